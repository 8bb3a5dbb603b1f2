use std::io::Read;
use std::path::Path;

use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::domain::Child;
use super::evaluation::RuleConfig;
use super::migration::{LegacyChild, LegacyRuleConfig, MigrationError, SettingsDocument};

/// Whole-store document: the settings document next to the children document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataSnapshot {
    #[serde(default)]
    pub settings: RuleConfig,
    #[serde(default)]
    pub children: Vec<Child>,
}

/// Snapshot resolved to the current schema, noting whether a migration ran.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedSnapshot {
    pub snapshot: DataSnapshot,
    pub migrated: bool,
}

#[derive(Deserialize)]
struct SnapshotProbe {
    #[serde(default)]
    settings: Option<SettingsProbe>,
}

#[derive(Deserialize)]
struct SettingsProbe {
    #[serde(rename = "scoreSystem", default)]
    score_system: Option<IgnoredAny>,
}

#[derive(Deserialize)]
struct LegacySnapshot {
    settings: LegacyRuleConfig,
    #[serde(default)]
    children: Vec<LegacyChild>,
}

impl DataSnapshot {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<ResolvedSnapshot, MigrationError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(mut reader: R) -> Result<ResolvedSnapshot, MigrationError> {
        let mut raw = String::new();
        reader.read_to_string(&mut raw)?;
        Self::resolve(&raw)
    }

    /// Parses a snapshot, migrating settings and every score when the settings are legacy.
    pub fn resolve(raw: &str) -> Result<ResolvedSnapshot, MigrationError> {
        let probe: SnapshotProbe = serde_json::from_str(raw)?;
        let is_legacy = matches!(probe.settings, Some(SettingsProbe { score_system: None }));

        if !is_legacy {
            let snapshot: DataSnapshot = serde_json::from_str(raw)?;
            snapshot.settings.validate()?;
            return Ok(ResolvedSnapshot {
                snapshot,
                migrated: false,
            });
        }

        let legacy: LegacySnapshot = serde_json::from_str(raw)?;
        let settings = SettingsDocument::Legacy(legacy.settings).into_current()?;
        let children: Vec<Child> = legacy
            .children
            .into_iter()
            .map(LegacyChild::into_current)
            .collect();

        info!(
            children = children.len(),
            categories = settings.categories.len(),
            "migrated legacy snapshot to the 0-2 score scale"
        );

        Ok(ResolvedSnapshot {
            snapshot: DataSnapshot { settings, children },
            migrated: true,
        })
    }

    pub fn to_json_pretty(&self) -> Result<String, MigrationError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
