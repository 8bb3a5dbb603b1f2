//! One-time conversion from the legacy 1-5 schema to the current 0-2 schema.
//!
//! A settings document is current exactly when it carries a `scoreSystem` key. Everything
//! else is treated as legacy and converted, together with every stored score, before any
//! evaluator call sees it.

mod scores;
mod settings;

pub use scores::{migrate_score, LegacyChild, LegacyScoreEntry};
pub use settings::{migrate_settings, LegacyCalcType, LegacyRuleConfig, MIGRATED_THRESHOLD};

use serde::de::IgnoredAny;
use serde::Deserialize;

use super::evaluation::{RuleConfig, RuleConfigError};

/// Settings as loaded, before resolution to the canonical shape.
#[derive(Debug, Clone, PartialEq)]
pub enum SettingsDocument {
    Current(RuleConfig),
    Legacy(LegacyRuleConfig),
}

#[derive(Deserialize)]
struct SchemaProbe {
    #[serde(rename = "scoreSystem", default)]
    score_system: Option<IgnoredAny>,
}

impl SettingsDocument {
    pub fn from_json(raw: &str) -> Result<Self, MigrationError> {
        let probe: SchemaProbe = serde_json::from_str(raw)?;
        if probe.score_system.is_some() {
            Ok(Self::Current(serde_json::from_str(raw)?))
        } else {
            Ok(Self::Legacy(serde_json::from_str(raw)?))
        }
    }

    pub fn needs_migration(&self) -> bool {
        matches!(self, Self::Legacy(_))
    }

    /// Resolves to the canonical schema and validates the result.
    pub fn into_current(self) -> Result<RuleConfig, MigrationError> {
        let config = match self {
            Self::Current(config) => config,
            Self::Legacy(legacy) => migrate_settings(legacy),
        };
        config.validate()?;
        Ok(config)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    #[error("malformed data document: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to read data document: {0}")]
    Io(#[from] std::io::Error),
    #[error("settings are invalid after resolution: {0}")]
    InvalidSettings(#[from] RuleConfigError),
}
