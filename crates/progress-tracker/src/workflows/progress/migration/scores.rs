use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use super::super::domain::{CategoryIndex, Child, ChildId, Score, ScoreEntry};

/// Maps a legacy 1-5 score onto the 0-2 scale: 1-2 → 0, 3 → 1, 4-5 → 2.
pub fn migrate_score(old: u8) -> Score {
    match old {
        0..=2 => 0,
        3 => 1,
        _ => 2,
    }
}

/// Score entry as the legacy schema stored it: one `sN` key per 1-based category slot.
#[derive(Debug, Clone, Deserialize)]
pub struct LegacyScoreEntry {
    pub date: NaiveDate,
    #[serde(default)]
    pub evaluator: String,
    #[serde(default)]
    pub descriptions: BTreeMap<String, String>,
    #[serde(flatten)]
    pub slots: BTreeMap<String, Value>,
}

impl LegacyScoreEntry {
    pub fn into_current(self) -> ScoreEntry {
        let mut category_scores = BTreeMap::new();
        for (key, value) in &self.slots {
            let Some(index) = slot_index(key) else {
                continue;
            };
            match value.as_u64() {
                Some(raw) => {
                    let old = u8::try_from(raw).unwrap_or(u8::MAX);
                    category_scores.insert(index, migrate_score(old));
                }
                None => debug!(slot = %key, date = %self.date, "skipping non-numeric legacy score"),
            }
        }

        let descriptions = self
            .descriptions
            .into_iter()
            .filter_map(|(key, note)| key.trim().parse::<CategoryIndex>().ok().map(|i| (i, note)))
            .collect();

        ScoreEntry {
            date: self.date,
            evaluator: self.evaluator,
            category_scores,
            descriptions,
        }
    }
}

fn slot_index(key: &str) -> Option<CategoryIndex> {
    key.strip_prefix('s')?
        .parse::<CategoryIndex>()
        .ok()
        .filter(|slot| *slot >= 1)
        .map(|slot| slot - 1)
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyChild {
    pub id: ChildId,
    pub name: String,
    #[serde(default)]
    pub scores: Vec<LegacyScoreEntry>,
    #[serde(default)]
    pub archived: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl LegacyChild {
    pub fn into_current(self) -> Child {
        Child {
            id: self.id,
            name: self.name,
            scores: self
                .scores
                .into_iter()
                .map(LegacyScoreEntry::into_current)
                .collect(),
            archived: self.archived,
            created_at: self.created_at,
        }
    }
}
