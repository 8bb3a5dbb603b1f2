use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Position of a category inside `RuleConfig::categories`.
pub type CategoryIndex = usize;

/// A single category score on the current 0-2 scale.
pub type Score = u8;

/// Lowest score of the current scale; veto counts occurrences of this value.
pub const MIN_SCORE: Score = 0;
/// Highest score of the current scale.
pub const MAX_SCORE: Score = 2;

/// Identifier wrapper for tracked children.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChildId(pub String);

impl ChildId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ChildId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One evaluation event for one child on one date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreEntry {
    pub date: NaiveDate,
    pub evaluator: String,
    #[serde(default)]
    pub category_scores: BTreeMap<CategoryIndex, Score>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub descriptions: BTreeMap<CategoryIndex, String>,
}

impl ScoreEntry {
    pub fn new(date: NaiveDate, evaluator: impl Into<String>) -> Self {
        Self {
            date,
            evaluator: evaluator.into(),
            category_scores: BTreeMap::new(),
            descriptions: BTreeMap::new(),
        }
    }

    pub fn with_score(mut self, category: CategoryIndex, score: Score) -> Self {
        self.category_scores.insert(category, score);
        self
    }

    /// Scores in category order; unscored categories are skipped.
    pub fn scores(&self) -> impl Iterator<Item = Score> + '_ {
        self.category_scores.values().copied()
    }
}

/// A tracked individual and their evaluation history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Child {
    pub id: ChildId,
    pub name: String,
    /// Newest-first by convention; at most one entry per date.
    #[serde(default)]
    pub scores: Vec<ScoreEntry>,
    #[serde(default)]
    pub archived: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Child {
    pub fn new(id: ChildId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            scores: Vec::new(),
            archived: false,
            created_at: None,
        }
    }

    /// Every recorded category score across the full history.
    pub fn flattened_scores(&self) -> Vec<Score> {
        self.scores.iter().flat_map(ScoreEntry::scores).collect()
    }

    /// Distinct evaluation dates, most recent first.
    pub fn distinct_dates_desc(&self) -> Vec<NaiveDate> {
        let dates: BTreeSet<NaiveDate> = self.scores.iter().map(|entry| entry.date).collect();
        dates.into_iter().rev().collect()
    }

    /// Returns a copy whose history holds `entry` in front and no other entry for its date.
    pub fn with_entry(&self, entry: ScoreEntry) -> Self {
        let mut scores = Vec::with_capacity(self.scores.len() + 1);
        let date = entry.date;
        scores.push(entry);
        scores.extend(
            self.scores
                .iter()
                .filter(|existing| existing.date != date)
                .cloned(),
        );

        Self {
            scores,
            ..self.clone()
        }
    }

    /// Returns a copy with any entry for `date` removed.
    pub fn without_date(&self, date: NaiveDate) -> Self {
        Self {
            scores: self
                .scores
                .iter()
                .filter(|entry| entry.date != date)
                .cloned()
                .collect(),
            ..self.clone()
        }
    }
}
