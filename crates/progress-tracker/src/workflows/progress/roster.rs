use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use icu_collator::{Collator, CollatorOptions, Strength};
use icu_locid::locale;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::domain::{CategoryIndex, Child, ChildId, Score, ScoreEntry, MAX_SCORE};
use super::evaluation::RuleConfig;

/// A day's worth of evaluations submitted together by one evaluator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationBatch {
    pub date: NaiveDate,
    pub evaluator: String,
    pub entries: Vec<ChildEvaluation>,
}

/// Pending changes for one child inside a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChildEvaluation {
    pub child_id: ChildId,
    /// Marks the child as absent, clearing any entry for the batch date.
    #[serde(default)]
    pub absent: bool,
    #[serde(default)]
    pub scores: BTreeMap<CategoryIndex, Score>,
    #[serde(default)]
    pub descriptions: BTreeMap<CategoryIndex, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RosterError {
    #[error("child {0} not found")]
    UnknownChild(ChildId),
    #[error("child {0} appears more than once in the batch")]
    DuplicateChild(ChildId),
    #[error("an evaluator is required")]
    MissingEvaluator,
    #[error("{child}: missing {}", .missing.join(", "))]
    IncompleteEvaluation { child: String, missing: Vec<String> },
    #[error("{child}: category {index} is not configured")]
    UnknownCategory { child: String, index: CategoryIndex },
    #[error("{child}: score {score} for category {index} is outside the 0-2 scale")]
    ScoreOutOfRange {
        child: String,
        index: CategoryIndex,
        score: Score,
    },
    #[error("no evaluations were recorded")]
    NothingRecorded,
    #[error("a child name is required")]
    BlankName,
}

/// Produces the next child list for a batch; the input list is never modified.
///
/// Fully scored children get a fresh entry for the batch date in front of their history,
/// absent children lose any entry for that date, and children with no pending scores are
/// returned as they were.
pub fn apply_batch(
    children: &[Child],
    batch: &EvaluationBatch,
    config: &RuleConfig,
) -> Result<Vec<Child>, RosterError> {
    let evaluator = batch.evaluator.trim();
    if evaluator.is_empty() {
        return Err(RosterError::MissingEvaluator);
    }

    let by_id: HashMap<&ChildId, &Child> =
        children.iter().map(|child| (&child.id, child)).collect();
    let mut pending: HashMap<&ChildId, &ChildEvaluation> = HashMap::new();
    let mut recorded = false;

    for evaluation in &batch.entries {
        let child = by_id
            .get(&evaluation.child_id)
            .ok_or_else(|| RosterError::UnknownChild(evaluation.child_id.clone()))?;

        if !evaluation.absent {
            validate_scores(child, evaluation, config)?;
            recorded |= evaluation.scores.len() == config.categories.len();
        }
        if pending.insert(&evaluation.child_id, evaluation).is_some() {
            return Err(RosterError::DuplicateChild(evaluation.child_id.clone()));
        }
    }

    if !recorded {
        return Err(RosterError::NothingRecorded);
    }

    let updated = children
        .iter()
        .map(|child| match pending.get(&child.id) {
            Some(evaluation) if evaluation.absent => child.without_date(batch.date),
            Some(evaluation) if evaluation.scores.len() == config.categories.len() => {
                child.with_entry(ScoreEntry {
                    date: batch.date,
                    evaluator: evaluator.to_string(),
                    category_scores: evaluation.scores.clone(),
                    descriptions: evaluation.descriptions.clone(),
                })
            }
            _ => child.clone(),
        })
        .collect();

    Ok(updated)
}

fn validate_scores(
    child: &Child,
    evaluation: &ChildEvaluation,
    config: &RuleConfig,
) -> Result<(), RosterError> {
    for (index, score) in &evaluation.scores {
        if *index >= config.categories.len() {
            return Err(RosterError::UnknownCategory {
                child: child.name.clone(),
                index: *index,
            });
        }
        if *score > MAX_SCORE {
            return Err(RosterError::ScoreOutOfRange {
                child: child.name.clone(),
                index: *index,
                score: *score,
            });
        }
    }

    let scored = evaluation.scores.len();
    if scored > 0 && scored < config.categories.len() {
        let missing = config
            .categories
            .iter()
            .enumerate()
            .filter(|(index, _)| !evaluation.scores.contains_key(index))
            .map(|(_, name)| name.clone())
            .collect();
        return Err(RosterError::IncompleteEvaluation {
            child: child.name.clone(),
            missing,
        });
    }

    Ok(())
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    #[serde(alias = "az")]
    Asc,
    #[serde(alias = "za")]
    Desc,
}

/// Filters applied when listing children.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterQuery {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub sort: SortOrder,
    #[serde(default)]
    pub include_archived: bool,
}

/// Case-insensitive name search and ordering; archived children only on request.
pub fn select<'a>(children: &'a [Child], query: &RosterQuery) -> Vec<&'a Child> {
    let needle = query
        .search
        .as_deref()
        .map(str::trim)
        .filter(|term| !term.is_empty())
        .map(str::to_lowercase);

    let mut selected: Vec<&Child> = children
        .iter()
        .filter(|child| query.include_archived || !child.archived)
        .filter(|child| match &needle {
            Some(term) => child.name.to_lowercase().contains(term.as_str()),
            None => true,
        })
        .collect();

    let collator = name_collator();
    selected.sort_by(|a, b| {
        let ordering = compare_names(collator.as_ref(), &a.name, &b.name);
        match query.sort {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    });
    selected
}

/// Turkish collation that ignores case but not accents, so `Ç` follows `C` and `ı` precedes `i`.
fn name_collator() -> Option<Collator> {
    let mut options = CollatorOptions::new();
    options.strength = Some(Strength::Secondary);
    match Collator::try_new(&locale!("tr").into(), options) {
        Ok(collator) => Some(collator),
        Err(error) => {
            warn!(error = ?error, "name collation unavailable; sorting by lowercase code points");
            None
        }
    }
}

fn compare_names(collator: Option<&Collator>, a: &str, b: &str) -> Ordering {
    let ordering = match collator {
        Some(collator) => collator.compare(a, b),
        None => a.to_lowercase().cmp(&b.to_lowercase()),
    };
    ordering.then_with(|| a.cmp(b))
}

/// Returns the list with a new, empty child appended.
pub fn add_child(children: &[Child], child: Child) -> Result<Vec<Child>, RosterError> {
    if child.name.trim().is_empty() {
        return Err(RosterError::BlankName);
    }
    let mut updated = children.to_vec();
    updated.push(child);
    Ok(updated)
}

/// Soft-deletes a child; its history stays available for statistics.
pub fn archive_child(children: &[Child], id: &ChildId) -> Result<Vec<Child>, RosterError> {
    if !children.iter().any(|child| &child.id == id) {
        return Err(RosterError::UnknownChild(id.clone()));
    }

    Ok(children
        .iter()
        .map(|child| {
            if &child.id == id {
                Child {
                    archived: true,
                    ..child.clone()
                }
            } else {
                child.clone()
            }
        })
        .collect())
}
