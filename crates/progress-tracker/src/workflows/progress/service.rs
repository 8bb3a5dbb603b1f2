use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use serde::Serialize;
use tracing::{debug, info};

use super::domain::{Child, ChildId, Score};
use super::evaluation::{
    AchievementStatus, AggregateResult, RuleConfig, RuleConfigError, RuleEvaluator,
};
use super::repository::{ChildRepository, RepositoryError, SettingsRepository};
use super::roster::{self, EvaluationBatch, RosterError, RosterQuery};
use super::snapshot::DataSnapshot;
use super::stats::views::ChildOverview;
use super::stats::{aggregate, ChildStats, CohortReport};

/// Service composing the repositories, the rule evaluator, and roster operations.
pub struct ProgressService<C, S> {
    children: Arc<C>,
    settings: Arc<S>,
}

static CHILD_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_child_id(taken: &HashSet<&ChildId>) -> ChildId {
    loop {
        let id = CHILD_SEQUENCE.fetch_add(1, Ordering::Relaxed);
        let candidate = ChildId(format!("child-{id:06}"));
        if !taken.contains(&candidate) {
            return candidate;
        }
    }
}

/// Result of evaluating an ad-hoc score list.
#[derive(Debug, Clone, Serialize)]
pub struct ScoreEvaluation {
    pub result: Option<AggregateResult>,
    pub achieved: bool,
    pub status: AchievementStatus,
}

/// Summary of an applied evaluation batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchOutcome {
    pub date: NaiveDate,
    pub recorded: usize,
    pub cleared: usize,
}

impl<C, S> ProgressService<C, S>
where
    C: ChildRepository + 'static,
    S: SettingsRepository + 'static,
{
    pub fn new(children: Arc<C>, settings: Arc<S>) -> Self {
        Self { children, settings }
    }

    /// Replaces both documents with a resolved snapshot.
    pub fn seed(&self, snapshot: DataSnapshot) -> Result<(), ProgressServiceError> {
        snapshot.settings.validate()?;
        info!(
            children = snapshot.children.len(),
            categories = snapshot.settings.categories.len(),
            "seeding progress store"
        );
        self.settings.store(snapshot.settings)?;
        self.children.replace_all(snapshot.children)?;
        Ok(())
    }

    pub fn snapshot(&self) -> Result<DataSnapshot, ProgressServiceError> {
        Ok(DataSnapshot {
            settings: self.settings()?,
            children: self.children.load_all()?,
        })
    }

    /// Current settings, storing the defaults the first time none exist.
    pub fn settings(&self) -> Result<RuleConfig, ProgressServiceError> {
        match self.settings.load()? {
            Some(config) => Ok(config),
            None => {
                let config = RuleConfig::default();
                self.settings.store(config.clone())?;
                info!("no stored settings found; stored defaults");
                Ok(config)
            }
        }
    }

    pub fn update_settings(&self, config: RuleConfig) -> Result<RuleConfig, ProgressServiceError> {
        config.validate()?;
        self.settings.store(config.clone())?;
        info!(
            categories = config.categories.len(),
            periods = config.periods.len(),
            threshold = config.threshold,
            "settings updated"
        );
        Ok(config)
    }

    /// Evaluates a flattened score list against the given or the stored settings.
    pub fn evaluate_scores(
        &self,
        scores: &[Score],
        config: Option<RuleConfig>,
    ) -> Result<ScoreEvaluation, ProgressServiceError> {
        let config = match config {
            Some(config) => {
                config.validate()?;
                config
            }
            None => self.settings()?,
        };

        let evaluator = RuleEvaluator::new(&config);
        let result = evaluator.evaluate(scores);
        Ok(ScoreEvaluation {
            result,
            achieved: evaluator.achieved(result.as_ref()),
            status: AchievementStatus::from_result(result.as_ref(), config.threshold),
        })
    }

    pub fn record_evaluations(
        &self,
        batch: &EvaluationBatch,
    ) -> Result<BatchOutcome, ProgressServiceError> {
        let config = self.settings()?;
        self.modify_children(|children| {
            Ok((roster::apply_batch(children, batch, &config)?, ()))
        })?;

        // Child ids are unique within an applied batch, so entries map one-to-one onto children.
        let cleared = batch.entries.iter().filter(|entry| entry.absent).count();
        let recorded = batch
            .entries
            .iter()
            .filter(|entry| !entry.absent && entry.scores.len() == config.categories.len())
            .count();

        info!(
            date = %batch.date,
            evaluator = %batch.evaluator.trim(),
            recorded,
            cleared,
            "evaluation batch saved"
        );

        Ok(BatchOutcome {
            date: batch.date,
            recorded,
            cleared,
        })
    }

    pub fn roster(&self, query: &RosterQuery) -> Result<Vec<ChildOverview>, ProgressServiceError> {
        let config = self.settings()?;
        let children = self.children.load_all()?;

        let overview = roster::select(&children, query)
            .into_iter()
            .map(|child| ChildOverview::new(child, &aggregate(child, &config)))
            .collect::<Vec<_>>();
        debug!(matched = overview.len(), total = children.len(), "roster listed");
        Ok(overview)
    }

    pub fn child_stats(&self, id: &ChildId) -> Result<(Child, ChildStats), ProgressServiceError> {
        let config = self.settings()?;
        let child = self
            .children
            .load_all()?
            .into_iter()
            .find(|child| &child.id == id)
            .ok_or_else(|| RosterError::UnknownChild(id.clone()))?;

        let stats = aggregate(&child, &config);
        Ok((child, stats))
    }

    pub fn add_child(&self, name: &str) -> Result<Child, ProgressServiceError> {
        let child = self.modify_children(|children| {
            let taken: HashSet<&ChildId> = children.iter().map(|child| &child.id).collect();
            let mut child = Child::new(next_child_id(&taken), name.trim());
            child.created_at = Some(Utc::now());

            let updated = roster::add_child(children, child.clone())?;
            Ok((updated, child))
        })?;
        info!(child_id = %child.id, "child added");
        Ok(child)
    }

    pub fn archive_child(&self, id: &ChildId) -> Result<Child, ProgressServiceError> {
        let archived = self.modify_children(|children| {
            let updated = roster::archive_child(children, id)?;
            let archived = updated
                .iter()
                .find(|child| &child.id == id)
                .cloned()
                .ok_or_else(|| RosterError::UnknownChild(id.clone()))?;
            Ok((updated, archived))
        })?;
        info!(child_id = %id, "child archived");
        Ok(archived)
    }

    pub fn cohort_report(
        &self,
        include_archived: bool,
    ) -> Result<CohortReport, ProgressServiceError> {
        let config = self.settings()?;
        let children = self.children.load_all()?;
        let selected = children
            .iter()
            .filter(|child| include_archived || !child.archived);
        Ok(CohortReport::build(selected, &config))
    }

    fn modify_children<T, F>(&self, change: F) -> Result<T, ProgressServiceError>
    where
        F: FnOnce(&[Child]) -> Result<(Vec<Child>, T), ProgressServiceError>,
    {
        self.children.update(change)
    }
}

/// Error raised by the progress service.
#[derive(Debug, thiserror::Error)]
pub enum ProgressServiceError {
    #[error(transparent)]
    Settings(#[from] RuleConfigError),
    #[error(transparent)]
    Roster(#[from] RosterError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
