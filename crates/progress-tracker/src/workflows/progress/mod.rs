//! Daily behaviour scores, rule-based aggregation, and achievement reporting.
//!
//! Evaluations are stored per child as dated entries on a 0-2 scale. Statistics are never
//! persisted: every read flattens the stored history and runs it through the configured
//! cancellation and veto rules, once overall and once per configured period window.

pub mod domain;
pub mod evaluation;
pub mod migration;
pub mod repository;
pub mod roster;
pub mod router;
pub mod service;
pub mod snapshot;
pub mod stats;

#[cfg(test)]
mod tests;

pub use domain::{CategoryIndex, Child, ChildId, Score, ScoreEntry, MAX_SCORE, MIN_SCORE};
pub use evaluation::{
    evaluate, is_achieved, raw_mean, AchievementStatus, AggregateResult, CancelRule, Period,
    RuleConfig, RuleConfigError, RuleEvaluator, ScoreScale, VetoRule,
};
pub use migration::{MigrationError, SettingsDocument};
pub use repository::{ChildRepository, RepositoryError, SettingsRepository};
pub use roster::{ChildEvaluation, EvaluationBatch, RosterError, RosterQuery, SortOrder};
pub use router::progress_router;
pub use service::{BatchOutcome, ProgressService, ProgressServiceError, ScoreEvaluation};
pub use snapshot::{DataSnapshot, ResolvedSnapshot};
pub use stats::views::{ChildOverview, ChildStatsView, LegacyStatsView};
pub use stats::{aggregate, ChildStats, CohortReport, PeriodOutcome};
