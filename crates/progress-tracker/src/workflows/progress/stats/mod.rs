mod cohort;
mod periods;
pub mod views;

pub use cohort::{CategoryAverage, ChildSummaryRow, CohortReport, PeriodAchievement};
pub use periods::{aggregate, ChildStats, PeriodOutcome};
