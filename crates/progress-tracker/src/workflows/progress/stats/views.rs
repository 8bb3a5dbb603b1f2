use serde::Serialize;

use super::super::domain::{Child, ChildId};
use super::super::evaluation::raw_mean;
use super::periods::{ChildStats, PeriodOutcome};

/// Flattened statistics payload: overall fields sit next to the period list.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChildStatsView {
    pub average: Option<f64>,
    pub remaining_zeros: usize,
    pub total_scores: usize,
    pub veto_applied: bool,
    pub periods: Vec<Option<PeriodOutcome>>,
}

impl From<&ChildStats> for ChildStatsView {
    fn from(stats: &ChildStats) -> Self {
        Self {
            average: stats.average(),
            remaining_zeros: stats.remaining_zeros(),
            total_scores: stats.total_scores(),
            veto_applied: stats.veto_applied(),
            periods: stats.periods.clone(),
        }
    }
}

/// Field names older dashboards still read.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyStatsView {
    pub normal_avg: Option<f64>,
    pub neutral_avg: Option<LegacyNeutralAverage>,
    pub periods: Vec<Option<LegacyPeriodView>>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyNeutralAverage {
    pub average: f64,
    pub remaining_ones: usize,
    pub total_scores: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyPeriodView {
    pub average: f64,
    pub remaining_ones: usize,
    pub achieved: bool,
    pub days_count: usize,
}

impl LegacyStatsView {
    pub fn new(child: &Child, stats: &ChildStats) -> Self {
        let neutral_avg = stats.overall.map(|result| LegacyNeutralAverage {
            average: result.average,
            remaining_ones: result.remaining_zeros,
            total_scores: result.total_scores,
        });

        let periods = stats
            .periods
            .iter()
            .map(|period| {
                period.as_ref().map(|outcome| LegacyPeriodView {
                    average: outcome.result.average,
                    remaining_ones: outcome.result.remaining_zeros,
                    achieved: outcome.achieved,
                    days_count: outcome.days_count,
                })
            })
            .collect();

        Self {
            normal_avg: raw_mean(&child.flattened_scores()),
            neutral_avg,
            periods,
        }
    }
}

/// Roster row combining identity with freshly computed statistics.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChildOverview {
    pub id: ChildId,
    pub name: String,
    pub archived: bool,
    pub evaluations: usize,
    pub stats: ChildStatsView,
}

impl ChildOverview {
    pub fn new(child: &Child, stats: &ChildStats) -> Self {
        Self {
            id: child.id.clone(),
            name: child.name.clone(),
            archived: child.archived,
            evaluations: child.scores.len(),
            stats: ChildStatsView::from(stats),
        }
    }
}
