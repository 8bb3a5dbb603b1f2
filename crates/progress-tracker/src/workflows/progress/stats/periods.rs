use std::collections::HashSet;

use chrono::NaiveDate;
use serde::Serialize;

use super::super::domain::{Child, Score, ScoreEntry};
use super::super::evaluation::{AggregateResult, Period, RuleConfig, RuleEvaluator};

/// Result of one configured period for one child.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodOutcome {
    pub name: String,
    pub days: u32,
    #[serde(flatten)]
    pub result: AggregateResult,
    pub achieved: bool,
    /// Distinct dates actually inside the window; below `days` when history is short.
    pub days_count: usize,
}

/// Overall and per-period statistics for one child, recomputed on demand.
#[derive(Debug, Clone, PartialEq)]
pub struct ChildStats {
    pub overall: Option<AggregateResult>,
    /// One slot per configured period, in configuration order.
    pub periods: Vec<Option<PeriodOutcome>>,
}

impl ChildStats {
    pub fn average(&self) -> Option<f64> {
        self.overall.map(|result| result.average)
    }

    pub fn remaining_zeros(&self) -> usize {
        self.overall.map_or(0, |result| result.remaining_zeros)
    }

    pub fn total_scores(&self) -> usize {
        self.overall.map_or(0, |result| result.total_scores)
    }

    pub fn veto_applied(&self) -> bool {
        self.overall.map_or(false, |result| result.veto_applied)
    }

    pub fn overall_achieved(&self, threshold: f64) -> bool {
        super::super::evaluation::is_achieved(self.overall.as_ref(), threshold)
    }
}

/// Computes the overall result and one windowed result per configured period.
pub fn aggregate(child: &Child, config: &RuleConfig) -> ChildStats {
    let evaluator = RuleEvaluator::new(config);
    let overall = evaluator.evaluate(&child.flattened_scores());

    let dates = child.distinct_dates_desc();
    let periods = config
        .periods
        .iter()
        .map(|period| evaluate_period(&evaluator, child, &dates, period))
        .collect();

    ChildStats { overall, periods }
}

fn evaluate_period(
    evaluator: &RuleEvaluator<'_>,
    child: &Child,
    dates_desc: &[NaiveDate],
    period: &Period,
) -> Option<PeriodOutcome> {
    let window_len = dates_desc.len().min(period.days as usize);
    let window: HashSet<NaiveDate> = dates_desc[..window_len].iter().copied().collect();

    let scores: Vec<Score> = child
        .scores
        .iter()
        .filter(|entry| window.contains(&entry.date))
        .flat_map(ScoreEntry::scores)
        .collect();

    if scores.is_empty() {
        return None;
    }

    let result = evaluator.evaluate(&scores)?;
    Some(PeriodOutcome {
        name: period.name.clone(),
        days: period.days,
        result,
        achieved: evaluator.achieved(Some(&result)),
        days_count: window.len(),
    })
}
