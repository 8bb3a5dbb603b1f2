mod config;
mod policy;
mod rules;

pub use config::{CancelRule, Period, RuleConfig, RuleConfigError, ScoreScale, VetoRule};
pub use policy::{is_achieved, AchievementStatus};

use super::domain::{Score, MIN_SCORE};
use serde::{Deserialize, Serialize};

/// Aggregate outcome of one evaluation pass.
///
/// When `veto_applied` is set, `average` is reported as `0.0` and carries no statistical meaning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateResult {
    pub average: f64,
    pub remaining_zeros: usize,
    pub total_scores: usize,
    /// Scores removed by the cancel rule before averaging.
    #[serde(default)]
    pub cancelled_scores: usize,
    pub veto_applied: bool,
}

/// Stateless evaluator that applies a rule configuration to flattened score lists.
#[derive(Debug, Clone, Copy)]
pub struct RuleEvaluator<'a> {
    config: &'a RuleConfig,
}

impl<'a> RuleEvaluator<'a> {
    pub fn new(config: &'a RuleConfig) -> Self {
        Self { config }
    }

    pub fn evaluate(&self, scores: &[Score]) -> Option<AggregateResult> {
        if scores.is_empty() {
            return None;
        }

        let mut working = scores.to_vec();
        let cancelled_scores =
            rules::apply_cancellation(&mut working, &self.config.cancel_rule).total();

        let remaining_zeros = rules::count_of(&working, MIN_SCORE);
        if policy::veto_applies(&self.config.veto_rule, remaining_zeros) {
            return Some(AggregateResult {
                average: 0.0,
                remaining_zeros,
                total_scores: working.len(),
                cancelled_scores,
                veto_applied: true,
            });
        }

        if working.is_empty() {
            return None;
        }

        Some(AggregateResult {
            average: mean(&working),
            remaining_zeros,
            total_scores: working.len(),
            cancelled_scores,
            veto_applied: false,
        })
    }

    pub fn achieved(&self, result: Option<&AggregateResult>) -> bool {
        is_achieved(result, self.config.threshold)
    }
}

/// Convenience wrapper around [`RuleEvaluator::evaluate`].
pub fn evaluate(scores: &[Score], config: &RuleConfig) -> Option<AggregateResult> {
    RuleEvaluator::new(config).evaluate(scores)
}

/// Plain arithmetic mean with no rules applied; `None` for an empty list.
pub fn raw_mean(scores: &[Score]) -> Option<f64> {
    if scores.is_empty() {
        None
    } else {
        Some(mean(scores))
    }
}

fn mean(scores: &[Score]) -> f64 {
    let total: u64 = scores.iter().map(|score| u64::from(*score)).sum();
    total as f64 / scores.len() as f64
}
