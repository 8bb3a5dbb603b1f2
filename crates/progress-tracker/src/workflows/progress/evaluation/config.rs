use serde::{Deserialize, Serialize};

use super::super::domain::{Score, MAX_SCORE, MIN_SCORE};

/// Administrator-controlled rules shared by every child.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleConfig {
    pub categories: Vec<String>,
    pub threshold: f64,
    pub score_system: ScoreScale,
    pub veto_rule: VetoRule,
    pub cancel_rule: CancelRule,
    pub periods: Vec<Period>,
}

/// Bounds of the scoring scale. Its presence marks a document as the current schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreScale {
    pub min: Score,
    pub max: Score,
}

impl ScoreScale {
    pub const CURRENT: ScoreScale = ScoreScale {
        min: MIN_SCORE,
        max: MAX_SCORE,
    };

    pub fn contains(&self, score: Score) -> bool {
        (self.min..=self.max).contains(&score)
    }
}

/// Forces a non-achieved outcome once enough zeros survive cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VetoRule {
    pub enabled: bool,
    pub zero_count: u32,
}

/// Lets `high_count` occurrences of `high_score` cancel `low_count` occurrences of `low_score`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelRule {
    pub enabled: bool,
    pub high_score: Score,
    pub high_count: u32,
    pub low_score: Score,
    pub low_count: u32,
}

impl CancelRule {
    /// Equal scores or zero counts give the rule no well-defined multiset meaning.
    pub fn is_degenerate(&self) -> bool {
        self.high_score == self.low_score || self.high_count == 0 || self.low_count == 0
    }
}

/// Trailing window over the N most recent distinct evaluation dates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    pub days: u32,
    pub name: String,
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self {
            categories: vec![
                "Personal Tasks".to_string(),
                "Shared Spaces".to_string(),
                "Education".to_string(),
                "General Attitude".to_string(),
            ],
            threshold: 1.5,
            score_system: ScoreScale::CURRENT,
            veto_rule: VetoRule::default(),
            cancel_rule: CancelRule::default(),
            periods: vec![
                Period {
                    days: 6,
                    name: "6-Day Achievement".to_string(),
                },
                Period {
                    days: 12,
                    name: "12-Day Achievement".to_string(),
                },
            ],
        }
    }
}

impl Default for VetoRule {
    fn default() -> Self {
        Self {
            enabled: false,
            zero_count: 3,
        }
    }
}

impl Default for CancelRule {
    fn default() -> Self {
        Self {
            enabled: false,
            high_score: MAX_SCORE,
            high_count: 2,
            low_score: MIN_SCORE,
            low_count: 1,
        }
    }
}

impl RuleConfig {
    /// Rejects configurations the evaluator cannot give a meaningful result for.
    pub fn validate(&self) -> Result<(), RuleConfigError> {
        if self.score_system != ScoreScale::CURRENT {
            return Err(RuleConfigError::UnsupportedScale {
                min: self.score_system.min,
                max: self.score_system.max,
            });
        }

        if self.categories.is_empty() {
            return Err(RuleConfigError::NoCategories);
        }
        if let Some(index) = self
            .categories
            .iter()
            .position(|name| name.trim().is_empty())
        {
            return Err(RuleConfigError::BlankCategory { index });
        }

        if !self.threshold.is_finite() || self.threshold < 0.0 {
            return Err(RuleConfigError::InvalidThreshold(self.threshold));
        }

        if self.veto_rule.enabled && self.veto_rule.zero_count == 0 {
            return Err(RuleConfigError::ZeroVetoCount);
        }

        let cancel = &self.cancel_rule;
        if cancel.enabled {
            for score in [cancel.high_score, cancel.low_score] {
                if !self.score_system.contains(score) {
                    return Err(RuleConfigError::CancelScoreOutOfRange(score));
                }
            }
            if cancel.high_score == cancel.low_score {
                return Err(RuleConfigError::DegenerateCancelRule(cancel.high_score));
            }
            if cancel.high_count == 0 || cancel.low_count == 0 {
                return Err(RuleConfigError::ZeroCancelCount);
            }
        }

        for period in &self.periods {
            if period.name.trim().is_empty() {
                return Err(RuleConfigError::BlankPeriodName { days: period.days });
            }
            if period.days == 0 {
                return Err(RuleConfigError::EmptyPeriod {
                    name: period.name.clone(),
                });
            }
        }

        Ok(())
    }
}

/// Configuration-load validation failure.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RuleConfigError {
    #[error("at least one category is required")]
    NoCategories,
    #[error("category {index} has a blank name")]
    BlankCategory { index: usize },
    #[error("threshold {0} must be a finite, non-negative number")]
    InvalidThreshold(f64),
    #[error("only the 0-2 score scale is supported (got {min}-{max})")]
    UnsupportedScale { min: Score, max: Score },
    #[error("veto rule needs a zero count of at least 1")]
    ZeroVetoCount,
    #[error("cancel rule score {0} lies outside the score scale")]
    CancelScoreOutOfRange(Score),
    #[error("cancel rule cannot use score {0} as both high and low score")]
    DegenerateCancelRule(Score),
    #[error("cancel rule counts must be at least 1")]
    ZeroCancelCount,
    #[error("period '{name}' must span at least one day")]
    EmptyPeriod { name: String },
    #[error("period of {days} day(s) needs a name")]
    BlankPeriodName { days: u32 },
}
