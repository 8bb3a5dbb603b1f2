use super::config::VetoRule;
use super::AggregateResult;

pub(crate) fn veto_applies(rule: &VetoRule, remaining_zeros: usize) -> bool {
    rule.enabled && remaining_zeros >= rule.zero_count as usize
}

/// A missing result never counts as achieved, and a veto beats any average.
pub fn is_achieved(result: Option<&AggregateResult>, threshold: f64) -> bool {
    match result {
        Some(result) => !result.veto_applied && result.average >= threshold,
        None => false,
    }
}

/// Outcome label used by summaries and exports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AchievementStatus {
    Achieved,
    InProgress,
    NoData,
}

impl AchievementStatus {
    pub fn from_result(result: Option<&AggregateResult>, threshold: f64) -> Self {
        match result {
            None => Self::NoData,
            Some(_) if is_achieved(result, threshold) => Self::Achieved,
            Some(_) => Self::InProgress,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Achieved => "Achieved",
            Self::InProgress => "In Progress",
            Self::NoData => "No Data",
        }
    }
}
