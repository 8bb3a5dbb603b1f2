use serde::{Deserialize, Serialize};
use tracing::warn;

use super::super::evaluation::{CancelRule, Period, RuleConfig, ScoreScale, VetoRule};

/// Settings as stored before the 0-2 scale existed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyRuleConfig {
    pub categories: Vec<String>,
    #[serde(default)]
    pub threshold: Option<f64>,
    #[serde(default)]
    pub calc_type: Option<LegacyCalcType>,
    #[serde(default)]
    pub veto_fives: Option<u32>,
    #[serde(default)]
    pub veto_ones: Option<u32>,
    #[serde(default)]
    pub cancel_threshold: Option<u32>,
    #[serde(default)]
    pub periods: Vec<Period>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LegacyCalcType {
    Neutral,
    Normal,
}

/// Threshold applied to migrated settings; legacy thresholds belong to the 1-5 scale.
pub const MIGRATED_THRESHOLD: f64 = 1.5;

pub fn migrate_settings(legacy: LegacyRuleConfig) -> RuleConfig {
    let mut cancel_rule = CancelRule::default();
    if let (Some(fives), Some(ones)) = (legacy.veto_fives, legacy.veto_ones) {
        cancel_rule.enabled = true;
        cancel_rule.high_count = fives;
        cancel_rule.low_count = ones;
    }

    if legacy.calc_type == Some(LegacyCalcType::Normal) {
        warn!("legacy 'normal' calculation type dropped; cancellation now follows the cancel rule");
    }
    if let Some(cut_off) = legacy.cancel_threshold.filter(|value| *value > 0) {
        warn!(cut_off, "legacy cancel threshold dropped; veto rule starts disabled");
    }

    RuleConfig {
        categories: legacy.categories,
        threshold: MIGRATED_THRESHOLD,
        score_system: ScoreScale::CURRENT,
        veto_rule: VetoRule::default(),
        cancel_rule,
        periods: legacy.periods,
    }
}
