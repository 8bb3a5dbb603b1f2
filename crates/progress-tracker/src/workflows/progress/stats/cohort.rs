use serde::Serialize;

use super::super::domain::{CategoryIndex, Child, ChildId};
use super::super::evaluation::{raw_mean, AchievementStatus, AggregateResult, RuleConfig};
use super::periods::aggregate;

/// Statistics across a group of children, in the order they were supplied.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CohortReport {
    pub threshold: f64,
    pub children: Vec<ChildSummaryRow>,
    pub categories: Vec<CategoryAverage>,
    pub periods: Vec<PeriodAchievement>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChildSummaryRow {
    pub id: ChildId,
    pub name: String,
    pub evaluations: usize,
    pub overall: Option<AggregateResult>,
    pub raw_average: Option<f64>,
    pub status: AchievementStatus,
    pub status_label: &'static str,
    /// Per configured period, in configuration order.
    pub period_statuses: Vec<AchievementStatus>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryAverage {
    pub index: CategoryIndex,
    pub name: String,
    pub scored: usize,
    pub average: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodAchievement {
    pub name: String,
    pub days: u32,
    /// Children with enough history to produce a period result.
    pub evaluated: usize,
    pub achieved: usize,
}

impl CohortReport {
    pub fn build<'a, I>(children: I, config: &RuleConfig) -> Self
    where
        I: IntoIterator<Item = &'a Child>,
    {
        let mut totals = vec![(0u64, 0usize); config.categories.len()];
        let mut periods: Vec<PeriodAchievement> = config
            .periods
            .iter()
            .map(|period| PeriodAchievement {
                name: period.name.clone(),
                days: period.days,
                evaluated: 0,
                achieved: 0,
            })
            .collect();
        let mut rows = Vec::new();

        for child in children {
            for entry in &child.scores {
                for (index, score) in &entry.category_scores {
                    if let Some((sum, count)) = totals.get_mut(*index) {
                        *sum += u64::from(*score);
                        *count += 1;
                    }
                }
            }

            let stats = aggregate(child, config);
            let period_statuses = stats
                .periods
                .iter()
                .map(|period| match period {
                    Some(outcome) if outcome.achieved => AchievementStatus::Achieved,
                    Some(_) => AchievementStatus::InProgress,
                    None => AchievementStatus::NoData,
                })
                .collect::<Vec<_>>();

            for (tally, status) in periods.iter_mut().zip(&period_statuses) {
                if *status != AchievementStatus::NoData {
                    tally.evaluated += 1;
                }
                if *status == AchievementStatus::Achieved {
                    tally.achieved += 1;
                }
            }

            let status = AchievementStatus::from_result(stats.overall.as_ref(), config.threshold);
            rows.push(ChildSummaryRow {
                id: child.id.clone(),
                name: child.name.clone(),
                evaluations: child.scores.len(),
                overall: stats.overall,
                raw_average: raw_mean(&child.flattened_scores()),
                status,
                status_label: status.label(),
                period_statuses,
            });
        }

        let categories = config
            .categories
            .iter()
            .zip(totals)
            .enumerate()
            .map(|(index, (name, (sum, count)))| CategoryAverage {
                index,
                name: name.clone(),
                scored: count,
                average: (count > 0).then(|| sum as f64 / count as f64),
            })
            .collect();

        Self {
            threshold: config.threshold,
            children: rows,
            categories,
            periods,
        }
    }
}
