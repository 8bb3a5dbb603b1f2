use super::super::domain::Score;
use super::config::CancelRule;

/// How many occurrences the cancel rule removed from the working list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Cancellation {
    pub high_removed: usize,
    pub low_removed: usize,
}

impl Cancellation {
    pub fn total(&self) -> usize {
        self.high_removed + self.low_removed
    }
}

pub(crate) fn count_of(scores: &[Score], value: Score) -> usize {
    scores.iter().filter(|score| **score == value).count()
}

/// Removes paired high/low occurrences while both sides can still pay a full round.
///
/// Equivalent to repeatedly decrementing both tallies until either falls below its count,
/// so the number of rounds is the smaller of the two integer quotients.
pub(crate) fn apply_cancellation(working: &mut Vec<Score>, rule: &CancelRule) -> Cancellation {
    if !rule.enabled || rule.is_degenerate() {
        return Cancellation::default();
    }

    let highs = count_of(working, rule.high_score);
    let lows = count_of(working, rule.low_score);
    let high_count = rule.high_count as usize;
    let low_count = rule.low_count as usize;

    let rounds = (highs / high_count).min(lows / low_count);
    if rounds == 0 {
        return Cancellation::default();
    }

    let cancellation = Cancellation {
        high_removed: rounds * high_count,
        low_removed: rounds * low_count,
    };

    let mut high_budget = cancellation.high_removed;
    let mut low_budget = cancellation.low_removed;
    working.retain(|score| {
        if *score == rule.high_score && high_budget > 0 {
            high_budget -= 1;
            false
        } else if *score == rule.low_score && low_budget > 0 {
            low_budget -= 1;
            false
        } else {
            true
        }
    });

    cancellation
}
