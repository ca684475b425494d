//! Per-option vote counts, derived from the full vote set on every read.

use serde::{Deserialize, Serialize};
use tracing::warn;
use utoipa::ToSchema;

use super::Vote;

/// Vote counts indexed by option position.
///
/// # Examples
/// ```
/// use chrono::Utc;
/// use livepoll::domain::{ExternalIdentity, PollId, Tally, Vote};
///
/// let poll = PollId::random();
/// let voter = ExternalIdentity::new("user_1").expect("identity");
/// let votes: Vec<Vote> = [0, 0, 1]
///     .into_iter()
///     .map(|i| Vote::cast(poll, voter.clone(), i, Utc::now()))
///     .collect();
/// let tally = Tally::from_votes(3, &votes);
/// assert_eq!(tally.counts(), [2, 1, 0]);
/// assert_eq!(tally.total(), 3);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Tally {
    counts: Vec<u64>,
    total: u64,
}

impl Tally {
    /// Count `votes` over `option_count` options.
    ///
    /// Out-of-range indices are skipped, so `total` always equals the sum of
    /// `counts`.
    pub fn from_votes<'a>(option_count: usize, votes: impl IntoIterator<Item = &'a Vote>) -> Self {
        let mut counts = vec![0_u64; option_count];
        for vote in votes {
            match usize::try_from(vote.option_index)
                .ok()
                .and_then(|index| counts.get_mut(index))
            {
                Some(count) => *count += 1,
                None => warn!(
                    vote_id = %vote.id,
                    poll_id = %vote.poll_id,
                    option_index = vote.option_index,
                    option_count,
                    "ignoring vote with out-of-range option index"
                ),
            }
        }
        let total = counts.iter().sum();
        Self { counts, total }
    }

    pub fn counts(&self) -> &[u64] {
        &self.counts
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    /// Count for option `index`, zero when out of range.
    pub fn count(&self, index: usize) -> u64 {
        self.counts.get(index).copied().unwrap_or(0)
    }

    /// Indices sharing the highest count. Empty when nobody voted.
    pub fn leaders(&self) -> Vec<usize> {
        let Some(max) = self.counts.iter().copied().max().filter(|max| *max > 0) else {
            return Vec::new();
        };
        self.counts
            .iter()
            .enumerate()
            .filter_map(|(index, count)| (*count == max).then_some(index))
            .collect()
    }

    /// Share of the total for option `index`, in percent.
    #[expect(clippy::cast_precision_loss, reason = "vote counts stay far below 2^52")]
    pub fn percentage(&self, index: usize) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.count(index) as f64 * 100.0 / self.total as f64
    }
}
