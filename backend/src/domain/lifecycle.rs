//! Derived poll lifecycle.
//!
//! Status is never stored: it is a pure function of the voting window and the
//! clock reading supplied by the caller.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Half-open voting window `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VotingWindow {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl VotingWindow {
    /// Build a window. Ordering is not checked.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// Status of a poll with this window at `now`.
    pub fn status_at(&self, now: DateTime<Utc>) -> PollStatus {
        PollStatus::at(self, now)
    }
}

/// Lifecycle state of a poll.
///
/// # Examples
/// ```
/// use chrono::{Duration, Utc};
/// use livepoll::domain::{PollStatus, VotingWindow};
///
/// let start = Utc::now();
/// let window = VotingWindow::new(start, start + Duration::hours(1));
/// assert_eq!(PollStatus::at(&window, start), PollStatus::Active);
/// assert_eq!(PollStatus::at(&window, window.end()), PollStatus::Ended);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PollStatus {
    NotStarted,
    Active,
    Ended,
}

impl PollStatus {
    /// Evaluate the window at `now`.
    ///
    /// `start` itself is active and `end` itself is ended. An inverted window
    /// is never active.
    pub fn at(window: &VotingWindow, now: DateTime<Utc>) -> Self {
        if now >= window.end {
            Self::Ended
        } else if now < window.start {
            Self::NotStarted
        } else {
            Self::Active
        }
    }

    /// Whether the presentation tier accepts votes in this state.
    pub fn accepts_votes(self) -> bool {
        matches!(self, Self::Active)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use rstest::{fixture, rstest};

    #[fixture]
    fn window() -> VotingWindow {
        let start = Utc
            .with_ymd_and_hms(2024, 1, 1, 12, 0, 0)
            .single()
            .expect("valid start");
        VotingWindow::new(start, start + Duration::hours(2))
    }

    #[rstest]
    #[case(-Duration::seconds(1), PollStatus::NotStarted)]
    #[case(Duration::zero(), PollStatus::Active)]
    #[case(Duration::minutes(59), PollStatus::Active)]
    #[case(Duration::hours(2) - Duration::nanoseconds(1), PollStatus::Active)]
    #[case(Duration::hours(2), PollStatus::Ended)]
    #[case(Duration::days(3), PollStatus::Ended)]
    fn status_follows_window(
        window: VotingWindow,
        #[case] offset: Duration,
        #[case] expected: PollStatus,
    ) {
        assert_eq!(window.status_at(window.start() + offset), expected);
    }

    #[rstest]
    fn inverted_window_is_never_active(window: VotingWindow) {
        let inverted = VotingWindow::new(window.end(), window.start());
        let midpoint = window.start() + Duration::hours(1);
        assert_eq!(inverted.status_at(midpoint), PollStatus::Ended);
        assert_eq!(
            inverted.status_at(window.start() - Duration::hours(1)),
            PollStatus::NotStarted
        );
    }

    #[rstest]
    #[case(PollStatus::NotStarted, "\"not_started\"")]
    #[case(PollStatus::Active, "\"active\"")]
    #[case(PollStatus::Ended, "\"ended\"")]
    fn serialises_snake_case(#[case] status: PollStatus, #[case] expected: &str) {
        assert_eq!(serde_json::to_string(&status).expect("serialise"), expected);
    }

    #[rstest]
    fn only_active_accepts_votes() {
        assert!(PollStatus::Active.accepts_votes());
        assert!(!PollStatus::NotStarted.accepts_votes());
        assert!(!PollStatus::Ended.accepts_votes());
    }
}
