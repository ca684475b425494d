//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};

use crate::domain::ports::{MockPollAssist, MockPollsCommand, MockPollsQuery, PollView};
use crate::domain::{Poll, PollDraft, PollId, PollStatus, UserId, VotingWindow};
use crate::inbound::http::state::HttpState;

/// Handler state backed by the given mocks.
pub fn test_state(
    polls: MockPollsCommand,
    polls_query: MockPollsQuery,
    assist: MockPollAssist,
) -> HttpState {
    HttpState::new(Arc::new(polls), Arc::new(polls_query), Arc::new(assist))
}

pub fn fixture_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0)
        .single()
        .expect("fixture time")
}

/// An active public poll with two options.
pub fn sample_poll(id: PollId) -> Poll {
    let now = fixture_time();
    Poll::new(PollDraft {
        id,
        topic: "Lunch?".into(),
        options: vec!["Pizza".into(), "Sushi".into()],
        is_public: true,
        window: VotingWindow::new(now - Duration::hours(1), now + Duration::hours(1)),
        created_by: UserId::random(),
        created_at: now - Duration::hours(2),
    })
    .expect("valid poll")
}

pub fn sample_view(id: PollId) -> PollView {
    PollView {
        poll: sample_poll(id),
        status: PollStatus::Active,
    }
}
