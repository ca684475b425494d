//! Row payloads exchanged with the broadcast table store.
//!
//! Column names follow the store's camelCase table layout.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::domain::{
    ExternalIdentity, Poll, PollAnalysis, PollDraft, PollId, UserId, Vote, VotingWindow,
    parse_timestamp,
};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct PollRowDto<'a> {
    id: Uuid,
    topic: &'a str,
    options: &'a [String],
    is_public: bool,
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
    created_by: Uuid,
    created_at: DateTime<Utc>,
}

impl<'a> From<&'a Poll> for PollRowDto<'a> {
    fn from(poll: &'a Poll) -> Self {
        let window = poll.window();
        Self {
            id: *poll.id().as_uuid(),
            topic: poll.topic(),
            options: poll.options(),
            is_public: poll.is_public(),
            start_time: window.start(),
            end_time: window.end(),
            created_by: *poll.created_by().as_uuid(),
            created_at: poll.created_at(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct VoteRowDto<'a> {
    id: Uuid,
    poll_id: Uuid,
    user_id: &'a str,
    option_index: u32,
    created_at: DateTime<Utc>,
}

impl<'a> From<&'a Vote> for VoteRowDto<'a> {
    fn from(vote: &'a Vote) -> Self {
        Self {
            id: vote.id,
            poll_id: *vote.poll_id.as_uuid(),
            user_id: vote.voter.as_ref(),
            option_index: vote.option_index,
            created_at: vote.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub(super) struct AnalysisPatchDto<'a> {
    pub(super) analysis: &'a PollAnalysis,
}

/// Poll row as read back from the store.
///
/// Timestamps stay textual: the store may hold zoned or naive values.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct PollRecordDto {
    id: Uuid,
    topic: String,
    options: Vec<String>,
    is_public: bool,
    start_time: String,
    end_time: String,
    created_by: Uuid,
    created_at: String,
    #[serde(default)]
    analysis: Option<serde_json::Value>,
}

impl TryFrom<PollRecordDto> for Poll {
    type Error = String;

    fn try_from(row: PollRecordDto) -> Result<Self, Self::Error> {
        let start = parse_timestamp("startTime", &row.start_time).map_err(|err| err.to_string())?;
        let end = parse_timestamp("endTime", &row.end_time).map_err(|err| err.to_string())?;
        let created_at =
            parse_timestamp("createdAt", &row.created_at).map_err(|err| err.to_string())?;
        let analysis = row.analysis.and_then(|value| {
            serde_json::from_value::<PollAnalysis>(value)
                .inspect_err(|err| {
                    warn!(poll_id = %row.id, error = %err, "ignoring malformed mirrored analysis");
                })
                .ok()
        });
        Ok(Poll::from_stored(
            PollDraft {
                id: PollId::from_uuid(row.id),
                topic: row.topic,
                options: row.options,
                is_public: row.is_public,
                window: VotingWindow::new(start, end),
                created_by: UserId::from_uuid(row.created_by),
                created_at,
            },
            analysis,
        ))
    }
}

/// Vote row as read back from the store.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct VoteRecordDto {
    id: Uuid,
    poll_id: Uuid,
    user_id: String,
    option_index: u32,
    created_at: String,
}

impl TryFrom<VoteRecordDto> for Vote {
    type Error = String;

    fn try_from(row: VoteRecordDto) -> Result<Self, Self::Error> {
        let voter = ExternalIdentity::new(row.user_id).map_err(|err| err.to_string())?;
        let created_at =
            parse_timestamp("createdAt", &row.created_at).map_err(|err| err.to_string())?;
        Ok(Vote {
            id: row.id,
            poll_id: PollId::from_uuid(row.poll_id),
            voter,
            option_index: row.option_index,
            created_at,
        })
    }
}
