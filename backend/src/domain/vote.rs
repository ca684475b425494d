//! Votes: one recorded option choice by one voter on one poll.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::{ExternalIdentity, PollId};

/// An immutable vote.
///
/// The voter is always the external identity, never the internal user id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Vote {
    pub id: Uuid,
    #[schema(value_type = String, format = Uuid)]
    pub poll_id: PollId,
    #[schema(value_type = String)]
    pub voter: ExternalIdentity,
    pub option_index: u32,
    pub created_at: DateTime<Utc>,
}

impl Vote {
    /// Record a new vote with a fresh id.
    pub fn cast(
        poll_id: PollId,
        voter: ExternalIdentity,
        option_index: u32,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            poll_id,
            voter,
            option_index,
            created_at,
        }
    }
}

/// A vote joined with the public fields of its poll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VoteHistoryEntry {
    pub vote: Vote,
    pub poll: PollSummary,
}

/// Public fields of a poll shown next to a vote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PollSummary {
    #[schema(value_type = String, format = Uuid)]
    pub id: PollId,
    pub topic: String,
    pub options: Vec<String>,
    pub is_public: bool,
    pub end_time: DateTime<Utc>,
}

impl From<&super::Poll> for PollSummary {
    fn from(poll: &super::Poll) -> Self {
        Self {
            id: poll.id(),
            topic: poll.topic().to_owned(),
            options: poll.options().to_vec(),
            is_public: poll.is_public(),
            end_time: poll.window().end(),
        }
    }
}

/// Fallback display name for voters without a profile.
pub const ANONYMOUS_VOTER: &str = "Anonymous";
/// Fallback email for voters without a profile.
pub const UNKNOWN_EMAIL: &str = "N/A";

/// A vote joined with the voter's profile, as shown to the poll owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VoterDetail {
    pub vote_id: Uuid,
    pub name: String,
    pub email: String,
    pub voted_at: DateTime<Utc>,
    pub option_index: u32,
}

impl VoterDetail {
    /// Build a row, substituting placeholders for unknown profile fields.
    pub fn new(vote: &Vote, name: Option<String>, email: Option<String>) -> Self {
        Self {
            vote_id: vote.id,
            name: name.unwrap_or_else(|| ANONYMOUS_VOTER.to_owned()),
            email: email.unwrap_or_else(|| UNKNOWN_EMAIL.to_owned()),
            voted_at: vote.created_at,
            option_index: vote.option_index,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn voter_detail_falls_back_for_missing_profile() {
        let vote = Vote::cast(
            PollId::random(),
            ExternalIdentity::new("user_1").expect("identity"),
            2,
            Utc::now(),
        );
        let detail = VoterDetail::new(&vote, None, None);
        assert_eq!(detail.name, ANONYMOUS_VOTER);
        assert_eq!(detail.email, UNKNOWN_EMAIL);
        assert_eq!(detail.option_index, 2);
        assert_eq!(detail.vote_id, vote.id);
    }

    #[rstest]
    fn vote_serialises_voter_as_string() {
        let vote = Vote::cast(
            PollId::random(),
            ExternalIdentity::new("user_1").expect("identity"),
            0,
            Utc::now(),
        );
        let value = serde_json::to_value(&vote).expect("serialise vote");
        assert_eq!(value["voter"], "user_1");
        assert_eq!(value["optionIndex"], 0);
    }
}
