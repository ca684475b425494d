//! Driving port for poll and vote mutations.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Error, ExternalIdentity, Identity, Poll, PollAnalysis, PollId, Vote};

/// Input for [`PollsCommand::create_poll`].
///
/// Timestamps arrive as text and are validated by the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePollRequest {
    pub topic: String,
    pub options: Vec<String>,
    #[serde(default)]
    pub is_public: bool,
    /// RFC 3339, or `YYYY-MM-DDTHH:MM[:SS]` read as UTC.
    pub start_time: String,
    /// RFC 3339, or `YYYY-MM-DDTHH:MM[:SS]` read as UTC.
    pub end_time: String,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PollsCommand: Send + Sync {
    /// Create a poll owned by `owner`, registering the owner on first use.
    async fn create_poll(&self, request: CreatePollRequest, owner: &Identity)
    -> Result<Poll, Error>;

    /// Record a vote for option `option_index` of `poll_id`.
    ///
    /// The poll's voting window and earlier votes by the same voter are not
    /// checked.
    async fn cast_vote(
        &self,
        poll_id: PollId,
        option_index: i64,
        voter: &ExternalIdentity,
    ) -> Result<Vote, Error>;

    /// Store a generated analysis on an existing poll.
    async fn record_analysis(&self, poll_id: PollId, analysis: PollAnalysis)
    -> Result<(), Error>;
}
