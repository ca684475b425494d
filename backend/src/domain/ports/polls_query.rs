//! Driving port for poll reads and derived projections.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{
    Error, ExternalIdentity, Poll, PollId, PollStatus, Tally, Vote, VoteHistoryEntry, VoterDetail,
};

/// A poll with its lifecycle status at read time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PollView {
    #[serde(flatten)]
    pub poll: Poll,
    pub status: PollStatus,
}

/// A poll with its tally and raw votes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PollResults {
    pub poll: PollView,
    pub tally: Tally,
    pub votes: Vec<Vote>,
}

/// The most-voted poll of an owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PopularPoll {
    #[schema(value_type = String, format = Uuid)]
    pub poll_id: PollId,
    pub topic: String,
    pub votes: u64,
}

/// Aggregate statistics over the polls an identity owns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_polls: u64,
    pub total_votes: u64,
    pub most_popular_poll: Option<PopularPoll>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PollsQuery: Send + Sync {
    /// Look a poll up; absence is `Ok(None)`.
    async fn get_poll(&self, poll_id: PollId) -> Result<Option<PollView>, Error>;

    /// Public polls that have not ended, newest first.
    async fn list_public_polls(&self) -> Result<Vec<PollView>, Error>;

    /// Tally and votes for a poll.
    async fn poll_results(&self, poll_id: PollId) -> Result<PollResults, Error>;

    /// Votes cast by `voter`, newest first.
    async fn vote_history(&self, voter: &ExternalIdentity)
    -> Result<Vec<VoteHistoryEntry>, Error>;

    /// Polls owned by `owner`, newest first.
    async fn user_polls(&self, owner: &ExternalIdentity) -> Result<Vec<PollView>, Error>;

    /// Dashboard figures for `owner`.
    async fn dashboard_stats(&self, owner: &ExternalIdentity) -> Result<DashboardStats, Error>;

    /// Voter rows for a poll, visible to its owner only.
    async fn voter_details(
        &self,
        poll_id: PollId,
        requester: &ExternalIdentity,
    ) -> Result<Vec<VoterDetail>, Error>;
}
