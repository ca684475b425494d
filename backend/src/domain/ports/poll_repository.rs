//! Port for poll and vote persistence.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{
    ExternalIdentity, Poll, PollAnalysis, PollId, UserId, Vote, VoteHistoryEntry, VoterDetail,
};

use super::define_port_error;

define_port_error! {
    /// Errors raised by poll repository adapters.
    pub enum PollRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "poll repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "poll repository query failed: {message}",
        /// A per-voter uniqueness constraint rejected the vote.
        DuplicateVote { message: String } =>
            "vote rejected by uniqueness constraint: {message}",
    }
}

/// Vote count of one owned poll, used for dashboard statistics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollVoteCount {
    pub poll_id: PollId,
    pub topic: String,
    pub created_at: DateTime<Utc>,
    pub votes: u64,
}

/// Port for reading and writing polls and their votes.
///
/// Every list is ordered newest first by creation time.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PollRepository: Send + Sync {
    /// Persist a new poll.
    async fn insert_poll(&self, poll: &Poll) -> Result<(), PollRepositoryError>;

    /// Find a poll by id.
    async fn find_poll(&self, poll_id: &PollId) -> Result<Option<Poll>, PollRepositoryError>;

    /// Public polls whose end time lies after `now`.
    async fn list_open_public_polls(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<Poll>, PollRepositoryError>;

    /// Polls created by `owner`.
    async fn list_polls_by_owner(&self, owner: &UserId) -> Result<Vec<Poll>, PollRepositoryError>;

    /// Store the analysis annotation on an existing poll. Returns `false` when
    /// the poll does not exist.
    async fn update_analysis(
        &self,
        poll_id: &PollId,
        analysis: &PollAnalysis,
    ) -> Result<bool, PollRepositoryError>;

    /// Persist a vote.
    async fn insert_vote(&self, vote: &Vote) -> Result<(), PollRepositoryError>;

    /// Insert a poll or overwrite the stored row with the same id. A stored
    /// analysis survives when `poll` carries none.
    async fn upsert_poll(&self, poll: &Poll) -> Result<(), PollRepositoryError>;

    /// Insert a vote unless one with the same id already exists.
    async fn upsert_vote(&self, vote: &Vote) -> Result<(), PollRepositoryError>;

    /// All votes on `poll_id`.
    async fn list_votes_for_poll(&self, poll_id: &PollId)
    -> Result<Vec<Vote>, PollRepositoryError>;

    /// Votes cast by `voter` joined with their polls.
    async fn list_votes_by_voter(
        &self,
        voter: &ExternalIdentity,
    ) -> Result<Vec<VoteHistoryEntry>, PollRepositoryError>;

    /// Vote counts for every poll owned by `owner`, including polls without
    /// votes.
    async fn vote_counts_for_owner(
        &self,
        owner: &UserId,
    ) -> Result<Vec<PollVoteCount>, PollRepositoryError>;

    /// Votes on `poll_id` joined with the voters' profiles.
    async fn list_voter_details(
        &self,
        poll_id: &PollId,
    ) -> Result<Vec<VoterDetail>, PollRepositoryError>;
}
