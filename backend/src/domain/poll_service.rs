//! Poll domain service.
//!
//! Implements the poll driving ports over the poll and user repositories.
//! Every successful primary write is followed by a change feed publish; the
//! feed never fails the request.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::{debug, info};

use crate::domain::ports::{
    ChangeFeed, CreatePollRequest, DashboardStats, MirrorEvent, PollRepository,
    PollRepositoryError, PollResults, PollView, PollsCommand, PollsQuery, PopularPoll,
    UserRepository, UserRepositoryError,
};
use crate::domain::{
    Error, ExternalIdentity, Identity, Poll, PollAnalysis, PollDraft, PollId, Tally, Vote,
    VoteHistoryEntry, VoterDetail, VotingWindow, parse_timestamp, validate_content,
};

fn map_poll_repository_error(error: PollRepositoryError) -> Error {
    match error {
        PollRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("poll repository unavailable: {message}"))
        }
        PollRepositoryError::Query { message } => {
            Error::internal(format!("poll repository error: {message}"))
        }
        PollRepositoryError::DuplicateVote { .. } => {
            Error::invalid_request("already voted on this poll")
                .with_details(json!({ "field": "optionIndex", "code": "duplicate_vote" }))
        }
    }
}

fn map_user_repository_error(error: UserRepositoryError) -> Error {
    match error {
        UserRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserRepositoryError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
    }
}

fn poll_not_found() -> Error {
    Error::not_found("Poll not found")
}

/// Poll service implementing [`PollsCommand`] and [`PollsQuery`].
#[derive(Clone)]
pub struct PollService<P, U> {
    polls: Arc<P>,
    users: Arc<U>,
    feed: Arc<dyn ChangeFeed>,
    clock: Arc<dyn Clock>,
}

impl<P, U> PollService<P, U> {
    /// Create a service over the given repositories, change feed and clock.
    pub fn new(
        polls: Arc<P>,
        users: Arc<U>,
        feed: Arc<dyn ChangeFeed>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            polls,
            users,
            feed,
            clock,
        }
    }

    fn view(&self, poll: Poll) -> PollView {
        let status = poll.status_at(self.clock.utc());
        PollView { poll, status }
    }
}

impl<P, U> PollService<P, U>
where
    P: PollRepository,
    U: UserRepository,
{
    async fn require_poll(&self, poll_id: &PollId) -> Result<Poll, Error> {
        self.polls
            .find_poll(poll_id)
            .await
            .map_err(map_poll_repository_error)?
            .ok_or_else(poll_not_found)
    }
}

#[async_trait]
impl<P, U> PollsCommand for PollService<P, U>
where
    P: PollRepository,
    U: UserRepository,
{
    async fn create_poll(
        &self,
        request: CreatePollRequest,
        owner: &Identity,
    ) -> Result<Poll, Error> {
        validate_content(&request.topic, &request.options)?;
        let start = parse_timestamp("startTime", &request.start_time)?;
        let end = parse_timestamp("endTime", &request.end_time)?;

        let user = self
            .users
            .insert_or_fetch(owner)
            .await
            .map_err(map_user_repository_error)?;

        let poll = Poll::new(PollDraft {
            id: PollId::random(),
            topic: request.topic,
            options: request.options,
            is_public: request.is_public,
            window: VotingWindow::new(start, end),
            created_by: user.id,
            created_at: self.clock.utc(),
        })?;

        self.polls
            .insert_poll(&poll)
            .await
            .map_err(map_poll_repository_error)?;
        info!(poll_id = %poll.id(), owner = %user.id, options = poll.options().len(), "poll created");

        self.feed.publish(MirrorEvent::PollCreated(poll.clone()));
        Ok(poll)
    }

    async fn cast_vote(
        &self,
        poll_id: PollId,
        option_index: i64,
        voter: &ExternalIdentity,
    ) -> Result<Vote, Error> {
        let poll = self.require_poll(&poll_id).await?;
        let index = u32::try_from(option_index)
            .ok()
            .filter(|index| usize::try_from(*index).is_ok_and(|i| poll.has_option(i)))
            .ok_or_else(|| {
                Error::invalid_request(format!(
                    "option index {option_index} is out of range for {} options",
                    poll.options().len()
                ))
                .with_details(json!({ "field": "optionIndex", "code": "out_of_range" }))
            })?;

        let vote = Vote::cast(poll_id, voter.clone(), index, self.clock.utc());
        self.polls
            .insert_vote(&vote)
            .await
            .map_err(map_poll_repository_error)?;
        debug!(poll_id = %poll_id, vote_id = %vote.id, option_index = index, "vote recorded");

        self.feed.publish(MirrorEvent::VoteCast(vote.clone()));
        Ok(vote)
    }

    async fn record_analysis(&self, poll_id: PollId, analysis: PollAnalysis) -> Result<(), Error> {
        let updated = self
            .polls
            .update_analysis(&poll_id, &analysis)
            .await
            .map_err(map_poll_repository_error)?;
        if !updated {
            return Err(poll_not_found());
        }
        self.feed
            .publish(MirrorEvent::AnalysisRecorded { poll_id, analysis });
        Ok(())
    }
}

#[async_trait]
impl<P, U> PollsQuery for PollService<P, U>
where
    P: PollRepository,
    U: UserRepository,
{
    async fn get_poll(&self, poll_id: PollId) -> Result<Option<PollView>, Error> {
        let poll = self
            .polls
            .find_poll(&poll_id)
            .await
            .map_err(map_poll_repository_error)?;
        Ok(poll.map(|poll| self.view(poll)))
    }

    async fn list_public_polls(&self) -> Result<Vec<PollView>, Error> {
        let polls = self
            .polls
            .list_open_public_polls(self.clock.utc())
            .await
            .map_err(map_poll_repository_error)?;
        Ok(polls.into_iter().map(|poll| self.view(poll)).collect())
    }

    async fn poll_results(&self, poll_id: PollId) -> Result<PollResults, Error> {
        let poll = self.require_poll(&poll_id).await?;
        let votes = self
            .polls
            .list_votes_for_poll(&poll_id)
            .await
            .map_err(map_poll_repository_error)?;
        let tally = Tally::from_votes(poll.options().len(), &votes);
        Ok(PollResults {
            poll: self.view(poll),
            tally,
            votes,
        })
    }

    async fn vote_history(
        &self,
        voter: &ExternalIdentity,
    ) -> Result<Vec<VoteHistoryEntry>, Error> {
        self.polls
            .list_votes_by_voter(voter)
            .await
            .map_err(map_poll_repository_error)
    }

    async fn user_polls(&self, owner: &ExternalIdentity) -> Result<Vec<PollView>, Error> {
        let Some(user) = self
            .users
            .find_by_identity(owner)
            .await
            .map_err(map_user_repository_error)?
        else {
            return Ok(Vec::new());
        };
        let polls = self
            .polls
            .list_polls_by_owner(&user.id)
            .await
            .map_err(map_poll_repository_error)?;
        Ok(polls.into_iter().map(|poll| self.view(poll)).collect())
    }

    async fn dashboard_stats(&self, owner: &ExternalIdentity) -> Result<DashboardStats, Error> {
        let user = self
            .users
            .find_by_identity(owner)
            .await
            .map_err(map_user_repository_error)?
            .ok_or_else(|| Error::not_found("User not found"))?;
        let counts = self
            .polls
            .vote_counts_for_owner(&user.id)
            .await
            .map_err(map_poll_repository_error)?;

        let most_popular_poll = counts
            .iter()
            .max_by(|a, b| {
                a.votes
                    .cmp(&b.votes)
                    .then_with(|| a.created_at.cmp(&b.created_at))
            })
            .map(|count| PopularPoll {
                poll_id: count.poll_id,
                topic: count.topic.clone(),
                votes: count.votes,
            });

        Ok(DashboardStats {
            total_polls: counts.len() as u64,
            total_votes: counts.iter().map(|count| count.votes).sum(),
            most_popular_poll,
        })
    }

    async fn voter_details(
        &self,
        poll_id: PollId,
        requester: &ExternalIdentity,
    ) -> Result<Vec<VoterDetail>, Error> {
        let poll = self.require_poll(&poll_id).await?;
        let requester = self
            .users
            .find_by_identity(requester)
            .await
            .map_err(map_user_repository_error)?;
        if requester.is_none_or(|user| user.id != poll.created_by()) {
            return Err(Error::forbidden("only the poll owner may view its voters"));
        }
        self.polls
            .list_voter_details(&poll_id)
            .await
            .map_err(map_poll_repository_error)
    }
}

#[cfg(test)]
#[path = "poll_service_tests.rs"]
mod tests;
