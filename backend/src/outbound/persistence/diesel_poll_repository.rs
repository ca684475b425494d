//! PostgreSQL-backed `PollRepository` implementation using Diesel ORM.
//!
//! Votes store the voter's external identity in `votes.user_id`; voter
//! profiles are joined on `users.external_id`.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::upsert::excluded;
use diesel_async::RunQueryDsl;
use tracing::warn;
use uuid::Uuid;

use crate::domain::ports::{PollRepository, PollRepositoryError, PollVoteCount};
use crate::domain::{
    ExternalIdentity, Poll, PollAnalysis, PollDraft, PollId, PollSummary, UserId, Vote,
    VoteHistoryEntry, VoterDetail, VotingWindow,
};

use super::diesel_error_mapping::{map_diesel_error, map_pool_error, unique_violation};
use super::models::{NewPollRow, PollRow, VoteRow};
use super::pool::DbPool;
use super::schema::{polls, users, votes};

/// Diesel-backed implementation of the poll repository port.
#[derive(Clone)]
pub struct DieselPollRepository {
    pool: DbPool,
}

impl DieselPollRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_error(error: diesel::result::Error) -> PollRepositoryError {
    map_diesel_error(
        error,
        PollRepositoryError::query,
        PollRepositoryError::connection,
    )
}

/// Postgres' default name for a `UNIQUE (poll_id, user_id)` constraint on
/// votes. Operators may add it; the shipped migrations do not.
const VOTER_UNIQUE_CONSTRAINT: &str = "votes_poll_id_user_id_key";

fn map_vote_insert_error(error: diesel::result::Error) -> PollRepositoryError {
    match unique_violation(&error) {
        Some(constraint) if constraint == VOTER_UNIQUE_CONSTRAINT => {
            PollRepositoryError::duplicate_vote(constraint)
        }
        _ => map_error(error),
    }
}

fn row_to_poll(row: PollRow) -> Poll {
    let analysis = row.analysis.and_then(|value| {
        serde_json::from_value::<PollAnalysis>(value)
            .inspect_err(|err| warn!(poll_id = %row.id, error = %err, "ignoring malformed analysis"))
            .ok()
    });
    Poll::from_stored(
        PollDraft {
            id: PollId::from_uuid(row.id),
            topic: row.topic,
            options: row.options,
            is_public: row.is_public,
            window: VotingWindow::new(row.start_time, row.end_time),
            created_by: UserId::from_uuid(row.created_by),
            created_at: row.created_at,
        },
        analysis,
    )
}

fn row_to_vote(row: VoteRow) -> Result<Vote, PollRepositoryError> {
    let voter = ExternalIdentity::new(row.user_id)
        .map_err(|err| PollRepositoryError::query(format!("stored voter invalid: {err}")))?;
    let option_index = u32::try_from(row.option_index)
        .map_err(|err| PollRepositoryError::query(format!("stored option index invalid: {err}")))?;
    Ok(Vote {
        id: row.id,
        poll_id: PollId::from_uuid(row.poll_id),
        voter,
        option_index,
        created_at: row.created_at,
    })
}

fn poll_to_row(poll: &Poll) -> Result<NewPollRow<'_>, PollRepositoryError> {
    let analysis = poll
        .analysis()
        .map(serde_json::to_value)
        .transpose()
        .map_err(|err| PollRepositoryError::query(format!("serialise analysis: {err}")))?;
    let window = poll.window();
    Ok(NewPollRow {
        id: *poll.id().as_uuid(),
        topic: poll.topic(),
        options: poll.options(),
        is_public: poll.is_public(),
        start_time: window.start(),
        end_time: window.end(),
        created_by: *poll.created_by().as_uuid(),
        created_at: poll.created_at(),
        analysis,
    })
}

fn vote_to_row(vote: &Vote) -> Result<VoteRow, PollRepositoryError> {
    let option_index = i32::try_from(vote.option_index)
        .map_err(|err| PollRepositoryError::query(format!("option index too large: {err}")))?;
    Ok(VoteRow {
        id: vote.id,
        poll_id: *vote.poll_id.as_uuid(),
        user_id: vote.voter.as_ref().to_owned(),
        option_index,
        created_at: vote.created_at,
    })
}

#[async_trait]
impl PollRepository for DieselPollRepository {
    async fn insert_poll(&self, poll: &Poll) -> Result<(), PollRepositoryError> {
        let row = poll_to_row(poll)?;
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, PollRepositoryError::connection))?;

        diesel::insert_into(polls::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_error)
    }

    async fn find_poll(&self, poll_id: &PollId) -> Result<Option<Poll>, PollRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, PollRepositoryError::connection))?;

        let row = polls::table
            .filter(polls::id.eq(poll_id.as_uuid()))
            .select(PollRow::as_select())
            .first::<PollRow>(&mut conn)
            .await
            .optional()
            .map_err(map_error)?;

        Ok(row.map(row_to_poll))
    }

    async fn list_open_public_polls(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<Poll>, PollRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, PollRepositoryError::connection))?;

        let rows: Vec<PollRow> = polls::table
            .filter(polls::is_public.eq(true).and(polls::end_time.gt(now)))
            .order((polls::created_at.desc(), polls::id.desc()))
            .select(PollRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_error)?;

        Ok(rows.into_iter().map(row_to_poll).collect())
    }

    async fn list_polls_by_owner(&self, owner: &UserId) -> Result<Vec<Poll>, PollRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, PollRepositoryError::connection))?;

        let rows: Vec<PollRow> = polls::table
            .filter(polls::created_by.eq(owner.as_uuid()))
            .order((polls::created_at.desc(), polls::id.desc()))
            .select(PollRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_error)?;

        Ok(rows.into_iter().map(row_to_poll).collect())
    }

    async fn update_analysis(
        &self,
        poll_id: &PollId,
        analysis: &PollAnalysis,
    ) -> Result<bool, PollRepositoryError> {
        let value = serde_json::to_value(analysis)
            .map_err(|err| PollRepositoryError::query(format!("serialise analysis: {err}")))?;
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, PollRepositoryError::connection))?;

        let updated = diesel::update(polls::table.filter(polls::id.eq(poll_id.as_uuid())))
            .set(polls::analysis.eq(Some(value)))
            .execute(&mut conn)
            .await
            .map_err(map_error)?;

        Ok(updated > 0)
    }

    async fn insert_vote(&self, vote: &Vote) -> Result<(), PollRepositoryError> {
        let row = vote_to_row(vote)?;
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, PollRepositoryError::connection))?;

        diesel::insert_into(votes::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_vote_insert_error)
    }

    async fn upsert_poll(&self, poll: &Poll) -> Result<(), PollRepositoryError> {
        let row = poll_to_row(poll)?;
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, PollRepositoryError::connection))?;

        let upsert = diesel::insert_into(polls::table)
            .values(&row)
            .on_conflict(polls::id)
            .do_update();
        let result = if row.analysis.is_some() {
            upsert
                .set((
                    polls::topic.eq(excluded(polls::topic)),
                    polls::options.eq(excluded(polls::options)),
                    polls::is_public.eq(excluded(polls::is_public)),
                    polls::start_time.eq(excluded(polls::start_time)),
                    polls::end_time.eq(excluded(polls::end_time)),
                    polls::created_by.eq(excluded(polls::created_by)),
                    polls::created_at.eq(excluded(polls::created_at)),
                    polls::analysis.eq(excluded(polls::analysis)),
                ))
                .execute(&mut conn)
                .await
        } else {
            upsert
                .set((
                    polls::topic.eq(excluded(polls::topic)),
                    polls::options.eq(excluded(polls::options)),
                    polls::is_public.eq(excluded(polls::is_public)),
                    polls::start_time.eq(excluded(polls::start_time)),
                    polls::end_time.eq(excluded(polls::end_time)),
                    polls::created_by.eq(excluded(polls::created_by)),
                    polls::created_at.eq(excluded(polls::created_at)),
                ))
                .execute(&mut conn)
                .await
        };
        result.map(|_| ()).map_err(map_error)
    }

    async fn upsert_vote(&self, vote: &Vote) -> Result<(), PollRepositoryError> {
        let row = vote_to_row(vote)?;
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, PollRepositoryError::connection))?;

        diesel::insert_into(votes::table)
            .values(&row)
            .on_conflict(votes::id)
            .do_nothing()
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_vote_insert_error)
    }

    async fn list_votes_for_poll(
        &self,
        poll_id: &PollId,
    ) -> Result<Vec<Vote>, PollRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, PollRepositoryError::connection))?;

        let rows: Vec<VoteRow> = votes::table
            .filter(votes::poll_id.eq(poll_id.as_uuid()))
            .order((votes::created_at.desc(), votes::id.desc()))
            .select(VoteRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_error)?;

        rows.into_iter().map(row_to_vote).collect()
    }

    async fn list_votes_by_voter(
        &self,
        voter: &ExternalIdentity,
    ) -> Result<Vec<VoteHistoryEntry>, PollRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, PollRepositoryError::connection))?;

        let rows: Vec<(VoteRow, PollRow)> = votes::table
            .inner_join(polls::table)
            .filter(votes::user_id.eq(voter.as_ref()))
            .order((votes::created_at.desc(), votes::id.desc()))
            .select((VoteRow::as_select(), PollRow::as_select()))
            .load(&mut conn)
            .await
            .map_err(map_error)?;

        rows.into_iter()
            .map(|(vote, poll)| {
                Ok(VoteHistoryEntry {
                    vote: row_to_vote(vote)?,
                    poll: PollSummary::from(&row_to_poll(poll)),
                })
            })
            .collect()
    }

    async fn vote_counts_for_owner(
        &self,
        owner: &UserId,
    ) -> Result<Vec<PollVoteCount>, PollRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, PollRepositoryError::connection))?;

        let owned: Vec<(Uuid, String, DateTime<Utc>)> = polls::table
            .filter(polls::created_by.eq(owner.as_uuid()))
            .order((polls::created_at.desc(), polls::id.desc()))
            .select((polls::id, polls::topic, polls::created_at))
            .load(&mut conn)
            .await
            .map_err(map_error)?;
        if owned.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<Uuid> = owned.iter().map(|(id, _, _)| *id).collect();
        let counts: HashMap<Uuid, i64> = votes::table
            .filter(votes::poll_id.eq_any(&ids))
            .group_by(votes::poll_id)
            .select((votes::poll_id, diesel::dsl::count_star()))
            .load::<(Uuid, i64)>(&mut conn)
            .await
            .map_err(map_error)?
            .into_iter()
            .collect();

        Ok(owned
            .into_iter()
            .map(|(id, topic, created_at)| PollVoteCount {
                poll_id: PollId::from_uuid(id),
                topic,
                created_at,
                votes: counts
                    .get(&id)
                    .copied()
                    .and_then(|count| u64::try_from(count).ok())
                    .unwrap_or(0),
            })
            .collect())
    }

    async fn list_voter_details(
        &self,
        poll_id: &PollId,
    ) -> Result<Vec<VoterDetail>, PollRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, PollRepositoryError::connection))?;

        let rows: Vec<(VoteRow, Option<String>, Option<String>)> = votes::table
            .left_join(users::table.on(users::external_id.eq(votes::user_id)))
            .filter(votes::poll_id.eq(poll_id.as_uuid()))
            .order((votes::created_at.desc(), votes::id.desc()))
            .select((
                VoteRow::as_select(),
                users::name.nullable(),
                users::email.nullable(),
            ))
            .load(&mut conn)
            .await
            .map_err(map_error)?;

        rows.into_iter()
            .map(|(vote, name, email)| {
                let vote = row_to_vote(vote)?;
                Ok(VoterDetail::new(&vote, name, email))
            })
            .collect()
    }
}
