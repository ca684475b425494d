//! In-memory poll and user store.
//!
//! Used when no database is configured and by integration tests. Ordering and
//! join semantics match the Diesel adapters. `with_unique_votes` emulates a
//! `(poll_id, user_id)` uniqueness constraint on votes.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::ports::{
    PollRepository, PollRepositoryError, PollVoteCount, UserRepository, UserRepositoryError,
};
use crate::domain::{
    ExternalIdentity, Identity, Poll, PollAnalysis, PollId, PollSummary, User, UserId, Vote,
    VoteHistoryEntry, VoterDetail,
};

/// Name reported for the emulated `(poll_id, user_id)` constraint.
const VOTER_UNIQUE_CONSTRAINT: &str = "votes_poll_id_user_id_key";

#[derive(Debug, Default)]
struct StoreState {
    users: Vec<User>,
    polls: Vec<Poll>,
    votes: Vec<Vote>,
}

impl StoreState {
    fn user_by_identity(&self, identity: &ExternalIdentity) -> Option<&User> {
        self.users.iter().find(|user| &user.external_id == identity)
    }

    fn poll(&self, poll_id: &PollId) -> Option<&Poll> {
        self.polls.iter().find(|poll| &poll.id() == poll_id)
    }

    fn newest_polls<'a>(&'a self, keep: impl Fn(&Poll) -> bool + 'a) -> Vec<Poll> {
        let mut polls: Vec<Poll> = self.polls.iter().rev().filter(|p| keep(p)).cloned().collect();
        polls.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
        polls
    }

    fn check_poll_owner(&self, poll: &Poll) -> Result<(), PollRepositoryError> {
        if self.users.iter().any(|user| user.id == poll.created_by()) {
            Ok(())
        } else {
            Err(PollRepositoryError::query("poll owner does not exist"))
        }
    }

    fn newest_votes<'a>(&'a self, keep: impl Fn(&Vote) -> bool + 'a) -> Vec<Vote> {
        let mut votes: Vec<Vote> = self.votes.iter().rev().filter(|v| keep(v)).cloned().collect();
        votes.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        votes
    }
}

/// Thread-safe in-memory implementation of the poll and user repositories.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPollStore {
    state: Arc<Mutex<StoreState>>,
    unique_votes: bool,
}

impl InMemoryPollStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject a second vote by the same voter on the same poll.
    #[must_use]
    pub fn with_unique_votes(mut self) -> Self {
        self.unique_votes = true;
        self
    }

    fn lock(&self) -> Result<MutexGuard<'_, StoreState>, String> {
        self.state
            .lock()
            .map_err(|_| "in-memory store lock poisoned".to_owned())
    }

    fn lock_polls(&self) -> Result<MutexGuard<'_, StoreState>, PollRepositoryError> {
        self.lock().map_err(PollRepositoryError::query)
    }

    fn push_vote(&self, state: &mut StoreState, vote: &Vote) -> Result<(), PollRepositoryError> {
        if state.poll(&vote.poll_id).is_none() {
            return Err(PollRepositoryError::query("vote references unknown poll"));
        }
        if self.unique_votes
            && state
                .votes
                .iter()
                .any(|existing| existing.poll_id == vote.poll_id && existing.voter == vote.voter)
        {
            return Err(PollRepositoryError::duplicate_vote(VOTER_UNIQUE_CONSTRAINT));
        }
        state.votes.push(vote.clone());
        Ok(())
    }

    fn lock_users(&self) -> Result<MutexGuard<'_, StoreState>, UserRepositoryError> {
        self.lock().map_err(UserRepositoryError::query)
    }
}

#[async_trait]
impl UserRepository for InMemoryPollStore {
    async fn insert_or_fetch(&self, identity: &Identity) -> Result<User, UserRepositoryError> {
        let mut state = self.lock_users()?;
        if let Some(existing) = state.user_by_identity(&identity.external_id) {
            return Ok(existing.clone());
        }
        let user = User::from_identity(identity);
        state.users.push(user.clone());
        Ok(user)
    }

    async fn find_by_identity(
        &self,
        identity: &ExternalIdentity,
    ) -> Result<Option<User>, UserRepositoryError> {
        Ok(self.lock_users()?.user_by_identity(identity).cloned())
    }
}

#[async_trait]
impl PollRepository for InMemoryPollStore {
    async fn insert_poll(&self, poll: &Poll) -> Result<(), PollRepositoryError> {
        let mut state = self.lock_polls()?;
        if state.poll(&poll.id()).is_some() {
            return Err(PollRepositoryError::query("duplicate poll id"));
        }
        state.check_poll_owner(poll)?;
        state.polls.push(poll.clone());
        Ok(())
    }

    async fn find_poll(&self, poll_id: &PollId) -> Result<Option<Poll>, PollRepositoryError> {
        Ok(self.lock_polls()?.poll(poll_id).cloned())
    }

    async fn list_open_public_polls(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<Poll>, PollRepositoryError> {
        let state = self.lock_polls()?;
        Ok(state.newest_polls(|poll| poll.is_public() && poll.window().end() > now))
    }

    async fn list_polls_by_owner(&self, owner: &UserId) -> Result<Vec<Poll>, PollRepositoryError> {
        let state = self.lock_polls()?;
        let owner = *owner;
        Ok(state.newest_polls(move |poll| poll.created_by() == owner))
    }

    async fn update_analysis(
        &self,
        poll_id: &PollId,
        analysis: &PollAnalysis,
    ) -> Result<bool, PollRepositoryError> {
        let mut state = self.lock_polls()?;
        match state.polls.iter_mut().find(|poll| &poll.id() == poll_id) {
            Some(poll) => {
                poll.set_analysis(analysis.clone());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn insert_vote(&self, vote: &Vote) -> Result<(), PollRepositoryError> {
        let mut state = self.lock_polls()?;
        self.push_vote(&mut state, vote)
    }

    async fn upsert_poll(&self, poll: &Poll) -> Result<(), PollRepositoryError> {
        let mut state = self.lock_polls()?;
        state.check_poll_owner(poll)?;
        let mut incoming = poll.clone();
        match state.polls.iter_mut().find(|stored| stored.id() == poll.id()) {
            Some(stored) => {
                if let (None, Some(kept)) = (incoming.analysis(), stored.analysis()) {
                    incoming.set_analysis(kept.clone());
                }
                *stored = incoming;
            }
            None => state.polls.push(incoming),
        }
        Ok(())
    }

    async fn upsert_vote(&self, vote: &Vote) -> Result<(), PollRepositoryError> {
        let mut state = self.lock_polls()?;
        if state.votes.iter().any(|stored| stored.id == vote.id) {
            return Ok(());
        }
        self.push_vote(&mut state, vote)
    }

    async fn list_votes_for_poll(
        &self,
        poll_id: &PollId,
    ) -> Result<Vec<Vote>, PollRepositoryError> {
        let state = self.lock_polls()?;
        let poll_id = *poll_id;
        Ok(state.newest_votes(move |vote| vote.poll_id == poll_id))
    }

    async fn list_votes_by_voter(
        &self,
        voter: &ExternalIdentity,
    ) -> Result<Vec<VoteHistoryEntry>, PollRepositoryError> {
        let state = self.lock_polls()?;
        let voter = voter.clone();
        Ok(state
            .newest_votes(move |vote| vote.voter == voter)
            .into_iter()
            .filter_map(|vote| {
                let poll = PollSummary::from(state.poll(&vote.poll_id)?);
                Some(VoteHistoryEntry { vote, poll })
            })
            .collect())
    }

    async fn vote_counts_for_owner(
        &self,
        owner: &UserId,
    ) -> Result<Vec<PollVoteCount>, PollRepositoryError> {
        let state = self.lock_polls()?;
        let mut counts: HashMap<PollId, u64> = HashMap::new();
        for vote in &state.votes {
            *counts.entry(vote.poll_id).or_default() += 1;
        }
        let owner = *owner;
        Ok(state
            .newest_polls(move |poll| poll.created_by() == owner)
            .into_iter()
            .map(|poll| PollVoteCount {
                poll_id: poll.id(),
                topic: poll.topic().to_owned(),
                created_at: poll.created_at(),
                votes: counts.get(&poll.id()).copied().unwrap_or(0),
            })
            .collect())
    }

    async fn list_voter_details(
        &self,
        poll_id: &PollId,
    ) -> Result<Vec<VoterDetail>, PollRepositoryError> {
        let state = self.lock_polls()?;
        let poll_id = *poll_id;
        Ok(state
            .newest_votes(move |vote| vote.poll_id == poll_id)
            .iter()
            .map(|vote| {
                let profile = state.user_by_identity(&vote.voter);
                VoterDetail::new(
                    vote,
                    profile.and_then(|user| user.name.clone()),
                    profile.and_then(|user| user.email.clone()),
                )
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{PollDraft, VotingWindow};
    use chrono::Duration;
    use rstest::{fixture, rstest};

    fn identity(raw: &str) -> Identity {
        Identity {
            external_id: ExternalIdentity::new(raw).expect("identity"),
            email: Some(format!("{raw}@example.com")),
            name: Some(raw.to_uppercase()),
        }
    }

    fn poll(owner: &User, created_at: DateTime<Utc>, is_public: bool, end: DateTime<Utc>) -> Poll {
        Poll::new(PollDraft {
            id: PollId::random(),
            topic: "Topic".into(),
            options: vec!["A".into(), "B".into()],
            is_public,
            window: VotingWindow::new(created_at, end),
            created_by: owner.id,
            created_at,
        })
        .expect("valid poll")
    }

    #[fixture]
    fn store() -> InMemoryPollStore {
        InMemoryPollStore::new()
    }

    #[rstest]
    #[tokio::test]
    async fn insert_or_fetch_is_idempotent_per_identity(store: InMemoryPollStore) {
        let first = store
            .insert_or_fetch(&identity("user_1"))
            .await
            .expect("insert");
        let second = store
            .insert_or_fetch(&Identity::bare(first.external_id.clone()))
            .await
            .expect("fetch");
        assert_eq!(first, second);
        assert_eq!(second.email.as_deref(), Some("user_1@example.com"));
    }

    #[rstest]
    #[tokio::test]
    async fn open_public_polls_are_filtered_and_newest_first(store: InMemoryPollStore) {
        let owner = store.insert_or_fetch(&identity("owner")).await.expect("owner");
        let now = Utc::now();
        let older = poll(&owner, now - Duration::hours(2), true, now + Duration::hours(1));
        let newer = poll(&owner, now - Duration::hours(1), true, now + Duration::hours(1));
        let private = poll(&owner, now, false, now + Duration::hours(1));
        let ended = poll(&owner, now, true, now);
        for p in [&older, &newer, &private, &ended] {
            store.insert_poll(p).await.expect("insert poll");
        }

        let open = store.list_open_public_polls(now).await.expect("list");

        let ids: Vec<PollId> = open.iter().map(Poll::id).collect();
        assert_eq!(ids, [newer.id(), older.id()]);
    }

    #[rstest]
    #[tokio::test]
    async fn duplicate_votes_persist_without_constraint(store: InMemoryPollStore) {
        let owner = store.insert_or_fetch(&identity("owner")).await.expect("owner");
        let now = Utc::now();
        let p = poll(&owner, now, true, now + Duration::hours(1));
        store.insert_poll(&p).await.expect("insert poll");
        let voter = ExternalIdentity::new("voter").expect("identity");

        for _ in 0..2 {
            store
                .insert_vote(&Vote::cast(p.id(), voter.clone(), 0, now))
                .await
                .expect("vote accepted");
        }

        assert_eq!(store.list_votes_for_poll(&p.id()).await.expect("votes").len(), 2);
    }

    #[tokio::test]
    async fn unique_votes_reject_second_vote() {
        let store = InMemoryPollStore::new().with_unique_votes();
        let owner = store.insert_or_fetch(&identity("owner")).await.expect("owner");
        let now = Utc::now();
        let p = poll(&owner, now, true, now + Duration::hours(1));
        store.insert_poll(&p).await.expect("insert poll");
        let voter = ExternalIdentity::new("voter").expect("identity");

        store
            .insert_vote(&Vote::cast(p.id(), voter.clone(), 0, now))
            .await
            .expect("first vote");
        let second = store.insert_vote(&Vote::cast(p.id(), voter, 1, now)).await;

        assert!(matches!(second, Err(PollRepositoryError::DuplicateVote { .. })));
    }

    #[rstest]
    #[tokio::test]
    async fn voter_details_fall_back_for_unknown_profiles(store: InMemoryPollStore) {
        let owner = store.insert_or_fetch(&identity("owner")).await.expect("owner");
        let now = Utc::now();
        let p = poll(&owner, now, true, now + Duration::hours(1));
        store.insert_poll(&p).await.expect("insert poll");
        store
            .insert_vote(&Vote::cast(p.id(), owner.external_id.clone(), 0, now))
            .await
            .expect("owner vote");
        store
            .insert_vote(&Vote::cast(
                p.id(),
                ExternalIdentity::new("ghost").expect("identity"),
                1,
                now + Duration::seconds(1),
            ))
            .await
            .expect("ghost vote");

        let rows = store.list_voter_details(&p.id()).await.expect("rows");

        assert_eq!(rows[0].name, "Anonymous");
        assert_eq!(rows[0].email, "N/A");
        assert_eq!(rows[1].name, "OWNER");
    }

    #[rstest]
    #[tokio::test]
    async fn vote_counts_include_polls_without_votes(store: InMemoryPollStore) {
        let owner = store.insert_or_fetch(&identity("owner")).await.expect("owner");
        let now = Utc::now();
        let busy = poll(&owner, now - Duration::hours(1), true, now);
        let quiet = poll(&owner, now, true, now);
        store.insert_poll(&busy).await.expect("insert");
        store.insert_poll(&quiet).await.expect("insert");
        store
            .insert_vote(&Vote::cast(busy.id(), owner.external_id.clone(), 1, now))
            .await
            .expect("vote");

        let counts = store.vote_counts_for_owner(&owner.id).await.expect("counts");

        assert_eq!(counts.len(), 2);
        assert_eq!((counts[0].poll_id, counts[0].votes), (quiet.id(), 0));
        assert_eq!((counts[1].poll_id, counts[1].votes), (busy.id(), 1));
    }

    #[rstest]
    #[tokio::test]
    async fn update_analysis_reports_missing_polls(store: InMemoryPollStore) {
        let analysis = PollAnalysis {
            winner: "A".into(),
            analysis: "text".into(),
            follow_up: "more".into(),
        };
        assert!(
            !store
                .update_analysis(&PollId::random(), &analysis)
                .await
                .expect("update")
        );
    }

    #[rstest]
    #[tokio::test]
    async fn upsert_poll_overwrites_but_keeps_stored_analysis(store: InMemoryPollStore) {
        let owner = store.insert_or_fetch(&identity("owner")).await.expect("owner");
        let now = Utc::now();
        let original = poll(&owner, now, true, now + Duration::hours(1));
        store.insert_poll(&original).await.expect("insert poll");
        let analysis = PollAnalysis {
            winner: "A".into(),
            analysis: "text".into(),
            follow_up: "more".into(),
        };
        store
            .update_analysis(&original.id(), &analysis)
            .await
            .expect("analysis");
        let renamed = Poll::new(PollDraft {
            id: original.id(),
            topic: "Renamed".into(),
            options: vec!["A".into(), "B".into()],
            is_public: false,
            window: original.window(),
            created_by: owner.id,
            created_at: now,
        })
        .expect("valid poll");

        store.upsert_poll(&renamed).await.expect("upsert");

        let stored = store.find_poll(&original.id()).await.expect("find").expect("present");
        assert_eq!(stored.topic(), "Renamed");
        assert!(!stored.is_public());
        assert_eq!(stored.analysis(), Some(&analysis));
        assert_eq!(store.list_polls_by_owner(&owner.id).await.expect("list").len(), 1);
    }

    #[rstest]
    #[tokio::test]
    async fn upsert_poll_requires_a_known_owner(store: InMemoryPollStore) {
        let stranger = User::from_identity(&identity("stranger"));
        let now = Utc::now();
        let orphan = poll(&stranger, now, true, now + Duration::hours(1));

        let result = store.upsert_poll(&orphan).await;

        assert!(matches!(result, Err(PollRepositoryError::Query { .. })));
    }

    #[rstest]
    #[tokio::test]
    async fn upsert_vote_skips_known_ids(store: InMemoryPollStore) {
        let owner = store.insert_or_fetch(&identity("owner")).await.expect("owner");
        let now = Utc::now();
        let p = poll(&owner, now, true, now + Duration::hours(1));
        store.insert_poll(&p).await.expect("insert poll");
        let vote = Vote::cast(p.id(), owner.external_id.clone(), 1, now);

        store.upsert_vote(&vote).await.expect("first upsert");
        store.upsert_vote(&vote).await.expect("second upsert");

        assert_eq!(
            store.list_votes_for_poll(&p.id()).await.expect("votes"),
            vec![vote]
        );
    }
}
