//! Ports for change notifications mirrored to the realtime broadcast store.
//!
//! Services publish to a [`ChangeFeed`] after the primary write is durable.
//! Delivery to the broadcast store happens elsewhere through a
//! [`RealtimeMirror`], at most once and in no guaranteed order.
//! [`MirrorSource`] reads the broadcast store back for reconciliation.

use async_trait::async_trait;

use crate::domain::{Poll, PollAnalysis, PollId, Vote};

use super::define_port_error;

/// A change worth broadcasting to connected clients.
#[derive(Debug, Clone, PartialEq)]
pub enum MirrorEvent {
    PollCreated(Poll),
    VoteCast(Vote),
    AnalysisRecorded {
        poll_id: PollId,
        analysis: PollAnalysis,
    },
}

impl MirrorEvent {
    /// Short label used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::PollCreated(_) => "poll_created",
            Self::VoteCast(_) => "vote_cast",
            Self::AnalysisRecorded { .. } => "analysis_recorded",
        }
    }

    /// Poll the event concerns.
    pub fn poll_id(&self) -> PollId {
        match self {
            Self::PollCreated(poll) => poll.id(),
            Self::VoteCast(vote) => vote.poll_id,
            Self::AnalysisRecorded { poll_id, .. } => *poll_id,
        }
    }
}

/// Sink for change notifications.
///
/// Publishing never blocks and never fails from the caller's point of view.
#[cfg_attr(test, mockall::automock)]
pub trait ChangeFeed: Send + Sync {
    fn publish(&self, event: MirrorEvent);
}

/// Change feed that discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct DiscardingChangeFeed;

impl ChangeFeed for DiscardingChangeFeed {
    fn publish(&self, _event: MirrorEvent) {}
}

define_port_error! {
    /// Errors raised by realtime mirror adapters.
    pub enum RealtimeMirrorError {
        /// The broadcast store could not be reached.
        Transport { message: String } => "realtime mirror unreachable: {message}",
        /// The broadcast store answered with a non-success status.
        Rejected { status: u16, message: String } =>
            "realtime mirror rejected request with status {status}: {message}",
        /// Rows read back from the broadcast store could not be decoded.
        Decode { message: String } => "realtime mirror returned unreadable rows: {message}",
    }
}

/// Driven port writing events into the broadcast table store.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RealtimeMirror: Send + Sync {
    async fn apply(&self, event: &MirrorEvent) -> Result<(), RealtimeMirrorError>;
}

/// Mirror used when no broadcast store is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpRealtimeMirror;

#[async_trait]
impl RealtimeMirror for NoOpRealtimeMirror {
    async fn apply(&self, event: &MirrorEvent) -> Result<(), RealtimeMirrorError> {
        tracing::debug!(
            kind = event.kind(),
            poll_id = %event.poll_id(),
            "realtime mirror disabled; skipping event"
        );
        Ok(())
    }
}

/// Poll and vote rows currently held by the broadcast store.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MirrorSnapshot {
    pub polls: Vec<Poll>,
    pub votes: Vec<Vote>,
}

/// Driven port reading every row back from the broadcast table store.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MirrorSource: Send + Sync {
    async fn fetch_snapshot(&self) -> Result<MirrorSnapshot, RealtimeMirrorError>;
}
