//! Domain primitives, aggregates and services.
//!
//! Public surface:
//! - `Poll`, `Vote`, `User` and their identifiers.
//! - `PollStatus`/`VotingWindow`: lifecycle derived from the clock.
//! - `Tally`: per-option counts derived from votes.
//! - `PollService`, `AssistService`: driving port implementations.
//! - `MirrorOutbox`/`MirrorDispatcher`: best-effort realtime mirroring.
//! - `MirrorReconciler`: copies broadcast store rows back into storage.
//! - `Error`/`ErrorCode`: transport-agnostic failures.

pub mod assist;
pub mod error;
pub mod lifecycle;
pub mod mirror;
pub mod poll;
pub mod poll_service;
pub mod ports;
pub mod reconcile;
pub mod tally;
pub mod trace_id;
pub mod user;
pub mod vote;

pub use self::assist::{AssistService, DEFAULT_ASSIST_TIMEOUT};
pub use self::error::{Error, ErrorCode};
pub use self::lifecycle::{PollStatus, VotingWindow};
pub use self::mirror::{MirrorDispatcher, MirrorOutbox};
pub use self::poll::{
    Poll, PollAnalysis, PollDraft, PollId, PollValidationError, parse_timestamp, validate_content,
};
pub use self::poll_service::PollService;
pub use self::reconcile::{MirrorReconciler, ReconcileReport};
pub use self::tally::Tally;
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{ExternalIdentity, Identity, IdentityValidationError, User, UserId};
pub use self::vote::{
    ANONYMOUS_VOTER, PollSummary, UNKNOWN_EMAIL, Vote, VoteHistoryEntry, VoterDetail,
};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use livepoll::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<()> {
///     Err(Error::forbidden("nope"))
/// }
/// assert!(handler().is_err());
/// ```
pub type ApiResult<T> = Result<T, Error>;
