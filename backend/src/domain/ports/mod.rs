//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driving ports (`PollsCommand`, `PollsQuery`, `PollAssist`) are called by
//! inbound adapters. Driven ports (repositories, the change feed, the
//! realtime mirror and its read-back source, the text generator) are
//! implemented by outbound adapters.

mod macros;
pub(crate) use macros::define_port_error;

mod change_feed;
mod poll_assist;
mod poll_repository;
mod polls_command;
mod polls_query;
mod text_generator;
mod user_repository;

#[cfg(test)]
pub use change_feed::{MockChangeFeed, MockMirrorSource, MockRealtimeMirror};
pub use change_feed::{
    ChangeFeed, DiscardingChangeFeed, MirrorEvent, MirrorSnapshot, MirrorSource,
    NoOpRealtimeMirror, RealtimeMirror, RealtimeMirrorError,
};
#[cfg(test)]
pub use poll_assist::MockPollAssist;
pub use poll_assist::{AssistOutcome, PollAssist};
#[cfg(test)]
pub use poll_repository::MockPollRepository;
pub use poll_repository::{PollRepository, PollRepositoryError, PollVoteCount};
#[cfg(test)]
pub use polls_command::MockPollsCommand;
pub use polls_command::{CreatePollRequest, PollsCommand};
#[cfg(test)]
pub use polls_query::MockPollsQuery;
pub use polls_query::{DashboardStats, PollResults, PollView, PollsQuery, PopularPoll};
#[cfg(test)]
pub use text_generator::MockTextGenerator;
pub use text_generator::{TextGenerationError, TextGenerator, UnconfiguredTextGenerator};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserRepository, UserRepositoryError};
