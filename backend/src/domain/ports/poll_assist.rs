//! Driving port for generated option suggestions and result analysis.

use async_trait::async_trait;

use crate::domain::{Error, PollAnalysis, PollId};

/// Soft result of an assist call.
///
/// Upstream trouble is reported as [`AssistOutcome::Failure`] so callers can
/// fall back to manual input; it never surfaces as an [`Error`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssistOutcome<T> {
    Success(T),
    Failure { error: String },
}

impl<T> AssistOutcome<T> {
    pub fn failure(error: impl Into<String>) -> Self {
        Self::Failure {
            error: error.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Payload of a successful outcome.
    pub fn data(&self) -> Option<&T> {
        match self {
            Self::Success(data) => Some(data),
            Self::Failure { .. } => None,
        }
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PollAssist: Send + Sync {
    /// Ask the generator for options on `topic`.
    async fn suggest_options(&self, topic: &str) -> AssistOutcome<Vec<String>>;

    /// Summarise the current results of `poll_id`.
    ///
    /// A missing poll is a hard [`Error`]; upstream failures are soft.
    async fn analyze_results(&self, poll_id: PollId) -> Result<AssistOutcome<PollAnalysis>, Error>;
}
