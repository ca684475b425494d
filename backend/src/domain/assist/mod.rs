//! Assist service: generated poll options and result analysis.
//!
//! Each call builds a prompt, asks the [`TextGenerator`] under a deadline and
//! parses the first bracketed JSON span of the reply. Upstream trouble becomes
//! [`AssistOutcome::Failure`]; only a missing poll is a hard error.

pub mod extract;
pub mod prompt;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::domain::ports::{AssistOutcome, PollAssist, PollsCommand, PollsQuery, TextGenerator};
use crate::domain::{Error, PollAnalysis, PollId};

/// Deadline applied to each generator call unless configured otherwise.
pub const DEFAULT_ASSIST_TIMEOUT: Duration = Duration::from_secs(10);

const OPTIONS_FAILURE: &str = "Failed to generate poll options";
const ANALYSIS_FAILURE: &str = "Failed to analyze poll results";

/// Service implementing [`PollAssist`].
#[derive(Clone)]
pub struct AssistService {
    generator: Arc<dyn TextGenerator>,
    polls_query: Arc<dyn PollsQuery>,
    polls_command: Arc<dyn PollsCommand>,
    timeout: Duration,
}

impl AssistService {
    /// Create a service with [`DEFAULT_ASSIST_TIMEOUT`].
    pub fn new(
        generator: Arc<dyn TextGenerator>,
        polls_query: Arc<dyn PollsQuery>,
        polls_command: Arc<dyn PollsCommand>,
    ) -> Self {
        Self {
            generator,
            polls_query,
            polls_command,
            timeout: DEFAULT_ASSIST_TIMEOUT,
        }
    }

    /// Override the per-call deadline.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    async fn complete(&self, operation: &'static str, prompt: &str) -> Option<String> {
        match tokio::time::timeout(self.timeout, self.generator.generate(prompt)).await {
            Ok(Ok(text)) => Some(text),
            Ok(Err(error)) => {
                warn!(operation, error = %error, "text generation failed");
                None
            }
            Err(_) => {
                warn!(
                    operation,
                    timeout_ms = u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX),
                    "text generation timed out"
                );
                None
            }
        }
    }
}

fn normalise_options(raw: Vec<String>) -> Vec<String> {
    raw.into_iter()
        .map(|option| option.trim().to_owned())
        .filter(|option| !option.is_empty())
        .collect()
}

#[async_trait]
impl PollAssist for AssistService {
    async fn suggest_options(&self, topic: &str) -> AssistOutcome<Vec<String>> {
        if topic.trim().is_empty() {
            return AssistOutcome::failure("Topic is required to suggest options");
        }
        let Some(text) = self
            .complete("suggest_options", &prompt::options_prompt(topic))
            .await
        else {
            return AssistOutcome::failure(OPTIONS_FAILURE);
        };

        match extract::parse_array::<Vec<String>>(&text).map(normalise_options) {
            Ok(options) if !options.is_empty() => AssistOutcome::Success(options),
            Ok(_) => {
                warn!("generated option list was empty");
                AssistOutcome::failure(OPTIONS_FAILURE)
            }
            Err(error) => {
                warn!(error = %error, "could not parse generated options");
                AssistOutcome::failure(OPTIONS_FAILURE)
            }
        }
    }

    async fn analyze_results(&self, poll_id: PollId) -> Result<AssistOutcome<PollAnalysis>, Error> {
        let results = self.polls_query.poll_results(poll_id).await?;
        let prompt = prompt::analysis_prompt(&results.poll.poll, &results.tally);

        let Some(text) = self.complete("analyze_results", &prompt).await else {
            return Ok(AssistOutcome::failure(ANALYSIS_FAILURE));
        };
        let analysis = match extract::parse_object::<PollAnalysis>(&text) {
            Ok(analysis) => analysis,
            Err(error) => {
                warn!(poll_id = %poll_id, error = %error, "could not parse generated analysis");
                return Ok(AssistOutcome::failure(ANALYSIS_FAILURE));
            }
        };

        match self
            .polls_command
            .record_analysis(poll_id, analysis.clone())
            .await
        {
            Ok(()) => info!(poll_id = %poll_id, "analysis recorded"),
            Err(error) => warn!(poll_id = %poll_id, error = %error, "analysis not recorded"),
        }
        Ok(AssistOutcome::Success(analysis))
    }
}
