//! Port for the generative-text service behind the assist features.

use async_trait::async_trait;

use super::define_port_error;

define_port_error! {
    /// Errors raised by text generation adapters.
    pub enum TextGenerationError {
        /// No credentials were configured for the upstream service.
        Unconfigured => "text generation is not configured",
        /// Transport failed before a response arrived.
        Transport { message: String } => "text generation transport failed: {message}",
        /// The upstream call exceeded its deadline.
        Timeout { message: String } => "text generation timed out: {message}",
        /// The upstream service throttled the request.
        RateLimited { message: String } => "text generation rate limited: {message}",
        /// The upstream service answered with an unexpected status.
        Status { status: u16, message: String } =>
            "text generation failed with status {status}: {message}",
        /// The response body could not be decoded.
        Decode { message: String } => "text generation response malformed: {message}",
        /// The response carried no text.
        EmptyResponse => "text generation returned no text",
    }
}

/// Driven port completing a free-text prompt.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Return the raw completion text for `prompt`.
    async fn generate(&self, prompt: &str) -> Result<String, TextGenerationError>;
}

/// Generator used when no API key is configured.
///
/// ```
/// use livepoll::domain::ports::{TextGenerationError, TextGenerator, UnconfiguredTextGenerator};
///
/// # tokio::runtime::Runtime::new().expect("runtime").block_on(async {
/// let result = UnconfiguredTextGenerator.generate("hello").await;
/// assert_eq!(result, Err(TextGenerationError::Unconfigured));
/// # });
/// ```
#[derive(Debug, Default, Clone, Copy)]
pub struct UnconfiguredTextGenerator;

#[async_trait]
impl TextGenerator for UnconfiguredTextGenerator {
    async fn generate(&self, _prompt: &str) -> Result<String, TextGenerationError> {
        Err(TextGenerationError::unconfigured())
    }
}
