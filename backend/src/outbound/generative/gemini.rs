//! Reqwest-backed text generator for the Gemini `generateContent` API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};

use super::dto::{GenerateRequestDto, GenerateResponseDto};
use crate::domain::ports::{TextGenerationError, TextGenerator};
use crate::outbound::with_trailing_slash;

pub const DEFAULT_GENERATIVE_ENDPOINT: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_GENERATIVE_MODEL: &str = "gemini-pro";

/// Text generator calling one model on one endpoint.
pub struct GeminiTextGenerator {
    client: Client,
    url: Url,
    api_key: String,
}

impl GeminiTextGenerator {
    /// Build a generator for `model` at `endpoint`.
    ///
    /// # Errors
    ///
    /// Returns [`TextGenerationError::Transport`] when the endpoint cannot be
    /// combined with the model path or the client cannot be constructed.
    pub fn new(
        endpoint: &Url,
        model: &str,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, TextGenerationError> {
        let url = with_trailing_slash(endpoint.clone())
            .join(&format!("v1beta/models/{model}:generateContent"))
            .map_err(|err| TextGenerationError::transport(format!("invalid endpoint: {err}")))?;
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| TextGenerationError::transport(err.to_string()))?;
        Ok(Self {
            client,
            url,
            api_key: api_key.into(),
        })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

#[async_trait]
impl TextGenerator for GeminiTextGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, TextGenerationError> {
        let response = self
            .client
            .post(self.url.clone())
            .header("x-goog-api-key", self.api_key.as_str())
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&GenerateRequestDto::for_prompt(prompt))
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }
        parse_text(body.as_ref())
    }
}

fn parse_text(body: &[u8]) -> Result<String, TextGenerationError> {
    let decoded: GenerateResponseDto = serde_json::from_slice(body)
        .map_err(|err| TextGenerationError::decode(format!("invalid response JSON: {err}")))?;
    decoded
        .into_text()
        .ok_or_else(TextGenerationError::empty_response)
}

fn map_transport_error(error: reqwest::Error) -> TextGenerationError {
    if error.is_timeout() {
        TextGenerationError::timeout(error.to_string())
    } else {
        TextGenerationError::transport(error.to_string())
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> TextGenerationError {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let message: String = compact.chars().take(PREVIEW_CHAR_LIMIT).collect();

    match status {
        StatusCode::TOO_MANY_REQUESTS => TextGenerationError::rate_limited(message),
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
            TextGenerationError::timeout(message)
        }
        _ => TextGenerationError::status(status.as_u16(), message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[test]
    fn url_targets_the_model_generate_endpoint() {
        let endpoint = Url::parse(DEFAULT_GENERATIVE_ENDPOINT).expect("url");
        let generator = GeminiTextGenerator::new(
            &endpoint,
            DEFAULT_GENERATIVE_MODEL,
            "key",
            Duration::from_secs(1),
        )
        .expect("generator");
        assert_eq!(
            generator.url().as_str(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-pro:generateContent"
        );
    }

    #[rstest]
    #[case::no_trailing_slash("https://proxy.example.com/google")]
    #[case::trailing_slash("https://proxy.example.com/google/")]
    fn prefixed_endpoints_keep_their_path(#[case] endpoint: &str) {
        let endpoint = Url::parse(endpoint).expect("url");
        let generator =
            GeminiTextGenerator::new(&endpoint, "gemini-pro", "key", Duration::from_secs(1))
                .expect("generator");
        assert_eq!(
            generator.url().as_str(),
            "https://proxy.example.com/google/v1beta/models/gemini-pro:generateContent"
        );
    }

    #[test]
    fn request_body_wraps_the_prompt() {
        let body = serde_json::to_value(GenerateRequestDto::for_prompt("hi")).expect("json");
        assert_eq!(body, json!({"contents": [{"parts": [{"text": "hi"}]}]}));
    }

    #[test]
    fn joins_all_parts_of_the_first_candidate() {
        let body = json!({
            "candidates": [
                {"content": {"parts": [{"text": "[\"A\","}, {"text": " \"B\"]"}]}},
                {"content": {"parts": [{"text": "ignored"}]}}
            ]
        });
        let text = parse_text(body.to_string().as_bytes()).expect("text");
        assert_eq!(text, "[\"A\", \"B\"]");
    }

    #[rstest]
    #[case::no_candidates(json!({}))]
    #[case::no_content(json!({"candidates": [{}]}))]
    #[case::blank_text(json!({"candidates": [{"content": {"parts": [{"text": "  "}]}}]}))]
    fn missing_text_is_an_empty_response(#[case] body: serde_json::Value) {
        let error = parse_text(body.to_string().as_bytes()).expect_err("no text");
        assert_eq!(error, TextGenerationError::EmptyResponse);
    }

    #[test]
    fn invalid_json_is_a_decode_error() {
        let error = parse_text(b"<html>").expect_err("not json");
        assert!(matches!(error, TextGenerationError::Decode { .. }));
    }

    #[rstest]
    #[case::rate_limited(StatusCode::TOO_MANY_REQUESTS)]
    #[case::gateway_timeout(StatusCode::GATEWAY_TIMEOUT)]
    #[case::forbidden(StatusCode::FORBIDDEN)]
    fn statuses_are_classified(#[case] status: StatusCode) {
        let error = map_status_error(status, b"{\"error\": \"nope\"}");
        match status {
            StatusCode::TOO_MANY_REQUESTS => {
                assert!(matches!(error, TextGenerationError::RateLimited { .. }));
            }
            StatusCode::GATEWAY_TIMEOUT => {
                assert!(matches!(error, TextGenerationError::Timeout { .. }));
            }
            _ => assert_eq!(
                error,
                TextGenerationError::status(403_u16, "{\"error\": \"nope\"}")
            ),
        }
    }
}
