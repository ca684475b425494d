//! Pull a JSON value out of free-form generated text.
//!
//! Generators wrap JSON in prose or code fences. The scan is greedy: it spans
//! from the first opening bracket to the last closing one, so nested values
//! survive intact and trailing prose containing brackets breaks the parse.

use std::sync::OnceLock;

use regex::Regex;
use serde::de::DeserializeOwned;

static ARRAY_RE: OnceLock<Regex> = OnceLock::new();
static OBJECT_RE: OnceLock<Regex> = OnceLock::new();

fn array_regex() -> &'static Regex {
    ARRAY_RE.get_or_init(|| {
        Regex::new(r"(?s)\[.*\]")
            .unwrap_or_else(|error| panic!("array regex failed to compile: {error}"))
    })
}

fn object_regex() -> &'static Regex {
    OBJECT_RE.get_or_init(|| {
        Regex::new(r"(?s)\{.*\}")
            .unwrap_or_else(|error| panic!("object regex failed to compile: {error}"))
    })
}

/// Reasons a JSON value could not be recovered from generated text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExtractError {
    #[error("response contains no JSON {0}")]
    Missing(&'static str),
    #[error("response JSON is malformed: {0}")]
    Malformed(String),
}

/// The bracketed `[...]` span of `text`, if any.
pub fn array_span(text: &str) -> Option<&str> {
    array_regex().find(text).map(|found| found.as_str())
}

/// The braced `{...}` span of `text`, if any.
pub fn object_span(text: &str) -> Option<&str> {
    object_regex().find(text).map(|found| found.as_str())
}

/// Parse the bracketed array embedded in `text`.
pub fn parse_array<T: DeserializeOwned>(text: &str) -> Result<T, ExtractError> {
    let span = array_span(text).ok_or(ExtractError::Missing("array"))?;
    serde_json::from_str(span).map_err(|error| ExtractError::Malformed(error.to_string()))
}

/// Parse the braced object embedded in `text`.
pub fn parse_object<T: DeserializeOwned>(text: &str) -> Result<T, ExtractError> {
    let span = object_span(text).ok_or(ExtractError::Missing("object"))?;
    serde_json::from_str(span).map_err(|error| ExtractError::Malformed(error.to_string()))
}
