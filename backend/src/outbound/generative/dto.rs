//! Request and response bodies for the `generateContent` endpoint.

use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub(super) struct GenerateRequestDto<'a> {
    contents: [ContentDto<'a>; 1],
}

#[derive(Debug, Serialize)]
struct ContentDto<'a> {
    parts: [PartDto<'a>; 1],
}

#[derive(Debug, Serialize)]
struct PartDto<'a> {
    text: &'a str,
}

impl<'a> GenerateRequestDto<'a> {
    pub(super) fn for_prompt(prompt: &'a str) -> Self {
        Self {
            contents: [ContentDto {
                parts: [PartDto { text: prompt }],
            }],
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct GenerateResponseDto {
    #[serde(default)]
    candidates: Vec<CandidateDto>,
}

#[derive(Debug, Default, Deserialize)]
struct CandidateDto {
    #[serde(default)]
    content: Option<CandidateContentDto>,
}

#[derive(Debug, Default, Deserialize)]
struct CandidateContentDto {
    #[serde(default)]
    parts: Vec<CandidatePartDto>,
}

#[derive(Debug, Default, Deserialize)]
struct CandidatePartDto {
    #[serde(default)]
    text: Option<String>,
}

impl GenerateResponseDto {
    /// Concatenated text of the first candidate, if it has any.
    pub(super) fn into_text(self) -> Option<String> {
        let content = self.candidates.into_iter().next()?.content?;
        let text: String = content
            .parts
            .into_iter()
            .filter_map(|part| part.text)
            .collect();
        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }
}
