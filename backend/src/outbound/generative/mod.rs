//! Generative text adapters backing the assist features.

mod dto;
mod gemini;

pub use gemini::{DEFAULT_GENERATIVE_ENDPOINT, DEFAULT_GENERATIVE_MODEL, GeminiTextGenerator};
