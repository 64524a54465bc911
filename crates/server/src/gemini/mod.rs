//! Gemini API client for the assistant backend.
//!
//! Only the streaming `streamGenerateContent` endpoint is used; the caller
//! drains the chunk stream and concatenates the text fragments.

mod client;
mod error;
mod types;

pub use client::GeminiClient;
pub use error::GeminiError;
pub use types::{
    Content, GenerateContentRequest, GenerationConfig, Part, StreamChunk, ThinkingConfig,
};
