//! Gemini API error types.

use serde::Deserialize;
use thiserror::Error;

/// Errors from the Gemini API client.
#[derive(Debug, Error)]
pub enum GeminiError {
    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API returned an error response.
    #[error("Gemini API error ({status}): {message}")]
    Api {
        /// Error status reported by the API (e.g., `RESOURCE_EXHAUSTED`).
        status: String,
        /// Human-readable message.
        message: String,
    },

    /// Rate limited by the API.
    #[error("rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Invalid or missing API key.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Failed to parse a response or stream event.
    #[error("parse error: {0}")]
    Parse(String),

    /// The byte stream failed mid-response.
    #[error("stream error: {0}")]
    Stream(String),
}

/// Error envelope returned by the Gemini API.
#[derive(Debug, Deserialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorDetail,
}

/// Error detail within an [`ApiErrorResponse`].
#[derive(Debug, Deserialize)]
pub struct ApiErrorDetail {
    #[serde(default)]
    pub code: i32,
    pub message: String,
    #[serde(default)]
    pub status: String,
}
