//! Gemini API client with SSE streaming.

use std::sync::Arc;

use async_stream::stream;
use futures::Stream;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use tracing::instrument;

use crate::config::GeminiConfig;

use super::error::{ApiErrorResponse, GeminiError};
use super::types::{GenerateContentRequest, StreamChunk};

const GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Gemini API client.
///
/// Cheap to clone; the HTTP client and model name live behind an `Arc`.
#[derive(Clone)]
pub struct GeminiClient {
    inner: Arc<GeminiClientInner>,
}

struct GeminiClientInner {
    client: reqwest::Client,
    base_url: String,
    model: String,
}

impl GeminiClient {
    /// Create a new Gemini client.
    ///
    /// # Panics
    ///
    /// Panics if the API key contains invalid header characters.
    #[must_use]
    pub fn new(config: &GeminiConfig) -> Self {
        let api_key = config.api_key.expose_secret();

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            "x-goog-api-key",
            HeaderValue::from_str(api_key).expect("Invalid API key for header"),
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            inner: Arc::new(GeminiClientInner {
                client,
                base_url: GEMINI_API_URL.to_owned(),
                model: config.model.clone(),
            }),
        }
    }

    /// Send a generate-content request and stream the response chunks.
    ///
    /// The returned stream is a finite, non-restartable sequence of text
    /// chunks terminated by backend completion or error.
    ///
    /// # Errors
    ///
    /// Returns an error if the initial request fails or the API rejects it.
    #[instrument(skip(self, request), fields(model = %self.inner.model))]
    pub async fn generate_stream(
        &self,
        request: GenerateContentRequest,
    ) -> Result<impl Stream<Item = Result<StreamChunk, GeminiError>>, GeminiError> {
        let url = format!(
            "{}/models/{}:streamGenerateContent?alt=sse",
            self.inner.base_url, self.inner.model
        );

        let response = self.inner.client.post(url).json(&request).send().await?;

        // Check for error responses before streaming
        let status = response.status();
        if !status.is_success() {
            return Err(handle_error_status(status, response).await);
        }

        // Return a stream that parses SSE events
        Ok(stream! {
            use futures::StreamExt;

            let mut buffer = String::new();
            let mut byte_stream = std::pin::pin!(response.bytes_stream());

            while let Some(chunk_result) = byte_stream.next().await {
                match chunk_result {
                    Ok(chunk) => {
                        let text = match std::str::from_utf8(&chunk) {
                            Ok(t) => t,
                            Err(e) => {
                                yield Err(GeminiError::Parse(format!("Invalid UTF-8: {e}")));
                                continue;
                            }
                        };

                        buffer.push_str(text);

                        // Process complete SSE events
                        while let Some(event) = extract_sse_event(&mut buffer) {
                            if let Some(parsed) = parse_sse_event(&event) {
                                match parsed {
                                    Ok(stream_chunk) => yield Ok(stream_chunk),
                                    Err(e) => yield Err(e),
                                }
                            }
                        }
                    }
                    Err(e) => {
                        yield Err(GeminiError::Stream(e.to_string()));
                    }
                }
            }
        })
    }
}

/// Translate an error status code into a `GeminiError`.
async fn handle_error_status(
    status: reqwest::StatusCode,
    response: reqwest::Response,
) -> GeminiError {
    // Check for rate limiting
    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        let retry_after = response
            .headers()
            .get("Retry-After")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse().ok())
            .unwrap_or(60);
        return GeminiError::RateLimited(retry_after);
    }

    // Check for bad credentials
    if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
        return GeminiError::Unauthorized("Invalid API key".to_owned());
    }

    // Try to parse the API error envelope
    match response.text().await {
        Ok(body) => {
            if let Ok(api_error) = serde_json::from_str::<ApiErrorResponse>(&body) {
                GeminiError::Api {
                    status: api_error.error.status,
                    message: api_error.error.message,
                }
            } else {
                GeminiError::Api {
                    status: status.to_string(),
                    message: body,
                }
            }
        }
        Err(e) => GeminiError::Http(e),
    }
}

/// Extract a complete SSE event from the buffer.
///
/// Returns `Some(event)` if a complete event was found (and removes it from
/// buffer), or `None` if no complete event is available yet.
fn extract_sse_event(buffer: &mut String) -> Option<String> {
    // SSE events are separated by double newlines
    buffer.find("\n\n").map(|idx| {
        let event = buffer[..idx].to_string();
        *buffer = buffer[idx + 2..].to_string();
        event
    })
}

/// Parse an SSE event string into a `StreamChunk`.
fn parse_sse_event(event: &str) -> Option<Result<StreamChunk, GeminiError>> {
    // Skip empty events
    if event.trim().is_empty() {
        return None;
    }

    // Each Gemini event is a single "data: <json>" line; keep the last
    // data line in case a comment or id field precedes it
    let mut data_line = None;

    for line in event.lines() {
        if let Some(stripped) = line.strip_prefix("data: ") {
            data_line = Some(stripped);
        }
    }

    let data = data_line?;

    match serde_json::from_str::<StreamChunk>(data) {
        Ok(stream_chunk) => Some(Ok(stream_chunk)),
        Err(e) => Some(Err(GeminiError::Parse(format!(
            "Failed to parse stream chunk: {e}"
        )))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_sse_event() {
        let mut buffer =
            "data: {\"candidates\":[]}\n\ndata: {\"candidates\":[]}\n\n".to_string();

        let event1 = extract_sse_event(&mut buffer);
        assert!(event1.is_some());
        assert!(event1.expect("no event").contains("candidates"));

        let event2 = extract_sse_event(&mut buffer);
        assert!(event2.is_some());

        let event3 = extract_sse_event(&mut buffer);
        assert!(event3.is_none());
    }

    #[test]
    fn test_extract_sse_event_incomplete() {
        let mut buffer = "data: {\"partial".to_string();
        let event = extract_sse_event(&mut buffer);
        assert!(event.is_none());
        assert_eq!(buffer, "data: {\"partial");
    }

    #[test]
    fn test_parse_sse_event_chunk() {
        let event = r#"data: {"candidates":[{"content":{"parts":[{"text":"hi"}]}}]}"#;
        let result = parse_sse_event(event);
        assert!(result.is_some());
        let chunk = result.expect("no result").expect("parse error");
        assert_eq!(chunk.text(), "hi");
    }

    #[test]
    fn test_parse_sse_event_empty() {
        assert!(parse_sse_event("").is_none());
    }

    #[test]
    fn test_parse_sse_event_comment_only() {
        // Keep-alive comments carry no data line
        assert!(parse_sse_event(": keep-alive").is_none());
    }

    #[test]
    fn test_parse_sse_event_invalid_json() {
        let event = "data: {not json}";
        let result = parse_sse_event(event).expect("should yield a result");
        assert!(matches!(result, Err(GeminiError::Parse(_))));
    }

    #[test]
    fn test_gemini_client_is_clone() {
        fn assert_clone<T: Clone>() {}
        assert_clone::<GeminiClient>();
    }

    #[test]
    fn test_gemini_client_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<GeminiClient>();
    }
}
