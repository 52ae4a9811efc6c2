use thiserror::Error;

/// Failure of a single request to the text-generation service.
///
/// Every variant is retryable; none of them reaches callers of
/// [`crate::ai::GeminiClient::send_prompt`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("request failed: {0}")]
    Request(String),

    #[error("API error {status}: {body}")]
    Status { status: u16, body: String },

    #[error("response was not valid JSON: {0}")]
    Decode(String),
}
