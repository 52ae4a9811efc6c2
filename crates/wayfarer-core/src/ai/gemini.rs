//! Gemini `generateContent` client that never fails.
//!
//! Every call resolves to a string. Transport errors, bad statuses and
//! undecodable bodies are retried on the [`RetryPolicy`] schedule; when the
//! attempts run out the caller gets [`EXHAUSTED_FALLBACK`], and a well-formed
//! reply without text becomes [`SIGNAL_LOST_FALLBACK`].

use std::sync::Arc;

use serde_json::{json, Value};
use tracing::{debug, warn};

use super::transport::{ReqwestTransport, Transport};
use crate::error::TransportError;
use crate::retry::{RetryPolicy, Sleeper, TokioSleeper};

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash-preview-09-2025";
pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta/models";

pub const SIGNAL_LOST_FALLBACK: &str = "The signal was lost...";
pub const EXHAUSTED_FALLBACK: &str = "Connection to the Neural Net failed. Please try again later.";

#[derive(Clone)]
pub struct GeminiClient {
    transport: Arc<dyn Transport>,
    sleeper: Arc<dyn Sleeper>,
    policy: RetryPolicy,
    api_key: String,
    model: String,
    endpoint: String,
}

impl GeminiClient {
    pub fn new(api_key: &str) -> Self {
        Self {
            transport: Arc::new(ReqwestTransport::new()),
            sleeper: Arc::new(TokioSleeper),
            policy: RetryPolicy::default(),
            api_key: api_key.to_string(),
            model: DEFAULT_MODEL.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = transport;
        self
    }

    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn url(&self) -> String {
        format!(
            "{}/{}:generateContent?key={}",
            self.endpoint, self.model, self.api_key
        )
    }

    /// Sends `prompt` with an optional persona `instruction` and returns the
    /// reply text, or one of the fallback strings.
    pub async fn send_prompt(&self, prompt: &str, instruction: &str) -> String {
        let url = self.url();
        let body = request_body(prompt, instruction);

        let result = self
            .policy
            .run(self.sleeper.as_ref(), |attempt| {
                let url = &url;
                let body = &body;
                async move {
                    debug!(attempt = attempt + 1, model = %self.model, "sending prompt");
                    let raw = self.transport.post_json(url, body).await?;
                    serde_json::from_str::<Value>(&raw)
                        .map_err(|err| TransportError::Decode(err.to_string()))
                }
            })
            .await;

        match result {
            Ok(payload) => extract_text(&payload).unwrap_or_else(|| {
                warn!("response carried no candidate text");
                SIGNAL_LOST_FALLBACK.to_string()
            }),
            Err(err) => {
                warn!(
                    attempts = self.policy.max_attempts(),
                    "giving up on prompt: {}", err
                );
                EXHAUSTED_FALLBACK.to_string()
            }
        }
    }
}

fn request_body(prompt: &str, instruction: &str) -> Value {
    json!({
        "contents": [{ "parts": [{ "text": prompt }] }],
        "systemInstruction": { "parts": [{ "text": instruction }] },
    })
}

/// First candidate's first part, if it is a non-empty string.
fn extract_text(payload: &Value) -> Option<String> {
    payload
        .pointer("/candidates/0/content/parts/0/text")
        .and_then(Value::as_str)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
}
