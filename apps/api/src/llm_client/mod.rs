/// Chat relay: the single point where chat completions leave the service.
///
/// The relay does not interpret the conversation. It fills in the default
/// model, forces streaming, forwards the request with bearer auth and hands the
/// upstream byte stream back to the caller untouched.
use std::time::Duration;

use reqwest::{Client, Response};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, warn};

pub mod handlers;

pub const DEFAULT_CHAT_API_URL: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_CHAT_MODEL: &str = "gpt-3.5-turbo";
const MAX_RETRIES: u32 = 3;

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("Chat relay is not configured (no API key)")]
    NotConfigured,

    #[error("Invalid chat request: {0}")]
    InvalidRequest(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Upstream error (status {status}): {message}")]
    Api { status: u16, message: String },
}

#[derive(Clone)]
pub struct ChatRelay {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
    default_model: String,
    backoff_base: Duration,
}

impl ChatRelay {
    pub fn new(
        api_key: Option<String>,
        endpoint: impl Into<String>,
        default_model: impl Into<String>,
    ) -> Result<Self, RelayError> {
        // No overall timeout: a streamed completion may legitimately run long.
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            api_key,
            default_model: default_model.into(),
            backoff_base: Duration::from_millis(1000),
        })
    }

    pub fn with_backoff_base(mut self, base: Duration) -> Self {
        self.backoff_base = base;
        self
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Inserts the default model when absent and forces `stream: true`.
    /// Every other parameter passes through as given.
    pub fn prepare_body(&self, body: Value) -> Result<Value, RelayError> {
        let mut params: Map<String, Value> = match body {
            Value::Object(map) => map,
            other => {
                return Err(RelayError::InvalidRequest(format!(
                    "expected a JSON object, got {}",
                    json_kind(&other)
                )))
            }
        };
        if !params.contains_key("messages") {
            return Err(RelayError::InvalidRequest("missing 'messages'".to_string()));
        }
        params
            .entry("model")
            .or_insert_with(|| Value::String(self.default_model.clone()));
        params.insert("stream".to_string(), Value::Bool(true));
        Ok(Value::Object(params))
    }

    /// Sends the request upstream and returns the successful response, whose
    /// body has not been read yet.
    /// Retries on connection errors, 429 and 5xx with exponential backoff.
    pub async fn forward(&self, body: Value) -> Result<Response, RelayError> {
        let api_key = self.api_key.as_deref().ok_or(RelayError::NotConfigured)?;
        let request_body = self.prepare_body(body)?;

        let mut last_error: Option<RelayError> = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                let delay = self.backoff_base * (1 << (attempt - 1));
                warn!(
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    "Chat relay attempt failed, retrying"
                );
                tokio::time::sleep(delay).await;
            }

            let response = self
                .client
                .post(&self.endpoint)
                .bearer_auth(api_key)
                .json(&request_body)
                .send()
                .await;

            let response = match response {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(RelayError::Http(e));
                    continue;
                }
            };

            let status = response.status();

            if status.as_u16() == 429 || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!(status = status.as_u16(), "Chat upstream returned retryable status");
                last_error = Some(RelayError::Api {
                    status: status.as_u16(),
                    message: upstream_message(body),
                });
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(RelayError::Api {
                    status: status.as_u16(),
                    message: upstream_message(body),
                });
            }

            debug!(attempt, "Chat relay connected upstream");
            return Ok(response);
        }

        Err(last_error.unwrap_or(RelayError::Api {
            status: 503,
            message: format!("gave up after {MAX_RETRIES} attempts"),
        }))
    }
}

/// Pulls `error.message` out of an OpenAI-style error body, else the raw body.
fn upstream_message(body: String) -> String {
    serde_json::from_str::<Value>(&body)
        .ok()
        .and_then(|v| {
            v.pointer("/error/message")
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or(body)
}

pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
    use serde_json::json;

    fn relay(endpoint: &str) -> ChatRelay {
        ChatRelay::new(Some("test-key".to_string()), endpoint, DEFAULT_CHAT_MODEL)
            .unwrap()
            .with_backoff_base(Duration::from_millis(5))
    }

    /// Starts an upstream that answers the first `failures` requests with
    /// `status`, then echoes the request body.
    async fn upstream(status: StatusCode, failures: usize) -> (String, Arc<AtomicUsize>) {
        let hits = Arc::new(AtomicUsize::new(0));
        let app = Router::new()
            .route(
                "/chat",
                post(
                    move |State(hits): State<Arc<AtomicUsize>>, Json(body): Json<Value>| async move {
                        let n = hits.fetch_add(1, Ordering::SeqCst);
                        if n < failures {
                            (status, json!({"error": {"message": "upstream says no"}}).to_string())
                        } else {
                            (StatusCode::OK, body.to_string())
                        }
                    },
                ),
            )
            .with_state(hits.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{addr}/chat"), hits)
    }

    #[test]
    fn test_prepare_body_fills_model_and_forces_stream() {
        let relay = relay("http://unused");
        let body = relay
            .prepare_body(json!({"messages": [], "stream": false, "temperature": 0.2}))
            .unwrap();
        assert_eq!(body["model"], DEFAULT_CHAT_MODEL);
        assert_eq!(body["stream"], true);
        assert_eq!(body["temperature"], 0.2);
    }

    #[test]
    fn test_prepare_body_keeps_caller_model() {
        let relay = relay("http://unused");
        let body = relay
            .prepare_body(json!({"messages": [], "model": "gpt-4"}))
            .unwrap();
        assert_eq!(body["model"], "gpt-4");
    }

    #[test]
    fn test_prepare_body_rejects_non_object_and_missing_messages() {
        let relay = relay("http://unused");
        assert!(matches!(
            relay.prepare_body(json!([1, 2])),
            Err(RelayError::InvalidRequest(_))
        ));
        assert!(matches!(
            relay.prepare_body(json!({"model": "x"})),
            Err(RelayError::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_upstream_message_extraction() {
        assert_eq!(
            upstream_message(r#"{"error":{"message":"quota"}}"#.to_string()),
            "quota"
        );
        assert_eq!(upstream_message("plain".to_string()), "plain");
    }

    #[tokio::test]
    async fn test_forward_without_key_is_not_configured() {
        let relay = ChatRelay::new(None, "http://unused", DEFAULT_CHAT_MODEL).unwrap();
        assert!(!relay.is_configured());
        assert!(matches!(
            relay.forward(json!({"messages": []})).await,
            Err(RelayError::NotConfigured)
        ));
    }

    #[tokio::test]
    async fn test_forward_retries_server_errors_then_succeeds() {
        let (url, hits) = upstream(StatusCode::SERVICE_UNAVAILABLE, 2).await;
        let response = relay(&url)
            .forward(json!({"messages": [{"role": "user", "content": "hi"}]}))
            .await
            .unwrap();

        let echoed: Value = response.json().await.unwrap();
        assert_eq!(echoed["stream"], true);
        assert_eq!(echoed["model"], DEFAULT_CHAT_MODEL);
        assert_eq!(hits.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_forward_gives_up_after_max_retries() {
        let (url, hits) = upstream(StatusCode::TOO_MANY_REQUESTS, usize::MAX).await;
        let err = relay(&url).forward(json!({"messages": []})).await.unwrap_err();

        match err {
            RelayError::Api { status, message } => {
                assert_eq!(status, 429);
                assert_eq!(message, "upstream says no");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
        assert_eq!(hits.load(Ordering::SeqCst), MAX_RETRIES as usize);
    }

    #[tokio::test]
    async fn test_forward_does_not_retry_client_errors() {
        let (url, hits) = upstream(StatusCode::UNAUTHORIZED, usize::MAX).await;
        let err = relay(&url).forward(json!({"messages": []})).await.unwrap_err();

        match err {
            RelayError::Api { status, message } => {
                assert_eq!(status, 401);
                assert_eq!(message, "upstream says no");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }
}
