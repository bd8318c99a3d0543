/// Client for the external chat completion service.
///
/// One endpoint matters: `POST {base_url}/api/chat` with the new message and
/// the conversation so far, answered by `{ "response": "..." }`. The service
/// also exposes `GET /api/health`, used by `aidash health`.
///
/// Requests are single-shot: no retry, no backoff, and no timeout unless one
/// is configured.
use std::time::Instant;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::activity;
use crate::config::schema::CompletionConfig;
use crate::store::Message;
use crate::store::rest::build_agent;

/// Anything that can answer a chat message.
pub trait CompletionClient {
    /// Send `message` with the prior `history` and return the `response`
    /// field, or `None` when the service answered without one.
    ///
    /// `Err` means the exchange itself failed (unreachable, unreadable).
    fn complete(&self, message: &str, history: &[Message]) -> Result<Option<String>>;
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

/// Request body for `POST /api/chat`.
#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    message: &'a str,
    conversation_history: &'a [Message],
}

/// Response body from `POST /api/chat`.
///
/// Error answers look like `{ "error": "..." }`, so every field is optional.
#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    response: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

// ---------------------------------------------------------------------------
// HTTP client
// ---------------------------------------------------------------------------

/// `ureq`-backed [`CompletionClient`].
#[derive(Debug)]
pub struct HttpCompletionClient {
    base_url: String,
    agent: ureq::Agent,
}

impl HttpCompletionClient {
    pub fn from_config(config: &CompletionConfig) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            agent: build_agent(config.timeout_ms),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build an endpoint URL. On Windows "localhost" may resolve to `::1`
    /// first while the service only binds IPv4, so use `127.0.0.1`.
    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url).replace("://localhost", "://127.0.0.1")
    }

    fn try_complete(&self, message: &str, history: &[Message]) -> Result<Option<String>> {
        let body = ChatRequest {
            message,
            conversation_history: history,
        };

        let parsed: ChatResponse = match self.agent.post(&self.endpoint("/api/chat")).send_json(&body) {
            Ok(resp) => resp
                .into_json()
                .context("failed to parse completion response")?,
            // A JSON error body still counts as an answer without a response.
            Err(ureq::Error::Status(code, resp)) => resp
                .into_json()
                .with_context(|| format!("completion service returned HTTP {code}"))?,
            Err(e) => return Err(anyhow::Error::new(e).context("completion request failed")),
        };

        if let Some(error) = &parsed.error {
            activity::note("chat", "/api/chat", false, format!("service error: {error}"));
        }

        Ok(parsed.response)
    }

    /// Whether `GET /api/health` answers with a 2xx.
    pub fn is_healthy(&self) -> bool {
        self.agent.get(&self.endpoint("/api/health")).call().is_ok()
    }
}

impl CompletionClient for HttpCompletionClient {
    fn complete(&self, message: &str, history: &[Message]) -> Result<Option<String>> {
        let started = Instant::now();
        let result = self.try_complete(message, history);
        activity::record("chat", "/api/chat", started, &result);
        result
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_from_default_config() {
        let client = HttpCompletionClient::from_config(&CompletionConfig::default());
        assert_eq!(client.base_url(), "http://localhost:5000");
        assert_eq!(client.endpoint("/api/chat"), "http://127.0.0.1:5000/api/chat");
    }

    #[test]
    fn client_strips_trailing_slash() {
        let config = CompletionConfig {
            base_url: "http://chat.internal:8000/".to_string(),
            timeout_ms: None,
        };
        let client = HttpCompletionClient::from_config(&config);
        assert_eq!(client.endpoint("/api/chat"), "http://chat.internal:8000/api/chat");
    }

    #[test]
    fn request_uses_history_field_name() {
        let history = vec![Message::user("earlier")];
        let body = ChatRequest {
            message: "Hello",
            conversation_history: &history,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["message"], "Hello");
        assert_eq!(json["conversation_history"][0]["role"], "user");
        assert_eq!(json["conversation_history"][0]["content"], "earlier");
    }

    #[test]
    fn response_with_extra_fields_parses() {
        let json = r#"{"response":"Hi there","timestamp":"2026-01-01T00:00:00","model":"demo-ai-model"}"#;
        let parsed: ChatResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.response.as_deref(), Some("Hi there"));
    }

    #[test]
    fn error_body_has_no_response() {
        let parsed: ChatResponse = serde_json::from_str(r#"{"error":"Message is required"}"#).unwrap();
        assert!(parsed.response.is_none());
        assert_eq!(parsed.error.as_deref(), Some("Message is required"));
    }

    #[test]
    fn unreachable_service_is_an_error() {
        let config = CompletionConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            timeout_ms: Some(2_000),
        };
        let client = HttpCompletionClient::from_config(&config);
        assert!(client.complete("hi", &[]).is_err());
        assert!(!client.is_healthy());
    }
}
