use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

use crate::provider::{api_error, http_client, LlmError, LlmProvider, Message, Role};

pub const ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com";
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Anthropic Messages API. Structured output goes through the trait's
/// prompt-embedded schema.
pub struct ClaudeProvider {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl ClaudeProvider {
    pub fn new(api_key: String, model: String, timeout: Duration) -> Result<Self, LlmError> {
        Ok(Self {
            client: http_client(timeout)?,
            api_key,
            model,
            base_url: ANTHROPIC_BASE_URL.to_string(),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// System turns are merged into the top-level `system` field; the
    /// conversation itself carries only user and assistant turns.
    fn build_request_body(&self, messages: &[Message], temperature: f32, max_tokens: u32) -> Value {
        let system: Vec<&str> = messages
            .iter()
            .filter(|m| matches!(m.role, Role::System))
            .map(|m| m.content.as_str())
            .collect();

        let turns: Vec<Value> = messages
            .iter()
            .filter_map(|m| match m.role {
                Role::User => Some(json!({ "role": "user", "content": m.content })),
                Role::Assistant => Some(json!({ "role": "assistant", "content": m.content })),
                Role::System => None,
            })
            .collect();

        let mut body = json!({
            "model": self.model,
            "messages": turns,
            "temperature": temperature,
            "max_tokens": max_tokens,
        });
        if !system.is_empty() {
            body["system"] = json!(system.join("\n\n"));
        }
        body
    }

    fn extract_text(resp: &Value) -> Result<String, LlmError> {
        let blocks = resp["content"]
            .as_array()
            .ok_or_else(|| LlmError::ParseError("response has no content array".into()))?;
        let text: String = blocks
            .iter()
            .filter(|b| b["type"] == "text")
            .filter_map(|b| b["text"].as_str())
            .collect();
        if text.is_empty() {
            let reason = resp["stop_reason"].as_str().unwrap_or("unknown");
            return Err(LlmError::ParseError(format!(
                "no text blocks in response (stop_reason: {reason})"
            )));
        }
        Ok(text)
    }
}

#[async_trait]
impl LlmProvider for ClaudeProvider {
    async fn complete(
        &self,
        messages: Vec<Message>,
        temperature: f32,
        max_tokens: u32,
    ) -> Result<String, LlmError> {
        let url = format!("{}/v1/messages", self.base_url);
        let body = self.build_request_body(&messages, temperature, max_tokens);
        debug!(model = %self.model, "Anthropic request");

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(LlmError::from_send)?;

        if !response.status().is_success() {
            return Err(api_error(response).await);
        }

        let resp: Value = response.json().await?;
        Self::extract_text(&resp)
    }

    fn provider_name(&self) -> &str {
        "anthropic"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::HeaderMap, routing::post, Json, Router};

    fn provider() -> ClaudeProvider {
        ClaudeProvider::new("k".into(), "claude".into(), Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn system_messages_are_lifted_and_joined() {
        let body = provider().build_request_body(
            &[
                Message::system("Be fair."),
                Message::system("Reply in JSON."),
                Message::user("Evaluate"),
            ],
            0.7,
            256,
        );
        assert_eq!(body["system"], "Be fair.\n\nReply in JSON.");
        assert_eq!(body["messages"].as_array().unwrap().len(), 1);
        assert_eq!(body["messages"][0]["role"], "user");
    }

    #[test]
    fn text_blocks_are_concatenated() {
        let resp = json!({
            "content": [
                { "type": "text", "text": "{\"score\":" },
                { "type": "text", "text": " 8}" }
            ]
        });
        assert_eq!(ClaudeProvider::extract_text(&resp).unwrap(), "{\"score\": 8}");
    }

    #[test]
    fn empty_content_reports_stop_reason() {
        let resp = json!({ "content": [], "stop_reason": "max_tokens" });
        match ClaudeProvider::extract_text(&resp) {
            Err(LlmError::ParseError(msg)) => assert!(msg.contains("max_tokens")),
            other => panic!("expected ParseError, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_complete_against_local_server() {
        async fn handler(headers: HeaderMap, Json(body): Json<Value>) -> Json<Value> {
            assert_eq!(headers["x-api-key"], "k");
            assert_eq!(headers["anthropic-version"], ANTHROPIC_VERSION);
            assert_eq!(body["model"], "claude");
            Json(json!({ "content": [{ "type": "text", "text": "hello" }] }))
        }

        let app = Router::new().route("/v1/messages", post(handler));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });

        let text = provider()
            .with_base_url(format!("http://{addr}"))
            .complete(vec![Message::user("hi")], 0.7, 64)
            .await
            .unwrap();
        assert_eq!(text, "hello");
    }
}
