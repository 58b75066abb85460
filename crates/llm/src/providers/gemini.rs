use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use tracing::debug;

use crate::provider::{api_error, http_client, LlmError, LlmProvider, Message, Role};
use crate::schema::ResponseSchema;

pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

pub struct GeminiProvider {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiProvider {
    pub fn new(api_key: String, model: String, timeout: Duration) -> Result<Self, LlmError> {
        Ok(Self {
            client: http_client(timeout)?,
            api_key,
            model,
            base_url: GEMINI_BASE_URL.to_string(),
        })
    }

    /// Point at a different endpoint (proxies, tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Build the request body for the Gemini generateContent API.
    fn build_request_body(
        messages: &[Message],
        schema: Option<&ResponseSchema>,
        temperature: f32,
        max_tokens: u32,
    ) -> serde_json::Value {
        // Gemini uses a separate system_instruction field
        let system_msg = messages
            .iter()
            .find(|m| matches!(m.role, Role::System))
            .map(|m| m.content.clone());

        let contents: Vec<serde_json::Value> = messages
            .iter()
            .filter_map(|m| {
                let role = match m.role {
                    Role::User => "user",
                    Role::Assistant => "model",
                    Role::System => return None,
                };
                Some(json!({
                    "role": role,
                    "parts": [{ "text": m.content }],
                }))
            })
            .collect();

        let mut body = json!({
            "contents": contents,
            "generationConfig": {
                "temperature": temperature,
                "maxOutputTokens": max_tokens,
            },
        });

        if let Some(schema) = schema {
            body["generationConfig"]["responseMimeType"] = json!("application/json");
            body["generationConfig"]["responseSchema"] = schema.to_gemini();
        }

        if let Some(system) = system_msg {
            body["system_instruction"] = json!({
                "parts": [{ "text": system }],
            });
        }

        body
    }

    async fn generate(&self, body: serde_json::Value) -> Result<String, LlmError> {
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key,
        );

        debug!("Gemini request to model={}", self.model);

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(LlmError::from_send)?;

        if response.status().as_u16() != 200 {
            return Err(api_error(response).await);
        }

        let resp: serde_json::Value = response.json().await?;
        let content = resp["candidates"][0]["content"]["parts"][0]["text"]
            .as_str()
            .ok_or_else(|| {
                LlmError::ParseError("missing candidates[0].content.parts[0].text".into())
            })?
            .to_string();

        Ok(content)
    }
}

#[async_trait]
impl LlmProvider for GeminiProvider {
    async fn complete(
        &self,
        messages: Vec<Message>,
        temperature: f32,
        max_tokens: u32,
    ) -> Result<String, LlmError> {
        let body = Self::build_request_body(&messages, None, temperature, max_tokens);
        self.generate(body).await
    }

    async fn complete_json(
        &self,
        messages: Vec<Message>,
        schema: &ResponseSchema,
        temperature: f32,
        max_tokens: u32,
    ) -> Result<String, LlmError> {
        let body = Self::build_request_body(&messages, Some(schema), temperature, max_tokens);
        self.generate(body).await
    }

    fn provider_name(&self) -> &str {
        "gemini"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::{Path, Query};
    use axum::routing::post;
    use axum::{Json, Router};
    use std::collections::HashMap;

    #[test]
    fn test_request_body_structure() {
        let messages = vec![
            Message::system("You are an expert HR manager."),
            Message::user("Hello"),
            Message { role: Role::Assistant, content: "Hi there!".into() },
            Message::user("How are you?"),
        ];

        let body = GeminiProvider::build_request_body(&messages, None, 0.7, 4096);

        // System instruction is separate
        assert_eq!(
            body["system_instruction"]["parts"][0]["text"].as_str().unwrap(),
            "You are an expert HR manager.",
        );

        let contents = body["contents"].as_array().unwrap();
        assert_eq!(contents.len(), 3);
        assert_eq!(contents[0]["role"], "user");
        // "model", not "assistant"
        assert_eq!(contents[1]["role"], "model");
        assert_eq!(contents[2]["parts"][0]["text"], "How are you?");

        let temp = body["generationConfig"]["temperature"].as_f64().unwrap();
        assert!((temp - 0.7).abs() < 1e-6, "temperature should be ~0.7, got {temp}");
        assert_eq!(body["generationConfig"]["maxOutputTokens"], 4096);
        assert!(body["generationConfig"].get("responseSchema").is_none());
    }

    #[test]
    fn test_request_body_with_schema() {
        let messages = vec![Message::user("Generate questions")];
        let schema = ResponseSchema::question_list();

        let body = GeminiProvider::build_request_body(&messages, Some(&schema), 0.5, 2048);

        assert!(body.get("system_instruction").is_none());
        assert_eq!(body["generationConfig"]["responseMimeType"], "application/json");
        assert_eq!(body["generationConfig"]["responseSchema"]["type"], "ARRAY");
    }

    #[tokio::test]
    async fn test_generate_against_local_server() {
        async fn handler(
            Path(model): Path<String>,
            Query(q): Query<HashMap<String, String>>,
            Json(body): Json<serde_json::Value>,
        ) -> Json<serde_json::Value> {
            assert_eq!(model, "gemini-2.5-flash:generateContent");
            assert_eq!(q.get("key").map(String::as_str), Some("test-key"));
            assert_eq!(body["generationConfig"]["responseMimeType"], "application/json");
            Json(json!({
                "candidates": [{ "content": { "parts": [{ "text": "[\"q1\"]" }] } }]
            }))
        }

        let app = Router::new().route("/models/{model}", post(handler));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });

        let provider = GeminiProvider::new(
            "test-key".into(),
            "gemini-2.5-flash".into(),
            Duration::from_secs(5),
        )
        .unwrap()
        .with_base_url(format!("http://{addr}"));

        let text = provider
            .complete_json(vec![Message::user("go")], &ResponseSchema::question_list(), 0.7, 64)
            .await
            .unwrap();
        assert_eq!(text, "[\"q1\"]");
    }

    #[tokio::test]
    async fn test_non_200_is_api_error() {
        let app = Router::new().route(
            "/models/{model}",
            post(|| async { (axum::http::StatusCode::TOO_MANY_REQUESTS, "quota") }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });

        let provider = GeminiProvider::new("k".into(), "m".into(), Duration::from_secs(5))
            .unwrap()
            .with_base_url(format!("http://{addr}"));

        match provider.complete(vec![Message::user("go")], 0.7, 64).await {
            Err(LlmError::ApiError { status, body }) => {
                assert_eq!(status, 429);
                assert_eq!(body, "quota");
            }
            other => panic!("expected ApiError, got {other:?}"),
        }
    }
}
