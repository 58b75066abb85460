use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use tracing::debug;

use crate::provider::{api_error, http_client, LlmError, LlmProvider, Message, Role};
use crate::schema::{ResponseSchema, SchemaNode};

pub struct OpenAiProvider {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl OpenAiProvider {
    pub fn new(
        api_key: String,
        model: String,
        base_url: String,
        timeout: Duration,
    ) -> Result<Self, LlmError> {
        Ok(Self {
            client: http_client(timeout)?,
            api_key,
            model,
            base_url,
        })
    }

    fn build_request_body(
        &self,
        messages: &[Message],
        schema: Option<&ResponseSchema>,
        temperature: f32,
        max_tokens: u32,
    ) -> serde_json::Value {
        let api_messages: Vec<serde_json::Value> = messages
            .iter()
            .map(|m| {
                json!({
                    "role": match m.role {
                        Role::System => "system",
                        Role::User => "user",
                        Role::Assistant => "assistant",
                    },
                    "content": m.content,
                })
            })
            .collect();

        let mut body = json!({
            "model": self.model,
            "messages": api_messages,
            "temperature": temperature,
            "max_tokens": max_tokens,
        });

        if let Some(schema) = schema {
            body["response_format"] = json!({
                "type": "json_schema",
                "json_schema": {
                    "name": "response",
                    "strict": true,
                    "schema": schema.to_json_schema(),
                },
            });
        }

        body
    }

    async fn chat(&self, body: serde_json::Value) -> Result<String, LlmError> {
        let url = format!("{}/v1/chat/completions", self.base_url);

        debug!("OpenAI request to {}", url);

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(LlmError::from_send)?;

        if response.status().as_u16() != 200 {
            return Err(api_error(response).await);
        }

        let resp: serde_json::Value = response.json().await?;
        let content = resp["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| LlmError::ParseError("missing choices[0].message.content".into()))?
            .to_string();

        Ok(content)
    }
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    async fn complete(
        &self,
        messages: Vec<Message>,
        temperature: f32,
        max_tokens: u32,
    ) -> Result<String, LlmError> {
        let body = self.build_request_body(&messages, None, temperature, max_tokens);
        self.chat(body).await
    }

    async fn complete_json(
        &self,
        mut messages: Vec<Message>,
        schema: &ResponseSchema,
        temperature: f32,
        max_tokens: u32,
    ) -> Result<String, LlmError> {
        // Structured outputs only accept an object at the root; arrays are
        // described in the prompt instead.
        if !matches!(schema.node, SchemaNode::Object(_)) {
            messages.insert(
                0,
                Message::system(format!(
                    "Respond with a single JSON value and nothing else. It must match this JSON Schema:\n{}",
                    schema.to_json_schema()
                )),
            );
            let body = self.build_request_body(&messages, None, temperature, max_tokens);
            return self.chat(body).await;
        }
        let body = self.build_request_body(&messages, Some(schema), temperature, max_tokens);
        self.chat(body).await
    }

    fn provider_name(&self) -> &str {
        "openai"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> OpenAiProvider {
        OpenAiProvider::new(
            "sk-test".into(),
            "gpt-4o".into(),
            "https://api.openai.com".into(),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[test]
    fn object_schema_uses_response_format() {
        let body = provider().build_request_body(
            &[Message::user("evaluate")],
            Some(&ResponseSchema::coding_feedback()),
            0.7,
            512,
        );
        assert_eq!(body["response_format"]["type"], "json_schema");
        assert_eq!(body["response_format"]["json_schema"]["strict"], true);
        assert_eq!(body["response_format"]["json_schema"]["schema"]["type"], "object");
    }

    #[test]
    fn plain_request_has_no_response_format() {
        let body = provider().build_request_body(&[Message::user("hi")], None, 0.7, 512);
        assert!(body.get("response_format").is_none());
        assert_eq!(body["messages"][0]["role"], "user");
    }
}
