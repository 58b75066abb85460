use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use tracing::debug;

use crate::provider::{api_error, http_client, LlmError, LlmProvider, Message, Role};
use crate::schema::ResponseSchema;

pub struct OllamaProvider {
    client: reqwest::Client,
    url: String,
    model: String,
}

impl OllamaProvider {
    pub fn new(url: String, model: String, timeout: Duration) -> Result<Self, LlmError> {
        Ok(Self {
            client: http_client(timeout)?,
            url,
            model,
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
            "stream": false,
            "options": {
                "temperature": temperature,
                "num_predict": max_tokens,
            },
        });

        if let Some(schema) = schema {
            body["format"] = schema.to_json_schema();
        }

        body
    }

    async fn chat(&self, body: serde_json::Value) -> Result<String, LlmError> {
        let url = format!("{}/api/chat", self.url.trim_end_matches('/'));

        debug!("Ollama request to {}", url);

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
        let content = resp["message"]["content"]
            .as_str()
            .ok_or_else(|| LlmError::ParseError("missing message.content".into()))?
            .to_string();

        Ok(content)
    }
}

#[async_trait]
impl LlmProvider for OllamaProvider {
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
        messages: Vec<Message>,
        schema: &ResponseSchema,
        temperature: f32,
        max_tokens: u32,
    ) -> Result<String, LlmError> {
        let body = self.build_request_body(&messages, Some(schema), temperature, max_tokens);
        self.chat(body).await
    }

    fn provider_name(&self) -> &str {
        "ollama"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_goes_into_format() {
        let p = OllamaProvider::new(
            "http://localhost:11434".into(),
            "llama3.2".into(),
            Duration::from_secs(5),
        )
        .unwrap();
        let body = p.build_request_body(
            &[Message::user("q")],
            Some(&ResponseSchema::hr_questions()),
            0.7,
            512,
        );
        assert_eq!(body["format"]["type"], "array");
        assert_eq!(body["options"]["num_predict"], 512);
        assert_eq!(body["stream"], false);
    }
}
