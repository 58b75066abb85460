use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::schema::ResponseSchema;

/// A chat message for the LLM.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: Role::System, content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// Trait for LLM providers — each backend implements this.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Send a chat completion request and return the assistant's response text.
    async fn complete(
        &self,
        messages: Vec<Message>,
        temperature: f32,
        max_tokens: u32,
    ) -> Result<String, LlmError>;

    /// Ask for a JSON document shaped like `schema`.
    ///
    /// Backends with native structured output override this. The default
    /// appends the schema to the system instruction and relies on the
    /// caller's JSON extraction.
    async fn complete_json(
        &self,
        mut messages: Vec<Message>,
        schema: &ResponseSchema,
        temperature: f32,
        max_tokens: u32,
    ) -> Result<String, LlmError> {
        let instruction = format!(
            "Respond with a single JSON value and nothing else. It must match this JSON Schema:\n{}",
            schema.to_json_schema()
        );
        match messages.iter_mut().find(|m| matches!(m.role, Role::System)) {
            Some(system) => {
                system.content.push_str("\n\n");
                system.content.push_str(&instruction);
            }
            None => messages.insert(0, Message::system(instruction)),
        }
        self.complete(messages, temperature, max_tokens).await
    }

    fn provider_name(&self) -> &str;
}

#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("API error: {status}: {body}")]
    ApiError { status: u16, body: String },
    #[error("failed to parse response: {0}")]
    ParseError(String),
    #[error("provider not configured: {0}")]
    NotConfigured(String),
    #[error("request timed out")]
    Timeout,
}

impl LlmError {
    /// Classify a transport failure, keeping timeouts distinct.
    pub(crate) fn from_send(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            LlmError::Timeout
        } else {
            LlmError::HttpError(err)
        }
    }
}

/// Build the HTTP client every provider shares the shape of.
pub(crate) fn http_client(timeout: std::time::Duration) -> Result<reqwest::Client, LlmError> {
    Ok(reqwest::Client::builder().timeout(timeout).build()?)
}

/// Read a non-200 response into an `ApiError`.
pub(crate) async fn api_error(response: reqwest::Response) -> LlmError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    LlmError::ApiError { status, body }
}

/// Mock LLM provider for exercising the gateway and stages without real API calls.
#[cfg(any(test, feature = "test-utils"))]
pub mod mock {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Returns queued responses in order and records every prompt it sees.
    pub struct MockLlmProvider {
        responses: Mutex<VecDeque<Result<String, LlmError>>>,
        prompts: Mutex<Vec<Vec<Message>>>,
    }

    impl Default for MockLlmProvider {
        fn default() -> Self {
            Self::new()
        }
    }

    impl MockLlmProvider {
        pub fn new() -> Self {
            Self {
                responses: Mutex::new(VecDeque::new()),
                prompts: Mutex::new(Vec::new()),
            }
        }

        /// Queue a raw text response.
        pub fn queue_text(&self, text: &str) {
            self.responses.lock().unwrap().push_back(Ok(text.to_string()));
        }

        /// Queue a JSON response.
        pub fn queue_json(&self, value: serde_json::Value) {
            self.queue_text(&value.to_string());
        }

        /// Queue a failure for the next call.
        pub fn queue_error(&self, err: LlmError) {
            self.responses.lock().unwrap().push_back(Err(err));
        }

        /// Prompts received so far, one entry per call.
        pub fn prompts(&self) -> Vec<Vec<Message>> {
            self.prompts.lock().unwrap().clone()
        }

        pub fn calls(&self) -> usize {
            self.prompts.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl LlmProvider for MockLlmProvider {
        async fn complete(
            &self,
            messages: Vec<Message>,
            _temperature: f32,
            _max_tokens: u32,
        ) -> Result<String, LlmError> {
            self.prompts.lock().unwrap().push(messages);
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(LlmError::NotConfigured("mock response queue is empty".into())))
        }

        fn provider_name(&self) -> &str {
            "mock"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct Recording {
        seen: Mutex<Vec<Message>>,
    }

    #[async_trait]
    impl LlmProvider for Recording {
        async fn complete(
            &self,
            messages: Vec<Message>,
            _temperature: f32,
            _max_tokens: u32,
        ) -> Result<String, LlmError> {
            *self.seen.lock().unwrap() = messages;
            Ok("{}".into())
        }

        fn provider_name(&self) -> &str {
            "recording"
        }
    }

    #[tokio::test]
    async fn default_complete_json_extends_system_message() {
        let p = Recording { seen: Mutex::new(vec![]) };
        p.complete_json(
            vec![Message::system("You are an HR manager."), Message::user("Go")],
            &ResponseSchema::feedback(),
            0.7,
            100,
        )
        .await
        .unwrap();

        let seen = p.seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert!(seen[0].content.starts_with("You are an HR manager."));
        assert!(seen[0].content.contains("\"strengths\""));
    }

    #[tokio::test]
    async fn default_complete_json_inserts_system_message() {
        let p = Recording { seen: Mutex::new(vec![]) };
        p.complete_json(vec![Message::user("Go")], &ResponseSchema::question_list(), 0.7, 100)
            .await
            .unwrap();

        let seen = p.seen.lock().unwrap();
        assert!(matches!(seen[0].role, Role::System));
        assert!(matches!(seen[1].role, Role::User));
    }
}
