use acemock_core::feedback::StageFeedback;
use acemock_core::question::CodingChallenge;
use acemock_llm::EvaluationGateway;
use acemock_runner::{strip_code_fences, CodeRunner};
use tracing::{debug, info, warn};

use crate::error::StageError;

#[derive(Debug, Clone)]
pub struct CodingStage {
    selection: String,
    challenge: CodingChallenge,
    code: String,
    output: String,
}

impl CodingStage {
    pub fn new(selection: impl Into<String>, challenge: CodingChallenge) -> Self {
        Self {
            selection: selection.into(),
            code: challenge.default_code.clone(),
            challenge,
            output: String::new(),
        }
    }

    pub async fn load(gateway: &EvaluationGateway, selection: &str) -> Result<Self, StageError> {
        let challenge = gateway.generate_coding_challenge(selection).await?;
        info!(selection, title = %challenge.title, "Coding challenge ready");
        Ok(Self::new(selection, challenge))
    }

    pub fn selection(&self) -> &str {
        &self.selection
    }

    pub fn challenge(&self) -> &CodingChallenge {
        &self.challenge
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn set_code(&mut self, code: impl Into<String>) {
        self.code = code.into();
    }

    /// Text of the output panel from the last run.
    pub fn output(&self) -> &str {
        &self.output
    }

    /// Execute the current code. Failures end up in the output panel.
    pub async fn run(&mut self, runner: &CodeRunner, stdin: &str) -> &str {
        self.output = match runner.run(&self.selection, &self.code, stdin).await {
            Ok(outcome) => {
                let text = outcome.output_text();
                if text.trim().is_empty() {
                    "(no output)".to_string()
                } else {
                    text
                }
            }
            Err(e) => {
                warn!(selection = %self.selection, error = %e, "Code run failed");
                format!("Error: {e}")
            }
        };
        &self.output
    }

    pub async fn submit(&self, gateway: &EvaluationGateway) -> Result<StageFeedback, StageError> {
        if strip_code_fences(&self.code).is_empty() {
            return Err(StageError::EmptySubmission);
        }
        debug!(selection = %self.selection, "Submitting code");
        let feedback = gateway
            .evaluate_code(&self.challenge.description, &self.selection, &self.code)
            .await?;
        Ok(StageFeedback::Coding(feedback))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use acemock_llm::provider::mock::MockLlmProvider;
    use acemock_runner::{Catalog, CatalogSource, PistonClient, RuntimeCatalog};
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::time::Duration;

    fn challenge() -> CodingChallenge {
        CodingChallenge {
            title: "Sum".into(),
            description: "Add two numbers.".into(),
            default_code: "```python\ndef solve(a, b):\n    pass\n```".into(),
        }
    }

    #[tokio::test]
    async fn empty_fence_is_an_empty_submission() {
        let mock = Arc::new(MockLlmProvider::new());
        let gateway = EvaluationGateway::new(mock.clone(), 0.7, 1024);
        let mut stage = CodingStage::new("Python", challenge());
        stage.set_code("```python\n\n```");

        assert!(matches!(stage.submit(&gateway).await, Err(StageError::EmptySubmission)));
        assert_eq!(mock.calls(), 0);
    }

    #[tokio::test]
    async fn run_errors_land_in_the_output_panel() {
        let piston = PistonClient::new("http://127.0.0.1:9", Duration::from_secs(1)).unwrap();
        let mut versions = HashMap::new();
        versions.insert("python".to_string(), vec!["3.10.0".to_string()]);
        let catalog = RuntimeCatalog::with_catalog(Catalog {
            source: CatalogSource::Fallback,
            versions,
        });
        let runner = CodeRunner::new(piston, catalog, None);
        let mut stage = CodingStage::new("Python", challenge());

        let output = stage.run(&runner, "").await.to_string();
        assert!(output.starts_with("Error: "), "{output}");
        assert_eq!(stage.code(), challenge().default_code);
    }
}
