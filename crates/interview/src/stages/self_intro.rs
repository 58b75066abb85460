use acemock_core::events::StageEvent;
use acemock_core::feedback::StageFeedback;
use acemock_llm::EvaluationGateway;
use tracing::debug;

use super::{append_transcript, StageSignal};
use crate::error::StageError;

#[derive(Debug, Clone, Default)]
pub struct SelfIntroductionStage {
    introduction: String,
    interim: String,
    speech_error: Option<String>,
}

impl SelfIntroductionStage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn introduction(&self) -> &str {
        &self.introduction
    }

    pub fn set_introduction(&mut self, text: impl Into<String>) {
        self.introduction = text.into();
    }

    /// Unconfirmed speech, shown after the typed text.
    pub fn interim(&self) -> &str {
        &self.interim
    }

    pub fn speech_error(&self) -> Option<&str> {
        self.speech_error.as_deref()
    }

    pub fn on_event(&mut self, event: StageEvent) -> StageSignal {
        match event {
            StageEvent::SpeechFinalResult(text) => {
                append_transcript(&mut self.introduction, &text);
                self.interim.clear();
            }
            StageEvent::SpeechInterimResult(text) => self.interim = text,
            StageEvent::SpeechError(e) => {
                self.speech_error = Some(format!("Speech recognition error: {e}"));
            }
            StageEvent::TimerTick => {}
        }
        StageSignal::Continue
    }

    pub async fn submit(&self, gateway: &EvaluationGateway) -> Result<StageFeedback, StageError> {
        let text = self.introduction.trim();
        if text.is_empty() {
            return Err(StageError::EmptySubmission);
        }
        debug!(chars = text.len(), "Submitting self-introduction");
        let feedback = gateway.analyze_self_introduction(text).await?;
        Ok(StageFeedback::SelfIntroduction(feedback))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use acemock_llm::provider::mock::MockLlmProvider;
    use std::sync::Arc;

    #[tokio::test]
    async fn blank_introduction_makes_no_call() {
        let mock = Arc::new(MockLlmProvider::new());
        let gateway = EvaluationGateway::new(mock.clone(), 0.7, 1024);
        let mut stage = SelfIntroductionStage::new();
        stage.set_introduction("   \n");

        let err = stage.submit(&gateway).await.unwrap_err();
        assert!(matches!(err, StageError::EmptySubmission));
        assert_eq!(mock.calls(), 0);
    }

    #[test]
    fn speech_appends_to_typed_text() {
        let mut stage = SelfIntroductionStage::new();
        stage.set_introduction("Hi, I'm Sam.");
        stage.on_event(StageEvent::SpeechInterimResult("I stud".into()));
        assert_eq!(stage.interim(), "I stud");
        stage.on_event(StageEvent::SpeechFinalResult("I studied physics.".into()));
        assert_eq!(stage.introduction(), "Hi, I'm Sam. I studied physics.");
        assert_eq!(stage.interim(), "");

        stage.on_event(StageEvent::SpeechError("no-speech".into()));
        assert_eq!(stage.speech_error(), Some("Speech recognition error: no-speech"));
        assert_eq!(stage.introduction(), "Hi, I'm Sam. I studied physics.");
    }
}
