use acemock_core::events::StageEvent;
use acemock_core::feedback::StageFeedback;
use acemock_llm::EvaluationGateway;
use tracing::{debug, info};

use super::{append_transcript, StageSignal};
use crate::error::StageError;

/// Open-ended questions about the selected technology, answered one at a time.
#[derive(Debug, Clone)]
pub struct TechnicalQAStage {
    selection: String,
    questions: Vec<String>,
    answers: Vec<String>,
    current: usize,
    interim: String,
    speech_error: Option<String>,
}

impl TechnicalQAStage {
    pub fn new(selection: impl Into<String>, questions: Vec<String>) -> Self {
        Self {
            selection: selection.into(),
            answers: vec![String::new(); questions.len()],
            questions,
            current: 0,
            interim: String::new(),
            speech_error: None,
        }
    }

    pub async fn load(gateway: &EvaluationGateway, selection: &str) -> Result<Self, StageError> {
        let questions = gateway.generate_technical_questions(selection).await?;
        info!(selection, count = questions.len(), "Technical questions ready");
        Ok(Self::new(selection, questions))
    }

    pub fn selection(&self) -> &str {
        &self.selection
    }

    pub fn questions(&self) -> &[String] {
        &self.questions
    }

    pub fn answers(&self) -> &[String] {
        &self.answers
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current_question(&self) -> Option<&str> {
        self.questions.get(self.current).map(String::as_str)
    }

    pub fn current_answer(&self) -> &str {
        self.answers.get(self.current).map_or("", String::as_str)
    }

    pub fn set_answer(&mut self, text: impl Into<String>) {
        if let Some(slot) = self.answers.get_mut(self.current) {
            *slot = text.into();
        }
    }

    /// The current answer followed by any unconfirmed speech.
    pub fn preview(&self) -> String {
        let answer = self.current_answer();
        match (answer.is_empty(), self.interim.is_empty()) {
            (_, true) => answer.to_string(),
            (true, false) => self.interim.clone(),
            (false, false) => format!("{answer} {}", self.interim),
        }
    }

    pub fn speech_error(&self) -> Option<&str> {
        self.speech_error.as_deref()
    }

    pub fn is_last(&self) -> bool {
        self.current + 1 >= self.questions.len()
    }

    pub fn on_event(&mut self, event: StageEvent) -> StageSignal {
        match event {
            StageEvent::SpeechFinalResult(text) => {
                if let Some(slot) = self.answers.get_mut(self.current) {
                    append_transcript(slot, &text);
                }
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

    /// Move to the next question. The current one must have an answer.
    pub fn next(&mut self) -> Result<StageSignal, StageError> {
        if self.current_answer().trim().is_empty() {
            return Err(StageError::EmptySubmission);
        }
        self.interim.clear();
        if self.is_last() {
            Ok(StageSignal::Submit)
        } else {
            self.current += 1;
            Ok(StageSignal::Continue)
        }
    }

    pub async fn submit(&self, gateway: &EvaluationGateway) -> Result<StageFeedback, StageError> {
        if self.answers.iter().all(|a| a.trim().is_empty()) {
            return Err(StageError::EmptySubmission);
        }
        let answers: Vec<String> = self.answers.iter().map(|a| a.trim().to_string()).collect();
        debug!(selection = %self.selection, questions = self.questions.len(), "Submitting technical answers");
        let feedback = gateway
            .evaluate_technical_answers(&self.questions, &answers, &self.selection)
            .await?;
        Ok(StageFeedback::TechnicalQA(feedback))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stage() -> TechnicalQAStage {
        TechnicalQAStage::new("Rust", vec!["What is ownership?".into(), "What is a trait?".into()])
    }

    #[test]
    fn speech_fills_the_current_answer() {
        let mut s = stage();
        s.on_event(StageEvent::SpeechInterimResult("each value".into()));
        assert_eq!(s.preview(), "each value");
        s.on_event(StageEvent::SpeechFinalResult("Each value has one owner.".into()));
        s.on_event(StageEvent::SpeechInterimResult("when".into()));
        assert_eq!(s.preview(), "Each value has one owner. when");
        assert_eq!(s.current_answer(), "Each value has one owner.");
    }

    #[test]
    fn next_requires_an_answer() {
        let mut s = stage();
        assert!(matches!(s.next(), Err(StageError::EmptySubmission)));
        s.set_answer("Single owner, moves transfer it.");
        assert_eq!(s.next().unwrap(), StageSignal::Continue);
        assert_eq!(s.current_question(), Some("What is a trait?"));
        s.set_answer("Shared behaviour.");
        assert_eq!(s.next().unwrap(), StageSignal::Submit);
        assert_eq!(s.answers()[0], "Single owner, moves transfer it.");
    }
}
