use acemock_core::config::InterviewConfig;
use acemock_core::events::{Countdown, CountdownState, StageEvent};
use acemock_core::feedback::{HRFeedback, StageFeedback};
use acemock_core::question::HRQuestion;
use acemock_llm::EvaluationGateway;
use tracing::{debug, info, warn};

use super::{append_transcript, StageSignal};
use crate::error::StageError;

/// Behavioural questions with a fresh countdown per question.
#[derive(Debug, Clone)]
pub struct HRStage {
    questions: Vec<HRQuestion>,
    /// Aligned with `questions`; a skipped or timed-out question stays empty.
    responses: Vec<String>,
    current: usize,
    draft: String,
    interim: String,
    countdown: Countdown,
    secs_per_question: u32,
    timed: bool,
}

impl HRStage {
    pub fn new(questions: Vec<HRQuestion>, secs_per_question: u32) -> Self {
        Self {
            responses: vec![String::new(); questions.len()],
            questions,
            current: 0,
            draft: String::new(),
            interim: String::new(),
            countdown: Countdown::new(secs_per_question),
            secs_per_question,
            timed: true,
        }
    }

    pub async fn load(
        gateway: &EvaluationGateway,
        config: &InterviewConfig,
    ) -> Result<Self, StageError> {
        let questions = gateway.generate_hr_questions().await?;
        info!(count = questions.len(), "HR questions ready");
        Ok(Self::new(questions, config.hr_secs_per_question))
    }

    pub fn untimed(mut self) -> Self {
        self.timed = false;
        self
    }

    pub fn questions(&self) -> &[HRQuestion] {
        &self.questions
    }

    pub fn responses(&self) -> &[String] {
        &self.responses
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current_question(&self) -> Option<&HRQuestion> {
        self.questions.get(self.current)
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn set_draft(&mut self, text: impl Into<String>) {
        self.draft = text.into();
    }

    pub fn clear_draft(&mut self) {
        self.draft.clear();
        self.interim.clear();
    }

    pub fn interim(&self) -> &str {
        &self.interim
    }

    pub fn countdown(&self) -> &Countdown {
        &self.countdown
    }

    pub fn is_last(&self) -> bool {
        self.current + 1 >= self.questions.len()
    }

    /// Record the draft for the current question and move on, or ask for
    /// submission after the last one.
    pub fn next(&mut self) -> StageSignal {
        if let Some(slot) = self.responses.get_mut(self.current) {
            *slot = self.draft.trim().to_string();
        }
        self.draft.clear();
        self.interim.clear();
        if self.is_last() {
            StageSignal::Submit
        } else {
            self.current += 1;
            self.countdown.reset(self.secs_per_question);
            StageSignal::Continue
        }
    }

    pub fn on_event(&mut self, event: StageEvent) -> StageSignal {
        match event {
            StageEvent::TimerTick if self.timed => match self.countdown.tick() {
                CountdownState::Expired => {
                    debug!(question = self.current, "HR question time expired");
                    self.next()
                }
                CountdownState::Running | CountdownState::Stopped => StageSignal::Continue,
            },
            StageEvent::TimerTick => StageSignal::Continue,
            StageEvent::SpeechFinalResult(text) => {
                append_transcript(&mut self.draft, &text);
                self.interim.clear();
                StageSignal::Continue
            }
            StageEvent::SpeechInterimResult(text) => {
                self.interim = text;
                StageSignal::Continue
            }
            StageEvent::SpeechError(e) => {
                warn!(error = %e, "Speech recognition error");
                StageSignal::Continue
            }
        }
    }

    /// Always completes: a failed evaluation is replaced by neutral feedback.
    pub async fn submit(&self, gateway: &EvaluationGateway) -> StageFeedback {
        let feedback = match gateway.evaluate_hr_responses(&self.questions, &self.responses).await {
            Ok(feedback) => feedback,
            Err(e) => {
                warn!(error = %e, "HR evaluation failed, using fallback feedback");
                HRFeedback::fallback(&self.questions, &self.responses)
            }
        };
        StageFeedback::HrRound(feedback)
    }
}
