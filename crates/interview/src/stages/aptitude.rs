use acemock_core::config::InterviewConfig;
use acemock_core::events::{Countdown, CountdownState, StageEvent};
use acemock_core::feedback::StageFeedback;
use acemock_core::question::AptitudeQuestion;
use acemock_llm::EvaluationGateway;
use tracing::{debug, info};

use super::StageSignal;
use crate::error::StageError;

/// A timed multiple-choice test. One countdown covers the whole test.
#[derive(Debug, Clone)]
pub struct AptitudeStage {
    questions: Vec<AptitudeQuestion>,
    /// Aligned with `questions`; empty means unanswered.
    answers: Vec<String>,
    current: usize,
    countdown: Countdown,
    timed: bool,
}

impl AptitudeStage {
    pub fn new(questions: Vec<AptitudeQuestion>, secs_per_question: u32) -> Self {
        let total = secs_per_question.saturating_mul(questions.len() as u32);
        Self {
            answers: vec![String::new(); questions.len()],
            questions,
            current: 0,
            countdown: Countdown::new(total),
            timed: true,
        }
    }

    pub async fn load(
        gateway: &EvaluationGateway,
        config: &InterviewConfig,
    ) -> Result<Self, StageError> {
        let questions = gateway
            .generate_aptitude_questions(config.aptitude_questions)
            .await?;
        info!(count = questions.len(), "Aptitude questions ready");
        Ok(Self::new(questions, config.aptitude_secs_per_question))
    }

    /// Ignore timer ticks.
    pub fn untimed(mut self) -> Self {
        self.timed = false;
        self
    }

    pub fn questions(&self) -> &[AptitudeQuestion] {
        &self.questions
    }

    pub fn answers(&self) -> &[String] {
        &self.answers
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current_question(&self) -> Option<&AptitudeQuestion> {
        self.questions.get(self.current)
    }

    pub fn current_answer(&self) -> Option<&str> {
        self.answers
            .get(self.current)
            .map(String::as_str)
            .filter(|a| !a.is_empty())
    }

    pub fn answered(&self) -> usize {
        self.answers.iter().filter(|a| !a.is_empty()).count()
    }

    pub fn countdown(&self) -> &Countdown {
        &self.countdown
    }

    pub fn is_last(&self) -> bool {
        self.current + 1 >= self.questions.len()
    }

    /// Choose option `index` (zero-based) for the current question.
    pub fn select(&mut self, index: usize) -> Result<(), StageError> {
        let option = self
            .questions
            .get(self.current)
            .and_then(|q| q.options.get(index))
            .ok_or(StageError::InvalidOption { index })?;
        self.answers[self.current] = option.clone();
        Ok(())
    }

    /// Move forward; on the last question this asks for submission.
    pub fn next(&mut self) -> StageSignal {
        if self.is_last() {
            StageSignal::Submit
        } else {
            self.current += 1;
            StageSignal::Continue
        }
    }

    pub fn previous(&mut self) {
        self.current = self.current.saturating_sub(1);
    }

    pub fn on_event(&mut self, event: StageEvent) -> StageSignal {
        match event {
            StageEvent::TimerTick if self.timed => match self.countdown.tick() {
                CountdownState::Expired => {
                    info!(answered = self.answered(), "Aptitude time expired");
                    StageSignal::Submit
                }
                CountdownState::Running | CountdownState::Stopped => StageSignal::Continue,
            },
            _ => StageSignal::Continue,
        }
    }

    pub async fn submit(&self, gateway: &EvaluationGateway) -> Result<StageFeedback, StageError> {
        debug!(answered = self.answered(), total = self.questions.len(), "Submitting aptitude test");
        let feedback = gateway.evaluate_aptitude(&self.questions, &self.answers).await?;
        Ok(StageFeedback::Aptitude(feedback))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn questions(n: usize) -> Vec<AptitudeQuestion> {
        (0..n)
            .map(|i| AptitudeQuestion {
                question: format!("Q{i}"),
                options: vec!["a".into(), "b".into(), "c".into(), "d".into()],
                answer: "a".into(),
            })
            .collect()
    }

    #[test]
    fn whole_test_countdown() {
        let stage = AptitudeStage::new(questions(5), 90);
        assert_eq!(stage.countdown().remaining_secs(), 450);
        assert_eq!(stage.countdown().format(), "7:30");
    }

    #[test]
    fn navigation_and_selection() {
        let mut stage = AptitudeStage::new(questions(2), 90);
        stage.select(1).unwrap();
        assert_eq!(stage.current_answer(), Some("b"));
        assert!(matches!(stage.select(4), Err(StageError::InvalidOption { index: 4 })));

        assert_eq!(stage.next(), StageSignal::Continue);
        assert_eq!(stage.current_answer(), None);
        assert_eq!(stage.next(), StageSignal::Submit);
        assert_eq!(stage.current_index(), 1);

        stage.previous();
        stage.previous();
        assert_eq!(stage.current_index(), 0);
        assert_eq!(stage.answered(), 1);
    }

    #[test]
    fn expiry_signals_submit_once() {
        let mut stage = AptitudeStage::new(questions(1), 2);
        assert_eq!(stage.on_event(StageEvent::TimerTick), StageSignal::Continue);
        assert_eq!(stage.on_event(StageEvent::TimerTick), StageSignal::Submit);
        assert_eq!(stage.on_event(StageEvent::TimerTick), StageSignal::Continue);
    }

    #[test]
    fn untimed_ignores_ticks() {
        let mut stage = AptitudeStage::new(questions(1), 1).untimed();
        assert_eq!(stage.on_event(StageEvent::TimerTick), StageSignal::Continue);
        assert_eq!(stage.countdown().remaining_secs(), 1);
    }
}
