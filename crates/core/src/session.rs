//! The interview state machine.
//!
//! [`InterviewSession`] is the only owner of the current stage, the
//! selection string and the results aggregate. Every mutation goes through
//! [`InterviewSession::advance`] or [`InterviewSession::reset`].

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::error::TransitionError;
use crate::feedback::StageFeedback;
use crate::results::ResultsAggregate;
use crate::stage::Stage;

/// What a completed stage hands back to the state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageResult {
    /// Leaves `Welcome`.
    Start,
    /// Leaves `LanguageSelection` with the chosen technology.
    Selection(String),
    /// Leaves an evaluated stage.
    Feedback(StageFeedback),
}

impl StageResult {
    fn kind(&self) -> &'static str {
        match self {
            StageResult::Start => "start",
            StageResult::Selection(_) => "selection",
            StageResult::Feedback(fb) => match fb {
                StageFeedback::SelfIntroduction(_) => "self-introduction feedback",
                StageFeedback::Aptitude(_) => "aptitude feedback",
                StageFeedback::TechnicalQA(_) => "technical Q&A feedback",
                StageFeedback::Coding(_) => "coding feedback",
                StageFeedback::HrRound(_) => "HR feedback",
            },
        }
    }
}

/// Serializable for reporting only; a session is never rebuilt from data.
#[derive(Debug, Clone, Serialize)]
pub struct InterviewSession {
    id: Uuid,
    started_at: DateTime<Utc>,
    stage: Stage,
    selection: String,
    results: ResultsAggregate,
}

impl Default for InterviewSession {
    fn default() -> Self {
        Self::new()
    }
}

impl InterviewSession {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            started_at: Utc::now(),
            stage: Stage::Welcome,
            selection: String::new(),
            results: ResultsAggregate::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn selection(&self) -> &str {
        &self.selection
    }

    pub fn results(&self) -> &ResultsAggregate {
        &self.results
    }

    pub fn is_finished(&self) -> bool {
        self.stage == Stage::Feedback
    }

    /// Record `result` for the current stage and move to exactly the next one.
    pub fn advance(&mut self, result: StageResult) -> Result<Stage, TransitionError> {
        let next = self
            .stage
            .next()
            .ok_or(TransitionError::NoTransition { from: self.stage })?;

        match (self.stage, result) {
            (Stage::Welcome, StageResult::Start) => {}
            (Stage::LanguageSelection, StageResult::Selection(selection)) => {
                if selection.trim().is_empty() {
                    return Err(TransitionError::EmptySelection);
                }
                self.selection = selection;
            }
            (stage, StageResult::Feedback(feedback))
                if stage.feedback_slot() == Some(feedback.key()) =>
            {
                tracing::debug!(
                    session = %self.id,
                    stage = %stage,
                    score = feedback.score(),
                    "Stage feedback recorded"
                );
                let results = std::mem::take(&mut self.results);
                self.results = results.merge(feedback);
            }
            (stage, other) => {
                return Err(TransitionError::UnexpectedResult {
                    stage,
                    got: other.kind(),
                });
            }
        }

        tracing::info!(session = %self.id, from = %self.stage, to = %next, "Stage advanced");
        self.stage = next;
        Ok(next)
    }

    /// Return to `Welcome` from any stage, clearing the selection and results.
    pub fn reset(&mut self) {
        tracing::info!(session = %self.id, from = %self.stage, "Session reset");
        *self = Self::new();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feedback::{CodingFeedback, Feedback};
    use crate::stage::StageKey;

    fn base(score: u8) -> Feedback {
        Feedback {
            strengths: vec![],
            weaknesses: vec![],
            suggestions: vec![],
            score,
        }
    }

    fn to_coding(session: &mut InterviewSession) {
        session.advance(StageResult::Start).unwrap();
        session.advance(StageResult::Selection("Python".into())).unwrap();
        session
            .advance(StageResult::Feedback(StageFeedback::SelfIntroduction(base(7))))
            .unwrap();
        // Aptitude and technical slots are exercised in the interview crate.
        session.stage = Stage::Coding;
    }

    #[test]
    fn starts_at_welcome_and_advances_one_step() {
        let mut session = InterviewSession::new();
        assert_eq!(session.stage(), Stage::Welcome);
        assert_eq!(session.advance(StageResult::Start), Ok(Stage::LanguageSelection));
        assert_eq!(
            session.advance(StageResult::Selection("Rust".into())),
            Ok(Stage::SelfIntroduction)
        );
        assert_eq!(session.selection(), "Rust");
    }

    #[test]
    fn feedback_merges_into_matching_slot() {
        let mut session = InterviewSession::new();
        to_coding(&mut session);
        let next = session
            .advance(StageResult::Feedback(StageFeedback::Coding(CodingFeedback {
                base: base(9),
                logic: String::new(),
                syntax: String::new(),
                efficiency: String::new(),
            })))
            .unwrap();
        assert_eq!(next, Stage::HR);
        assert!(session.results().contains(StageKey::Coding));
        assert!(session.results().contains(StageKey::SelfIntroduction));
        assert!((session.results().overall_score() - 8.0).abs() < f64::EPSILON);
    }

    #[test]
    fn mismatched_result_is_rejected_without_moving() {
        let mut session = InterviewSession::new();
        session.advance(StageResult::Start).unwrap();
        let err = session
            .advance(StageResult::Feedback(StageFeedback::SelfIntroduction(base(5))))
            .unwrap_err();
        assert!(matches!(
            err,
            TransitionError::UnexpectedResult { stage: Stage::LanguageSelection, .. }
        ));
        assert_eq!(session.stage(), Stage::LanguageSelection);
        assert!(session.results().is_empty());
    }

    #[test]
    fn empty_selection_is_rejected() {
        let mut session = InterviewSession::new();
        session.advance(StageResult::Start).unwrap();
        assert_eq!(
            session.advance(StageResult::Selection("  ".into())),
            Err(TransitionError::EmptySelection)
        );
    }

    #[test]
    fn serialized_session_reflects_advanced_state() {
        let mut session = InterviewSession::new();
        to_coding(&mut session);
        let value = serde_json::to_value(&session).unwrap();
        assert_eq!(value["stage"], "coding");
        assert_eq!(value["selection"], "Python");
        assert_eq!(value["id"], session.id().to_string());
    }

    #[test]
    fn feedback_stage_is_terminal() {
        let mut session = InterviewSession::new();
        session.stage = Stage::Feedback;
        assert_eq!(
            session.advance(StageResult::Start),
            Err(TransitionError::NoTransition { from: Stage::Feedback })
        );
    }

    #[test]
    fn reset_clears_everything_from_any_stage() {
        let mut session = InterviewSession::new();
        let old_id = session.id();
        to_coding(&mut session);
        session.reset();
        assert_eq!(session.stage(), Stage::Welcome);
        assert_eq!(session.selection(), "");
        assert!(session.results().is_empty());
        assert_ne!(session.id(), old_id);
    }
}
