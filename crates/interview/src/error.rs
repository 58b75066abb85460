use acemock_core::error::TransitionError;
use acemock_llm::EvaluationError;
use thiserror::Error;

/// Why a stage could not complete. The stage keeps its inputs in every
/// case, so the caller can fix the input or simply retry.
#[derive(Error, Debug)]
pub enum StageError {
    #[error("there is nothing to submit yet")]
    EmptySubmission,

    #[error("option {index} does not exist for this question")]
    InvalidOption { index: usize },

    #[error(transparent)]
    Evaluation(#[from] EvaluationError),

    #[error(transparent)]
    Transition(#[from] TransitionError),
}

impl StageError {
    /// Remote failures are worth retrying unchanged; the rest need new input.
    pub fn is_retryable(&self) -> bool {
        matches!(self, StageError::Evaluation(_))
    }
}
