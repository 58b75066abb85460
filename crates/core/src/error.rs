use thiserror::Error;

use crate::stage::Stage;

/// A stage result arrived that the state machine has no transition for.
///
/// These indicate a wiring bug in the caller, not a user or network
/// failure; they are never retried and never fall back to `Welcome`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransitionError {
    #[error("no transition out of the {from:?} stage")]
    NoTransition { from: Stage },

    #[error("{got} result is not valid in the {stage:?} stage")]
    UnexpectedResult { stage: Stage, got: &'static str },

    #[error("selection must not be empty")]
    EmptySelection,
}
