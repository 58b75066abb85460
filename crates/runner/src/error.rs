use std::time::Duration;

use thiserror::Error;

/// Failures of the execution backends. None of these are a `RunResult`:
/// a program that ran and failed is a successful execution.
#[derive(Error, Debug)]
pub enum RunnerError {
    #[error("execution backend unreachable: {0}")]
    Unreachable(#[source] reqwest::Error),

    #[error("runner API error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("execution timed out after {0:?}")]
    Timeout(Duration),

    #[error("malformed runner response: {0}")]
    Malformed(String),

    #[error("sandbox unavailable: {0}")]
    SandboxUnavailable(String),

    #[error("sandbox error: {0}")]
    Sandbox(String),
}
