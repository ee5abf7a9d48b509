use thiserror::Error;

use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum ChimeError {
    #[error("Configuration error: {0}")]
    Config(String),

    /// The recurrence rule is malformed (unknown frequency, missing or
    /// non-positive interval). Reported at add time — a bad rule is never
    /// scheduled.
    #[error("Invalid rule: {0}")]
    InvalidRule(String),

    #[error("Invalid time: {0}")]
    InvalidTime(String),

    /// A job's work step failed. Local to one execution — the job is still
    /// rescheduled.
    #[error("Execution failed: {0}")]
    Execution(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

pub type Result<T> = std::result::Result<T, ChimeError>;
