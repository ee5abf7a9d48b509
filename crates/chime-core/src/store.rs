use thiserror::Error;

use crate::types::Job;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Database(String),
}

/// Persistence boundary for the job set.
///
/// `load` is called once when the engine is constructed (a failure there is
/// fatal — there is no initial state to schedule from). `save` receives the
/// whole set after every add and after every reschedule; a mid-run save
/// failure is reported but does not roll back the in-memory set, which stays
/// the source of truth for the next scan.
pub trait JobStore: Send + Sync {
    fn load(&self) -> std::result::Result<Vec<Job>, StoreError>;
    fn save(&self, jobs: &[Job]) -> std::result::Result<(), StoreError>;
}
