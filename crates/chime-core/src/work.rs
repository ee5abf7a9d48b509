use async_trait::async_trait;

use crate::error::Result;

/// The work step of one execution unit.
///
/// Real command execution is an external collaborator; the scheduler ships
/// with a simulated stand-in that sleeps for a fixed duration. An error here
/// is local to the one run — the job is still rescheduled and its `running`
/// flag still cleared.
#[async_trait]
pub trait WorkHandler: Send + Sync {
    async fn run(&self, job_name: &str, command: &str) -> Result<()>;
}
