use chrono::{DateTime, Utc};

/// Side-effect sink invoked around each job execution.
///
/// Fire-and-forget from the scheduler's point of view: implementations must
/// swallow their own failures — nothing a sink does may block or fail an
/// execution unit.
pub trait Notifier: Send + Sync {
    /// The named job has started executing.
    fn notify_start(&self, job_name: &str);

    /// The named job finished. `next_run` is `None` for terminal (`Once`)
    /// jobs that will not fire again.
    fn notify_complete(&self, job_name: &str, next_run: Option<DateTime<Utc>>);
}
