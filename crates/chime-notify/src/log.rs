use chime_core::Notifier;
use chrono::{DateTime, Utc};
use tracing::info;

/// Log-only notification sink.
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify_start(&self, job_name: &str) {
        info!(job = %job_name, "job started");
    }

    fn notify_complete(&self, job_name: &str, next_run: Option<DateTime<Utc>>) {
        match next_run {
            Some(next) => info!(job = %job_name, next_run = %next.to_rfc3339(), "job completed"),
            None => info!(job = %job_name, "job completed (no further runs)"),
        }
    }
}
