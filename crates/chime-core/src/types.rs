use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How a job's trigger time advances after each execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "frequency", rename_all = "snake_case")]
pub enum Rule {
    /// Fire once at an absolute UTC instant, then never again.
    Once { at: DateTime<Utc> },

    /// Fire every hour, anchored to the previous trigger time.
    Hourly,

    /// Fire every day at the same time of day.
    Daily,

    /// Fire every seven days.
    Weekly,

    /// Fire every `seconds` seconds. Must be positive.
    Interval { seconds: i64 },
}

/// One scheduled unit of work.
///
/// Names are unique by convention only — duplicates are legal and scheduled
/// independently. Jobs are appended to the set and never removed, so an index
/// into the set stays valid for the life of the process.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub name: String,
    /// Opaque description of what to run. Execution itself lives behind the
    /// [`crate::WorkHandler`] collaborator.
    pub command: String,
    pub rule: Rule,
    /// The next (or currently due) trigger. Sole field consulted for due-ness.
    pub next_run: DateTime<Utc>,
    /// True while an execution unit is in flight. Transient — never persisted.
    #[serde(skip)]
    pub running: bool,
    /// Terminal flag for `Once` jobs after their single run.
    #[serde(default)]
    pub done: bool,
}

impl Job {
    pub fn new(name: &str, command: &str, rule: Rule, next_run: DateTime<Utc>) -> Self {
        Self {
            name: name.to_string(),
            command: command.to_string(),
            rule,
            next_run,
            running: false,
            done: false,
        }
    }

    /// Whether a scan at `now` should dispatch this job.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        !self.done && !self.running && now >= self.next_run
    }
}
