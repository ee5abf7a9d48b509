use chime_core::Rule;
use chrono::{DateTime, Duration, Utc};

/// Compute the trigger time that follows `last` for `rule`.
///
/// `last` is the timestamp the job was considered due at, not wall-clock now —
/// advancing from the previous trigger keeps periodic schedules drift-free no
/// matter how long the execution itself took.
///
/// `Once` never advances: it returns its configured instant unchanged, and the
/// runner retires the job via its `done` flag instead.
///
/// Pure — no clock reads, no I/O. Interval bounds (positive, capped at
/// [`chime_core::rule::MAX_INTERVAL_SECS`]) are validated when the job is
/// added, so every arm here is total.
pub fn next_trigger(rule: &Rule, last: DateTime<Utc>) -> DateTime<Utc> {
    match rule {
        Rule::Once { at } => *at,
        Rule::Hourly => last + Duration::hours(1),
        Rule::Daily => last + Duration::days(1),
        Rule::Weekly => last + Duration::weeks(1),
        Rule::Interval { seconds } => last + Duration::seconds(*seconds),
    }
}
