use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, NaiveTime, TimeZone, Utc};

use crate::error::{ChimeError, Result};
use crate::types::Rule;

/// Upper bound on interval rules: ten years in seconds. Anything larger is a
/// configuration mistake, and unbounded values would overflow chrono's
/// date-time arithmetic when the trigger is advanced.
pub const MAX_INTERVAL_SECS: i64 = 315_360_000;

/// Recurrence frequency as named on the control surface (CLI, config).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frequency {
    Once,
    Hourly,
    Daily,
    Weekly,
    Interval,
}

impl FromStr for Frequency {
    type Err = ChimeError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "once" => Ok(Frequency::Once),
            "hourly" => Ok(Frequency::Hourly),
            "daily" => Ok(Frequency::Daily),
            "weekly" => Ok(Frequency::Weekly),
            "interval" => Ok(Frequency::Interval),
            other => Err(ChimeError::InvalidRule(format!(
                "unknown frequency {other:?} (expected once, hourly, daily, weekly or interval)"
            ))),
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Frequency::Once => "once",
            Frequency::Hourly => "hourly",
            Frequency::Daily => "daily",
            Frequency::Weekly => "weekly",
            Frequency::Interval => "interval",
        };
        write!(f, "{s}")
    }
}

/// Unvalidated rule input as it arrives from the CLI.
///
/// [`RuleSpec::resolve`] turns it into a stored [`Rule`] plus the job's first
/// trigger time, failing fast on malformed input so a bad rule is never
/// scheduled.
#[derive(Debug, Clone)]
pub struct RuleSpec {
    pub frequency: Frequency,
    /// `HH:MM` (today, UTC) or a full date-time. Required for every frequency
    /// except `interval`.
    pub time: Option<String>,
    /// Repeat period. Required for `interval`, must be positive.
    pub seconds: Option<i64>,
}

impl RuleSpec {
    /// Validate and compute `(stored rule, first next_run)`.
    ///
    /// Interval jobs fire immediately (`now`); time-of-day jobs fire at the
    /// parsed instant. A time already in the past is accepted — the job is due
    /// on the very next scan rather than skipped to tomorrow.
    pub fn resolve(&self, now: DateTime<Utc>) -> Result<(Rule, DateTime<Utc>)> {
        match self.frequency {
            Frequency::Interval => {
                let seconds = self.seconds.ok_or_else(|| {
                    ChimeError::InvalidRule("interval rules require --seconds".into())
                })?;
                if seconds <= 0 {
                    return Err(ChimeError::InvalidRule(format!(
                        "interval seconds must be positive, got {seconds}"
                    )));
                }
                if seconds > MAX_INTERVAL_SECS {
                    return Err(ChimeError::InvalidRule(format!(
                        "interval seconds must be at most {MAX_INTERVAL_SECS}, got {seconds}"
                    )));
                }
                Ok((Rule::Interval { seconds }, now))
            }
            frequency => {
                let raw = self.time.as_deref().ok_or_else(|| {
                    ChimeError::InvalidRule(format!("{frequency} rules require --time"))
                })?;
                let at = parse_time(raw, now)?;
                let rule = match frequency {
                    Frequency::Once => Rule::Once { at },
                    Frequency::Hourly => Rule::Hourly,
                    Frequency::Daily => Rule::Daily,
                    Frequency::Weekly => Rule::Weekly,
                    Frequency::Interval => unreachable!("handled above"),
                };
                Ok((rule, at))
            }
        }
    }
}

/// Parse a user-supplied trigger time.
///
/// Accepts a bare `HH:MM` (today's date, UTC), an RFC 3339 date-time, or a
/// `YYYY-MM-DD HH:MM[:SS]` / `YYYY-MM-DDTHH:MM` date-time (treated as UTC).
pub fn parse_time(raw: &str, now: DateTime<Utc>) -> Result<DateTime<Utc>> {
    if let Ok(t) = NaiveTime::parse_from_str(raw, "%H:%M") {
        return Ok(Utc.from_utc_datetime(&now.date_naive().and_time(t)));
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Ok(Utc.from_utc_datetime(&dt));
        }
    }
    Err(ChimeError::InvalidTime(format!(
        "unrecognised time {raw:?} (expected HH:MM or a date-time)"
    )))
}
