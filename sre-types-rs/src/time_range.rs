// sre-types-rs/src/time_range.rs
// Converts wire time ranges into validated UTC bounds

use chrono::{DateTime, SecondsFormat, Utc};
use thiserror::Error;

use crate::models::TimeRange;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TimeRangeError {
    /// One of the bounds is blank; carries the caller's message
    #[error("{0}")]
    Empty(String),

    #[error("invalid {field} time '{value}': {reason}")]
    Invalid {
        field: &'static str,
        value: String,
        reason: String,
    },

    #[error("time range start {from} is after end {to}")]
    Inverted { from: String, to: String },
}

/// Validated time range. Only `parse_time_range` builds one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedTimeRange {
    from: DateTime<Utc>,
    to: DateTime<Utc>,
}

impl ParsedTimeRange {
    pub fn from(&self) -> DateTime<Utc> {
        self.from
    }

    pub fn to(&self) -> DateTime<Utc> {
        self.to
    }

    /// Both bounds in the RFC 3339 form the tool server expects
    pub fn format_bounds(&self) -> (String, String) {
        (format_timestamp(&self.from), format_timestamp(&self.to))
    }
}

/// RFC 3339, second precision, `Z` suffix
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Parse both bounds of `range` strictly as RFC 3339.
///
/// `empty_message` is returned verbatim when either bound is blank so each
/// endpoint can name its own field (`timeRange`, `alertWindow`, ...).
pub fn parse_time_range(
    range: &TimeRange,
    empty_message: &str,
) -> Result<ParsedTimeRange, TimeRangeError> {
    if range.from.trim().is_empty() || range.to.trim().is_empty() {
        return Err(TimeRangeError::Empty(empty_message.to_string()));
    }

    let from = parse_bound("from", &range.from)?;
    let to = parse_bound("to", &range.to)?;

    if from > to {
        return Err(TimeRangeError::Inverted {
            from: range.from.clone(),
            to: range.to.clone(),
        });
    }

    Ok(ParsedTimeRange { from, to })
}

fn parse_bound(field: &'static str, value: &str) -> Result<DateTime<Utc>, TimeRangeError> {
    DateTime::parse_from_rfc3339(value)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| TimeRangeError::Invalid {
            field,
            value: value.to_string(),
            reason: e.to_string(),
        })
}
