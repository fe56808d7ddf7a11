pub mod models;
pub mod time_range;

pub use models::{
    IncidentEvalRequest, IncidentEvalResponse, IncidentValidation, InsightAnalyzeRequest,
    InsightAnalyzeResponse, TelemetryKind, TelemetryResult, TimeRange,
};
pub use time_range::{format_timestamp, parse_time_range, ParsedTimeRange, TimeRangeError};
