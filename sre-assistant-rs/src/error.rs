//! Errors surfaced by the insight and incident pipelines

use axum::http::StatusCode;
use sre_sdk::{CancellationError, ServiceError};
use sre_types::TimeRangeError;
use thiserror::Error;

/// Why a pipeline stopped. Every step fails fast with one of these.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// A collaborator was not wired at startup
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The caller sent a request that cannot be served
    #[error("{0}")]
    Validation(String),

    /// A remote call failed
    #[error("{context}: {source}")]
    Downstream {
        context: String,
        #[source]
        source: ServiceError,
    },

    /// The language model reported itself unavailable
    #[error("{0}")]
    Unavailable(String),

    /// The language model answered with blank text
    #[error("{0}")]
    EmptyResult(String),

    #[error("{0}")]
    Cancelled(#[from] CancellationError),
}

impl PipelineError {
    pub fn configuration(message: impl Into<String>) -> Self {
        PipelineError::Configuration(message.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        PipelineError::Validation(message.into())
    }

    /// Wrap a client error; cancellation keeps its own kind
    pub fn downstream(context: impl Into<String>, source: ServiceError) -> Self {
        match source.cancellation() {
            Some(reason) => PipelineError::Cancelled(reason),
            None => PipelineError::Downstream {
                context: context.into(),
                source,
            },
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, PipelineError::Validation(_))
    }

    /// HTTP status the boundary answers with
    pub fn status_code(&self) -> StatusCode {
        if self.is_validation() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl From<TimeRangeError> for PipelineError {
    fn from(err: TimeRangeError) -> Self {
        PipelineError::Validation(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            PipelineError::validation("metricQuery must not be empty").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            PipelineError::configuration("telemetry gateway is not configured").status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            PipelineError::EmptyResult("blank".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_remote_validation_is_not_a_client_fault() {
        let err = PipelineError::downstream("query metrics", ServiceError::validation("400: bad"));
        assert!(!err.is_validation());
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), "query metrics: Validation error: 400: bad");
    }

    #[test]
    fn test_downstream_cancellation_keeps_kind() {
        let err = PipelineError::downstream(
            "list alerts",
            ServiceError::from(CancellationError::DeadlineExceeded),
        );
        assert!(matches!(
            err,
            PipelineError::Cancelled(CancellationError::DeadlineExceeded)
        ));
    }

    #[test]
    fn test_time_range_error_is_validation() {
        let err: PipelineError = TimeRangeError::Empty("timeRange.from/to must not be empty".into()).into();
        assert!(err.is_validation());
        assert_eq!(err.to_string(), "timeRange.from/to must not be empty");
    }
}
