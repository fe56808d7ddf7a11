//! Recording stand-ins for the gateway, the language model and probes

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::json;
use sre_sdk::{
    CancellationError, ChatRequest, ChatResponse, RequestContext, Result, ServiceError,
};
use sre_types::{
    IncidentEvalRequest, InsightAnalyzeRequest, ParsedTimeRange, TelemetryKind, TelemetryResult,
};

use crate::advisory::AdvisoryModel;
use crate::gateway::{IncidentTelemetry, InsightTelemetry};
use crate::health::Probe;

enum Failure {
    None,
    Error(&'static str),
    Cancelled(&'static str),
}

/// Answers every tool with a fixed payload and records the tool names
pub struct StubTelemetry {
    failure: Failure,
    calls: Mutex<Vec<&'static str>>,
}

impl StubTelemetry {
    pub fn ok() -> Self {
        Self {
            failure: Failure::None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(tool: &'static str) -> Self {
        Self {
            failure: Failure::Error(tool),
            ..Self::ok()
        }
    }

    pub fn cancelled_at(tool: &'static str) -> Self {
        Self {
            failure: Failure::Cancelled(tool),
            ..Self::ok()
        }
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    fn answer(&self, tool: &'static str, kind: TelemetryKind) -> Result<TelemetryResult> {
        self.calls.lock().unwrap().push(tool);
        match self.failure {
            Failure::Error(failing) if failing == tool => Err(ServiceError::service(format!(
                "tool {} returned status 500",
                tool
            ))),
            Failure::Cancelled(failing) if failing == tool => {
                Err(ServiceError::from(CancellationError::Cancelled))
            }
            _ => {
                let payload = match kind {
                    TelemetryKind::Metrics => json!({"value": 1}),
                    TelemetryKind::Logs => json!(["line"]),
                    TelemetryKind::Alerts => json!(["alert"]),
                    TelemetryKind::Timeline => json!([]),
                };
                Ok(TelemetryResult::new(kind, payload))
            }
        }
    }
}

#[async_trait]
impl InsightTelemetry for StubTelemetry {
    async fn query_metrics(
        &self,
        _ctx: &RequestContext,
        _req: &InsightAnalyzeRequest,
        _range: &ParsedTimeRange,
    ) -> Result<TelemetryResult> {
        self.answer("queryMetrics", TelemetryKind::Metrics)
    }

    async fn get_logs(
        &self,
        _ctx: &RequestContext,
        _req: &InsightAnalyzeRequest,
        _range: &ParsedTimeRange,
    ) -> Result<TelemetryResult> {
        self.answer("getLogs", TelemetryKind::Logs)
    }
}

#[async_trait]
impl IncidentTelemetry for StubTelemetry {
    async fn query_incident_metrics(
        &self,
        _ctx: &RequestContext,
        _req: &IncidentEvalRequest,
        _range: &ParsedTimeRange,
    ) -> Result<TelemetryResult> {
        self.answer("queryMetrics", TelemetryKind::Metrics)
    }

    async fn list_alerts(
        &self,
        _ctx: &RequestContext,
        _req: &IncidentEvalRequest,
        _range: &ParsedTimeRange,
    ) -> Result<TelemetryResult> {
        self.answer("listAlerts", TelemetryKind::Alerts)
    }
}

enum Availability {
    Enabled,
    Disabled,
    Cancelled,
}

/// Language model with a scripted availability and reply
pub struct StubModel {
    availability: Availability,
    reply: Mutex<Option<Result<String>>>,
    chats: AtomicUsize,
    last: Mutex<Option<ChatRequest>>,
}

impl StubModel {
    fn with(availability: Availability, reply: Result<String>) -> Self {
        Self {
            availability,
            reply: Mutex::new(Some(reply)),
            chats: AtomicUsize::new(0),
            last: Mutex::new(None),
        }
    }

    pub fn replying(output: &str) -> Self {
        Self::with(Availability::Enabled, Ok(output.to_string()))
    }

    pub fn failing(err: ServiceError) -> Self {
        Self::with(Availability::Enabled, Err(err))
    }

    pub fn disabled() -> Self {
        Self::with(Availability::Disabled, Ok("unused".to_string()))
    }

    pub fn cancelled() -> Self {
        Self::with(Availability::Cancelled, Ok("unused".to_string()))
    }

    pub fn chat_calls(&self) -> usize {
        self.chats.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<ChatRequest> {
        self.last.lock().unwrap().clone()
    }
}

#[async_trait]
impl AdvisoryModel for StubModel {
    async fn enabled(&self, _ctx: &RequestContext) -> std::result::Result<bool, CancellationError> {
        match self.availability {
            Availability::Enabled => Ok(true),
            Availability::Disabled => Ok(false),
            Availability::Cancelled => Err(CancellationError::Cancelled),
        }
    }

    async fn chat(&self, _ctx: &RequestContext, request: &ChatRequest) -> Result<ChatResponse> {
        self.chats.fetch_add(1, Ordering::SeqCst);
        *self.last.lock().unwrap() = Some(request.clone());

        // The first reply is consumed; later chats get an empty answer.
        match self.reply.lock().unwrap().take() {
            Some(Ok(output)) => Ok(ChatResponse { output }),
            Some(Err(err)) => Err(err),
            None => Ok(ChatResponse::default()),
        }
    }
}

/// Probe with a fixed outcome
pub struct StubProbe(pub std::result::Result<(), String>);

#[async_trait]
impl Probe for StubProbe {
    async fn probe(&self, _ctx: &RequestContext) -> std::result::Result<(), String> {
        self.0.clone()
    }
}
