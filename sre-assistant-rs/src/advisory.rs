//! Language-model advice for both pipelines

use std::sync::Arc;

use async_trait::async_trait;
use log::debug;
use serde_json::{json, Value};
use sre_sdk::{CancellationError, ChatRequest, ChatResponse, LlmClient, RequestContext};
use sre_types::{IncidentEvalRequest, InsightAnalyzeRequest, TelemetryResult};

use crate::error::PipelineError;

pub const UNAVAILABLE_MESSAGE: &str = "LLM service is currently unavailable";

/// Seam over the language-model client
#[async_trait]
pub trait AdvisoryModel: Send + Sync {
    /// `Ok(false)` for an unhealthy service; `Err` only when `ctx` ends
    async fn enabled(&self, ctx: &RequestContext) -> Result<bool, CancellationError>;

    async fn chat(&self, ctx: &RequestContext, request: &ChatRequest) -> sre_sdk::Result<ChatResponse>;
}

#[async_trait]
impl AdvisoryModel for LlmClient {
    async fn enabled(&self, ctx: &RequestContext) -> Result<bool, CancellationError> {
        LlmClient::enabled(self, ctx).await
    }

    async fn chat(&self, ctx: &RequestContext, request: &ChatRequest) -> sre_sdk::Result<ChatResponse> {
        LlmClient::chat(self, ctx, request).await
    }
}

/// Serialized form of a telemetry payload for the chat context
fn payload_text(result: &TelemetryResult) -> String {
    serde_json::to_string(result.payload()).unwrap_or_else(|_| "{}".to_string())
}

async fn consult(
    model: Option<&Arc<dyn AdvisoryModel>>,
    ctx: &RequestContext,
    request: ChatRequest,
    empty_message: &str,
) -> Result<String, PipelineError> {
    let model =
        model.ok_or_else(|| PipelineError::configuration("LLM client is not configured"))?;

    if !model.enabled(ctx).await? {
        return Err(PipelineError::Unavailable(UNAVAILABLE_MESSAGE.to_string()));
    }

    let response = model
        .chat(ctx, &request)
        .await
        .map_err(|e| PipelineError::downstream("LLM chat request failed", e))?;

    if response.output.trim().is_empty() {
        return Err(PipelineError::EmptyResult(empty_message.to_string()));
    }
    Ok(response.output)
}

/// Summarizes metrics and logs for the insight view
#[derive(Clone, Default)]
pub struct InsightSummarizer {
    model: Option<Arc<dyn AdvisoryModel>>,
}

impl InsightSummarizer {
    pub fn new(model: Option<Arc<dyn AdvisoryModel>>) -> Self {
        Self { model }
    }

    /// Whether an advisory client is wired in
    pub fn is_configured(&self) -> bool {
        self.model.is_some()
    }

    pub async fn summarize(
        &self,
        ctx: &RequestContext,
        req: &InsightAnalyzeRequest,
        metrics: &TelemetryResult,
        logs: &TelemetryResult,
    ) -> Result<String, PipelineError> {
        let prompt = format!(
            "Summarize the following metrics and logs for an SRE and point out likely root causes of anomalies.\nMetricQuery: {}\nLogQuery: {}",
            req.metric_query, req.log_query
        );
        debug!("Requesting insight summary for {}", req.metric_query);

        let request = ChatRequest::new(prompt)
            .with_context("metrics", payload_text(metrics))
            .with_context("logs", payload_text(logs))
            .with_context("metricsDatasource", req.metrics_datasource.as_str())
            .with_context("logsDatasource", req.logs_datasource.as_str())
            .with_context("dimensions", json!(req.dimensions));

        consult(
            self.model.as_ref(),
            ctx,
            request,
            "LLM returned an empty summary",
        )
        .await
    }
}

/// Produces investigation and mitigation steps for an incident
#[derive(Clone, Default)]
pub struct IncidentAdvisor {
    model: Option<Arc<dyn AdvisoryModel>>,
}

impl IncidentAdvisor {
    pub fn new(model: Option<Arc<dyn AdvisoryModel>>) -> Self {
        Self { model }
    }

    /// Whether an advisory client is wired in
    pub fn is_configured(&self) -> bool {
        self.model.is_some()
    }

    pub async fn build_recommendations(
        &self,
        ctx: &RequestContext,
        req: &IncidentEvalRequest,
        metrics: &TelemetryResult,
        alerts: &TelemetryResult,
    ) -> Result<String, PipelineError> {
        let prompt = format!(
            "Provide investigation steps and mitigation advice for incident {} within the alert window. Evaluate the metric query: {} and consult the log query: {}",
            req.incident_id, req.metric_query, req.log_query
        );
        debug!("Requesting recommendations for incident {}", req.incident_id);

        let time_range: Value = json!({
            "from": req.alert_window.from,
            "to": req.alert_window.to,
        });
        let request = ChatRequest::new(prompt)
            .with_context("metrics", payload_text(metrics))
            .with_context("alerts", payload_text(alerts))
            .with_context("incidentId", req.incident_id.as_str())
            .with_context("metricsDatasource", req.metrics_datasource.as_str())
            .with_context("logsDatasource", req.logs_datasource.as_str())
            .with_context("timeRange", time_range);

        consult(
            self.model.as_ref(),
            ctx,
            request,
            "LLM returned no recommendations",
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::StubModel;
    use serde_json::json;
    use sre_types::TelemetryKind;

    fn insight_request() -> InsightAnalyzeRequest {
        InsightAnalyzeRequest {
            metrics_datasource: "prom".into(),
            logs_datasource: "loki".into(),
            metric_query: "up".into(),
            log_query: "{app=\"api\"}".into(),
            ..Default::default()
        }
    }

    fn metrics() -> TelemetryResult {
        TelemetryResult::new(TelemetryKind::Metrics, json!({"value": 1}))
    }

    fn logs() -> TelemetryResult {
        TelemetryResult::new(TelemetryKind::Logs, json!(["line"]))
    }

    #[tokio::test]
    async fn test_summary_context_carries_telemetry_as_text() {
        let model = Arc::new(StubModel::replying("ok"));
        let summarizer = InsightSummarizer::new(Some(model.clone()));

        let summary = summarizer
            .summarize(&RequestContext::background(), &insight_request(), &metrics(), &logs())
            .await
            .expect("summary");

        assert_eq!(summary, "ok");
        let sent = model.last_request().expect("one chat");
        assert_eq!(sent.context["metrics"], json!("{\"value\":1}"));
        assert_eq!(sent.context["logs"], json!("[\"line\"]"));
        assert_eq!(sent.context["metricsDatasource"], json!("prom"));
        assert!(sent.prompt.contains("MetricQuery: up"));
    }

    #[tokio::test]
    async fn test_disabled_model_is_unavailable_without_chat() {
        let model = Arc::new(StubModel::disabled());
        let summarizer = InsightSummarizer::new(Some(model.clone()));

        let err = summarizer
            .summarize(&RequestContext::background(), &insight_request(), &metrics(), &logs())
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), UNAVAILABLE_MESSAGE);
        assert_eq!(model.chat_calls(), 0);
    }

    #[tokio::test]
    async fn test_missing_model_is_configuration_error() {
        let err = InsightSummarizer::default()
            .summarize(&RequestContext::background(), &insight_request(), &metrics(), &logs())
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::Configuration(_)));
    }

    #[tokio::test]
    async fn test_blank_output_is_empty_result() {
        let advisor = IncidentAdvisor::new(Some(Arc::new(StubModel::replying("  "))));
        let req = IncidentEvalRequest {
            incident_id: "INC-7".into(),
            ..Default::default()
        };
        let alerts = TelemetryResult::new(TelemetryKind::Alerts, json!(["alert"]));

        let err = advisor
            .build_recommendations(&RequestContext::background(), &req, &metrics(), &alerts)
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::EmptyResult(_)));
    }

    #[tokio::test]
    async fn test_recommendation_context_includes_window() {
        let model = Arc::new(StubModel::replying("restart the pod"));
        let advisor = IncidentAdvisor::new(Some(model.clone()));
        let req = IncidentEvalRequest {
            incident_id: "INC-7".into(),
            metric_query: "up".into(),
            alert_window: sre_types::TimeRange::new("2024-01-01T00:00:00Z", "2024-01-01T01:00:00Z"),
            ..Default::default()
        };
        let alerts = TelemetryResult::new(TelemetryKind::Alerts, json!(["alert"]));

        advisor
            .build_recommendations(&RequestContext::background(), &req, &metrics(), &alerts)
            .await
            .expect("recommendations");

        let sent = model.last_request().expect("one chat");
        assert!(sent.prompt.contains("INC-7"));
        assert_eq!(sent.context["incidentId"], json!("INC-7"));
        assert_eq!(sent.context["timeRange"]["from"], json!("2024-01-01T00:00:00Z"));
        assert_eq!(sent.context["alerts"], json!("[\"alert\"]"));
    }

    #[tokio::test]
    async fn test_cancellation_during_availability_check_propagates() {
        let model = Arc::new(StubModel::cancelled());
        let summarizer = InsightSummarizer::new(Some(model.clone()));

        let err = summarizer
            .summarize(&RequestContext::background(), &insight_request(), &metrics(), &logs())
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::Cancelled(CancellationError::Cancelled)));
        assert_eq!(model.chat_calls(), 0);
    }
}
