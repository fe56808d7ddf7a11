//! Incident evaluation: incident metrics, fired alerts and recommendations

use std::sync::Arc;

use log::info;
use sre_sdk::RequestContext;
use sre_types::{parse_time_range, IncidentEvalRequest, IncidentEvalResponse, IncidentValidation};

use crate::advisory::IncidentAdvisor;
use crate::error::PipelineError;
use crate::gateway::IncidentTelemetry;
use crate::insight::require;

pub const EMPTY_ALERT_WINDOW: &str = "alertWindow.from/to must not be empty";

/// Status reported for every evaluation that produced recommendations
pub const STATUS_COMPLETED: &str = "completed";

#[derive(Clone, Default)]
pub struct IncidentPipeline {
    telemetry: Option<Arc<dyn IncidentTelemetry>>,
    advisor: Option<IncidentAdvisor>,
}

impl IncidentPipeline {
    pub fn new(
        telemetry: Option<Arc<dyn IncidentTelemetry>>,
        advisor: Option<IncidentAdvisor>,
    ) -> Self {
        Self { telemetry, advisor }
    }

    pub async fn evaluate(
        &self,
        ctx: &RequestContext,
        req: &IncidentEvalRequest,
    ) -> Result<IncidentEvalResponse, PipelineError> {
        let telemetry = self
            .telemetry
            .as_ref()
            .ok_or_else(|| PipelineError::configuration("telemetry gateway is not configured"))?;
        let advisor = self
            .advisor
            .as_ref()
            .filter(|advisor| advisor.is_configured())
            .ok_or_else(|| PipelineError::configuration("LLM client is not configured"))?;

        require("metricsDatasource", &req.metrics_datasource)?;
        require("logsDatasource", &req.logs_datasource)?;
        require("metricQuery", &req.metric_query)?;
        require("logQuery", &req.log_query)?;

        let window = parse_time_range(&req.alert_window, EMPTY_ALERT_WINDOW)?;

        let metrics = telemetry
            .query_incident_metrics(ctx, req, &window)
            .await
            .map_err(|e| PipelineError::downstream("failed to query incident metrics", e))?;
        let alerts = telemetry
            .list_alerts(ctx, req, &window)
            .await
            .map_err(|e| PipelineError::downstream("failed to list alerts", e))?;

        let recommendations = advisor
            .build_recommendations(ctx, req, &metrics, &alerts)
            .await?;
        info!("Incident {} evaluated", req.incident_id);

        Ok(IncidentEvalResponse {
            status: STATUS_COMPLETED.to_string(),
            recommendations,
            validation: IncidentValidation {
                metrics: metrics.into_payload(),
                alerts: alerts.into_payload(),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{StubModel, StubTelemetry};
    use serde_json::json;
    use sre_sdk::{CancellationError, ServiceError};
    use sre_types::TimeRange;

    fn request() -> IncidentEvalRequest {
        IncidentEvalRequest {
            incident_id: "INC-42".into(),
            metrics_datasource: "prom".into(),
            logs_datasource: "loki".into(),
            metric_query: "rate(http_errors[5m])".into(),
            log_query: "{app=\"api\"}".into(),
            alert_window: TimeRange::new("2024-01-01T00:00:00Z", "2024-01-01T01:00:00Z"),
        }
    }

    fn pipeline(telemetry: Arc<StubTelemetry>, model: Arc<StubModel>) -> IncidentPipeline {
        IncidentPipeline::new(Some(telemetry), Some(IncidentAdvisor::new(Some(model))))
    }

    #[tokio::test]
    async fn test_evaluate_composes_response() {
        let telemetry = Arc::new(StubTelemetry::ok());
        let model = Arc::new(StubModel::replying("ok"));

        let response = pipeline(telemetry.clone(), model.clone())
            .evaluate(&RequestContext::background(), &request())
            .await
            .expect("evaluation");

        assert_eq!(response.status, "completed");
        assert_eq!(response.recommendations, "ok");
        assert_eq!(response.validation.metrics, json!({"value": 1}));
        assert_eq!(response.validation.alerts, json!(["alert"]));
        assert_eq!(model.chat_calls(), 1);
        assert_eq!(telemetry.calls(), vec!["queryMetrics", "listAlerts"]);
    }

    #[tokio::test]
    async fn test_blank_alert_window_uses_its_own_message() {
        let telemetry = Arc::new(StubTelemetry::ok());
        let mut req = request();
        req.alert_window = TimeRange::new("2024-01-01T00:00:00Z", " ");

        let err = pipeline(telemetry.clone(), Arc::new(StubModel::replying("ok")))
            .evaluate(&RequestContext::background(), &req)
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), EMPTY_ALERT_WINDOW);
        assert!(telemetry.calls().is_empty());
    }

    #[tokio::test]
    async fn test_missing_query_fails_before_any_call() {
        let telemetry = Arc::new(StubTelemetry::ok());
        let mut req = request();
        req.log_query = String::new();

        let err = pipeline(telemetry.clone(), Arc::new(StubModel::replying("ok")))
            .evaluate(&RequestContext::background(), &req)
            .await
            .unwrap_err();

        assert!(err.is_validation());
        assert!(telemetry.calls().is_empty());
    }

    #[tokio::test]
    async fn test_disabled_model_is_unavailable() {
        let model = Arc::new(StubModel::disabled());
        let err = pipeline(Arc::new(StubTelemetry::ok()), model.clone())
            .evaluate(&RequestContext::background(), &request())
            .await
            .unwrap_err();

        assert!(matches!(err, PipelineError::Unavailable(_)));
        assert_eq!(model.chat_calls(), 0);
    }

    #[tokio::test]
    async fn test_advisory_error_fails_evaluation() {
        let model = Arc::new(StubModel::failing(ServiceError::service("LLM request failed: boom")));
        let err = pipeline(Arc::new(StubTelemetry::ok()), model)
            .evaluate(&RequestContext::background(), &request())
            .await
            .unwrap_err();

        assert!(matches!(err, PipelineError::Downstream { .. }));
    }

    #[tokio::test]
    async fn test_cancelled_alerts_call_is_cancellation() {
        let telemetry = Arc::new(StubTelemetry::cancelled_at("listAlerts"));
        let err = pipeline(telemetry, Arc::new(StubModel::replying("ok")))
            .evaluate(&RequestContext::background(), &request())
            .await
            .unwrap_err();

        assert!(matches!(err, PipelineError::Cancelled(CancellationError::Cancelled)));
    }

    #[tokio::test]
    async fn test_missing_model_fails_before_any_call() {
        let telemetry = Arc::new(StubTelemetry::ok());
        let err = IncidentPipeline::new(Some(telemetry.clone()), Some(IncidentAdvisor::new(None)))
            .evaluate(&RequestContext::background(), &request())
            .await
            .unwrap_err();

        assert!(matches!(err, PipelineError::Configuration(_)));
        assert!(telemetry.calls().is_empty());
    }
}
