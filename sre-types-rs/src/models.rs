// sre-types-rs/src/models.rs
// Wire model for the insight and incident resource endpoints

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

/// Time range as sent by the frontend, both bounds as RFC 3339 strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    #[serde(default)]
    pub from: String,
    #[serde(default)]
    pub to: String,
}

impl TimeRange {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

/// Request body of `POST /insight/analyze`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightAnalyzeRequest {
    #[serde(default)]
    pub metrics_datasource: String,
    #[serde(default)]
    pub logs_datasource: String,
    #[serde(default)]
    pub metric_query: String,
    #[serde(default)]
    pub log_query: String,
    #[serde(default)]
    pub time_range: TimeRange,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub dimensions: HashMap<String, String>,
}

/// Response body of `POST /insight/analyze`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightAnalyzeResponse {
    pub metrics: Value,
    pub logs: Value,
    pub ai_summary: String,
}

/// Request body of `POST /incident/eval`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncidentEvalRequest {
    #[serde(default)]
    pub incident_id: String,
    #[serde(default)]
    pub metrics_datasource: String,
    #[serde(default)]
    pub logs_datasource: String,
    #[serde(default)]
    pub metric_query: String,
    #[serde(default)]
    pub log_query: String,
    #[serde(default)]
    pub alert_window: TimeRange,
}

/// Telemetry gathered while evaluating an incident
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncidentValidation {
    pub metrics: Value,
    pub alerts: Value,
}

/// Response body of `POST /incident/eval`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncidentEvalResponse {
    pub status: String,
    pub recommendations: String,
    pub validation: IncidentValidation,
}

/// Which gateway tool produced a telemetry payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TelemetryKind {
    Metrics,
    Logs,
    Alerts,
    Timeline,
}

impl fmt::Display for TelemetryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TelemetryKind::Metrics => "metrics",
            TelemetryKind::Logs => "logs",
            TelemetryKind::Alerts => "alerts",
            TelemetryKind::Timeline => "timeline",
        };
        f.write_str(name)
    }
}

/// Opaque tool output. The shape belongs to the remote tool, so it is
/// carried through untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct TelemetryResult {
    kind: TelemetryKind,
    payload: Value,
}

impl TelemetryResult {
    pub fn new(kind: TelemetryKind, payload: Value) -> Self {
        Self { kind, payload }
    }

    pub fn kind(&self) -> TelemetryKind {
        self.kind
    }

    pub fn payload(&self) -> &Value {
        &self.payload
    }

    pub fn into_payload(self) -> Value {
        self.payload
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_insight_request_uses_camel_case() {
        let body = json!({
            "metricsDatasource": "prom",
            "logsDatasource": "loki",
            "metricQuery": "up",
            "logQuery": "{app=\"grafana\"}",
            "timeRange": {"from": "2024-01-01T00:00:00Z", "to": "2024-01-01T01:00:00Z"},
            "dimensions": {"cluster": "prod"}
        });

        let request: InsightAnalyzeRequest = serde_json::from_value(body).unwrap();
        assert_eq!(request.metrics_datasource, "prom");
        assert_eq!(request.log_query, "{app=\"grafana\"}");
        assert_eq!(request.time_range.to, "2024-01-01T01:00:00Z");
        assert_eq!(request.dimensions.get("cluster").map(String::as_str), Some("prod"));
    }

    #[test]
    fn test_missing_fields_default_to_blank() {
        let request: IncidentEvalRequest = serde_json::from_value(json!({})).unwrap();
        assert!(request.incident_id.is_empty());
        assert!(request.alert_window.from.is_empty());
    }

    #[test]
    fn test_empty_dimensions_are_not_serialized() {
        let value = serde_json::to_value(InsightAnalyzeRequest::default()).unwrap();
        assert!(value.get("dimensions").is_none());
    }

    #[test]
    fn test_insight_response_wire_names() {
        let response = InsightAnalyzeResponse {
            metrics: json!({"value": 1}),
            logs: json!(["log"]),
            ai_summary: "ok".to_string(),
        };
        let value = serde_json::to_value(response).unwrap();
        assert_eq!(value["aiSummary"], "ok");
        assert_eq!(value["metrics"]["value"], 1);
    }

    #[test]
    fn test_telemetry_result_keeps_payload_untouched() {
        let result = TelemetryResult::new(TelemetryKind::Alerts, json!(["alert"]));
        assert_eq!(result.kind(), TelemetryKind::Alerts);
        assert_eq!(result.kind().to_string(), "alerts");
        assert_eq!(result.into_payload(), json!(["alert"]));
    }
}
