//! Tool payloads sent to the telemetry tool server

use serde_json::{json, Map, Value};
use sre_types::{IncidentEvalRequest, InsightAnalyzeRequest, ParsedTimeRange};

/// Tool names understood by the tool server
pub mod tools {
    pub const QUERY_METRICS: &str = "queryMetrics";
    pub const GET_LOGS: &str = "getLogs";
    pub const LIST_ALERTS: &str = "listAlerts";
    pub const QUERY_INCIDENT_TIMELINE: &str = "queryIncidentTimeline";
}

/// Keys of the `getLogs` payload that dimensions may not replace
const RESERVED_LOG_KEYS: [&str; 3] = ["datasource", "range", "query"];

pub fn metrics_payload(req: &InsightAnalyzeRequest, range: &ParsedTimeRange) -> Value {
    let (from, to) = range.format_bounds();
    let mut payload = Map::new();
    payload.insert("datasource".into(), json!(req.metrics_datasource));
    payload.insert("query".into(), json!(req.metric_query));
    payload.insert("from".into(), json!(from));
    payload.insert("to".into(), json!(to));
    if !req.dimensions.is_empty() {
        payload.insert("dimensions".into(), json!(req.dimensions));
    }
    Value::Object(payload)
}

/// Dimensions are flattened next to the fixed keys.
pub fn logs_payload(req: &InsightAnalyzeRequest, range: &ParsedTimeRange) -> Value {
    let (from, to) = range.format_bounds();
    let mut payload = Map::new();
    payload.insert("datasource".into(), json!(req.logs_datasource));
    payload.insert("range".into(), json!({ "from": from, "to": to }));
    payload.insert("query".into(), json!(req.log_query));

    for (key, value) in &req.dimensions {
        if RESERVED_LOG_KEYS.contains(&key.as_str()) {
            continue;
        }
        payload.insert(key.clone(), json!(value));
    }
    Value::Object(payload)
}

pub fn incident_metrics_payload(req: &IncidentEvalRequest, range: &ParsedTimeRange) -> Value {
    let (from, to) = range.format_bounds();
    let mut payload = Map::new();
    payload.insert("datasource".into(), json!(req.metrics_datasource));
    payload.insert("query".into(), json!(req.metric_query));
    payload.insert("from".into(), json!(from));
    payload.insert("to".into(), json!(to));
    if !req.incident_id.trim().is_empty() {
        payload.insert("incidentId".into(), json!(req.incident_id));
    }
    Value::Object(payload)
}

pub fn alerts_payload(req: &IncidentEvalRequest, range: &ParsedTimeRange) -> Value {
    let (from, to) = range.format_bounds();
    let mut payload = Map::new();
    payload.insert("incidentId".into(), json!(req.incident_id));
    payload.insert("datasource".into(), json!(req.metrics_datasource));
    payload.insert("from".into(), json!(from));
    payload.insert("to".into(), json!(to));
    if !req.metric_query.is_empty() {
        payload.insert("query".into(), json!(req.metric_query));
    }
    Value::Object(payload)
}

pub fn timeline_payload(req: &IncidentEvalRequest, range: &ParsedTimeRange) -> Value {
    let (from, to) = range.format_bounds();
    json!({
        "incidentId": req.incident_id,
        "datasource": req.logs_datasource,
        "from": from,
        "to": to,
    })
}

/// Cheapest query that proves the datasource answers
pub fn probe_payload(datasource_uid: &str, from: &str, to: &str) -> Value {
    json!({
        "datasource": datasource_uid,
        "query": "1",
        "from": from,
        "to": to,
    })
}
