//! Telemetry tool server client
//!
//! The tool server exposes metrics, logs and alert queries as named tools
//! under `POST /tools/{tool}`. Payloads and responses are untyped JSON; the
//! client only shapes the request and passes the response through.

mod models;
pub use models::*;

use std::time::Duration;

use async_trait::async_trait;
use log::{debug, error};
use reqwest::{header, Client, StatusCode};
use serde_json::Value;
use sre_types::{
    format_timestamp, IncidentEvalRequest, InsightAnalyzeRequest, ParsedTimeRange, TelemetryKind,
    TelemetryResult,
};

use crate::config::{McpConfig, ServiceConfig};
use crate::context::RequestContext;
use crate::core::ServiceClient;
use crate::error::{ErrorContext, Result, ServiceError};
use crate::services::common::{
    bearer_header, build_http_client, join_endpoint, parse_error_response, UserAgent,
};

/// Lookback of the synthetic datasource probe query
const PROBE_LOOKBACK_MINUTES: i64 = 5;

/// Client for the telemetry tool server
#[derive(Debug, Clone)]
pub struct McpClient {
    http_client: Client,
    config: McpConfig,
}

impl McpClient {
    /// Create a client; fails when the base URL is blank or malformed
    pub fn new(config: McpConfig) -> Result<Self> {
        config.validate()?;

        let http_client = build_http_client(
            Some(UserAgent::for_client("MCP-Client")),
            Some(Duration::from_secs(config.timeout_seconds)),
        )?;

        Ok(Self {
            http_client,
            config,
        })
    }

    /// Create a new builder for the tool server client
    pub fn builder() -> McpClientBuilder {
        McpClientBuilder::default()
    }

    pub fn config(&self) -> &McpConfig {
        &self.config
    }

    /// Metric series for the insight view
    pub async fn query_metrics(
        &self,
        ctx: &RequestContext,
        req: &InsightAnalyzeRequest,
        range: &ParsedTimeRange,
    ) -> Result<TelemetryResult> {
        let payload = metrics_payload(req, range);
        self.call_kind(ctx, TelemetryKind::Metrics, tools::QUERY_METRICS, payload)
            .await
    }

    /// Log lines for the insight view
    pub async fn get_logs(
        &self,
        ctx: &RequestContext,
        req: &InsightAnalyzeRequest,
        range: &ParsedTimeRange,
    ) -> Result<TelemetryResult> {
        let payload = logs_payload(req, range);
        self.call_kind(ctx, TelemetryKind::Logs, tools::GET_LOGS, payload)
            .await
    }

    /// Metric series scoped to an incident
    pub async fn query_incident_metrics(
        &self,
        ctx: &RequestContext,
        req: &IncidentEvalRequest,
        range: &ParsedTimeRange,
    ) -> Result<TelemetryResult> {
        let payload = incident_metrics_payload(req, range);
        self.call_kind(ctx, TelemetryKind::Metrics, tools::QUERY_METRICS, payload)
            .await
    }

    /// Alerts that fired for an incident inside the alert window
    pub async fn list_alerts(
        &self,
        ctx: &RequestContext,
        req: &IncidentEvalRequest,
        range: &ParsedTimeRange,
    ) -> Result<TelemetryResult> {
        let payload = alerts_payload(req, range);
        self.call_kind(ctx, TelemetryKind::Alerts, tools::LIST_ALERTS, payload)
            .await
    }

    /// Event timeline recorded for an incident
    pub async fn query_incident_timeline(
        &self,
        ctx: &RequestContext,
        req: &IncidentEvalRequest,
        range: &ParsedTimeRange,
    ) -> Result<TelemetryResult> {
        let payload = timeline_payload(req, range);
        self.call_kind(
            ctx,
            TelemetryKind::Timeline,
            tools::QUERY_INCIDENT_TIMELINE,
            payload,
        )
        .await
    }

    async fn call_kind(
        &self,
        ctx: &RequestContext,
        kind: TelemetryKind,
        tool: &str,
        payload: Value,
    ) -> Result<TelemetryResult> {
        let output = self.call_tool(ctx, tool, &payload).await?;
        Ok(TelemetryResult::new(kind, output))
    }

    /// Invoke a named tool and decode its JSON output.
    ///
    /// Anything but `200 OK` is an error carrying the tool name and status.
    pub async fn call_tool(
        &self,
        ctx: &RequestContext,
        tool: &str,
        payload: &Value,
    ) -> Result<Value> {
        let url = join_endpoint(&self.config.base_url, &format!("tools/{}", tool));
        debug!("Calling tool {} at {}", tool, url);

        ctx.run(self.send_tool_request(tool, &url, payload)).await?
    }

    async fn send_tool_request(&self, tool: &str, url: &str, payload: &Value) -> Result<Value> {
        let body = serde_json::to_vec(payload)?;

        let mut request = self
            .http_client
            .post(url)
            .header(header::CONTENT_TYPE, "application/json")
            .body(body);
        if let Some(auth) = bearer_header(self.config.api_token.as_deref()) {
            request = request.header(header::AUTHORIZATION, auth);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ServiceError::from(e).with_context_value("tool", tool))?;

        let status = response.status();
        if status != StatusCode::OK {
            let text = response.text().await.unwrap_or_default();
            error!("Tool {} returned {}: {}", tool, status.as_u16(), text);

            let context = ErrorContext::for_service(self.name())
                .endpoint(url)
                .status_code(status.as_u16())
                .with("tool", tool);
            return Err(ServiceError::service(format!(
                "tool {} returned status {}",
                tool,
                status.as_u16()
            ))
            .with_context(context));
        }

        response.json::<Value>().await.map_err(|e| {
            ServiceError::parsing(format!("Failed to decode {} response: {}", tool, e))
                .with_context(ErrorContext::for_service(self.name()).endpoint(url))
        })
    }

    /// `GET /health` on the tool server; any status below 400 is healthy
    pub async fn health(&self, ctx: &RequestContext) -> Result<()> {
        let url = join_endpoint(&self.config.base_url, "health");
        debug!("Checking tool server health at {}", url);

        ctx.run(self.send_health_request(&url)).await?
    }

    async fn send_health_request(&self, url: &str) -> Result<()> {
        let mut request = self.http_client.get(url);
        if let Some(auth) = bearer_header(self.config.api_token.as_deref()) {
            request = request.header(header::AUTHORIZATION, auth);
        }

        let response = request.send().await?;
        let status = response.status();
        if status.is_client_error() || status.is_server_error() {
            return Err(parse_error_response(self.name(), url, response).await);
        }
        Ok(())
    }

    /// Run a trivial query against the configured datasource.
    ///
    /// Fails without touching the network when no datasource UID is set.
    pub async fn probe_datasource(&self, ctx: &RequestContext) -> Result<()> {
        let uid = self
            .config
            .datasource_uid
            .as_deref()
            .map(str::trim)
            .filter(|uid| !uid.is_empty())
            .ok_or_else(|| {
                ServiceError::configuration("datasource UID is not configured for the probe")
            })?;

        let now = chrono::Utc::now();
        let from = format_timestamp(&(now - chrono::Duration::minutes(PROBE_LOOKBACK_MINUTES)));
        let to = format_timestamp(&now);

        let payload = probe_payload(uid, &from, &to);
        self.call_tool(ctx, &self.config.datasource_tool, &payload)
            .await
            .map(|_| ())
    }
}

#[async_trait]
impl ServiceClient for McpClient {
    fn name(&self) -> &str {
        "mcp"
    }

    fn base_url(&self) -> &str {
        &self.config.base_url
    }

    async fn health_check(&self, ctx: &RequestContext) -> Result<()> {
        self.health(ctx).await
    }
}

/// Builder for the tool server client
#[derive(Debug, Default)]
pub struct McpClientBuilder {
    config: McpConfig,
}

impl McpClientBuilder {
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.config.base_url = base_url.into();
        self
    }

    pub fn api_token(mut self, token: impl Into<String>) -> Self {
        self.config.api_token = Some(token.into());
        self
    }

    pub fn timeout_seconds(mut self, seconds: u64) -> Self {
        self.config.timeout_seconds = seconds;
        self
    }

    pub fn datasource_uid(mut self, uid: impl Into<String>) -> Self {
        self.config.datasource_uid = Some(uid.into());
        self
    }

    pub fn datasource_tool(mut self, tool: impl Into<String>) -> Self {
        self.config.datasource_tool = tool.into();
        self
    }

    pub fn build(self) -> Result<McpClient> {
        McpClient::new(self.config)
    }
}
