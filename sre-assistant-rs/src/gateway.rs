//! Telemetry seams used by the pipelines.
//!
//! `McpClient` implements both; tests swap in recording stubs.

use async_trait::async_trait;
use sre_sdk::{McpClient, RequestContext, Result};
use sre_types::{IncidentEvalRequest, InsightAnalyzeRequest, ParsedTimeRange, TelemetryResult};

/// Metrics and logs for the insight view
#[async_trait]
pub trait InsightTelemetry: Send + Sync {
    async fn query_metrics(
        &self,
        ctx: &RequestContext,
        req: &InsightAnalyzeRequest,
        range: &ParsedTimeRange,
    ) -> Result<TelemetryResult>;

    async fn get_logs(
        &self,
        ctx: &RequestContext,
        req: &InsightAnalyzeRequest,
        range: &ParsedTimeRange,
    ) -> Result<TelemetryResult>;
}

/// Incident-scoped metrics and alerts
#[async_trait]
pub trait IncidentTelemetry: Send + Sync {
    async fn query_incident_metrics(
        &self,
        ctx: &RequestContext,
        req: &IncidentEvalRequest,
        range: &ParsedTimeRange,
    ) -> Result<TelemetryResult>;

    async fn list_alerts(
        &self,
        ctx: &RequestContext,
        req: &IncidentEvalRequest,
        range: &ParsedTimeRange,
    ) -> Result<TelemetryResult>;
}

#[async_trait]
impl InsightTelemetry for McpClient {
    async fn query_metrics(
        &self,
        ctx: &RequestContext,
        req: &InsightAnalyzeRequest,
        range: &ParsedTimeRange,
    ) -> Result<TelemetryResult> {
        McpClient::query_metrics(self, ctx, req, range).await
    }

    async fn get_logs(
        &self,
        ctx: &RequestContext,
        req: &InsightAnalyzeRequest,
        range: &ParsedTimeRange,
    ) -> Result<TelemetryResult> {
        McpClient::get_logs(self, ctx, req, range).await
    }
}

#[async_trait]
impl IncidentTelemetry for McpClient {
    async fn query_incident_metrics(
        &self,
        ctx: &RequestContext,
        req: &IncidentEvalRequest,
        range: &ParsedTimeRange,
    ) -> Result<TelemetryResult> {
        McpClient::query_incident_metrics(self, ctx, req, range).await
    }

    async fn list_alerts(
        &self,
        ctx: &RequestContext,
        req: &IncidentEvalRequest,
        range: &ParsedTimeRange,
    ) -> Result<TelemetryResult> {
        McpClient::list_alerts(self, ctx, req, range).await
    }
}
