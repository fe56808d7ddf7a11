//! Insight analysis: metrics plus logs plus a model-written summary

use std::sync::Arc;

use log::info;
use sre_sdk::RequestContext;
use sre_types::{parse_time_range, InsightAnalyzeRequest, InsightAnalyzeResponse};

use crate::advisory::InsightSummarizer;
use crate::error::PipelineError;
use crate::gateway::InsightTelemetry;

pub const EMPTY_TIME_RANGE: &str = "timeRange.from/to must not be empty";

pub(crate) fn require(field: &str, value: &str) -> Result<(), PipelineError> {
    if value.trim().is_empty() {
        return Err(PipelineError::validation(format!("{} must not be empty", field)));
    }
    Ok(())
}

#[derive(Clone, Default)]
pub struct InsightPipeline {
    telemetry: Option<Arc<dyn InsightTelemetry>>,
    summarizer: Option<InsightSummarizer>,
}

impl InsightPipeline {
    pub fn new(
        telemetry: Option<Arc<dyn InsightTelemetry>>,
        summarizer: Option<InsightSummarizer>,
    ) -> Self {
        Self {
            telemetry,
            summarizer,
        }
    }

    /// Fetch metrics, then logs, then summarize. The first failure wins.
    pub async fn analyze(
        &self,
        ctx: &RequestContext,
        req: &InsightAnalyzeRequest,
    ) -> Result<InsightAnalyzeResponse, PipelineError> {
        let telemetry = self
            .telemetry
            .as_ref()
            .ok_or_else(|| PipelineError::configuration("telemetry gateway is not configured"))?;
        let summarizer = self
            .summarizer
            .as_ref()
            .filter(|summarizer| summarizer.is_configured())
            .ok_or_else(|| PipelineError::configuration("LLM client is not configured"))?;

        require("metricsDatasource", &req.metrics_datasource)?;
        require("logsDatasource", &req.logs_datasource)?;
        require("metricQuery", &req.metric_query)?;
        require("logQuery", &req.log_query)?;

        let range = parse_time_range(&req.time_range, EMPTY_TIME_RANGE)?;

        let metrics = telemetry
            .query_metrics(ctx, req, &range)
            .await
            .map_err(|e| PipelineError::downstream("failed to query metrics", e))?;
        let logs = telemetry
            .get_logs(ctx, req, &range)
            .await
            .map_err(|e| PipelineError::downstream("failed to query logs", e))?;

        let ai_summary = summarizer.summarize(ctx, req, &metrics, &logs).await?;
        info!("Insight analysis completed for {}", req.metrics_datasource);

        Ok(InsightAnalyzeResponse {
            metrics: metrics.into_payload(),
            logs: logs.into_payload(),
            ai_summary,
        })
    }
}
