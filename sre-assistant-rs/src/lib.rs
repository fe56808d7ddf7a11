// sre-assistant-rs/src/lib.rs
// SRE assistant backend: insight analysis, incident evaluation and
// dependency health over HTTP

pub mod advisory;
pub mod error;
pub mod gateway;
pub mod handlers;
pub mod health;
pub mod incident;
pub mod insight;

#[cfg(test)]
pub(crate) mod test_support;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    routing::{get, post},
    Router,
};
use log::{info, warn};
use sre_sdk::config::ConfigProviderExt;
use sre_sdk::{
    ConfigProvider, DatasourceHealthClient, GrafanaConfig, LlmClient, LlmConfig, McpClient,
    McpConfig, RequestContext,
};
use tokio_util::sync::CancellationToken;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;

use crate::advisory::{AdvisoryModel, IncidentAdvisor, InsightSummarizer};
use crate::health::{DatasourceHealthProbe, HealthAggregator, McpDatasourceProbe, McpProbe, Probe};
use crate::incident::IncidentPipeline;
use crate::insight::InsightPipeline;

pub use crate::error::PipelineError;

/// Largest accepted request body
pub const MAX_PAYLOAD_SIZE: usize = 1024 * 1024;

/// Deadline applied to each inbound request unless configured otherwise
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub insight: InsightPipeline,
    pub incident: IncidentPipeline,
    pub health: HealthAggregator,
    pub request_timeout: Duration,
    shutdown: RequestContext,
}

impl AppState {
    pub fn new(
        insight: InsightPipeline,
        incident: IncidentPipeline,
        health: HealthAggregator,
    ) -> Self {
        Self {
            insight,
            incident,
            health,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            shutdown: RequestContext::background(),
        }
    }

    /// Cancel in-flight requests when `token` is cancelled
    pub fn with_shutdown_token(mut self, token: CancellationToken) -> Self {
        self.shutdown = RequestContext::with_token(token);
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Fresh context for one inbound request
    pub fn request_context(&self) -> RequestContext {
        self.shutdown.with_timeout(self.request_timeout)
    }

    /// Wire every collaborator from configuration.
    ///
    /// A client that cannot be built is logged and left out; requests that
    /// need it fail with a configuration error instead of the process
    /// refusing to start.
    pub fn from_provider<P: ConfigProvider + ?Sized>(provider: &P) -> Self {
        let mcp = match McpConfig::from_provider(provider).and_then(McpClient::new) {
            Ok(client) => {
                info!("Using MCP server at {}", client.config().base_url);
                Some(Arc::new(client))
            }
            Err(e) => {
                warn!("MCP client unavailable: {}", e);
                None
            }
        };

        let llm: Option<Arc<dyn AdvisoryModel>> =
            match LlmConfig::from_provider(provider).and_then(LlmClient::new) {
                Ok(client) => Some(Arc::new(client) as Arc<dyn AdvisoryModel>),
                Err(e) => {
                    warn!("LLM client unavailable: {}", e);
                    None
                }
            };

        let grafana = GrafanaConfig::from_provider(provider);
        let datasource_probe: Option<Arc<dyn Probe>> = if grafana.is_configured() {
            let timeout = Duration::from_secs(grafana.timeout_seconds);
            match DatasourceHealthClient::new(grafana) {
                Ok(client) => Some(
                    Arc::new(DatasourceHealthProbe::new(Arc::new(client), timeout)) as Arc<dyn Probe>
                ),
                Err(e) => {
                    warn!("Grafana datasource client unavailable: {}", e);
                    None
                }
            }
        } else {
            mcp.as_ref().map(|client| {
                let timeout = Duration::from_secs(client.config().timeout_seconds);
                Arc::new(McpDatasourceProbe::new(client.clone(), timeout)) as Arc<dyn Probe>
            })
        };

        let mcp_probe = mcp
            .as_ref()
            .map(|client| Arc::new(McpProbe::new(client.clone())) as Arc<dyn Probe>);

        let insight = InsightPipeline::new(
            mcp.clone().map(|c| c as Arc<dyn gateway::InsightTelemetry>),
            Some(InsightSummarizer::new(llm.clone())),
        );
        let incident = IncidentPipeline::new(
            mcp.map(|c| c as Arc<dyn gateway::IncidentTelemetry>),
            Some(IncidentAdvisor::new(llm)),
        );

        let timeout_seconds = provider.get_int_or(
            "request_timeout_seconds",
            DEFAULT_REQUEST_TIMEOUT.as_secs() as i64,
        );
        let request_timeout = if timeout_seconds > 0 {
            Duration::from_secs(timeout_seconds as u64)
        } else {
            DEFAULT_REQUEST_TIMEOUT
        };

        Self::new(insight, incident, HealthAggregator::new(mcp_probe, datasource_probe))
            .with_request_timeout(request_timeout)
    }
}

/// Build the HTTP router
pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(handlers::root_handler))
        .route("/health", get(handlers::health_handler))
        .route("/insight/analyze", post(handlers::analyze_handler))
        .route("/incident/eval", post(handlers::evaluate_handler))
        .layer(RequestBodyLimitLayer::new(MAX_PAYLOAD_SIZE))
        .layer(cors)
        .with_state(state)
}
