//! Dependency health: the tool server and the telemetry datasource
//!
//! Unlike the pipelines, the aggregator never stops at the first failure;
//! both probes run and both outcomes are reported.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::future::join;
use serde::{Deserialize, Serialize};
use sre_sdk::{McpClient, RequestContext, ServiceClient};

pub const MCP_PROBE: &str = "MCP";
pub const DATASOURCE_PROBE: &str = "Datasource";

/// Default bound on the tool server health call
pub const DEFAULT_MCP_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// One dependency check; the error is the text shown to operators
#[async_trait]
pub trait Probe: Send + Sync {
    async fn probe(&self, ctx: &RequestContext) -> Result<(), String>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Ok,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthReport {
    pub status: HealthStatus,
    pub message: String,
}

impl HealthReport {
    pub fn is_ok(&self) -> bool {
        self.status == HealthStatus::Ok
    }
}

/// Runs the tool server probe and the datasource probe side by side
#[derive(Clone, Default)]
pub struct HealthAggregator {
    mcp: Option<Arc<dyn Probe>>,
    datasource: Option<Arc<dyn Probe>>,
}

impl HealthAggregator {
    pub fn new(mcp: Option<Arc<dyn Probe>>, datasource: Option<Arc<dyn Probe>>) -> Self {
        Self { mcp, datasource }
    }

    pub async fn check(&self, ctx: &RequestContext) -> HealthReport {
        let (mcp, datasource) = join(
            run_probe(self.mcp.as_deref(), MCP_PROBE, ctx),
            run_probe(self.datasource.as_deref(), DATASOURCE_PROBE, ctx),
        )
        .await;

        let mut status = HealthStatus::Ok;
        let mut lines = Vec::with_capacity(2);
        for (name, outcome) in [(MCP_PROBE, mcp), (DATASOURCE_PROBE, datasource)] {
            match outcome {
                Ok(()) => lines.push(format!("{}: ok", name)),
                Err(message) => {
                    status = HealthStatus::Error;
                    lines.push(format!("{}: {}", name, message));
                }
            }
        }

        HealthReport {
            status,
            message: lines.join("; "),
        }
    }
}

async fn run_probe(probe: Option<&dyn Probe>, name: &str, ctx: &RequestContext) -> Result<(), String> {
    match probe {
        Some(probe) => probe.probe(ctx).await,
        None => Err(format!("{} probe not implemented", name)),
    }
}

/// `GET /health` on the tool server
pub struct McpProbe {
    client: Arc<McpClient>,
    timeout: Duration,
}

impl McpProbe {
    pub fn new(client: Arc<McpClient>) -> Self {
        Self {
            client,
            timeout: DEFAULT_MCP_PROBE_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl Probe for McpProbe {
    async fn probe(&self, ctx: &RequestContext) -> Result<(), String> {
        let ctx = ctx.with_timeout(self.timeout);
        self.client
            .health(&ctx)
            .await
            .map_err(|e| format!("MCP health check failed: {}", e))
    }
}

/// Datasource health through any client whose health check targets the
/// datasource, normally Grafana's datasource health API
pub struct DatasourceHealthProbe<C: ServiceClient> {
    client: Arc<C>,
    timeout: Duration,
}

impl<C: ServiceClient> DatasourceHealthProbe<C> {
    pub fn new(client: Arc<C>, timeout: Duration) -> Self {
        Self { client, timeout }
    }
}

#[async_trait]
impl<C: ServiceClient + 'static> Probe for DatasourceHealthProbe<C> {
    async fn probe(&self, ctx: &RequestContext) -> Result<(), String> {
        let ctx = ctx.with_timeout(self.timeout);
        self.client
            .health_check(&ctx)
            .await
            .map_err(|e| e.to_string())
    }
}

/// Datasource check through the tool server, for setups without Grafana
pub struct McpDatasourceProbe {
    client: Arc<McpClient>,
    timeout: Duration,
}

impl McpDatasourceProbe {
    pub fn new(client: Arc<McpClient>, timeout: Duration) -> Self {
        Self { client, timeout }
    }
}

#[async_trait]
impl Probe for McpDatasourceProbe {
    async fn probe(&self, ctx: &RequestContext) -> Result<(), String> {
        let ctx = ctx.with_timeout(self.timeout);
        self.client
            .probe_datasource(&ctx)
            .await
            .map_err(|e| format!("datasource probe failed: {}", e))
    }
}
