//! Grafana datasource health client

use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::{header, Client};
use serde::Deserialize;

use crate::config::{GrafanaConfig, ServiceConfig};
use crate::context::RequestContext;
use crate::core::ServiceClient;
use crate::error::{ErrorContext, Result, ServiceError};
use crate::services::common::{bearer_header, build_http_client, join_endpoint, UserAgent};

/// Reported when Grafana answers without saying what is wrong
const DEFAULT_UNHEALTHY_MESSAGE: &str = "Grafana reported a non-OK status";

#[derive(Debug, Default, Deserialize)]
struct DatasourceHealth {
    #[serde(default)]
    status: String,
    #[serde(default)]
    message: String,
}

/// Checks one datasource through `GET /api/datasources/uid/{uid}/health`.
///
/// An incomplete config is accepted here and reported by [`check`], so the
/// health endpoint can name what is missing.
///
/// [`check`]: DatasourceHealthClient::check
#[derive(Debug, Clone)]
pub struct DatasourceHealthClient {
    http_client: Client,
    config: GrafanaConfig,
}

impl DatasourceHealthClient {
    pub fn new(config: GrafanaConfig) -> Result<Self> {
        let http_client = build_http_client(
            Some(UserAgent::for_client("Grafana-Client")),
            Some(Duration::from_secs(config.timeout_seconds.max(1))),
        )?;

        Ok(Self {
            http_client,
            config,
        })
    }

    pub fn config(&self) -> &GrafanaConfig {
        &self.config
    }

    /// `Ok(())` when Grafana reports the datasource as `OK`
    pub async fn check(&self, ctx: &RequestContext) -> Result<()> {
        self.config.validate()?;

        let url = join_endpoint(
            &self.config.base_url,
            &format!(
                "api/datasources/uid/{}/health",
                self.config.datasource_uid.trim()
            ),
        );
        debug!("Checking datasource health at {}", url);

        ctx.run(self.fetch_health(&url)).await?
    }

    async fn fetch_health(&self, url: &str) -> Result<()> {
        let mut request = self.http_client.get(url);
        if let Some(auth) = bearer_header(self.config.api_token.as_deref()) {
            request = request.header(header::AUTHORIZATION, auth);
        }

        let response = request.send().await?;
        let status = response.status();
        let context = ErrorContext::for_service(self.name())
            .endpoint(url)
            .status_code(status.as_u16());

        if status.as_u16() >= 400 {
            let text = response.text().await.unwrap_or_default();
            return Err(ServiceError::service(format!(
                "datasource health check returned {}: {}",
                status.as_u16(),
                text.trim()
            ))
            .with_context(context));
        }

        let health: DatasourceHealth = response.json().await.map_err(|e| {
            ServiceError::parsing(format!("Failed to decode datasource health: {}", e))
                .with_context(context.clone())
        })?;

        if health.status.eq_ignore_ascii_case("ok") {
            return Ok(());
        }

        let message = if health.message.trim().is_empty() {
            DEFAULT_UNHEALTHY_MESSAGE.to_string()
        } else {
            health.message
        };
        Err(ServiceError::service(format!("datasource health check failed: {}", message))
            .with_context(context))
    }
}

#[async_trait]
impl ServiceClient for DatasourceHealthClient {
    fn name(&self) -> &str {
        "grafana"
    }

    fn base_url(&self) -> &str {
        &self.config.base_url
    }

    async fn health_check(&self, ctx: &RequestContext) -> Result<()> {
        self.check(ctx).await
    }
}
