//! Language-model service client
//!
//! Two calls: `GET /health` to decide whether the model may be used at
//! all, and `POST /v1/chat` to turn a prompt plus structured context into
//! text.

mod models;
pub use models::*;

use std::time::Duration;

use async_trait::async_trait;
use log::{debug, warn};
use reqwest::{header, Client, RequestBuilder};

use crate::config::{LlmConfig, ServiceConfig};
use crate::context::{CancellationError, RequestContext};
use crate::core::ServiceClient;
use crate::error::{ErrorContext, Result, ServiceError};
use crate::services::common::{
    bearer_header, build_http_client, join_endpoint, parse_error_response, UserAgent,
};

/// Client for the language-model service
#[derive(Debug, Clone)]
pub struct LlmClient {
    http_client: Client,
    config: LlmConfig,
}

impl LlmClient {
    pub fn new(config: LlmConfig) -> Result<Self> {
        config.validate()?;

        let http_client = build_http_client(
            Some(UserAgent::for_client("LLM-Client")),
            Some(Duration::from_secs(config.timeout_seconds)),
        )?;

        Ok(Self {
            http_client,
            config,
        })
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match bearer_header(self.config.api_token.as_deref()) {
            Some(auth) => request.header(header::AUTHORIZATION, auth),
            None => request,
        }
    }

    /// Whether the service answers its health endpoint.
    ///
    /// Ordinary failures read as "disabled"; only the end of `ctx` is an error.
    pub async fn enabled(&self, ctx: &RequestContext) -> std::result::Result<bool, CancellationError> {
        match self.health_check(ctx).await {
            Ok(()) => Ok(true),
            Err(e) => match e.cancellation() {
                Some(reason) => Err(reason),
                None => {
                    warn!("LLM health check failed: {}", e);
                    Ok(false)
                }
            },
        }
    }

    /// Send a prompt with context and return the model output
    pub async fn chat(&self, ctx: &RequestContext, request: &ChatRequest) -> Result<ChatResponse> {
        let url = join_endpoint(&self.config.base_url, "v1/chat");
        debug!("Sending chat request to {}", url);

        ctx.run(self.send_chat(&url, request)).await?
    }

    async fn send_chat(&self, url: &str, request: &ChatRequest) -> Result<ChatResponse> {
        let body = serde_json::to_vec(request)?;

        let response = self
            .authorize(self.http_client.post(url))
            .header(header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if status.as_u16() >= 400 {
            let text = response.text().await.unwrap_or_default();
            let context = ErrorContext::for_service(self.name())
                .endpoint(url)
                .status_code(status.as_u16());
            return Err(
                ServiceError::service(format!("LLM request failed: {}", text.trim()))
                    .with_context(context),
            );
        }

        response.json::<ChatResponse>().await.map_err(|e| {
            ServiceError::parsing(format!("Failed to decode chat response: {}", e))
                .with_context(ErrorContext::for_service(self.name()).endpoint(url))
        })
    }

    async fn send_health_request(&self, url: &str) -> Result<()> {
        let response = self.authorize(self.http_client.get(url)).send().await?;
        if response.status().as_u16() >= 400 {
            return Err(parse_error_response(self.name(), url, response).await);
        }
        Ok(())
    }
}

#[async_trait]
impl ServiceClient for LlmClient {
    fn name(&self) -> &str {
        "llm"
    }

    fn base_url(&self) -> &str {
        &self.config.base_url
    }

    async fn health_check(&self, ctx: &RequestContext) -> Result<()> {
        let url = join_endpoint(&self.config.base_url, "health");
        ctx.run(self.send_health_request(&url)).await?
    }
}
