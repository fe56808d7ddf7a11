//! # SRE SDK
//!
//! Outbound clients used by the SRE assistant.
//!
//! This crate provides:
//!
//! - `McpClient`: named-tool calls against the telemetry tool server
//!   (metrics, logs, alerts, incident timeline) plus its health endpoints
//! - `LlmClient`: availability check and chat against the language-model service
//! - `DatasourceHealthClient`: Grafana datasource health checks
//! - `RequestContext`: cancellation and deadline threaded through every call
//! - `ServiceError`: the error type shared by all clients
//! - Configuration providers that build each client's immutable config

pub mod context;
pub use context::{CancellationError, RequestContext};

pub mod core;
pub use core::ServiceClient;

pub mod services;
pub use services::grafana::DatasourceHealthClient;
pub use services::llm::{ChatRequest, ChatResponse, LlmClient};
pub use services::mcp::{McpClient, McpClientBuilder};

pub mod error;
pub use error::{ErrorContext, Result, ServiceError};

pub mod config;
pub use config::{
    ConfigProvider, ConfigProviderExt, EnvConfigProvider, GrafanaConfig, LlmConfig, McpConfig,
    MemoryConfigProvider, ServiceConfig,
};

#[cfg(test)]
mod tests;
