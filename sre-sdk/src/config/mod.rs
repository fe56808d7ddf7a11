//! Configuration management for service clients
//!
//! This module provides utilities for loading and validating configuration
//! for the outbound clients, with support for environment variables.
//! Each client receives its config by value at construction; there is no
//! process-wide default.

use std::collections::HashMap;
use std::env;
use std::fmt::Debug;

use serde::{Deserialize, Serialize};

use crate::error::{Result, ServiceError};

/// Prefix shared by every environment variable the assistant reads
pub const ENV_PREFIX: &str = "SRE_ASSISTANT";

/// Base trait for configuration providers
pub trait ConfigProvider: Send + Sync {
    /// Get a string configuration value
    fn get_string(&self, key: &str) -> Result<String>;
}

/// Extension methods for configuration providers
pub trait ConfigProviderExt: ConfigProvider {
    /// Get an integer configuration value
    fn get_int(&self, key: &str) -> Result<i64> {
        let value = self.get_string(key)?;
        value.trim().parse::<i64>().map_err(|e| {
            ServiceError::configuration(format!("Invalid integer for key {}: {}", key, e))
        })
    }

    /// Get a string value, treating blank values as absent
    fn get_optional(&self, key: &str) -> Option<String> {
        self.get_string(key)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    /// Get a string configuration value with a default
    fn get_string_or(&self, key: &str, default: &str) -> String {
        self.get_optional(key).unwrap_or_else(|| default.to_string())
    }

    /// Get an integer configuration value with a default
    fn get_int_or(&self, key: &str, default: i64) -> i64 {
        self.get_int(key).unwrap_or(default)
    }
}

impl<T: ConfigProvider + ?Sized> ConfigProviderExt for T {}

/// Environment variable based configuration provider
#[derive(Debug, Clone, Default)]
pub struct EnvConfigProvider {
    /// Optional prefix for environment variables
    prefix: Option<String>,
}

impl EnvConfigProvider {
    /// Create a new environment variable config provider
    pub fn new() -> Self {
        Self::default()
    }

    /// Provider reading `SRE_ASSISTANT_*` variables
    pub fn assistant() -> Self {
        Self::new().with_prefix(ENV_PREFIX)
    }

    /// Set a prefix for environment variables
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Format a configuration key as an environment variable
    pub(crate) fn format_key(&self, key: &str) -> String {
        let mut env_key = String::new();

        if let Some(ref prefix) = self.prefix {
            env_key.push_str(prefix);
            env_key.push('_');
        }

        env_key.push_str(
            &key.to_uppercase()
                .replace(|c: char| !c.is_ascii_alphanumeric(), "_"),
        );

        env_key
    }
}

impl ConfigProvider for EnvConfigProvider {
    fn get_string(&self, key: &str) -> Result<String> {
        let env_key = self.format_key(key);

        env::var(&env_key).map_err(|e| match e {
            env::VarError::NotPresent => {
                ServiceError::configuration(format!("Environment variable not set: {}", env_key))
            }
            env::VarError::NotUnicode(_) => ServiceError::configuration(format!(
                "Environment variable is not valid unicode: {}",
                env_key
            )),
        })
    }
}

/// In-memory config provider for testing or static configuration
#[derive(Debug, Clone, Default)]
pub struct MemoryConfigProvider {
    values: HashMap<String, String>,
}

impl MemoryConfigProvider {
    /// Create a new empty memory config provider
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a configuration value
    pub fn set<K, V>(&mut self, key: K, value: V)
    where
        K: Into<String>,
        V: ToString,
    {
        self.values.insert(key.into(), value.to_string());
    }
}

impl ConfigProvider for MemoryConfigProvider {
    fn get_string(&self, key: &str) -> Result<String> {
        self.values.get(key).cloned().ok_or_else(|| {
            ServiceError::configuration(format!("Configuration key not found: {}", key))
        })
    }
}

/// Trait for service-specific configuration
pub trait ServiceConfig: Debug + Send + Sync {
    /// Validate this configuration
    fn validate(&self) -> Result<()>;

    /// Get the service name
    fn service_name(&self) -> &str;
}

fn validate_base_url(service: &str, base_url: &str) -> Result<()> {
    if base_url.trim().is_empty() {
        return Err(ServiceError::configuration(format!(
            "{} base URL must not be empty",
            service
        )));
    }
    url::Url::parse(base_url.trim()).map_err(|e| {
        ServiceError::configuration(format!("Invalid {} base URL '{}': {}", service, base_url, e))
    })?;
    Ok(())
}

fn seconds<P: ConfigProvider + ?Sized>(provider: &P, key: &str, default: u64) -> u64 {
    let value = provider.get_int_or(key, default as i64);
    if value <= 0 {
        default
    } else {
        value as u64
    }
}

/// Configuration for the telemetry tool server (MCP)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McpConfig {
    /// Base URL, e.g. `http://mcp:8000`
    pub base_url: String,

    /// Bearer token sent with every request when present
    pub api_token: Option<String>,

    /// Per-request HTTP timeout in seconds
    pub timeout_seconds: u64,

    /// Datasource used by the datasource probe
    pub datasource_uid: Option<String>,

    /// Tool invoked by the datasource probe
    pub datasource_tool: String,
}

impl McpConfig {
    pub const DEFAULT_TIMEOUT_SECONDS: u64 = 10;
    pub const DEFAULT_DATASOURCE_TOOL: &'static str = "queryMetrics";

    /// Config pointing at `base_url` with every other field defaulted
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Load configuration from a config provider
    pub fn from_provider<P: ConfigProvider + ?Sized>(provider: &P) -> Result<Self> {
        let config = Self {
            base_url: provider.get_string_or("mcp_url", ""),
            api_token: provider.get_optional("mcp_token"),
            timeout_seconds: seconds(provider, "mcp_timeout_seconds", Self::DEFAULT_TIMEOUT_SECONDS),
            datasource_uid: provider.get_optional("datasource_uid"),
            datasource_tool: provider
                .get_string_or("datasource_tool", Self::DEFAULT_DATASOURCE_TOOL),
        };

        config.validate()?;
        Ok(config)
    }
}

impl Default for McpConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            api_token: None,
            timeout_seconds: Self::DEFAULT_TIMEOUT_SECONDS,
            datasource_uid: None,
            datasource_tool: Self::DEFAULT_DATASOURCE_TOOL.to_string(),
        }
    }
}

impl ServiceConfig for McpConfig {
    fn validate(&self) -> Result<()> {
        validate_base_url("MCP", &self.base_url)
    }

    fn service_name(&self) -> &str {
        "mcp"
    }
}

/// Configuration for the language-model service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    pub base_url: String,
    pub api_token: Option<String>,
    pub timeout_seconds: u64,
}

impl LlmConfig {
    pub const DEFAULT_TIMEOUT_SECONDS: u64 = 15;

    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Load configuration from a config provider
    pub fn from_provider<P: ConfigProvider + ?Sized>(provider: &P) -> Result<Self> {
        let config = Self {
            base_url: provider.get_string_or("llm_url", ""),
            api_token: provider.get_optional("llm_token"),
            timeout_seconds: seconds(provider, "llm_timeout_seconds", Self::DEFAULT_TIMEOUT_SECONDS),
        };

        config.validate()?;
        Ok(config)
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            api_token: None,
            timeout_seconds: Self::DEFAULT_TIMEOUT_SECONDS,
        }
    }
}

impl ServiceConfig for LlmConfig {
    fn validate(&self) -> Result<()> {
        validate_base_url("LLM", &self.base_url)
    }

    fn service_name(&self) -> &str {
        "llm"
    }
}

/// Configuration for Grafana's datasource health API.
///
/// Missing values are tolerated here and reported when the probe runs, so
/// the health endpoint can say what is misconfigured.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GrafanaConfig {
    pub base_url: String,
    pub api_token: Option<String>,
    pub datasource_uid: String,
    pub timeout_seconds: u64,
}

impl GrafanaConfig {
    pub const DEFAULT_TIMEOUT_SECONDS: u64 = 10;

    /// Load configuration from a config provider
    pub fn from_provider<P: ConfigProvider + ?Sized>(provider: &P) -> Self {
        Self {
            base_url: provider.get_string_or("grafana_url", ""),
            api_token: provider.get_optional("grafana_token"),
            datasource_uid: provider.get_string_or("datasource_uid", ""),
            timeout_seconds: seconds(
                provider,
                "grafana_timeout_seconds",
                Self::DEFAULT_TIMEOUT_SECONDS,
            ),
        }
    }

    /// Whether a Grafana instance is configured at all
    pub fn is_configured(&self) -> bool {
        !self.base_url.trim().is_empty()
    }
}

impl ServiceConfig for GrafanaConfig {
    fn validate(&self) -> Result<()> {
        if self.datasource_uid.trim().is_empty() {
            return Err(ServiceError::configuration(
                "Datasource UID is not set; cannot check datasource health",
            ));
        }
        validate_base_url("Grafana", &self.base_url)
    }

    fn service_name(&self) -> &str {
        "grafana"
    }
}
