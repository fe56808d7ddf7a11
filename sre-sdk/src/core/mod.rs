//! Core abstractions for the SRE SDK
//!
//! - `ServiceClient`: the base trait every outbound client implements, so
//!   health probes can treat the tool server and Grafana uniformly

use async_trait::async_trait;

use crate::context::RequestContext;
use crate::error::Result;

/// Base trait for all service clients
#[async_trait]
pub trait ServiceClient: Send + Sync {
    /// The client name/identifier
    fn name(&self) -> &str;

    /// The base URL for the service
    fn base_url(&self) -> &str;

    /// Health check for the service. `Ok(())` means reachable and healthy;
    /// the error carries the diagnostic text.
    async fn health_check(&self, ctx: &RequestContext) -> Result<()>;
}
