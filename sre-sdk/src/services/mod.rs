//! Service-specific client implementations

pub mod common;
pub mod grafana;
pub mod llm;
pub mod mcp;
