//! Unit tests for the SRE SDK
//!
//! Client tests run against WireMock servers standing in for the tool
//! server, the language-model service and Grafana.

pub mod llm_mock_tests;
