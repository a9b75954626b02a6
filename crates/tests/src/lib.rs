//! Integration tests for the gateway.
//!
//! Every test drives the real [`HttpClient`](gateway_core::endpoint::HttpClient) against
//! mockito servers standing in for the Delayed and Live endpoints.
//!
//! - `health_probe_tests`: probe classification, freshness penalties and optimal selection
//! - `pipeline_tests`: routing, caching, retry and error propagation through `QueryClient`
//! - `cache_persistence_tests`: durable tier surviving a runtime restart
//! - `runtime_tests`: builder validation and shutdown
//! - `mock_infrastructure`: reusable GraphQL endpoint mocks
//!
//! ```bash
//! cargo test --package tests
//! ```

#[cfg(test)]
mod cache_persistence_tests;

#[cfg(test)]
mod health_probe_tests;

#[cfg(test)]
mod pipeline_tests;

#[cfg(test)]
mod runtime_tests;

/// Mock infrastructure for testing
pub mod mock_infrastructure;
