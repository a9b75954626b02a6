//! Shared domain and wire types.
//!
//! - [`EndpointId`] / [`EndpointDescriptor`] / [`EndpointSet`]: the two static GraphQL endpoints
//! - [`HealthMetric`] / [`PerformanceStatus`]: per-endpoint health as published by the monitor
//! - [`GraphQLRequest`] / [`GraphQLResponse`]: GraphQL-over-HTTP payloads

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Identifies one of the two endpoints backing the indexed dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EndpointId {
    /// Rate-limited endpoint that lags the chain head by several minutes.
    Delayed,
    /// Paid endpoint serving near real-time data.
    Live,
}

impl EndpointId {
    pub const ALL: [Self; 2] = [Self::Delayed, Self::Live];

    /// Returns the other endpoint of the pair.
    #[must_use]
    pub fn sibling(self) -> Self {
        match self {
            Self::Delayed => Self::Live,
            Self::Live => Self::Delayed,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Delayed => "delayed",
            Self::Live => "live",
        }
    }
}

impl fmt::Display for EndpointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Static description of one endpoint, including the sibling to fall back to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointDescriptor {
    pub id: EndpointId,
    pub url: String,
    pub fallback_id: EndpointId,
    pub fallback_url: String,
}

/// The Delayed/Live pair, built once from configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointSet {
    delayed: EndpointDescriptor,
    live: EndpointDescriptor,
}

impl EndpointSet {
    #[must_use]
    pub fn new(delayed_url: impl Into<String>, live_url: impl Into<String>) -> Self {
        let delayed_url = delayed_url.into();
        let live_url = live_url.into();

        Self {
            delayed: EndpointDescriptor {
                id: EndpointId::Delayed,
                url: delayed_url.clone(),
                fallback_id: EndpointId::Live,
                fallback_url: live_url.clone(),
            },
            live: EndpointDescriptor {
                id: EndpointId::Live,
                url: live_url,
                fallback_id: EndpointId::Delayed,
                fallback_url: delayed_url,
            },
        }
    }

    #[must_use]
    pub fn get(&self, id: EndpointId) -> &EndpointDescriptor {
        match id {
            EndpointId::Delayed => &self.delayed,
            EndpointId::Live => &self.live,
        }
    }

    #[must_use]
    pub fn delayed(&self) -> &EndpointDescriptor {
        &self.delayed
    }

    #[must_use]
    pub fn live(&self) -> &EndpointDescriptor {
        &self.live
    }
}

/// Lifecycle of an endpoint's health. There is no terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthState {
    Unknown,
    Healthy,
    Unhealthy,
}

/// Why a reachable endpoint had a latency penalty applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum DegradedReason {
    /// The indexer reported `hasIndexingErrors = true`.
    IndexingErrors,
    /// The endpoint's indexed block trails its sibling by `lag` blocks.
    BehindSibling { lag: u64 },
}

/// Health of a single endpoint as last measured by the monitor.
///
/// `response_time_ms` is the effective latency used for ranking: either the measured round
/// trip, the round trip plus a penalty, or the sentinel for unusable endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthMetric {
    pub response_time_ms: u64,
    #[serde(with = "chrono::serde::ts_milliseconds_option")]
    pub last_checked_at: Option<DateTime<Utc>>,
    pub is_healthy: bool,
    pub last_known_block: u64,
    pub state: HealthState,
    /// Raw measured round trip of the last probe that got a response.
    pub round_trip_ms: Option<u64>,
    pub degraded: Option<DegradedReason>,
}

impl Default for HealthMetric {
    /// Optimistic starting point: healthy with zero latency until the first probe lands.
    fn default() -> Self {
        Self {
            response_time_ms: 0,
            last_checked_at: None,
            is_healthy: true,
            last_known_block: 0,
            state: HealthState::Unknown,
            round_trip_ms: None,
            degraded: None,
        }
    }
}

/// Snapshot of both endpoints' health, exposed to collaborators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceStatus {
    pub delayed: HealthMetric,
    pub live: HealthMetric,
    /// Epoch milliseconds of the last completed probe round, 0 if none has run.
    pub last_updated: i64,
}

impl PerformanceStatus {
    #[must_use]
    pub fn get(&self, id: EndpointId) -> &HealthMetric {
        match id {
            EndpointId::Delayed => &self.delayed,
            EndpointId::Live => &self.live,
        }
    }
}

/// GraphQL-over-HTTP request body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphQLRequest {
    pub query: String,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub variables: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation_name: Option<String>,
}

impl GraphQLRequest {
    #[must_use]
    pub fn new(query: impl Into<String>) -> Self {
        Self { query: query.into(), variables: Value::Null, operation_name: None }
    }

    #[must_use]
    pub fn with_variables(mut self, variables: Value) -> Self {
        self.variables = variables;
        self
    }

    #[must_use]
    pub fn with_operation_name(mut self, name: impl Into<String>) -> Self {
        self.operation_name = Some(name.into());
        self
    }
}

/// A single entry of a GraphQL `errors` array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphQLErrorEntry {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locations: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Value>,
}

/// GraphQL-over-HTTP response body.
///
/// GraphQL-level errors are data, not failures: `errors` travels alongside any partial `data`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphQLResponse {
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<GraphQLErrorEntry>,
}

impl GraphQLResponse {
    #[must_use]
    pub fn from_data(data: Value) -> Self {
        Self { data: Some(data), errors: Vec::new() }
    }

    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Joins all error messages for logging.
    #[must_use]
    pub fn error_summary(&self) -> String {
        self.errors.iter().map(|e| e.message.as_str()).collect::<Vec<_>>().join("; ")
    }
}
