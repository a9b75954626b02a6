//! Probe request construction and outcome classification.
//!
//! A probe asks an endpoint for its indexing metadata plus a small sample of entities:
//!
//! ```graphql
//! { _meta { block { number } hasIndexingErrors } players(first: 1) { id } }
//! ```
//!
//! [`classify`] turns the raw result into a [`ProbeOutcome`]. It is a pure function so the
//! rules can be tested without a transport.

use super::TransportError;
use crate::types::{GraphQLRequest, GraphQLResponse};
use serde::Serialize;
use serde_json::Value;

pub const DEFAULT_SAMPLE_SELECTION: &str = "players(first: 1) { id }";

/// Builds the probe request for the given sample selection.
///
/// The selection must be non-empty; configuration validation enforces this.
#[must_use]
pub fn probe_request(sample_selection: &str) -> GraphQLRequest {
    let sample = sample_selection.trim();
    GraphQLRequest::new(format!("{{ _meta {{ block {{ number }} hasIndexingErrors }} {sample} }}"))
}

/// Result of a single probe, before any cross-endpoint comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "status")]
pub enum ProbeOutcome {
    /// Data present, no indexing errors.
    Healthy { block: u64, round_trip_ms: u64 },
    /// Data present but the indexer reports errors. Usable with a penalty.
    IndexingErrors { block: u64, round_trip_ms: u64 },
    /// Reachable but serving nothing: block 0, missing `_meta`, or empty sample.
    NoData { round_trip_ms: u64 },
    /// Well-formed response carrying GraphQL `errors`.
    GraphQLErrors { message: String, round_trip_ms: u64 },
    /// Timeout, network failure, non-2xx or unparseable body.
    TransportFailure { error: String },
}

impl ProbeOutcome {
    /// Whether the endpoint can serve queries.
    #[must_use]
    pub fn is_usable(&self) -> bool {
        matches!(self, Self::Healthy { .. } | Self::IndexingErrors { .. })
    }

    /// Indexed block height when the endpoint is usable.
    #[must_use]
    pub fn block(&self) -> Option<u64> {
        match self {
            Self::Healthy { block, .. } | Self::IndexingErrors { block, .. } => Some(*block),
            _ => None,
        }
    }

    #[must_use]
    pub fn round_trip_ms(&self) -> Option<u64> {
        match self {
            Self::Healthy { round_trip_ms, .. }
            | Self::IndexingErrors { round_trip_ms, .. }
            | Self::NoData { round_trip_ms }
            | Self::GraphQLErrors { round_trip_ms, .. } => Some(*round_trip_ms),
            Self::TransportFailure { .. } => None,
        }
    }
}

/// Classifies a probe result.
///
/// GraphQL errors win over everything else in the body. An endpoint without data is unusable
/// even if it also reports indexing errors.
#[must_use]
pub fn classify(result: Result<GraphQLResponse, TransportError>, round_trip_ms: u64) -> ProbeOutcome {
    let response = match result {
        Ok(response) => response,
        Err(e) => return ProbeOutcome::TransportFailure { error: e.to_string() },
    };

    if response.has_errors() {
        return ProbeOutcome::GraphQLErrors { message: response.error_summary(), round_trip_ms };
    }

    let Some(Value::Object(data)) = response.data else {
        return ProbeOutcome::NoData { round_trip_ms };
    };

    let meta = data.get("_meta");
    let block = meta
        .and_then(|m| m.pointer("/block/number"))
        .and_then(Value::as_u64)
        .unwrap_or(0);
    let has_indexing_errors =
        meta.and_then(|m| m.get("hasIndexingErrors")).and_then(Value::as_bool).unwrap_or(false);

    let mut samples = data.iter().filter(|(field, _)| field.as_str() != "_meta").peekable();
    let sample_empty = samples.peek().is_none()
        || samples.any(|(_, value)| match value {
            Value::Null => true,
            Value::Array(items) => items.is_empty(),
            _ => false,
        });

    if block == 0 || sample_empty {
        return ProbeOutcome::NoData { round_trip_ms };
    }

    if has_indexing_errors {
        ProbeOutcome::IndexingErrors { block, round_trip_ms }
    } else {
        ProbeOutcome::Healthy { block, round_trip_ms }
    }
}
