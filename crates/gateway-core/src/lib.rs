//! # Gateway Core
//!
//! Client-side query layer for a game indexer published on two GraphQL endpoints: a
//! reliable-but-lagging **Delayed** endpoint and a fresh-but-flaky **Live** endpoint.
//!
//! - **[`cache`]**: Two-tier cache with a bounded FIFO memory tier and an optional `SQLite`
//!   durable tier, per-entry TTLs, and a single-writer durable worker.
//!
//! - **[`endpoint`]**: HTTP transport, health probing with freshness penalties, feature
//!   routing, and optimal-endpoint selection.
//!
//! - **[`pipeline`]**: The query pipeline: transient-error retry, slow-query logging, response
//!   caching with in-flight coalescing, and the transport stage.
//!
//! - **[`runtime`]**: Builder and lifecycle that wire everything from [`config::AppConfig`].
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                      GatewayRuntime                      │
//! │  ┌──────────────┐   ┌──────────────────┐   ┌──────────┐  │
//! │  │ QueryClient  │──►│ EndpointSelector │──►│ Health   │  │
//! │  │  (pipeline)  │   │ (feature/optimal)│   │ Monitor  │  │
//! │  └──────┬───────┘   └──────────────────┘   └────┬─────┘  │
//! │         │                                       │        │
//! │  ┌──────▼───────┐                        ┌──────▼─────┐  │
//! │  │ TieredCache  │                        │ HttpClient │  │
//! │  │ memory+SQLite│                        └────────────┘  │
//! │  └──────────────┘                                        │
//! └──────────────────────────────────────────────────────────┘
//! ```

pub mod cache;
pub mod config;
pub mod endpoint;
pub mod pipeline;
pub mod runtime;
pub mod types;

#[cfg(test)]
mod testing;
