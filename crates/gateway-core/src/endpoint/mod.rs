//! The two GraphQL endpoints: transport, health monitoring and selection.
//!
//! - [`HttpClient`]: GraphQL-over-HTTP transport implementing [`GraphQLTransport`]
//! - [`HealthMonitor`]: concurrent probes, latency ranking and freshness penalties
//! - [`FeatureRoutingPolicy`]: static feature to endpoint map
//! - [`EndpointSelector`]: static and health-based endpoint choice, plus the
//!   [`EndpointResolver`] strategies used by the query pipeline

pub mod errors;
pub mod health;
pub mod http_client;
pub mod probe;
pub mod routing;
pub mod selector;
pub mod transport;

pub use errors::TransportError;
pub use health::{HealthMonitor, ProbeRecord};
pub use http_client::{HttpClient, HttpClientConfig};
pub use probe::ProbeOutcome;
pub use routing::FeatureRoutingPolicy;
pub use selector::{choose_optimal, EndpointResolver, EndpointSelector, OptimalRouting, StaticRouting};
pub use transport::GraphQLTransport;
