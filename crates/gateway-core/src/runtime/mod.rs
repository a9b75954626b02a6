//! Gateway runtime initialization and lifecycle management.
//!
//! The runtime validates configuration, opens the `metadata` and `queries` caches, builds the
//! endpoint selector and query pipeline, and optionally starts the background health task.
//!
//! ```no_run
//! use gateway_core::{config::AppConfig, pipeline::QueryOptions, runtime::GatewayRuntime, types::GraphQLRequest};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let runtime = GatewayRuntime::builder().with_config(AppConfig::load()?).build().await?;
//!
//!     let request = GraphQLRequest::new("query GetHeroes { heroes(first: 5) { id } }")
//!         .with_operation_name("GetHeroes");
//!     let response = runtime.query_client().query("party-management", request, QueryOptions::default()).await?;
//!     println!("{:?}", response.data);
//!
//!     runtime.shutdown().await;
//!     Ok(())
//! }
//! ```

pub mod builder;
pub mod lifecycle;

pub use builder::{GatewayRuntimeBuilder, RuntimeError};
pub use lifecycle::GatewayRuntime;
