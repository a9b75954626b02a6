//! Mock GraphQL endpoints backed by mockito.
//!
//! ```ignore
//! use tests::mock_infrastructure::{GraphQLMockBuilder, MockEndpoints};
//!
//! let mut endpoints = MockEndpoints::new().await;
//! endpoints.live.mock_probe(5_000, false);
//! let config = endpoints.config();
//! ```

pub mod graphql_mock;
pub mod test_helpers;

pub use graphql_mock::GraphQLMockBuilder;
pub use test_helpers::*;
