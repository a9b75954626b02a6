//! GraphQL endpoint mock.
//!
//! Probes and queries are told apart by body: probes select `_meta`, queries are matched on
//! their `operationName`.

use mockito::{Matcher, Mock, Server, ServerGuard};
use serde_json::{json, Value};

/// A mockito server impersonating one indexer endpoint.
pub struct GraphQLMockBuilder {
    server: ServerGuard,
    mocks: Vec<Mock>,
}

impl GraphQLMockBuilder {
    pub async fn new() -> Self {
        Self { server: Server::new_async().await, mocks: Vec::new() }
    }

    /// URL to configure as the endpoint (`http://127.0.0.1:<port>/graphql`).
    #[must_use]
    pub fn url(&self) -> String {
        format!("{}/graphql", self.server.url())
    }

    fn operation_matcher(operation: &str) -> Matcher {
        Matcher::Regex(format!(r#""operationName"\s*:\s*"{operation}""#))
    }

    /// Answers health probes with the given indexed block and a non-empty sample.
    pub fn mock_probe(&mut self, block: u64, has_indexing_errors: bool) -> &mut Self {
        let body = json!({
            "data": {
                "_meta": { "block": { "number": block }, "hasIndexingErrors": has_indexing_errors },
                "players": [{ "id": "0x01" }]
            }
        });
        let mock = self
            .server
            .mock("POST", "/graphql")
            .match_body(Matcher::Regex("_meta".to_string()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body.to_string())
            .expect_at_least(1)
            .create();

        self.mocks.push(mock);
        self
    }

    /// Answers health probes with an HTTP error.
    pub fn mock_probe_status(&mut self, status: usize) -> &mut Self {
        let mock = self
            .server
            .mock("POST", "/graphql")
            .match_body(Matcher::Regex("_meta".to_string()))
            .with_status(status)
            .with_body("upstream unavailable")
            .expect_at_least(1)
            .create();

        self.mocks.push(mock);
        self
    }

    /// Answers `operation` with `data`, expecting exactly `hits` requests.
    pub fn mock_query(&mut self, operation: &str, data: &Value, hits: usize) -> &mut Self {
        let mock = self
            .server
            .mock("POST", "/graphql")
            .match_body(Self::operation_matcher(operation))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!({ "data": data }).to_string())
            .expect(hits)
            .create();

        self.mocks.push(mock);
        self
    }

    /// Answers `operation` with a GraphQL `errors` array and no data.
    pub fn mock_query_errors(&mut self, operation: &str, message: &str, hits: usize) -> &mut Self {
        let mock = self
            .server
            .mock("POST", "/graphql")
            .match_body(Self::operation_matcher(operation))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!({ "data": null, "errors": [{ "message": message }] }).to_string())
            .expect(hits)
            .create();

        self.mocks.push(mock);
        self
    }

    /// Answers `operation` with an HTTP error status.
    pub fn mock_query_status(&mut self, operation: &str, status: usize, hits: usize) -> &mut Self {
        let mock = self
            .server
            .mock("POST", "/graphql")
            .match_body(Self::operation_matcher(operation))
            .with_status(status)
            .with_body(format!("status {status}"))
            .expect(hits)
            .create();

        self.mocks.push(mock);
        self
    }

    /// Asserts every registered mock received its expected number of requests.
    pub async fn assert_all(&self) {
        for mock in &self.mocks {
            mock.assert_async().await;
        }
    }
}
