//! Shared setup for integration tests.

use gateway_core::{
    config::{AppConfig, EndpointsConfig, RoutingMode},
    runtime::GatewayRuntime,
};

use super::GraphQLMockBuilder;

/// Mock Delayed and Live endpoints.
pub struct MockEndpoints {
    pub delayed: GraphQLMockBuilder,
    pub live: GraphQLMockBuilder,
}

impl MockEndpoints {
    pub async fn new() -> Self {
        Self { delayed: GraphQLMockBuilder::new().await, live: GraphQLMockBuilder::new().await }
    }

    /// Configuration pointing at the mocks, with no background monitor and no durable cache.
    #[must_use]
    pub fn config(&self) -> AppConfig {
        let mut config = AppConfig {
            endpoints: EndpointsConfig { delayed_url: self.delayed.url(), live_url: self.live.url() },
            ..AppConfig::default()
        };
        config.health_check.background = false;
        config.health_check.probe_timeout_seconds = 2;
        config.cache.database_url = None;
        config
    }

    #[must_use]
    pub fn optimal_config(&self) -> AppConfig {
        let mut config = self.config();
        config.pipeline.routing_mode = RoutingMode::Optimal;
        config
    }

    pub async fn assert_all(&self) {
        self.delayed.assert_all().await;
        self.live.assert_all().await;
    }
}

/// Builds a runtime from `config`, panicking on failure.
pub async fn build_runtime(config: AppConfig) -> GatewayRuntime {
    GatewayRuntime::builder().with_config(config).build().await.expect("runtime should build")
}
