//! Runtime builder and lifecycle over real HTTP.

use crate::mock_infrastructure::{build_runtime, MockEndpoints};
use gateway_core::{
    config::{AppConfig, RoutingMode},
    runtime::{GatewayRuntime, RuntimeError},
};
use serial_test::serial;
use std::io::Write;
use tokio::time::{timeout, Duration};

#[tokio::test]
async fn test_builder_rejects_identical_endpoints() {
    let endpoints = MockEndpoints::new().await;
    let mut config = endpoints.config();
    config.endpoints.live_url = config.endpoints.delayed_url.clone();

    let result = GatewayRuntime::builder().with_config(config).build().await;

    assert!(matches!(result, Err(RuntimeError::ConfigValidation(_))));
}

#[tokio::test]
async fn test_background_monitor_probes_on_start() {
    let mut endpoints = MockEndpoints::new().await;
    endpoints.delayed.mock_probe(4_990, false);
    endpoints.live.mock_probe(5_000, false);

    let mut config = endpoints.config();
    config.health_check.background = true;
    let runtime = build_runtime(config).await;
    assert!(runtime.has_health_task());

    let probed = timeout(Duration::from_secs(5), async {
        while runtime.health_monitor().rounds() == 0 {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await;
    assert!(probed.is_ok(), "background monitor should complete a round");

    timeout(Duration::from_secs(5), runtime.shutdown()).await.unwrap();
    assert!(!runtime.has_health_task());
    endpoints.assert_all().await;
}

#[tokio::test]
async fn test_shutdown_notifies_receivers_once() {
    let endpoints = MockEndpoints::new().await;
    let runtime = build_runtime(endpoints.config()).await;
    let mut first = runtime.shutdown_receiver();
    let mut second = runtime.shutdown_receiver();

    runtime.shutdown().await;
    runtime.shutdown().await;

    assert!(first.recv().await.is_ok());
    assert!(second.recv().await.is_ok());
    assert!(first.try_recv().is_err());
}

#[test]
#[serial]
fn test_environment_overrides_file() {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(
        file,
        r#"
[endpoints]
delayed_url = "https://delayed.example.com/graphql"
live_url = "https://live.example.com/graphql"

[pipeline]
routing_mode = "static"
"#
    )
    .unwrap();

    std::env::set_var("GATEWAY__PIPELINE__ROUTING_MODE", "optimal");
    let config = AppConfig::from_file(file.path());
    std::env::remove_var("GATEWAY__PIPELINE__ROUTING_MODE");

    let config = config.unwrap();
    assert_eq!(config.pipeline.routing_mode, RoutingMode::Optimal);
    assert_eq!(config.endpoints.live_url, "https://live.example.com/graphql");
}
