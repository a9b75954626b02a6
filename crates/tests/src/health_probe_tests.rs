//! Health probing over real HTTP: classification, penalties and optimal selection.

use crate::mock_infrastructure::{build_runtime, MockEndpoints};
use gateway_core::types::{DegradedReason, EndpointId, HealthState};

#[tokio::test]
async fn test_lagging_endpoint_is_penalized() {
    let mut endpoints = MockEndpoints::new().await;
    endpoints.delayed.mock_probe(100, false);
    endpoints.live.mock_probe(5_000, false);

    let runtime = build_runtime(endpoints.config()).await;
    let status = runtime.health_monitor().refresh().await;

    assert!(status.delayed.is_healthy);
    assert_eq!(status.delayed.degraded, Some(DegradedReason::BehindSibling { lag: 4_900 }));
    assert!(status.delayed.response_time_ms >= 8_000);
    assert_eq!(status.live.degraded, None);
    assert_eq!(status.live.last_known_block, 5_000);
    assert!(status.last_updated > 0);

    assert_eq!(runtime.query_client().optimal_endpoint_url().await, endpoints.live.url());

    runtime.shutdown().await;
    endpoints.assert_all().await;
}

#[tokio::test]
async fn test_indexing_errors_push_selection_to_sibling() {
    let mut endpoints = MockEndpoints::new().await;
    endpoints.delayed.mock_probe(4_990, false);
    endpoints.live.mock_probe(5_000, true);

    let runtime = build_runtime(endpoints.config()).await;
    let status = runtime.health_monitor().refresh().await;

    assert!(status.live.is_healthy);
    assert_eq!(status.live.degraded, Some(DegradedReason::IndexingErrors));
    assert!(status.live.response_time_ms >= 8_000);
    assert_eq!(status.delayed.degraded, None);

    assert_eq!(runtime.query_client().optimal_endpoint_url().await, endpoints.delayed.url());
    runtime.shutdown().await;
}

#[tokio::test]
async fn test_http_error_marks_endpoint_unhealthy_with_sentinel() {
    let mut endpoints = MockEndpoints::new().await;
    endpoints.delayed.mock_probe(4_990, false);
    endpoints.live.mock_probe_status(503);

    let runtime = build_runtime(endpoints.config()).await;
    let status = runtime.health_monitor().refresh().await;

    assert!(!status.live.is_healthy);
    assert_eq!(status.live.state, HealthState::Unhealthy);
    assert_eq!(status.live.response_time_ms, 9_999);
    assert_eq!(status.delayed.state, HealthState::Healthy);

    let history = runtime.health_monitor().history(EndpointId::Live);
    assert_eq!(history.len(), 1);
    assert!(!history[0].outcome.is_usable());

    assert_eq!(runtime.query_client().optimal_endpoint_url().await, endpoints.delayed.url());
    runtime.shutdown().await;
}

#[tokio::test]
async fn test_unreachable_endpoint_is_unhealthy() {
    let mut endpoints = MockEndpoints::new().await;
    endpoints.live.mock_probe(5_000, false);

    let mut config = endpoints.config();
    config.endpoints.delayed_url = "http://127.0.0.1:1/graphql".to_string();

    let runtime = build_runtime(config).await;
    let status = runtime.health_monitor().refresh().await;

    assert!(!status.delayed.is_healthy);
    assert_eq!(status.delayed.response_time_ms, 9_999);
    assert!(status.live.is_healthy);
    runtime.shutdown().await;
}
