//! Query pipeline over real HTTP: routing, caching, retry and error surfacing.

use crate::mock_infrastructure::{build_runtime, MockEndpoints};
use gateway_core::{
    endpoint::TransportError,
    pipeline::QueryOptions,
    types::{EndpointId, GraphQLRequest},
};
use serde_json::json;

fn heroes_request(owner: &str) -> GraphQLRequest {
    GraphQLRequest::new("query GetHeroes($owner: String!) { heroes(where: { owner: $owner }) { id } }")
        .with_operation_name("GetHeroes")
        .with_variables(json!({ "owner": owner }))
}

#[tokio::test]
async fn test_static_routing_sends_features_to_their_endpoint() {
    let mut endpoints = MockEndpoints::new().await;
    let data = json!({ "heroes": [{ "id": "1" }] });
    endpoints.delayed.mock_query("GetHeroes", &data, 1);
    endpoints.live.mock_query("GetHeroes", &data, 1);

    let runtime = build_runtime(endpoints.config()).await;
    let client = runtime.query_client();

    client.query("statistics", heroes_request("0xa"), QueryOptions::default()).await.unwrap();
    client.query("party-management", heroes_request("0xb"), QueryOptions::default()).await.unwrap();

    runtime.shutdown().await;
    endpoints.assert_all().await;
}

#[tokio::test]
async fn test_repeat_query_is_served_from_cache() {
    let mut endpoints = MockEndpoints::new().await;
    let data = json!({ "heroes": [{ "id": "7" }] });
    endpoints.live.mock_query("GetHeroes", &data, 1);

    let runtime = build_runtime(endpoints.config()).await;
    let client = runtime.query_client();

    let first = client.query("marketplace", heroes_request("0xa"), QueryOptions::default()).await.unwrap();
    let second = client.query("marketplace", heroes_request("0xa"), QueryOptions::default()).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(second.data, Some(data));
    assert_eq!(runtime.query_cache().stats().memory_size, 1);

    runtime.shutdown().await;
    endpoints.assert_all().await;
}

#[tokio::test]
async fn test_skip_cache_always_hits_endpoint() {
    let mut endpoints = MockEndpoints::new().await;
    endpoints.live.mock_query("GetHeroes", &json!({ "heroes": [] }), 2);

    let runtime = build_runtime(endpoints.config()).await;
    let options = QueryOptions::default().skip_cache();

    for _ in 0..2 {
        runtime.query_client().query("marketplace", heroes_request("0xa"), options).await.unwrap();
    }
    assert_eq!(runtime.query_cache().stats().memory_size, 0);

    runtime.shutdown().await;
    endpoints.assert_all().await;
}

#[tokio::test]
async fn test_graphql_errors_are_returned_and_not_cached() {
    let mut endpoints = MockEndpoints::new().await;
    endpoints.live.mock_query_errors("GetHeroes", "store error: timeout", 2);

    let runtime = build_runtime(endpoints.config()).await;

    for _ in 0..2 {
        let response = runtime
            .query_client()
            .query("marketplace", heroes_request("0xa"), QueryOptions::default())
            .await
            .unwrap();
        assert!(response.has_errors());
        assert_eq!(response.errors[0].message, "store error: timeout");
    }

    runtime.shutdown().await;
    endpoints.assert_all().await;
}

#[tokio::test]
async fn test_server_error_is_retried_once_then_surfaced() {
    let mut endpoints = MockEndpoints::new().await;
    endpoints.delayed.mock_query_status("GetHeroes", 502, 2);

    let runtime = build_runtime(endpoints.config()).await;
    let err = runtime
        .query_client()
        .query("explorer", heroes_request("0xa"), QueryOptions::default())
        .await
        .unwrap_err();

    assert_eq!(err.transport_error().status(), Some(502));
    let gateway_core::pipeline::QueryError::Transport { operation, feature, variables, endpoint, .. } = &err
    else {
        panic!("expected transport error");
    };
    assert_eq!(operation, "GetHeroes");
    assert_eq!(feature, "explorer");
    assert!(variables.contains("0xa"));
    assert_eq!(*endpoint, Some(EndpointId::Delayed));

    runtime.shutdown().await;
    endpoints.assert_all().await;
}

#[tokio::test]
async fn test_client_error_is_not_retried() {
    let mut endpoints = MockEndpoints::new().await;
    endpoints.live.mock_query_status("GetHeroes", 400, 1);

    let runtime = build_runtime(endpoints.config()).await;
    let err = runtime
        .query_client()
        .query("marketplace", heroes_request("0xa"), QueryOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(err.transport_error(), TransportError::HttpError(400, _)));

    runtime.shutdown().await;
    endpoints.assert_all().await;
}

#[tokio::test]
async fn test_optimal_routing_overrides_feature_mapping() {
    let mut endpoints = MockEndpoints::new().await;
    endpoints.delayed.mock_probe(100, false);
    endpoints.live.mock_probe(5_000, false).mock_query("GetHeroes", &json!({ "heroes": [] }), 1);

    let runtime = build_runtime(endpoints.optimal_config()).await;

    // "statistics" maps to Delayed, but Delayed lags by more than the threshold.
    runtime
        .query_client()
        .query("statistics", heroes_request("0xa"), QueryOptions::default())
        .await
        .unwrap();
    assert_eq!(runtime.health_monitor().rounds(), 1);

    runtime.shutdown().await;
    endpoints.assert_all().await;
}
