//! Durable tier behavior across runtime restarts.

use crate::mock_infrastructure::{build_runtime, MockEndpoints};
use gateway_core::{pipeline::QueryOptions, types::GraphQLRequest};
use serde_json::json;
use std::time::Duration;
use tempfile::TempDir;

fn database_url(dir: &TempDir) -> String {
    format!("sqlite://{}", dir.path().join("gateway-cache.db").display())
}

#[tokio::test]
async fn test_query_cache_survives_restart() {
    let dir = TempDir::new().unwrap();
    let mut endpoints = MockEndpoints::new().await;
    let data = json!({ "listings": [{ "id": "42", "price": "1000" }] });
    endpoints.live.mock_query("GetListings", &data, 1);

    let mut config = endpoints.config();
    config.cache.database_url = Some(database_url(&dir));
    let request = GraphQLRequest::new("query GetListings { listings(first: 1) { id price } }")
        .with_operation_name("GetListings");

    let runtime = build_runtime(config.clone()).await;
    assert!(runtime.query_cache().stats().durable_ready);
    runtime.query_client().query("marketplace", request.clone(), QueryOptions::default()).await.unwrap();
    runtime.shutdown().await;

    let restarted = build_runtime(config).await;
    assert_eq!(restarted.query_cache().stats().memory_size, 0);
    let response = restarted
        .query_client()
        .query("marketplace", request, QueryOptions::default())
        .await
        .unwrap();
    assert_eq!(response.data, Some(data));
    assert_eq!(restarted.query_cache().stats().memory_size, 1);
    restarted.shutdown().await;

    endpoints.assert_all().await;
}

#[tokio::test]
async fn test_metadata_cache_survives_restart_and_honors_delete() {
    let dir = TempDir::new().unwrap();
    let endpoints = MockEndpoints::new().await;
    let mut config = endpoints.config();
    config.cache.database_url = Some(database_url(&dir));

    let runtime = build_runtime(config.clone()).await;
    let metadata = runtime.metadata_cache();
    metadata.set("hero:1", json!({ "name": "Aria", "class": "mage" }), None);
    metadata.set("hero:2", json!({ "name": "Bram", "class": "knight" }), None);
    metadata.set("hero:3", json!({ "name": "Cole" }), Some(Duration::ZERO));
    metadata.delete("hero:2");
    runtime.shutdown().await;

    let restarted = build_runtime(config).await;
    let metadata = restarted.metadata_cache();
    assert_eq!(metadata.get("hero:1").await, Some(json!({ "name": "Aria", "class": "mage" })));
    assert_eq!(metadata.get("hero:2").await, None);
    assert_eq!(metadata.get("hero:3").await, None);
    restarted.shutdown().await;
}

#[tokio::test]
async fn test_unopenable_database_degrades_to_memory_only() {
    let dir = TempDir::new().unwrap();
    let endpoints = MockEndpoints::new().await;
    let mut config = endpoints.config();
    config.cache.database_url =
        Some(format!("sqlite://{}", dir.path().join("missing/nested/cache.db").display()));

    let runtime = build_runtime(config).await;
    let stats = runtime.metadata_cache().stats();
    assert!(!stats.durable_ready);

    runtime.metadata_cache().set("hero:1", json!({ "name": "Aria" }), None);
    assert_eq!(runtime.metadata_cache().get("hero:1").await, Some(json!({ "name": "Aria" })));
    runtime.shutdown().await;
}
