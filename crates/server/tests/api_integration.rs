//! API integration tests against an in-process router.

mod common;

use axum::http::{header, StatusCode};
use common::{fixtures, TestFixture};
use enricher_core::testing::RecordingSink;
use enricher_core::ProgressMessage;
use enricher_server::api::ws::run_batch;

#[tokio::test]
async fn test_health_on_both_prefixes() {
    let fixture = TestFixture::new();
    for path in ["/health", "/api/v1/health"] {
        let response = fixture.get(path).await;
        assert_eq!(response.status, StatusCode::OK, "{path}");
        assert_eq!(response.body["status"], "ok");
    }
}

#[tokio::test]
async fn test_config_endpoint() {
    let fixture = TestFixture::new();
    let response = fixture.get("/api/v1/config").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["enrichment"]["max_concurrent"], 4);
    assert_eq!(response.body["enrichment"]["retry"]["max_attempts"], 2);
}

#[tokio::test]
async fn test_chains_endpoint() {
    let fixture = TestFixture::new();
    let response = fixture.get("/api/v1/chains").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["count"], 10);

    let chains = response.body["chains"].as_array().unwrap();
    let base = chains
        .iter()
        .find(|c| c["origin_key"] == "base")
        .expect("base chain listed");
    assert_eq!(base["chain_id"], "eip155-8453");
}

#[tokio::test]
async fn test_upload_then_list() {
    let fixture = TestFixture::new();
    let csv = fixtures::csv(&[("abc", "base"), ("0xdef", "optimism")]);

    let response = fixture.upload("/upload", &csv).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.body["message"],
        "CSV processed successfully. Processed 2 contracts."
    );

    let response = fixture.get("/api/v1/contracts").await;
    assert_eq!(response.status, StatusCode::OK);
    let records = response.body.as_array().unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["address"], "0xabc");
    assert_eq!(records[0]["chain_id"], "base");
    assert_eq!(records[1]["origin_key"], "optimism");
}

#[tokio::test]
async fn test_upload_missing_columns_is_rejected() {
    let fixture = TestFixture::new();
    let response = fixture
        .upload("/api/v1/upload", "address,chain\n0x1,base\n")
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(response.body["error"].as_str().unwrap().contains("encode"));
    assert_eq!(fixture.state.store().len().await, 0);
}

#[tokio::test]
async fn test_upload_without_file_field() {
    let fixture = TestFixture::new();
    let response = fixture
        .upload_field("/api/v1/upload", "attachment", "encode,origin_key\n")
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(response.body["error"].is_string());
}

#[tokio::test]
async fn test_download_results_is_attachment() {
    let fixture = TestFixture::new();
    fixture
        .upload("/upload", &fixtures::csv(&[("0x1", "mode")]))
        .await;

    let response = fixture.get("/download-results").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.headers[header::CONTENT_DISPOSITION],
        "attachment; filename=processed_contracts.json"
    );
    assert_eq!(response.body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_process_plain_get_is_not_upgraded() {
    let fixture = TestFixture::new();
    let response = fixture.get("/api/v1/process?max_queries=5").await;
    assert!(response.status.is_client_error());
}

#[tokio::test]
async fn test_batch_results_visible_through_routes() {
    let fixture = TestFixture::new();
    fixture
        .source
        .set_found("0x1", fixtures::proxy_metadata("ERC1967Proxy", "0xbeef"))
        .await;
    fixture
        .upload(
            "/upload",
            &fixtures::csv(&[("0x1", "base"), ("0x2", "unknown")]),
        )
        .await;

    let sink = RecordingSink::new();
    let delivery = run_batch(&fixture.state, 0, sink.clone()).await;
    assert!(!delivery.cancelled);
    assert!(matches!(
        sink.last().await,
        Some(ProgressMessage::Completed { .. })
    ));

    let response = fixture.get("/api/v1/contracts").await;
    let records = response.body.as_array().unwrap();
    assert_eq!(records.len(), 2);
    let enriched = records.iter().find(|r| r["address"] == "0x1").unwrap();
    assert_eq!(enriched["name"], "ERC1967Proxy");
    assert_eq!(enriched["is_proxy_contract"], true);
    assert_eq!(enriched["proxy_address"], "0xbeef");
    assert_eq!(enriched["chain_id"], "eip155-8453");
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let fixture = TestFixture::new();
    fixture.get("/api/v1/health").await;

    let response = fixture.get("/metrics").await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.text.contains("enricher_http_requests_total"));
    assert!(response.text.contains("enricher_records_stored"));
}
