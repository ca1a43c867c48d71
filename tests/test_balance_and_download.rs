//! Balance and download-link tests:
//! 1) Balances come back scaled to whole tokens with trailing zeros dropped.
//! 2) Balance lookups never fail outward; any error degrades to "0".
//! 3) Download links carry the signed URL plus the dashboard's display
//!    metadata.

mod support;

use alloy_primitives::U256;
use serde_json::{json, Value};
use std::sync::Arc;
use support::{connect_session, spawn_server, MockWalletTransport, TEST_ACCOUNT};

const TOKEN: &str = "0x2000000000000000000000000000000000000002";

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_balance_formats_scaled_amounts() -> Result<(), Box<dyn std::error::Error>> {
    let wallet = Arc::new(
        MockWalletTransport::new().with_balance(U256::from(2_500_000_000_000_000_000u64)),
    );
    let server = spawn_server(wallet).await?;
    connect_session(&server).await;
    let app = server.registry.seed(TEST_ACCOUNT, TOKEN, 10);
    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(30))
        .build()?;
    let url = format!("{}/api/applications/{}/balance", server.base_url, app.id);

    let body = client.get(&url).send().await?.json::<Value>().await?;
    assert!(body["success"].as_bool().unwrap_or(false));
    assert_eq!(body["data"]["balance"].as_str(), Some("2.5"));

    // Reading is idempotent and submits nothing.
    let body = client.get(&url).send().await?.json::<Value>().await?;
    assert_eq!(body["data"]["balance"].as_str(), Some("2.5"));
    assert_eq!(server.wallet.sent_count(), 0);

    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_balance_failures_degrade_to_zero() -> Result<(), Box<dyn std::error::Error>> {
    let wallet = Arc::new(MockWalletTransport::new().failing_reads());
    let server = spawn_server(wallet).await?;
    connect_session(&server).await;
    let app = server.registry.seed(TEST_ACCOUNT, TOKEN, 10);
    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(30))
        .build()?;

    let resp = client
        .get(format!("{}/api/applications/{}/balance", server.base_url, app.id))
        .send()
        .await?;
    assert_eq!(resp.status().as_u16(), 200);
    let body = resp.json::<Value>().await?;
    assert!(body["success"].as_bool().unwrap_or(false));
    assert_eq!(body["data"]["balance"].as_str(), Some("0"));

    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_balance_without_session_is_zero() -> Result<(), Box<dyn std::error::Error>> {
    let server = spawn_server(Arc::new(MockWalletTransport::new())).await?;
    let app = server.registry.seed(TEST_ACCOUNT, TOKEN, 10);
    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(30))
        .build()?;

    let resp = client
        .get(format!("{}/api/applications/{}/balance", server.base_url, app.id))
        .send()
        .await?;
    assert_eq!(resp.status().as_u16(), 200);
    let body = resp.json::<Value>().await?;
    assert_eq!(body["data"]["balance"].as_str(), Some("0"));

    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_download_url_carries_display_metadata() -> Result<(), Box<dyn std::error::Error>> {
    let server = spawn_server(Arc::new(MockWalletTransport::new())).await?;
    let app = server.registry.seed(TEST_ACCOUNT, TOKEN, 10);
    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(30))
        .build()?;
    let url = format!(
        "{}/api/applications/{}/download-url",
        server.base_url, app.id
    );

    let body = client
        .post(&url)
        .json(&json!({}))
        .send()
        .await?
        .json::<Value>()
        .await?;
    assert!(body["success"].as_bool().unwrap_or(false));
    let signed = body["data"]["signed_url"].as_str().unwrap_or_default();
    assert!(signed.contains(&app.application_id));
    assert!(signed.contains("expiresIn=60"));
    assert_eq!(body["data"]["file_name"].as_str(), Some("app.exe"));
    assert_eq!(body["data"]["app_size_label"].as_str(), Some("2 KB"));
    assert_eq!(body["data"]["expires_in"].as_u64(), Some(60));

    // Callers can pick their own lifetime.
    let body = client
        .post(&url)
        .json(&json!({ "expires_in": 300 }))
        .send()
        .await?
        .json::<Value>()
        .await?;
    let signed = body["data"]["signed_url"].as_str().unwrap_or_default();
    assert!(signed.contains("expiresIn=300"));
    assert_eq!(body["data"]["expires_in"].as_u64(), Some(300));

    // Unknown applications have no link.
    let resp = client
        .post(format!("{}/api/applications/9999/download-url", server.base_url))
        .json(&json!({}))
        .send()
        .await?;
    assert_eq!(resp.status().as_u16(), 404);

    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_health_reports_ok() -> Result<(), Box<dyn std::error::Error>> {
    let server = spawn_server(Arc::new(MockWalletTransport::new())).await?;
    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(30))
        .build()?;

    let resp = client
        .get(format!("{}/health", server.base_url))
        .send()
        .await?;
    assert_eq!(resp.status().as_u16(), 200);
    let body = resp.json::<Value>().await?;
    assert!(body["success"].as_bool().unwrap_or(false));
    assert_eq!(body["data"]["status"].as_str(), Some("ok"));

    Ok(())
}
