mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::{scanner, table, FakeRenderer, Page, RecordingNotifier};
use screener_signals::{build_router, AppState};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tower::ServiceExt;

async fn get(app: &axum::Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

fn app_with(page: Page, notifier: Arc<RecordingNotifier>) -> axum::Router {
    let scanner = scanner(FakeRenderer::new(page), notifier, Duration::from_secs(3600));
    build_router(AppState::new(scanner))
}

#[tokio::test]
async fn test_scan_endpoint() {
    let html = table(&[&["BTCUSDT", "50000", "+2%", "1M"], &["ETHUSDT", "3000", "-1%", "500K"]]);
    let app = app_with(Page::Html(html), RecordingNotifier::new());

    let (status, json) = get(&app, "/scan").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    assert_eq!(json["message"], "Manual scan completed. Found 1 signals.");
    assert_eq!(json["data"][0]["symbol"], "BTCUSDT");
    assert_eq!(json["data"][0]["signal"], "Potential Buy Signal");
    assert_eq!(json["newSignals"], 1);
    assert!(json["timestamp"].is_string());
}

#[tokio::test]
async fn test_scan_endpoint_failed_render_is_empty_success() {
    let notifier = RecordingNotifier::new();
    let app = app_with(Page::LaunchFailure, notifier.clone());

    let (status, json) = get(&app, "/scan").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"].as_array().unwrap().len(), 0);
    assert!(notifier.sent()[0].contains("Browser launch failed"));
}

#[tokio::test]
async fn test_scan_endpoint_conflict_while_running() {
    let gate = Arc::new(Notify::new());
    let html = table(&[&["BTCUSDT", "50000", "+2%", "1M"]]);
    let scanner = scanner(
        FakeRenderer::new(Page::Gate(gate.clone(), html)),
        RecordingNotifier::new(),
        Duration::from_secs(3600),
    );
    let app = build_router(AppState::new(scanner.clone()));

    let mut stages = scanner.subscribe();
    let running = tokio::spawn({
        let scanner = scanner.clone();
        async move { scanner.run(screener_signals::types::Trigger::Timer).await }
    });
    stages
        .wait_for(|s| *s == screener_signals::types::ScanStage::Rendering)
        .await
        .unwrap();

    let (status, json) = get(&app, "/scan").await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["success"], false);
    assert_eq!(json["message"], "Scan failed");
    assert_eq!(json["error"], "A scan is already in progress");

    gate.notify_one();
    running.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_test_endpoint() {
    let notifier = RecordingNotifier::new();
    let app = app_with(Page::Html(String::new()), notifier.clone());

    let (status, json) = get(&app, "/test").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    assert!(notifier.sent()[0].starts_with("🧪 Test message"));

    notifier.set_failing(true);
    let (status, json) = get(&app, "/test").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["success"], false);
    assert_eq!(json["error"], "Telegram rejected message (502): Bad Gateway");
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = app_with(Page::Html(String::new()), RecordingNotifier::new());

    let (status, json) = get(&app, "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "✅ Healthy");
    assert_eq!(json["service"], "TradingView Scanner");
    assert!(json["uptime"].as_f64().unwrap() >= 0.0);
    assert!(json["timestamp"].is_string());
}

#[tokio::test]
async fn test_status_endpoint() {
    let html = table(&[&["BTCUSDT", "50000", "+2%", "1M"]]);
    let app = app_with(Page::Html(html), RecordingNotifier::new());
    get(&app, "/scan").await;

    let (status, json) = get(&app, "/api/status").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["scanner"]["stage"], "idle");
    assert_eq!(json["scanner"]["inProgress"], false);
    assert_eq!(json["scanner"]["seenSignals"], 1);
    assert_eq!(json["scanner"]["stats"]["scansCompleted"], 1);
    assert_eq!(json["scanner"]["stats"]["signalsDelivered"], 1);
}
