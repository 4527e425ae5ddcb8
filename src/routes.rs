//! HTTP trigger surface.

use crate::error::ScanError;
use crate::scanner::ScreenerScanner;
use crate::types::Trigger;
use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use chrono::Utc;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

pub const SERVICE_NAME: &str = "TradingView Scanner";

#[derive(Clone)]
pub struct AppState {
    pub scanner: Arc<ScreenerScanner>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(scanner: Arc<ScreenerScanner>) -> Self {
        Self { scanner, started_at: Instant::now() }
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/scan", get(scan))
        .route("/test", get(test_notification))
        .route("/health", get(health))
        .route("/api/status", get(status))
        .with_state(state)
}

fn error_status(e: &ScanError) -> StatusCode {
    match e {
        ScanError::InProgress => StatusCode::CONFLICT,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

async fn scan(State(state): State<AppState>) -> impl IntoResponse {
    info!("🔍 Manual scan triggered");
    match state.scanner.run(Trigger::Manual).await {
        Ok(report) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "success": true,
                "message": format!("Manual scan completed. Found {} signals.", report.signals.len()),
                "data": report.signals,
                "newSignals": report.new_signals,
                "timestamp": Utc::now().to_rfc3339()
            })),
        ),
        Err(e) => (
            error_status(&e),
            Json(serde_json::json!({
                "success": false,
                "message": "Scan failed",
                "error": e.to_string()
            })),
        ),
    }
}

async fn test_notification(State(state): State<AppState>) -> impl IntoResponse {
    match state.scanner.send_test().await {
        Ok(()) => (
            StatusCode::OK,
            Json(serde_json::json!({"success": true, "message": "Test message sent to Telegram"})),
        ),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({"success": false, "error": e.to_string()})),
        ),
    }
}

async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "✅ Healthy",
        "service": SERVICE_NAME,
        "timestamp": Utc::now().to_rfc3339(),
        "uptime": state.started_at.elapsed().as_secs_f64()
    }))
}

async fn status(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({ "scanner": state.scanner.status().await }))
}
