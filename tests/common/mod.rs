#![allow(dead_code)]

use async_trait::async_trait;
use screener_signals::error::{DeliveryError, RenderError};
use screener_signals::renderer::{with_deadline, PageRenderer};
use screener_signals::telegram::Notifier;
use screener_signals::ScreenerScanner;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;

pub const SCREENER_URL: &str = "https://screener.test/cex";

pub enum Page {
    Html(String),
    /// Never finishes loading; the renderer's deadline has to cut it off.
    Hang(Duration),
    /// Blocks until released, for overlapping-trigger tests.
    Gate(Arc<Notify>, String),
    LaunchFailure,
}

pub struct FakeRenderer {
    pub page: Page,
    pub calls: Mutex<usize>,
}

impl FakeRenderer {
    pub fn new(page: Page) -> Arc<Self> {
        Arc::new(Self { page, calls: Mutex::new(0) })
    }
}

#[async_trait]
impl PageRenderer for FakeRenderer {
    async fn render(&self, url: &str) -> Result<String, RenderError> {
        *self.calls.lock().unwrap() += 1;
        match &self.page {
            Page::Html(html) => Ok(html.clone()),
            Page::Hang(deadline) => {
                with_deadline(url, *deadline, async {
                    std::future::pending::<()>().await;
                    Ok(String::new())
                })
                .await
            }
            Page::Gate(gate, html) => {
                gate.notified().await;
                Ok(html.clone())
            }
            Page::LaunchFailure => Err(RenderError::Launch("no chrome binary".into())),
        }
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: Mutex<Vec<String>>,
    pub attempts: Mutex<usize>,
    pub failing: Mutex<bool>,
}

impl RecordingNotifier {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set_failing(&self, failing: bool) {
        *self.failing.lock().unwrap() = failing;
    }

    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }

    pub fn attempts(&self) -> usize {
        *self.attempts.lock().unwrap()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, text: &str) -> Result<(), DeliveryError> {
        *self.attempts.lock().unwrap() += 1;
        if *self.failing.lock().unwrap() {
            return Err(DeliveryError::Rejected { status: 502, body: "Bad Gateway".into() });
        }
        self.sent.lock().unwrap().push(text.to_string());
        Ok(())
    }
}

pub fn scanner(
    renderer: Arc<FakeRenderer>,
    notifier: Arc<RecordingNotifier>,
    dedup_window: Duration,
) -> Arc<ScreenerScanner> {
    Arc::new(ScreenerScanner::new(SCREENER_URL, renderer, notifier, dedup_window))
}

/// Builds a screener-like table, one `<tr>` per row of cells.
pub fn table(rows: &[&[&str]]) -> String {
    let body: String = rows
        .iter()
        .map(|cells| {
            let tds: String = cells.iter().map(|c| format!("<td>{c}</td>")).collect();
            format!("<tr>{tds}</tr>")
        })
        .collect();
    format!(
        "<html><body><table><thead><tr><th>Symbol</th><th>Price</th><th>Change</th><th>Volume</th></tr></thead>\
         <tbody>{body}</tbody></table></body></html>"
    )
}
