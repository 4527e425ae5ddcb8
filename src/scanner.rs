//! End-to-end screener scan: render, extract, classify, dedup, format, notify.

use crate::deduplication::Deduplicator;
use crate::digest::{self, MAX_SIGNALS_SHOWN};
use crate::error::{DeliveryError, ScanError};
use crate::extractor::RowExtractor;
use crate::renderer::PageRenderer;
use crate::signal::SignalClassifier;
use crate::telegram::Notifier;
use crate::types::{RawRow, ScanStage, Signal, Trigger};
use chrono::{DateTime, Utc};
use scraper::Html;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, RwLock};
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{error, info, warn};

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanReport {
    /// Every signal classified on the page, in page order.
    pub signals: Vec<Signal>,
    /// How many of them were new and went out in the digest.
    pub new_signals: usize,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanStats {
    pub scans_started: u64,
    pub scans_completed: u64,
    pub scans_failed: u64,
    pub scans_skipped: u64,
    pub signals_delivered: u64,
    pub last_scan_at: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScannerStatus {
    pub target_url: String,
    pub stage: ScanStage,
    pub in_progress: bool,
    pub dedup_enabled: bool,
    pub seen_signals: usize,
    pub stats: ScanStats,
}

/// Holds the "scan in progress" flag for the lifetime of one scan.
struct ScanGuard<'a>(&'a AtomicBool);

impl<'a> ScanGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for ScanGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct ScreenerScanner {
    url: String,
    renderer: Arc<dyn PageRenderer>,
    notifier: Arc<dyn Notifier>,
    extractor: RowExtractor,
    classifier: SignalClassifier,
    deduplicator: Deduplicator,
    in_progress: AtomicBool,
    stage: watch::Sender<ScanStage>,
    stats: RwLock<ScanStats>,
}

impl ScreenerScanner {
    pub fn new(
        url: impl Into<String>,
        renderer: Arc<dyn PageRenderer>,
        notifier: Arc<dyn Notifier>,
        dedup_window: Duration,
    ) -> Self {
        Self {
            url: url.into(),
            renderer,
            notifier,
            extractor: RowExtractor::default(),
            classifier: SignalClassifier,
            deduplicator: Deduplicator::new(dedup_window),
            in_progress: AtomicBool::new(false),
            stage: watch::channel(ScanStage::Idle).0,
            stats: RwLock::new(ScanStats::default()),
        }
    }

    pub fn stage(&self) -> ScanStage {
        *self.stage.borrow()
    }

    /// Receiver that observes every stage transition.
    pub fn subscribe(&self) -> watch::Receiver<ScanStage> {
        self.stage.subscribe()
    }

    fn set_stage(&self, stage: ScanStage) {
        self.stage.send_replace(stage);
    }

    /// Runs one scan unless another is already underway.
    ///
    /// Render and delivery failures never escape: they are reported to the
    /// chat (best effort) and an empty report is returned. The only error is
    /// [`ScanError::InProgress`].
    pub async fn run(&self, trigger: Trigger) -> Result<ScanReport, ScanError> {
        let Some(_guard) = ScanGuard::acquire(&self.in_progress) else {
            self.stats.write().await.scans_skipped += 1;
            warn!("{} scan ignored: another scan is in progress", trigger);
            return Err(ScanError::InProgress);
        };

        info!("🔍 Starting {} scan of {}", trigger, self.url);
        {
            let mut stats = self.stats.write().await;
            stats.scans_started += 1;
            stats.last_scan_at = Some(Utc::now());
        }

        match self.scan().await {
            Ok(report) => {
                self.set_stage(ScanStage::Idle);
                let mut stats = self.stats.write().await;
                stats.scans_completed += 1;
                stats.signals_delivered += report.new_signals as u64;
                Ok(report)
            }
            Err(e) => {
                self.set_stage(ScanStage::Failed);
                error!("❌ Scan failed: {}", e);
                {
                    let mut stats = self.stats.write().await;
                    stats.scans_failed += 1;
                    stats.last_error = Some(e.to_string());
                }
                self.notify_best_effort(&digest::format_error(&e)).await;
                Ok(ScanReport::default())
            }
        }
    }

    async fn scan(&self) -> Result<ScanReport, ScanError> {
        self.set_stage(ScanStage::Rendering);
        let html = self.renderer.render(&self.url).await?;

        let signals = self.classify_page(&html);
        info!("📈 Found {} potential signal(s)", signals.len());

        let fresh = self.deduplicator.filter_new(signals.clone()).await;
        if fresh.is_empty() {
            info!("No new signals in this scan");
            return Ok(ScanReport { signals, new_signals: 0 });
        }

        self.set_stage(ScanStage::Formatting);
        let message = digest::format_digest(&fresh, Utc::now(), MAX_SIGNALS_SHOWN);

        self.set_stage(ScanStage::Notifying);
        if let Err(e) = self.notifier.send(&message).await {
            self.deduplicator.release(&fresh).await;
            return Err(e.into());
        }

        // Only the shown blocks count as reported; the rest stay eligible for the next digest.
        let shown = fresh.len().min(MAX_SIGNALS_SHOWN);
        if let Some(unshown) = fresh.get(shown..).filter(|rest| !rest.is_empty()) {
            self.deduplicator.release(unshown).await;
            info!("{} signal(s) over the display cap held for the next scan", unshown.len());
        }

        info!("✅ Reported {} new signal(s)", shown);
        Ok(ScanReport { signals, new_signals: shown })
    }

    fn classify_page(&self, html: &str) -> Vec<Signal> {
        let rows = self.extract_rows(html);
        self.set_stage(ScanStage::Classifying);
        self.classifier.classify_all(rows)
    }

    /// Drains the extractor so the `Extracting` stage covers the whole table walk.
    fn extract_rows(&self, html: &str) -> Vec<RawRow> {
        self.set_stage(ScanStage::Extracting);
        let document = Html::parse_document(html);
        let rows = self.extractor.rows(&document).collect();
        rows
    }

    async fn notify_best_effort(&self, text: &str) {
        if let Err(e) = self.notifier.send(text).await {
            warn!("Could not report scan failure: {}", e);
        }
    }

    pub async fn send_test(&self) -> Result<(), DeliveryError> {
        self.notifier.send(digest::TEST_MESSAGE).await
    }

    pub async fn announce_startup(&self, interval: Duration) {
        let message = digest::startup_message(interval, Utc::now());
        match self.notifier.send(&message).await {
            Ok(()) => info!("Startup announcement sent"),
            Err(e) => warn!("Startup announcement failed: {}", e),
        }
    }

    pub async fn status(&self) -> ScannerStatus {
        ScannerStatus {
            target_url: self.url.clone(),
            stage: self.stage(),
            in_progress: self.in_progress.load(Ordering::Acquire),
            dedup_enabled: self.deduplicator.is_enabled(),
            seen_signals: self.deduplicator.seen_count().await,
            stats: self.stats.read().await.clone(),
        }
    }

    /// Fires a scan after `initial_delay` and then every `period`, forever.
    ///
    /// Ticks missed while a scan runs long are skipped rather than bursted.
    pub async fn run_schedule(self: Arc<Self>, initial_delay: Duration, period: Duration) {
        let mut ticker = tokio::time::interval_at(Instant::now() + initial_delay, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        info!("⏰ Scheduled scans every {:?}", period);

        loop {
            ticker.tick().await;
            match self.run(Trigger::Timer).await {
                Ok(report) => info!(
                    "Scheduled scan done: {} signal(s), {} new",
                    report.signals.len(),
                    report.new_signals
                ),
                Err(e) => warn!("Scheduled scan skipped: {}", e),
            }
        }
    }
}
