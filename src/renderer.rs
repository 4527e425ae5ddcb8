//! Page rendering through a headless Chrome instance.
//!
//! Every call launches its own browser and closes it before returning, on
//! success and failure alike. Nothing is shared between calls.

use crate::config::RenderConfig;
use crate::error::RenderError;
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use futures_util::StreamExt;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, info, warn};

const CHROME_ARGS: &[&str] = &[
    "--disable-setuid-sandbox",
    "--disable-dev-shm-usage",
    "--disable-accelerated-2d-canvas",
    "--no-first-run",
    "--no-zygote",
    "--disable-gpu",
];

/// Time a closing browser gets to exit before it is killed.
pub const TEARDOWN_GRACE: Duration = Duration::from_secs(10);

/// Produces the HTML of a page after its client-side scripts have run.
#[async_trait]
pub trait PageRenderer: Send + Sync {
    async fn render(&self, url: &str) -> Result<String, RenderError>;
}

pub struct ChromeRenderer {
    config: RenderConfig,
}

impl ChromeRenderer {
    pub fn new(config: RenderConfig) -> Self {
        Self { config }
    }

    fn browser_config(&self) -> Result<BrowserConfig, RenderError> {
        let mut builder = BrowserConfig::builder()
            .no_sandbox()
            .args(CHROME_ARGS.iter().copied())
            .arg(format!("--user-agent={}", self.config.user_agent))
            .request_timeout(self.config.navigation_timeout);
        if let Some(path) = &self.config.executable {
            builder = builder.chrome_executable(path);
        }
        builder.build().map_err(RenderError::Launch)
    }

    async fn snapshot(&self, browser: &Browser, url: &str) -> Result<String, RenderError> {
        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| RenderError::Navigation(e.to_string()))?;

        info!("Navigating to {}", url);
        with_deadline(url, self.config.navigation_timeout, async {
            page.goto(url).await.map(|_| ()).map_err(|e| RenderError::Navigation(e.to_string()))
        })
        .await?;

        debug!("Page loaded, settling for {:?}", self.config.settle_delay);
        tokio::time::sleep(self.config.settle_delay).await;

        page.content().await.map_err(|e| RenderError::Navigation(e.to_string()))
    }
}

#[async_trait]
impl PageRenderer for ChromeRenderer {
    async fn render(&self, url: &str) -> Result<String, RenderError> {
        let (mut browser, mut handler) = Browser::launch(self.browser_config()?)
            .await
            .map_err(|e| RenderError::Launch(e.to_string()))?;

        let events = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!("CDP handler error: {}", e);
                }
            }
        });

        let budget = self.config.navigation_timeout + self.config.settle_delay;
        let snapshot = with_deadline(url, budget, self.snapshot(&browser, url)).await;

        teardown(&mut browser, TEARDOWN_GRACE).await;
        events.abort();

        if let Ok(html) = &snapshot {
            info!("Rendered {} ({} bytes)", url, html.len());
        }
        snapshot
    }
}

/// The lifecycle calls [`teardown`] needs from a launched browser.
#[async_trait]
pub trait BrowserProcess: Send {
    async fn close(&mut self) -> Result<(), String>;
    async fn kill(&mut self);
    async fn wait(&mut self) -> std::io::Result<()>;
}

#[async_trait]
impl BrowserProcess for Browser {
    async fn close(&mut self) -> Result<(), String> {
        Browser::close(self).await.map(|_| ()).map_err(|e| e.to_string())
    }

    async fn kill(&mut self) {
        if let Some(Err(e)) = Browser::kill(self).await {
            warn!("Failed to kill browser process: {}", e);
        }
    }

    async fn wait(&mut self) -> std::io::Result<()> {
        Browser::wait(self).await.map(|_| ())
    }
}

/// Closes the browser and reaps its process, killing it when it does not go
/// quietly. Never waits longer than `grace` per step.
pub async fn teardown<B: BrowserProcess>(browser: &mut B, grace: Duration) {
    let closed = match tokio::time::timeout(grace, browser.close()).await {
        Ok(Ok(())) => true,
        Ok(Err(e)) => {
            warn!("Failed to close browser cleanly: {}", e);
            false
        }
        Err(_) => {
            warn!("Browser close timed out after {:?}", grace);
            false
        }
    };
    if !closed {
        browser.kill().await;
    }

    match tokio::time::timeout(grace, browser.wait()).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => warn!("Failed to reap browser process: {}", e),
        Err(_) => {
            warn!("Browser still running {:?} after close, killing it", grace);
            browser.kill().await;
        }
    }
}

/// Runs `fut`, mapping an elapsed deadline to [`RenderError::Timeout`].
pub async fn with_deadline<T, F>(url: &str, after: Duration, fut: F) -> Result<T, RenderError>
where
    F: Future<Output = Result<T, RenderError>>,
{
    tokio::time::timeout(after, fut)
        .await
        .map_err(|_| RenderError::Timeout { url: url.to_string(), after })?
}
