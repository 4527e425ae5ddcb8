use std::time::Duration;

/// Failures while obtaining the rendered page.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("Navigation to {url} timed out after {}s", .after.as_secs())]
    Timeout { url: String, after: Duration },

    #[error("Browser launch failed: {0}")]
    Launch(String),

    #[error("Navigation failed: {0}")]
    Navigation(String),
}

/// Failures while delivering a message to the chat endpoint.
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error("Telegram request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Telegram rejected message ({status}): {body}")]
    Rejected { status: u16, body: String },
}

#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Delivery(#[from] DeliveryError),

    #[error("A scan is already in progress")]
    InProgress,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} is required")]
    Missing(&'static str),

    #[error("{var} has invalid value {value:?}")]
    Invalid { var: &'static str, value: String },
}
