use crate::error::ConfigError;
use std::{env, str::FromStr, time::Duration};

pub const DEFAULT_SCREENER_URL: &str = "https://www.tradingview.com/cex-screener/";
pub const DEFAULT_TELEGRAM_API_URL: &str = "https://api.telegram.org";

/// Desktop Chrome identity presented to the screener.
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub telegram: TelegramConfig,
    pub render: RenderConfig,
    pub scan_interval: Duration,
    pub dedup_window: Duration,
    pub startup_notify_delay: Duration,
    pub initial_scan_delay: Duration,
}

#[derive(Debug, Clone)]
pub struct TelegramConfig {
    pub api_url: String,
    pub bot_token: String,
    pub chat_id: String,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct RenderConfig {
    pub url: String,
    pub navigation_timeout: Duration,
    pub settle_delay: Duration,
    pub user_agent: String,
    pub executable: Option<String>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_SCREENER_URL.into(),
            navigation_timeout: Duration::from_secs(60),
            settle_delay: Duration::from_secs(10),
            user_agent: USER_AGENT.into(),
            executable: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup; `from_env` passes the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let required = |key: &'static str| get(key).ok_or(ConfigError::Missing(key));
        let secs = |key: &'static str, default: u64| parse_or(get(key), key, default).map(Duration::from_secs);

        let scan_interval = secs("SCAN_INTERVAL_SECS", 300)?;
        if scan_interval.is_zero() {
            return Err(ConfigError::Invalid { var: "SCAN_INTERVAL_SECS", value: "0".into() });
        }

        Ok(Self {
            port: parse_or(get("PORT"), "PORT", 3000)?,
            telegram: TelegramConfig {
                api_url: get("TELEGRAM_API_URL").unwrap_or(DEFAULT_TELEGRAM_API_URL.into()),
                bot_token: required("TELEGRAM_BOT_TOKEN")?,
                chat_id: required("TELEGRAM_CHAT_ID")?,
                timeout: secs("NOTIFY_TIMEOUT_SECS", 15)?,
            },
            render: RenderConfig {
                url: get("TRADINGVIEW_URL").unwrap_or(DEFAULT_SCREENER_URL.into()),
                navigation_timeout: secs("NAVIGATION_TIMEOUT_SECS", 60)?,
                settle_delay: secs("SETTLE_DELAY_SECS", 10)?,
                user_agent: USER_AGENT.into(),
                executable: get("CHROME_EXECUTABLE"),
            },
            scan_interval,
            dedup_window: secs("DEDUP_WINDOW_SECS", 3600)?,
            startup_notify_delay: secs("STARTUP_NOTIFY_DELAY_SECS", 5)?,
            initial_scan_delay: secs("INITIAL_SCAN_DELAY_SECS", 10)?,
        })
    }
}

fn parse_or<T: FromStr>(raw: Option<String>, var: &'static str, default: T) -> Result<T, ConfigError> {
    match raw {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|_| ConfigError::Invalid { var, value }),
    }
}
