//! Telegram message bodies (HTML parse mode).

use crate::types::Signal;
use chrono::{DateTime, Utc};
use std::borrow::Cow;
use std::fmt::Write;
use std::time::Duration;

/// Signal blocks rendered per digest; the rest only count towards the total.
pub const MAX_SIGNALS_SHOWN: usize = 8;

const DIVIDER: &str = "━━━━━━━━━━━━━━━━━━━━";

pub const TEST_MESSAGE: &str =
    "🧪 Test message from Trading Scanner Bot\nIf you receive this, your bot is working! ✅";

pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

pub fn format_digest(signals: &[Signal], scanned_at: DateTime<Utc>, max: usize) -> String {
    let mut message = String::from("🎯 <b>TRADING SIGNALS FOUND</b> 🎯\n\n");
    let _ = writeln!(message, "⏰ <i>Scan Time: {}</i>", format_timestamp(scanned_at));
    let _ = writeln!(message, "📊 <i>Total Signals: {}</i>\n", signals.len());

    for signal in signals.iter().take(max) {
        let _ = writeln!(message, "🔥 <b>{}</b>", escape_html(&signal.symbol));
        let _ = writeln!(message, "💰 Price: {}", escape_html(&signal.price));
        let _ = writeln!(message, "📈 Change: {}", escape_html(&signal.change));
        let _ = writeln!(message, "📊 Volume: {}", escape_html(&signal.volume));
        let _ = writeln!(message, "⭐ {}", escape_html(&signal.label));
        let _ = writeln!(message, "{}\n", DIVIDER);
    }
    message
}

pub fn format_error(error: &dyn std::fmt::Display) -> String {
    format!("❌ Scanner Error: {}", escape_html(&error.to_string()))
}

pub fn startup_message(interval: Duration, started_at: DateTime<Utc>) -> String {
    format!(
        "🤖 Trading Scanner Bot Started Successfully!\n\n\
         ✅ Monitoring TradingView Screener\n\
         ✅ Scanning every {}\n\
         ✅ Sending signals to Telegram\n\n\
         ⏰ Started at: {}",
        describe_interval(interval),
        format_timestamp(started_at)
    )
}

fn describe_interval(interval: Duration) -> String {
    match interval.as_secs() {
        60 => "minute".to_string(),
        s if s % 60 == 0 => format!("{} minutes", s / 60),
        s => format!("{} seconds", s),
    }
}

fn escape_html(text: &str) -> Cow<'_, str> {
    if !text.contains(['&', '<', '>']) {
        return Cow::Borrowed(text);
    }
    Cow::Owned(text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;"))
}
