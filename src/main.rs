use screener_signals::{
    build_router,
    config::Config,
    renderer::ChromeRenderer,
    telegram::TelegramClient,
    AppState, ScreenerScanner,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("screener_signals=info")),
        )
        .init();

    info!("==================================================");
    info!("  TRADING SCANNER BOT - Rust Edition");
    info!("==================================================");

    let config = Config::from_env()?;
    info!("Target URL: {}", config.render.url);
    info!("Telegram chat: {}", config.telegram.chat_id);

    let notifier = Arc::new(TelegramClient::new(&config.telegram)?);
    let renderer = Arc::new(ChromeRenderer::new(config.render.clone()));
    let scanner = Arc::new(ScreenerScanner::new(
        config.render.url.clone(),
        renderer,
        notifier,
        config.dedup_window,
    ));

    let announcer = Arc::clone(&scanner);
    let (delay, interval) = (config.startup_notify_delay, config.scan_interval);
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        announcer.announce_startup(interval).await;
    });

    tokio::spawn(Arc::clone(&scanner).run_schedule(config.initial_scan_delay, config.scan_interval));

    let app = build_router(AppState::new(scanner)).layer(
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
    );

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port)).await?;
    info!("🚀 Server running on port {}", config.port);
    axum::serve(listener, app).await?;
    Ok(())
}
