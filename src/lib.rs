pub mod config;
pub mod deduplication;
pub mod digest;
pub mod error;
pub mod extractor;
pub mod renderer;
pub mod routes;
pub mod scanner;
pub mod signal;
pub mod telegram;
pub mod types;

pub use routes::{build_router, AppState};
pub use scanner::ScreenerScanner;
