pub mod app;
pub mod config;
pub mod error;
pub mod store_client;
pub mod templ_manager;
pub mod web;

// re-export
pub use app::{serve, App, AppState};
pub use error::{Error, Result};
pub use store_client::RecordStoreClient;

use tracing_subscriber::{fmt::format::FmtSpan, EnvFilter};

/// Compact console subscriber used in debug builds.
pub fn init_dbg_tracing() {
    tracing_subscriber::fmt()
        .without_time()
        .with_span_events(FmtSpan::CLOSE)
        .with_target(false)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")))
        .compact()
        .init();
}

/// Plain subscriber used in release builds.
pub fn init_production_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
}
