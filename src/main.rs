//! AI Fellowship Chat server
//!
//! Entry point: loads configuration, installs tracing and serves the chat UI.

use std::sync::Arc;

use anyhow::Context;
use dotenvy::dotenv;
use mimalloc::MiMalloc;

use fellowship_chat::config::AppConfig;
use fellowship_chat::{server, telemetry};

/// Global allocator for improved performance (M-MIMALLOC-APPS).
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env (if present)
    let _ = dotenv();

    let config = AppConfig::load().context("Configuration error")?;
    telemetry::init_tracing(config.log.format)?;

    server::start_server(Arc::new(config)).await
}
