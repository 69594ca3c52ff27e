//! Glossy Travel server
//!
//! Entry point for the travel-planning chat service.

// Allow pedantic clippy warnings that don't add value for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::map_err_ignore)]
#![allow(clippy::manual_let_else)]

use mimalloc::MiMalloc;

/// Global allocator for improved performance (M-MIMALLOC-APPS).
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

use std::sync::Arc;

use anyhow::Context;
use dotenvy::dotenv;
use tracing::{info, warn};

use glossy_travel::config::AppConfig;
use glossy_travel::genai::{GeminiClient, TravelModel};
use glossy_travel::{server, telemetry};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env (if present) before reading configuration
    let _ = dotenv();

    let config = AppConfig::load().context("Failed to load configuration")?;

    // Initialize tracing (M-LOG-STRUCTURED)
    telemetry::init(&config.logging);

    let settings = config.genai_settings();
    if settings.api_key.is_none() {
        warn!(
            name: "genai.api_key.missing",
            "No API key configured; model calls will be rejected upstream"
        );
    }
    info!(
        name: "config.loaded",
        host = %config.server.host,
        port = config.server.port,
        static_dir = %config.server.static_dir,
        "Configuration loaded"
    );

    let model: Arc<dyn TravelModel> = Arc::new(GeminiClient::new(settings));

    server::start_server(Arc::new(config), model)
        .await
        .context("Server terminated with an error")
}
