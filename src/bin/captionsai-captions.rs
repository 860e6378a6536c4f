// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! CaptionsAI Caption Service
//!
//! REST server for caption generation (single, multi-platform and batch).

use clap::Parser;
use tracing::info;

use captionsai::config::AppConfig;
use captionsai::Result;

#[derive(Parser, Debug)]
#[command(name = "captionsai-captions")]
#[command(author = "Jonathan D. A. Jewell <hyperpolymath>")]
#[command(version = "1.0.0")]
#[command(about = "CaptionsAI caption generation service")]
struct Args {
    /// Host to bind to (overrides API_HOST)
    #[arg(short = 'H', long)]
    host: Option<String>,

    /// Port to listen on (overrides CAPTION_API_PORT)
    #[arg(short, long)]
    port: Option<u16>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = AppConfig::from_env()?;

    // Initialize tracing
    let filter = if args.verbose || config.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    info!("CaptionsAI Caption Service v{}", env!("CARGO_PKG_VERSION"));

    // Apply CLI overrides
    if let Some(host) = args.host {
        config.web.host = host;
    }
    if let Some(port) = args.port {
        config.web.caption_port = port;
    }

    config.api_key()?;
    info!("Vision model: {}, text model: {}", config.ai.model, config.ai.text_model);

    captionsai::web::start_caption_server(config).await
}
