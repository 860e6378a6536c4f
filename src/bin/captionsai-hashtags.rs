// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! CaptionsAI Hashtag Service
//!
//! REST server for hashtag generation.

use clap::Parser;
use tracing::info;

use captionsai::config::AppConfig;
use captionsai::Result;

#[derive(Parser, Debug)]
#[command(name = "captionsai-hashtags")]
#[command(author = "Jonathan D. A. Jewell <hyperpolymath>")]
#[command(version = "1.0.0")]
#[command(about = "CaptionsAI hashtag generation service")]
struct Args {
    /// Host to bind to (overrides API_HOST)
    #[arg(short = 'H', long)]
    host: Option<String>,

    /// Port to listen on (overrides HASHTAG_API_PORT)
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

    info!("CaptionsAI Hashtag Service v{}", env!("CARGO_PKG_VERSION"));

    // Apply CLI overrides
    if let Some(host) = args.host {
        config.web.host = host;
    }
    if let Some(port) = args.port {
        config.web.hashtag_port = port;
    }

    config.api_key()?;
    info!("Vision model: {}", config.ai.model);

    captionsai::web::start_hashtag_server(config).await
}
