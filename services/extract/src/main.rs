//! Waymo image extraction CLI
//!
//! ```text
//! waymo-extract waymo-images/train --views front side_left --split training --sample 10
//! ```
//!
//! Saves every 10th frame of the front and side-left cameras of the training
//! split into `waymo-images/train`.
//!
//! # Configuration
//!
//! Configuration is loaded from:
//! 1. Configuration files (config/extract.toml, /etc/waymo-extract/extract.toml)
//! 2. Environment variables (prefixed with EXTRACT__)
//!
//! See `config.rs` for detailed configuration options.

use anyhow::Context;
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use waymo_extract::cli::Args;
use waymo_extract::config::{ExtractConfig, LoggingConfig};
use waymo_extract::{Extractor, GsutilStore, RunStats};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Load configuration
    let config = ExtractConfig::load().context("Failed to load configuration")?;

    // Initialize logging
    init_logging(&config.logging)?;

    // Validate configuration
    config.validate()?;

    let request = args.into_request();
    let views: Vec<&str> = request.views.iter().map(|view| view.name()).collect();

    info!(
        service = "waymo-extract",
        version = env!("CARGO_PKG_VERSION"),
        bucket = %config.storage.bucket,
        split = %request.split,
        views = ?views,
        sample = request.sampler.stride(),
        "Starting image extraction"
    );

    let store = GsutilStore::new(&config.storage);
    let extractor = Extractor::new(store, config, request);

    let stats = extractor.run().await.context("Extraction failed")?;
    log_final_stats(&stats);

    Ok(())
}

/// Initialize the tracing/logging subsystem.
fn init_logging(config: &LoggingConfig) -> anyhow::Result<()> {
    let level = match config.level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let filter = EnvFilter::from_default_env()
        .add_directive(format!("waymo_extract={}", level).parse()?);

    let subscriber = tracing_subscriber::registry().with(filter);

    if config.format == "json" {
        subscriber.with(fmt::layer().json()).init();
    } else {
        subscriber.with(fmt::layer().pretty()).init();
    }

    Ok(())
}

/// Log final statistics.
fn log_final_stats(stats: &RunStats) {
    info!(
        shards_listed = stats.shards_listed,
        shards_processed = stats.shards_processed,
        records_read = stats.records_read,
        frames_kept = stats.frames_kept,
        images_written = stats.images_written,
        unknown_views = stats.unknown_views,
        "Extraction complete"
    );
}
