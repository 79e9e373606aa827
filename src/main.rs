//! dupe - CLI Entry Point
//!
//! Finds images with identical pixel content across one or more folders.
//!
//! This binary is a thin wrapper around the library, handling argument parsing,
//! logging setup, and command dispatch.

use anyhow::{Context, Result};
use clap::Parser;
use image_dupe::cli::{self, build_logger, Args, ProgressLogger};
use image_dupe::core::config::Config;
use indicatif::MultiProgress;
use log::info;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

fn main() -> Result<()> {
    let args = Args::parse();

    // Load configuration
    let mut config = if let Some(ref config_path) = args.config {
        match Config::load(config_path) {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("Warning: Failed to load config file: {}", e);
                Config::default()
            }
        }
    } else {
        Config::load_default().unwrap_or_else(|e| {
            eprintln!("Warning: {}", e);
            Config::default()
        })
    };

    // Apply CLI overrides to config
    args.apply_to(&mut config);

    // Set up graceful shutdown handler
    let shutdown_flag = Arc::new(AtomicBool::new(false));
    let shutdown_flag_clone = shutdown_flag.clone();

    ctrlc::set_handler(move || {
        if shutdown_flag_clone.load(Ordering::SeqCst) {
            // Second Ctrl+C - force exit
            eprintln!("\nForce shutdown requested. Exiting immediately...");
            std::process::exit(1);
        } else {
            shutdown_flag_clone.store(true, Ordering::SeqCst);
            eprintln!("\nStopping after the current file... (Press Ctrl+C again to force quit)");
        }
    })
    .context("Failed to set Ctrl+C handler")?;

    // Log lines and the scan spinner share one draw target
    let multi = MultiProgress::new();
    init_logging(&config, &multi)?;

    info!("dupe v{}", image_dupe::VERSION);

    // Run the command
    cli::run_command(&args, &config, shutdown_flag, &multi)?;

    Ok(())
}

/// Initialize the logger from the logging configuration.
///
/// `RUST_LOG` is applied on top of the configured level in both modes.
fn init_logging(config: &Config, multi: &MultiProgress) -> Result<()> {
    let filters = std::env::var("RUST_LOG").ok();
    let logger = build_logger(&config.logging, filters.as_deref()).with_context(|| {
        format!(
            "Failed to open log file {}",
            config.logging.log_file.display()
        )
    })?;

    ProgressLogger::new(logger, multi.clone())
        .install()
        .context("Failed to install logger")?;

    if config.logging.log_to_file {
        info!("Logging to file: {}", config.logging.log_file.display());
    }

    Ok(())
}
