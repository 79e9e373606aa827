//! Command handler implementations
//!
//! This module contains the implementation of all CLI commands.

use crate::cli::progress::{
    format_duration, print_error, print_header, print_info, print_success, print_warning,
    ScanSpinner,
};
use crate::cli::{Args, Commands};
use crate::core::config::{get_config_path, Config, ConfigError};
use crate::core::scanner::{fingerprint_file, ScanReport, Scanner};
use crate::duplicate::EntropySource;
use anyhow::{bail, Context, Result};
use indicatif::MultiProgress;
use log::{debug, info};
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;

/// Run the appropriate command based on CLI arguments
///
/// Progress bars are drawn through `multi`, the same handle the logger
/// suspends while it writes.
pub fn run_command(
    args: &Args,
    config: &Config,
    shutdown_flag: Arc<AtomicBool>,
    multi: &MultiProgress,
) -> Result<()> {
    match &args.command {
        Some(Commands::Fingerprint { files }) => fingerprint_files(files),
        Some(Commands::ShowConfig) => show_config(config),
        Some(Commands::GenerateConfig { output }) => generate_config_file(output.clone()),
        Some(Commands::ConfigPath) => {
            println!("{}", Config::get_active_config_path().display());
            Ok(())
        }
        None => {
            let report = scan_folders(config, &shutdown_flag, multi)?;
            if config.output.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_report(&report);
            }
            Ok(())
        }
    }
}

/// Scan the configured folders and return the report
fn scan_folders(
    config: &Config,
    shutdown_flag: &AtomicBool,
    multi: &MultiProgress,
) -> Result<ScanReport> {
    if config.scan.folders.is_empty() {
        bail!("No folders to scan. Pass one or more with -f/--folders or set scan.folders in the config file");
    }

    let mut entropy = EntropySource::from_config_seed(config.scan.seed);
    let spinner = ScanSpinner::new(multi, config.output.json);

    let result = Scanner::new(config.scan.clone()).run(&mut entropy, shutdown_flag, |progress| {
        spinner.update(progress)
    });
    spinner.finish();

    let report = result.context("Scan aborted")?;
    debug!("Run {} finished in {}ms", report.run_id, report.elapsed_ms);
    Ok(report)
}

/// Print a human-readable summary of a scan
fn print_report(report: &ScanReport) {
    print_header("Duplicate Scan Results");

    if report.duplicates.is_empty() {
        print_success("No duplicate images found");
    } else {
        println!("  Duplicates ({}):", report.duplicates.len());
        for pair in &report.duplicates {
            println!(
                "    {}  ==  {}",
                pair.original.display(),
                pair.duplicate.display()
            );
        }
        println!();
    }

    print_info(&format!("Run: {}", report.run_id));
    print_info(&format!("Folders scanned: {}", report.folders_scanned));
    print_info(&format!("Files checked: {}", report.files_checked));
    print_info(&format!("Unique images: {}", report.unique_images));
    print_info(&format!(
        "Time: {}",
        format_duration(Duration::from_millis(report.elapsed_ms))
    ));

    if report.open_failures > 0 {
        print_warning(&format!("{} file(s) could not be read", report.open_failures));
    }
    if report.decode_failures > 0 {
        print_warning(&format!(
            "{} file(s) are not PNG, JPEG or BMP images",
            report.decode_failures
        ));
    }
    for failure in &report.failed_folders {
        print_error(&format!(
            "Skipped folder {}: {}",
            failure.folder.display(),
            failure.error
        ));
    }
    if report.interrupted {
        print_warning("Scan was interrupted; results are partial");
    }
    println!();
}

/// Print the fingerprint of each file
fn fingerprint_files(files: &[PathBuf]) -> Result<()> {
    let mut failed = 0;

    for path in files {
        match fingerprint_file(path) {
            Ok(fp) => println!("{}  {}", fp, path.display()),
            Err(e) => {
                print_error(&e.to_string());
                failed += 1;
            }
        }
    }

    if failed > 0 {
        bail!("{} of {} file(s) could not be fingerprinted", failed, files.len());
    }
    Ok(())
}

/// Show the effective configuration as TOML
fn show_config(config: &Config) -> Result<()> {
    print_header("Current Configuration");
    print_info(&format!(
        "Config file: {}",
        Config::get_active_config_path().display()
    ));
    println!();
    println!("{}", config.to_toml()?);
    Ok(())
}

/// Write the commented default configuration
fn generate_config_file(output: Option<PathBuf>) -> Result<()> {
    let path = match output {
        Some(path) => path,
        None => get_config_path().ok_or(ConfigError::ConfigDirNotFound)?,
    };

    Config::write_default_config(&path)?;
    info!("Wrote default configuration to {}", path.display());
    print_success(&format!("Configuration written to {}", path.display()));
    Ok(())
}
