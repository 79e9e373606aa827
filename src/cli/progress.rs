//! Progress and console output utilities
//!
//! Key features:
//! - A scan spinner fed by scanner progress
//! - A logger that clears the spinner while a log line is written
//! - Consistent visual styling for summaries
//! - A writer that sends log output to the console and a file

use crate::core::config::LoggingConfig;
use crate::core::scanner::ScanProgress;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use log::{LevelFilter, Log, Metadata, Record};
use std::fs::OpenOptions;
use std::io::Write;
use std::time::{Duration, Instant};

// ============================================================================
// Styles - Consistent visual appearance
// ============================================================================

/// Get the spinner style for scanning operations
fn spinner_style() -> ProgressStyle {
    ProgressStyle::default_spinner()
        .template("{spinner:.cyan} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_chars("⣾⣽⣻⢿⡿⣟⣯⣷")
}

// ============================================================================
// Console output helpers
// ============================================================================

/// Print a header section with a box
pub fn print_header(title: &str) {
    let width = 68;
    let title_padded = format!("{:^width$}", title, width = width - 2);
    println!();
    println!("╔{}╗", "═".repeat(width - 2));
    println!("║{}║", title_padded);
    println!("╚{}╝", "═".repeat(width - 2));
    println!();
}

/// Print a success message with checkmark
pub fn print_success(msg: &str) {
    println!("  ✓ {}", msg);
}

/// Print an info message with bullet
pub fn print_info(msg: &str) {
    println!("  • {}", msg);
}

/// Print a warning message
pub fn print_warning(msg: &str) {
    println!("  ⚠ {}", msg);
}

/// Print an error message
pub fn print_error(msg: &str) {
    println!("  ✗ {}", msg);
}

// ============================================================================
// Spinner for scan operations
// ============================================================================

/// Spinner shown while folders are scanned
pub struct ScanSpinner {
    spinner: ProgressBar,
    start_time: Instant,
}

impl ScanSpinner {
    /// Create a new spinner drawn through `multi`.
    ///
    /// A `hidden` spinner draws nothing (used for JSON output) and is kept
    /// out of `multi`, which would otherwise give it a visible target.
    pub fn new(multi: &MultiProgress, hidden: bool) -> Self {
        let spinner = if hidden {
            ProgressBar::hidden()
        } else {
            multi.add(ProgressBar::new_spinner())
        };
        spinner.set_style(spinner_style());
        spinner.enable_steady_tick(Duration::from_millis(100));
        spinner.set_message("Scanning folders...");

        Self {
            spinner,
            start_time: Instant::now(),
        }
    }

    /// Update the message from scanner progress
    pub fn update(&self, progress: &ScanProgress) {
        self.spinner.set_message(format!(
            "Folder {}/{}: {} file(s) checked, {} duplicate(s) - {}s elapsed",
            progress.folder + 1,
            progress.folders_total,
            progress.files_checked,
            progress.duplicates,
            self.start_time.elapsed().as_secs()
        ));
    }

    /// Finish and clear the progress display
    pub fn finish(&self) {
        self.spinner.finish_and_clear();
    }
}

// ============================================================================
// Logger that cooperates with progress bars
// ============================================================================

/// Wraps the env_logger logger so every record is written while the bars
/// drawn through `multi` are suspended.
pub struct ProgressLogger {
    inner: env_logger::Logger,
    multi: MultiProgress,
}

impl ProgressLogger {
    pub fn new(inner: env_logger::Logger, multi: MultiProgress) -> Self {
        Self { inner, multi }
    }

    /// Install as the global logger, keeping the inner logger's level filter
    pub fn install(self) -> Result<(), log::SetLoggerError> {
        let level = self.inner.filter();
        log::set_boxed_logger(Box::new(self))?;
        log::set_max_level(level);
        Ok(())
    }
}

/// Build the env_logger logger described by `logging`.
///
/// `filters` uses `RUST_LOG` syntax and refines the configured level in
/// both console and file mode.
pub fn build_logger(
    logging: &LoggingConfig,
    filters: Option<&str>,
) -> std::io::Result<env_logger::Logger> {
    let level = match logging.level.to_lowercase().as_str() {
        "error" => LevelFilter::Error,
        "warn" => LevelFilter::Warn,
        "info" => LevelFilter::Info,
        "debug" => LevelFilter::Debug,
        "trace" => LevelFilter::Trace,
        _ => LevelFilter::Info,
    };

    let mut builder = env_logger::Builder::new();
    builder.filter_level(level);

    if logging.log_to_file {
        // Console and file
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&logging.log_file)?;

        builder
            .format(|buf, record| {
                writeln!(
                    buf,
                    "[{} {} {}] {}",
                    chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ"),
                    record.level(),
                    record.target(),
                    record.args()
                )
            })
            .target(env_logger::Target::Pipe(Box::new(DualWriter {
                console: std::io::stderr(),
                file,
            })));
    }

    if let Some(filters) = filters {
        builder.parse_filters(filters);
    }

    Ok(builder.build())
}

impl Log for ProgressLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        self.inner.enabled(metadata)
    }

    fn log(&self, record: &Record) {
        if self.inner.enabled(record.metadata()) {
            self.multi.suspend(|| self.inner.log(record));
        }
    }

    fn flush(&self) {
        self.inner.flush();
    }
}

// ============================================================================
// Utility functions
// ============================================================================

/// Format duration as human-readable string
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs >= 3600 {
        let hours = secs / 3600;
        let mins = (secs % 3600) / 60;
        format!("{}h {}m", hours, mins)
    } else if secs >= 60 {
        let mins = secs / 60;
        let secs = secs % 60;
        format!("{}m {}s", mins, secs)
    } else {
        format!("{:.1}s", duration.as_secs_f64())
    }
}

// ============================================================================
// Dual writer for file + console logging
// ============================================================================

/// A writer that writes to both console and file
///
/// Used for logging to both stderr and a log file simultaneously.
pub struct DualWriter {
    pub console: std::io::Stderr,
    pub file: std::fs::File,
}

impl Write for DualWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        // Console output is best effort; the file is authoritative
        let _ = self.console.write(buf);
        self.file.write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        let _ = self.console.flush();
        self.file.flush()
    }
}

// ============================================================================
// Tests
// ============================================================================
