#![deny(missing_docs)]
//! Shared logging utilities for the image generation workspace.
//!
//! This crate provides the `imagegen_*` logging macros used across the codebase,
//! the logger setup used by the CLI and a minimal test initializer.

use std::fs::File;
use std::path::PathBuf;

use log::LevelFilter;
use simplelog::{
    ColorChoice, CombinedLogger, Config, ConfigBuilder, SharedLogger, TermLogger, TerminalMode,
    WriteLogger,
};

/// Logs a trace-level message using the global logging facade.
#[macro_export]
macro_rules! imagegen_trace {
    ($($arg:tt)*) => {{
        log::trace!($($arg)*);
    }};
}

/// Logs an info-level message using the global logging facade.
#[macro_export]
macro_rules! imagegen_info {
    ($($arg:tt)*) => {{
        log::info!($($arg)*);
    }};
}

/// Logs a debug-level message using the global logging facade.
#[macro_export]
macro_rules! imagegen_debug {
    ($($arg:tt)*) => {{
        log::debug!($($arg)*);
    }};
}

/// Logs a warn-level message using the global logging facade.
#[macro_export]
macro_rules! imagegen_warn {
    ($($arg:tt)*) => {{
        log::warn!($($arg)*);
    }};
}

/// Logs an error-level message using the global logging facade.
#[macro_export]
macro_rules! imagegen_error {
    ($($arg:tt)*) => {{
        log::error!($($arg)*);
    }};
}

/// Destination for log output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogDestination {
    /// Write to stderr/stdout through the terminal logger.
    Terminal,
    /// Write to the given file, truncating it on startup.
    File(PathBuf),
    /// Write to both the terminal and the given file.
    Both(PathBuf),
}

/// Logger settings chosen by the binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    /// Where log records go.
    pub destination: LogDestination,
    /// Maximum level that is emitted.
    pub level: LevelFilter,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            destination: LogDestination::Terminal,
            level: LevelFilter::Warn,
        }
    }
}

/// Initialize the global logger.
///
/// Returns `false` when no logger could be installed, either because one was
/// already set or because the log file could not be created and no other
/// destination was requested.
pub fn initialize(settings: LogSettings) -> bool {
    let config = build_config();
    let level = settings.level;

    let loggers: Vec<Box<dyn SharedLogger>> = match settings.destination {
        LogDestination::Terminal => vec![terminal_logger(level, config)],
        LogDestination::File(path) => match create_file_logger(level, config, path) {
            Some(file_logger) => vec![file_logger],
            None => return false,
        },
        LogDestination::Both(path) => {
            let mut loggers = vec![terminal_logger(level, config.clone())];
            if let Some(file_logger) = create_file_logger(level, config, path) {
                loggers.push(file_logger);
            }
            loggers
        }
    };

    CombinedLogger::init(loggers).is_ok()
}

/// Initializes a simple terminal logger for use in unit tests.
///
/// This safely no-ops if another logger has already been initialized.
pub fn initialize_for_tests() {
    // Use debug level in debug builds, info in release builds.
    let level = if cfg!(debug_assertions) {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    // Ignore the error if a logger was already set by another test.
    let _ = CombinedLogger::init(vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )]);
}

fn build_config() -> Config {
    ConfigBuilder::new()
        .set_time_format_rfc3339()
        .set_target_level(LevelFilter::Error)
        .build()
}

fn terminal_logger(level: LevelFilter, config: Config) -> Box<dyn SharedLogger> {
    let logger: Box<dyn SharedLogger> =
        TermLogger::new(level, config, TerminalMode::Stderr, ColorChoice::Auto);
    logger
}

fn create_file_logger(
    level: LevelFilter,
    config: Config,
    path: PathBuf,
) -> Option<Box<dyn SharedLogger>> {
    match File::create(&path) {
        Ok(file) => {
            let logger: Box<dyn SharedLogger> = WriteLogger::new(level, config, file);
            Some(logger)
        }
        Err(err) => {
            eprintln!("Warning: Could not create log file at {:?}: {}", path, err);
            None
        }
    }
}
