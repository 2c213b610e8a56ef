//! Logging system configuration and initialization
//!
//! - Console and/or file output
//! - Optional structured JSON logs
//! - Level from configuration, overridable with `RUST_LOG`
//! - Local time stamps

use anyhow::{Result, anyhow};
use chrono::Local;
use lazy_static::lazy_static;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::info;
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{
    EnvFilter, Registry,
    filter::Directive,
    fmt::{self, time::FormatTime},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

pub use crate::infrastructure::config::LoggingConfig;

const LOG_FILE_NAME: &str = "coin-search.log";

// Keeps the non-blocking file writers alive for the life of the process
lazy_static! {
    static ref LOG_GUARDS: Mutex<Vec<tracing_appender::non_blocking::WorkerGuard>> = Mutex::new(Vec::new());
}

struct LocalTimeFormatter;

impl FormatTime for LocalTimeFormatter {
    fn format_time(&self, w: &mut fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(w, "{}", Local::now().format("%Y-%m-%d %H:%M:%S%.3f"))
    }
}

/// Get the log directory relative to the executable location
pub fn get_log_directory() -> PathBuf {
    let exe_dir = std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(std::path::Path::to_path_buf))
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_default());

    exe_dir.join("logs")
}

/// Build the level filter: `RUST_LOG` wins, otherwise the configured level
/// plus the per-module directives that keep HTTP and HTML parser noise down.
pub fn build_env_filter(config: &LoggingConfig) -> Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }

    let mut filter = EnvFilter::try_new(&config.level)
        .map_err(|e| anyhow!("Invalid log level '{}': {}", config.level, e))?;

    // Dependency directives only apply below trace; trace shows everything
    if !config.level.eq_ignore_ascii_case("trace") {
        let mut modules: Vec<_> = config.module_filters.iter().collect();
        modules.sort();
        for (module, level) in modules {
            let directive: Directive = format!("{module}={level}")
                .parse()
                .map_err(|e| anyhow!("Invalid log directive for '{}': {}", module, e))?;
            filter = filter.add_directive(directive);
        }
    }

    let own: Directive = format!("coin_search_lib={}", config.level)
        .parse()
        .map_err(|e| anyhow!("Invalid log level '{}': {}", config.level, e))?;
    Ok(filter.add_directive(own))
}

/// Initialize logging with custom configuration
pub fn init_logging_with_config(config: &LoggingConfig) -> Result<()> {
    let env_filter = build_env_filter(config)?;
    let registry = Registry::default().with(env_filter);

    let log_dir = config.log_dir.clone().unwrap_or_else(get_log_directory);

    match (config.file_output, config.console_output) {
        (true, console) => {
            std::fs::create_dir_all(&log_dir)
                .map_err(|e| anyhow!("Failed to create log directory {:?}: {}", log_dir, e))?;

            let file_appender = match config.rotation.as_str() {
                "never" => rolling::never(&log_dir, LOG_FILE_NAME),
                _ => rolling::daily(&log_dir, LOG_FILE_NAME),
            };
            let (file_writer, file_guard) = non_blocking(file_appender);
            if let Ok(mut guards) = LOG_GUARDS.lock() {
                guards.push(file_guard);
            }

            if config.json_format {
                let file_layer = fmt::Layer::new()
                    .json()
                    .with_writer(file_writer)
                    .with_timer(LocalTimeFormatter)
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_ansi(false);
                let console_layer = console.then(|| {
                    fmt::Layer::new()
                        .with_writer(std::io::stderr)
                        .with_timer(LocalTimeFormatter)
                        .with_target(false)
                });
                registry
                    .with(file_layer)
                    .with(console_layer)
                    .try_init()
                    .map_err(|e| anyhow!("Failed to install logger: {}", e))?;
            } else {
                let file_layer = fmt::Layer::new()
                    .with_writer(file_writer)
                    .with_timer(LocalTimeFormatter)
                    .with_target(false)
                    .with_ansi(false);
                let console_layer = console.then(|| {
                    fmt::Layer::new()
                        .with_writer(std::io::stderr)
                        .with_timer(LocalTimeFormatter)
                        .with_target(false)
                });
                registry
                    .with(file_layer)
                    .with(console_layer)
                    .try_init()
                    .map_err(|e| anyhow!("Failed to install logger: {}", e))?;
            }
        }
        (false, true) => {
            if config.json_format {
                let console_layer = fmt::Layer::new()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_timer(LocalTimeFormatter);
                registry
                    .with(console_layer)
                    .try_init()
                    .map_err(|e| anyhow!("Failed to install logger: {}", e))?;
            } else {
                let console_layer = fmt::Layer::new()
                    .with_writer(std::io::stderr)
                    .with_timer(LocalTimeFormatter)
                    .with_target(false);
                registry
                    .with(console_layer)
                    .try_init()
                    .map_err(|e| anyhow!("Failed to install logger: {}", e))?;
            }
        }
        (false, false) => {
            return Err(anyhow!("No logging output configured"));
        }
    }

    info!("Logging system initialized (level: {})", config.level);
    if config.file_output {
        info!("Log directory: {:?}", log_dir);
    }
    Ok(())
}

/// Log system information for diagnostics
pub fn log_system_info() {
    info!("=== Coin Search ===");
    info!("Application version: {}", env!("CARGO_PKG_VERSION"));
    info!("Operating system: {}", std::env::consts::OS);
    info!("Architecture: {}", std::env::consts::ARCH);
}
