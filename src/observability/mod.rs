//! Structured logging setup.
//!
//! The monitor logs through `tracing`; this module installs the subscriber.
//!
//! # Features
//!
//! - **Structured Logging**: Key-value fields such as `tx`, `pool` and `value0_usd`
//! - **Span Tracking**: Each handled transaction runs inside a span carrying its hash
//! - **Multiple Formats**: Pretty or JSON console output, optional JSON file output
//!
//! # Usage
//!
//! Initialize tracing at application startup and keep the guard alive:
//!
//! ```no_run
//! use uniswap_flash_monitor::observability;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let _guard = observability::init_tracing(None, None, false)?;
//!
//!     // Run the monitor...
//!     Ok(())
//! }
//! ```
//!
//! # Environment Configuration
//!
//! ```bash
//! # Component-specific levels
//! RUST_LOG=uniswap_flash_monitor=debug,alloy=warn cargo run -- watch
//!
//! # JSON console output for log shipping
//! LOG_JSON=true cargo run -- watch
//!
//! # Additionally write JSON logs to a daily-rotated file
//! LOG_FILE=./logs/monitor.log cargo run -- watch
//! ```

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Default filter when neither `RUST_LOG` nor an explicit level is given.
pub const DEFAULT_FILTER: &str = "uniswap_flash_monitor=info,warn";

/// Install the global tracing subscriber.
///
/// # Arguments
///
/// * `log_level` - Filter directive used when `RUST_LOG` is unset.
/// * `log_file` - Optional file for JSON output with daily rotation.
/// * `json_output` - JSON console output instead of the pretty format.
///
/// The returned guard flushes the file writer on drop; keep it alive for
/// the lifetime of the process.
///
/// # Log Levels
///
/// - **ERROR**: Watch loop iterations that failed
/// - **WARN**: Failed transactions and swaps dropped under the isolate policy
/// - **INFO**: Startup, context setup and detected large flash swaps
/// - **DEBUG**: Pool validation outcomes, price requests and swap valuations
///
/// # Errors
///
/// Returns an error if the log directory cannot be created or a subscriber
/// is already installed.
///
/// # Example
///
/// ```no_run
/// use std::path::PathBuf;
/// use uniswap_flash_monitor::observability::init_tracing;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// // JSON console output plus a rotated file under ./logs
/// let _guard = init_tracing(
///     Some("uniswap_flash_monitor=debug".to_string()),
///     Some(PathBuf::from("./logs/monitor.log")),
///     true,
/// )?;
/// # Ok(())
/// # }
/// ```
pub fn init_tracing(
    log_level: Option<String>,
    log_file: Option<PathBuf>,
    json_output: bool,
) -> Result<Option<WorkerGuard>, Box<dyn std::error::Error>> {
    let env_filter = std::env::var("RUST_LOG").map_or_else(
        |_| EnvFilter::new(log_level.as_deref().unwrap_or(DEFAULT_FILTER)),
        EnvFilter::new,
    );

    let console_layer = if json_output {
        fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .with_target(true)
            .boxed()
    } else {
        fmt::layer()
            .pretty()
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .boxed()
    };

    let (file_layer, guard) = match log_file.as_deref() {
        Some(path) => {
            let directory = path.parent().unwrap_or_else(|| Path::new("."));
            std::fs::create_dir_all(directory)?;

            let appender = tracing_appender::rolling::daily(
                directory,
                path.file_name().unwrap_or_else(|| OsStr::new("monitor.log")),
            );
            let (writer, guard) = tracing_appender::non_blocking(appender);

            let layer = fmt::layer()
                .json()
                .with_writer(writer)
                .with_current_span(true)
                .with_target(true)
                .boxed();
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()?;

    info!(
        json_output,
        file_logging = log_file.is_some(),
        "Tracing initialized"
    );

    Ok(guard)
}

/// Subscriber for tests; output is captured by the test harness.
#[cfg(test)]
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}
