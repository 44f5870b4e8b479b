//! CLI entry point for the flash swap monitor.
//!
//! ```text
//! main.rs (runtime + tracing)
//!     ↓
//! cli.rs
//!     ↓
//! config → context (provider, contract reader, price client)
//!     ↓
//! handler: extract → validate → price → value → alert
//! ```

use tracing::error;
use uniswap_flash_monitor::{cli, observability};

/// Entry point.
///
/// Logging is controlled by `RUST_LOG`, `LOG_JSON` and `LOG_FILE`; everything
/// else is delegated to [`cli::run`].
#[tokio::main]
async fn main() {
    let log_file = std::env::var("LOG_FILE").ok().map(std::path::PathBuf::from);
    let json_output = std::env::var("LOG_JSON")
        .unwrap_or_else(|_| "false".to_string())
        .parse::<bool>()
        .unwrap_or(false);

    let _guard = match observability::init_tracing(None, log_file, json_output) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize tracing: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = cli::run().await {
        error!(error = %e, "Application error");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
