//! Command-line interface for the flash swap monitor.
//!
//! # Commands
//!
//! - `tx <HASH>`: Run the pipeline for a single mined transaction
//! - `watch`: Follow the chain and report large flash swaps as they land
//!
//! # Example
//!
//! ```bash
//! uniswap-flash-monitor tx 0x5c5d...e1
//! uniswap-flash-monitor watch --interval 12 --json
//! ```

use crate::alert::{Alert, KEY_POOL_ADDRESS, KEY_VALUE0_USD, KEY_VALUE1_USD};
use crate::config::Config;
use crate::context::with_provider;
use crate::error::{MonitorError, MonitorResult};
use crate::events::group_by_transaction;
use crate::handler::FlashSwapHandler;
use crate::rpc::{
    check_connection, create_provider, fetch_flash_logs, get_latest_block, get_transaction_logs,
    Provider,
};
use alloy::primitives::B256;
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Uniswap V3 large flash swap monitor
#[derive(Parser, Debug)]
#[command(name = "uniswap-flash-monitor")]
#[command(about = "Reports Uniswap V3 flash swaps above a USD threshold", long_about = None)]
#[command(version)]
struct Cli {
    /// Print alerts as JSON lines instead of the colored summary
    #[arg(long, global = true)]
    json: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Check a single transaction
    Tx {
        /// Transaction hash
        hash: B256,
    },

    /// Follow new blocks
    Watch {
        /// Polling interval in seconds (default: POLL_INTERVAL_SECS)
        #[arg(short, long)]
        interval: Option<u64>,

        /// Starting block number (default: latest)
        #[arg(short, long)]
        start_block: Option<u64>,
    },
}

/// Parse CLI arguments and execute the appropriate command.
///
/// # Errors
///
/// Returns an error if configuration, provider setup or the command fails.
pub async fn run() -> MonitorResult<()> {
    let cli = Cli::parse();

    let config = Config::from_env()?;
    let provider = create_provider(config.rpc_url()).await?;
    let handler = FlashSwapHandler::new();
    handler.initialize(with_provider(&config, provider.clone()))?;

    match cli.command {
        Commands::Tx { hash } => run_tx_command(&provider, &handler, hash, cli.json).await,
        Commands::Watch {
            interval,
            start_block,
        } => {
            let interval = interval.unwrap_or_else(|| config.poll_interval_secs());
            run_watch_command(&config, &provider, &handler, interval, start_block, cli.json).await
        }
    }
}

async fn run_tx_command(
    provider: &Provider,
    handler: &FlashSwapHandler,
    hash: B256,
    json: bool,
) -> MonitorResult<()> {
    let tx = get_transaction_logs(provider, hash).await?;

    let alerts = handler.handle_transaction(&tx).await?;
    if alerts.is_empty() && !json {
        println!("{}", "No large flash swaps in this transaction.".yellow());
    }
    for alert in &alerts {
        print_alert(tx.block_number(), hash, alert, json)?;
    }

    Ok(())
}

async fn run_watch_command(
    config: &Config,
    provider: &Provider,
    handler: &FlashSwapHandler,
    interval: u64,
    start_block: Option<u64>,
    json: bool,
) -> MonitorResult<()> {
    check_connection(provider).await?;

    let latest_block = get_latest_block(provider).await?;
    let mut last_processed_block = start_block.map_or(latest_block, |b| b.saturating_sub(1));
    info!(
        from_block = last_processed_block + 1,
        threshold_usd = %config.threshold_usd(),
        "Watching for large flash swaps"
    );
    if !json {
        println!(
            "{} (threshold ${})",
            "🔍 Watching for large Uniswap V3 flash swaps...".cyan().bold(),
            config.threshold_usd()
        );
    }

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            result = process_new_blocks(
                provider,
                handler,
                config.batch_size(),
                &mut last_processed_block,
                json,
            ) => {
                if let Err(e) = result {
                    error!(error = %e, "Error processing blocks");
                }
            }
        }

        tokio::select! {
            _ = &mut shutdown => break,
            () = tokio::time::sleep(Duration::from_secs(interval)) => {}
        }
    }

    info!(last_processed_block, "Shutdown signal received");
    if !json {
        println!("{}", "🛑 Shutting down".yellow().bold());
    }

    Ok(())
}

/// Process blocks after `last_processed_block` up to the chain head.
///
/// `last_processed_block` advances after each completed batch, so a failed
/// batch is retried on the next poll.
async fn process_new_blocks(
    provider: &Provider,
    handler: &FlashSwapHandler,
    batch_size: u64,
    last_processed_block: &mut u64,
    json: bool,
) -> MonitorResult<()> {
    let current_latest = get_latest_block(provider).await?;
    if current_latest <= *last_processed_block {
        debug!(current_latest, "No new blocks");
        return Ok(());
    }

    for (from_block, to_block) in block_batches(*last_processed_block + 1, current_latest, batch_size) {
        let logs = fetch_flash_logs(provider, from_block, to_block).await?;
        let transactions = group_by_transaction(logs);

        let results = handler.handle_batch(&transactions).await;
        for (tx, (hash, result)) in transactions.iter().zip(results) {
            match result {
                Ok(alerts) => {
                    for alert in &alerts {
                        print_alert(tx.block_number(), hash, alert, json)?;
                    }
                }
                Err(e) => warn!(tx = %hash, error = %e, "Transaction processing failed"),
            }
        }

        *last_processed_block = to_block;
    }

    Ok(())
}

/// Split `from..=to` into inclusive ranges of at most `size` blocks.
fn block_batches(from: u64, to: u64, size: u64) -> Vec<(u64, u64)> {
    let size = size.max(1);
    let mut batches = Vec::new();
    let mut start = from;
    while start <= to {
        let end = start.saturating_add(size - 1).min(to);
        batches.push((start, end));
        if end == u64::MAX {
            break;
        }
        start = end + 1;
    }
    batches
}

fn print_alert(block: Option<u64>, tx: B256, alert: &Alert, json: bool) -> MonitorResult<()> {
    if json {
        let line = serde_json::to_string(alert).map_err(|e| {
            MonitorError::decoding("Failed to serialize alert", Some(Box::new(e)))
        })?;
        println!("{line}");
        return Ok(());
    }

    let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
    let block = block.map_or_else(|| "?".to_string(), |b| b.to_string());
    let field = |key: &str| alert.metadata.get(key).map_or("?", String::as_str);

    println!(
        "{} {} Block: {} | Tx: {} | Pool: {} | token0 ${} | token1 ${}",
        "🚨".red(),
        timestamp.to_string().dimmed(),
        block.yellow(),
        tx.to_string().dimmed(),
        field(KEY_POOL_ADDRESS).blue(),
        field(KEY_VALUE0_USD).green().bold(),
        field(KEY_VALUE1_USD).green().bold(),
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_batches() {
        assert_eq!(block_batches(1, 25, 10), vec![(1, 10), (11, 20), (21, 25)]);
        assert_eq!(block_batches(5, 5, 10), vec![(5, 5)]);
        assert!(block_batches(6, 5, 10).is_empty());
        assert_eq!(block_batches(1, 3, 0), vec![(1, 1), (2, 2), (3, 3)]);
    }

    #[test]
    fn test_tx_command_parsing() {
        let hash = format!("0x{}", "ab".repeat(32));
        let cli = Cli::try_parse_from(["uniswap-flash-monitor", "tx", hash.as_str()]);
        assert!(cli.is_ok());

        if let Ok(Cli {
            command: Commands::Tx { hash: parsed },
            json,
        }) = cli
        {
            assert_eq!(parsed, B256::repeat_byte(0xab));
            assert!(!json);
        }
    }

    #[test]
    fn test_tx_command_rejects_bad_hash() {
        let cli = Cli::try_parse_from(["uniswap-flash-monitor", "tx", "0x1234"]);
        assert!(cli.is_err());
    }

    #[test]
    fn test_watch_command_with_options() {
        let cli = Cli::try_parse_from([
            "uniswap-flash-monitor",
            "watch",
            "--interval",
            "30",
            "--start-block",
            "19000000",
            "--json",
        ]);
        assert!(cli.is_ok());

        if let Ok(Cli {
            command:
                Commands::Watch {
                    interval,
                    start_block,
                },
            json,
        }) = cli
        {
            assert_eq!(interval, Some(30));
            assert_eq!(start_block, Some(19_000_000));
            assert!(json);
        }
    }
}
