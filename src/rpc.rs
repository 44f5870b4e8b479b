//! RPC provider management for Ethereum connections.
//!
//! This module handles the HTTP connection to an Ethereum node and the two
//! ways the monitor sources transaction logs: a single receipt by hash, or
//! every Flash log in a block range.
//!
//! ## Example
//!
//! ```no_run
//! use uniswap_flash_monitor::rpc::{create_provider, get_latest_block};
//! use uniswap_flash_monitor::error::MonitorResult;
//!
//! # async fn example() -> MonitorResult<()> {
//! let provider = create_provider("https://eth-mainnet.g.alchemy.com/v2/API_KEY").await?;
//! let latest_block = get_latest_block(&provider).await?;
//! println!("Latest block: {}", latest_block);
//! # Ok(())
//! # }
//! ```

use crate::error::{MonitorError, MonitorResult};
use crate::events::{create_flash_filter, TransactionEvent};
use alloy::primitives::B256;
use alloy::providers::{Provider as AlloyProvider, ProviderBuilder, RootProvider};
use alloy::rpc::types::Log;
use alloy::transports::http::{Client, Http};
use tracing::{debug, info, instrument, warn};

/// HTTP provider type used throughout the crate.
pub type Provider = RootProvider<Http<Client>>;

/// Create a new Ethereum RPC provider connected via HTTP.
///
/// No request is made here; connectivity problems surface on first use.
/// The provider is a cheap handle and is cloned into the contract reader,
/// so one provider serves both log queries and contract calls.
///
/// # Arguments
///
/// * `rpc_url` - The HTTP(S) endpoint URL for the Ethereum RPC node
///
/// # Errors
///
/// Returns an error if the RPC URL cannot be parsed.
///
/// # Example
///
/// ```no_run
/// use uniswap_flash_monitor::rpc::create_provider;
/// use uniswap_flash_monitor::error::MonitorResult;
///
/// # async fn example() -> MonitorResult<()> {
/// let provider = create_provider("https://eth-mainnet.g.alchemy.com/v2/YOUR_KEY").await?;
/// # Ok(())
/// # }
/// ```
#[allow(clippy::unused_async)]
#[instrument(skip(rpc_url), fields(rpc_host = tracing::field::Empty))]
pub async fn create_provider(rpc_url: &str) -> MonitorResult<Provider> {
    info!("Initializing RPC provider");

    // Extract host for logging (without sensitive API key)
    let host = rpc_url.split("/v2/").next().unwrap_or("unknown");
    tracing::Span::current().record("rpc_host", host);

    let url = rpc_url.parse().map_err(|e| {
        MonitorError::rpc(
            format!("Failed to parse RPC URL: '{rpc_url}'"),
            Some(Box::new(e)),
        )
    })?;

    let provider = ProviderBuilder::new().on_http(url);

    info!("RPC provider initialized successfully");

    Ok(provider)
}

/// Get the latest block number from the Ethereum network.
///
/// # Errors
///
/// Returns an error if the RPC request fails.
pub async fn get_latest_block(provider: &Provider) -> MonitorResult<u64> {
    debug!("Fetching latest block number");

    let block_number = provider
        .get_block_number()
        .await
        .map_err(|e| MonitorError::rpc("Failed to fetch latest block number", Some(Box::new(e))))?;

    debug!(block_number, "Latest block number");

    Ok(block_number)
}

/// Check if the provider connection is healthy by fetching the latest block.
///
/// # Errors
///
/// Returns an error if the RPC connection is not working.
pub async fn check_connection(provider: &Provider) -> MonitorResult<()> {
    match get_latest_block(provider).await {
        Ok(block) => {
            info!("Connection check successful - latest block: {}", block);
            Ok(())
        }
        Err(e) => {
            warn!("Connection check failed: {}", e);
            Err(MonitorError::rpc(
                format!("Provider connection health check failed: {e}"),
                None,
            ))
        }
    }
}

/// Load the receipt logs of a mined transaction.
///
/// The logs keep their receipt order, which is the order alerts are
/// reported in.
///
/// # Arguments
///
/// * `provider` - The RPC provider
/// * `hash` - Hash of a mined transaction
///
/// # Errors
///
/// Returns an error if the request fails or the transaction is unknown or
/// still pending.
///
/// # Example
///
/// ```no_run
/// use alloy::primitives::B256;
/// use uniswap_flash_monitor::rpc::{create_provider, get_transaction_logs};
///
/// # async fn example(hash: B256) -> uniswap_flash_monitor::error::MonitorResult<()> {
/// let provider = create_provider("http://localhost:8545").await?;
/// let tx = get_transaction_logs(&provider, hash).await?;
/// println!("{} logs in block {:?}", tx.logs().len(), tx.block_number());
/// # Ok(())
/// # }
/// ```
#[instrument(skip(provider))]
pub async fn get_transaction_logs(provider: &Provider, hash: B256) -> MonitorResult<TransactionEvent> {
    let receipt = provider
        .get_transaction_receipt(hash)
        .await
        .map_err(|e| MonitorError::rpc("Failed to fetch transaction receipt", Some(Box::new(e))))?
        .ok_or_else(|| MonitorError::rpc(format!("No receipt for transaction {hash}"), None))?;

    let logs = receipt.inner.logs().to_vec();
    debug!(logs = logs.len(), "Receipt loaded");

    Ok(TransactionEvent::new(hash, receipt.block_number, logs))
}

/// Fetch every Flash log emitted in `from_block..=to_block`.
///
/// The query filters on the Flash topic only, so logs from any contract
/// are returned; pool validation happens later in the handler.
///
/// # Arguments
///
/// * `provider` - The RPC provider
/// * `from_block` - First block of the range (inclusive)
/// * `to_block` - Last block of the range (inclusive)
///
/// # Errors
///
/// Returns an error if the `eth_getLogs` request fails. Providers cap the
/// range size, so keep ranges within `BATCH_SIZE` blocks.
///
/// # Example
///
/// ```no_run
/// use uniswap_flash_monitor::events::group_by_transaction;
/// use uniswap_flash_monitor::rpc::{create_provider, fetch_flash_logs};
///
/// # async fn example() -> uniswap_flash_monitor::error::MonitorResult<()> {
/// let provider = create_provider("http://localhost:8545").await?;
/// let logs = fetch_flash_logs(&provider, 19_000_000, 19_000_009).await?;
/// let transactions = group_by_transaction(logs);
/// # Ok(())
/// # }
/// ```
pub async fn fetch_flash_logs(
    provider: &Provider,
    from_block: u64,
    to_block: u64,
) -> MonitorResult<Vec<Log>> {
    let filter = create_flash_filter(from_block, to_block);

    let logs = provider
        .get_logs(&filter)
        .await
        .map_err(|e| MonitorError::rpc("Failed to fetch Flash logs", Some(Box::new(e))))?;

    debug!(from_block, to_block, logs = logs.len(), "Fetched Flash logs");

    Ok(logs)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rpc_url() -> String {
        std::env::var("RPC_URL").unwrap_or_else(|_| "http://localhost:8545".to_string())
    }

    #[tokio::test]
    async fn test_create_provider_invalid_url() {
        let result = create_provider("not-a-valid-url").await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_create_provider_valid_url() {
        let result = create_provider("http://localhost:8545").await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    #[ignore = "Requires valid RPC_URL environment variable"]
    async fn test_get_latest_block_integration() {
        if let Ok(provider) = create_provider(&rpc_url()).await {
            let block = get_latest_block(&provider).await;
            assert!(matches!(block, Ok(b) if b > 0));
            assert!(check_connection(&provider).await.is_ok());
        }
    }

    #[tokio::test]
    #[ignore = "Requires valid RPC_URL environment variable"]
    async fn test_fetch_flash_logs_integration() {
        if let Ok(provider) = create_provider(&rpc_url()).await {
            if let Ok(latest) = get_latest_block(&provider).await {
                let logs = fetch_flash_logs(&provider, latest.saturating_sub(5), latest).await;
                assert!(logs.is_ok());
            }
        }
    }
}
