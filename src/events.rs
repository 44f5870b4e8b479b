//! Uniswap V3 contract bindings and Flash event extraction.
//!
//! Contract interfaces are declared with Alloy's `sol!` macro, which gives
//! compile-time checked event signatures and typed call builders for the
//! pool, factory and ERC-20 metadata contracts the monitor talks to.
//!
//! A [`TransactionEvent`] wraps the ordered logs of one transaction. The
//! extractor keeps only logs whose first topic is the `Flash` signature hash
//! and decodes them into [`FlashEvent`]s, preserving log order.
//!
//! ## Example
//!
//! ```
//! use uniswap_flash_monitor::events::{extract_flash_events, TransactionEvent};
//! use alloy::primitives::B256;
//!
//! let tx = TransactionEvent::new(B256::ZERO, None, Vec::new());
//! assert!(extract_flash_events(&tx).is_empty());
//! ```

use alloy::primitives::{Address, B256, U256};
use alloy::rpc::types::{Filter, Log};
use alloy::sol;
use alloy::sol_types::SolEvent;
use tracing::debug;

sol! {
    /// Subset of the Uniswap V3 pool interface used by the monitor.
    #[sol(rpc)]
    interface IUniswapV3Pool {
        /// Emitted by `flash`: amounts lent out and fees paid back per token.
        event Flash(
            address indexed sender,
            address indexed recipient,
            uint256 amount0,
            uint256 amount1,
            uint256 paid0,
            uint256 paid1
        );

        function token0() external view returns (address);
        function token1() external view returns (address);
        function fee() external view returns (uint24);
    }

    /// Uniswap V3 factory lookup.
    #[sol(rpc)]
    interface IUniswapV3Factory {
        function getPool(address tokenA, address tokenB, uint24 fee) external view returns (address pool);
    }

    /// ERC-20 decimals accessor.
    #[sol(rpc)]
    interface IERC20Metadata {
        function decimals() external view returns (uint8);
    }
}

pub use IUniswapV3Pool::Flash;

/// The logs emitted by a single transaction, in receipt order.
#[derive(Debug, Clone)]
pub struct TransactionEvent {
    hash: B256,
    block_number: Option<u64>,
    logs: Vec<Log>,
}

impl TransactionEvent {
    /// Wrap a transaction's logs.
    #[must_use]
    pub const fn new(hash: B256, block_number: Option<u64>, logs: Vec<Log>) -> Self {
        Self {
            hash,
            block_number,
            logs,
        }
    }

    /// Transaction hash.
    #[must_use]
    pub const fn hash(&self) -> B256 {
        self.hash
    }

    /// Block the transaction was included in, if known.
    #[must_use]
    pub const fn block_number(&self) -> Option<u64> {
        self.block_number
    }

    /// All logs of the transaction.
    #[must_use]
    pub fn logs(&self) -> &[Log] {
        &self.logs
    }

    /// Logs whose first topic equals `signature`, in receipt order.
    #[must_use]
    pub fn filter_log(&self, signature: B256) -> Vec<&Log> {
        self.logs
            .iter()
            .filter(|log| log.topics().first() == Some(&signature))
            .collect()
    }
}

/// A decoded `Flash` event together with the contract that emitted it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlashEvent {
    /// Emitting contract; only a candidate pool until validated
    pub pool: Address,
    /// Account that initiated the flash
    pub sender: Address,
    /// Recipient of the borrowed tokens
    pub recipient: Address,
    /// Raw amount of token0 lent
    pub amount0: U256,
    /// Raw amount of token1 lent
    pub amount1: U256,
    /// Raw amount of token0 paid back on top
    pub paid0: U256,
    /// Raw amount of token1 paid back on top
    pub paid1: U256,
}

/// Return the Flash events of a transaction in log order.
///
/// Logs that carry the Flash topic but fail to decode (e.g. a contract
/// emitting the same signature with a different indexed layout) are skipped.
#[must_use]
pub fn extract_flash_events(tx: &TransactionEvent) -> Vec<FlashEvent> {
    tx.filter_log(Flash::SIGNATURE_HASH)
        .into_iter()
        .filter_map(|log| match Flash::decode_log_data(log.data(), true) {
            Ok(flash) => Some(FlashEvent {
                pool: log.address(),
                sender: flash.sender,
                recipient: flash.recipient,
                amount0: flash.amount0,
                amount1: flash.amount1,
                paid0: flash.paid0,
                paid1: flash.paid1,
            }),
            Err(e) => {
                debug!(tx = %tx.hash(), address = %log.address(), error = %e, "Skipping undecodable Flash log");
                None
            }
        })
        .collect()
}

/// Create a filter for Flash events from any contract in a block range.
#[must_use]
pub fn create_flash_filter(from_block: u64, to_block: u64) -> Filter {
    Filter::new()
        .event_signature(Flash::SIGNATURE_HASH)
        .from_block(from_block)
        .to_block(to_block)
}

/// Group a flat list of logs into per-transaction events.
///
/// Transactions keep the order in which they first appear, and logs keep
/// their order within a transaction. Pending logs without a transaction hash
/// are dropped.
#[must_use]
pub fn group_by_transaction(logs: Vec<Log>) -> Vec<TransactionEvent> {
    let mut grouped: Vec<TransactionEvent> = Vec::new();

    for log in logs {
        let Some(hash) = log.transaction_hash else {
            debug!(address = %log.address(), "Dropping log without transaction hash");
            continue;
        };

        match grouped.iter_mut().find(|tx| tx.hash == hash) {
            Some(tx) => tx.logs.push(log),
            None => grouped.push(TransactionEvent::new(hash, log.block_number, vec![log])),
        }
    }

    grouped
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::{address, b256, Bytes, LogData};

    const POOL: Address = address!("88e6A0c2dDD26FEEb64F039a2c41296FcB3f5640");
    const SENDER: Address = address!("00000000000000000000000000000000000000aa");
    const RECIPIENT: Address = address!("00000000000000000000000000000000000000bb");

    fn flash_log(pool: Address, amount0: u64, tx: B256) -> Log {
        let event = Flash {
            sender: SENDER,
            recipient: RECIPIENT,
            amount0: U256::from(amount0),
            amount1: U256::ZERO,
            paid0: U256::from(1),
            paid1: U256::ZERO,
        };
        Log {
            inner: alloy::primitives::Log {
                address: pool,
                data: event.encode_log_data(),
            },
            transaction_hash: Some(tx),
            block_number: Some(1),
            ..Default::default()
        }
    }

    fn other_log(tx: B256) -> Log {
        Log {
            inner: alloy::primitives::Log {
                address: POOL,
                data: LogData::new_unchecked(vec![B256::repeat_byte(0x11)], Bytes::new()),
            },
            transaction_hash: Some(tx),
            ..Default::default()
        }
    }

    #[test]
    fn test_flash_signature() {
        assert_eq!(
            Flash::SIGNATURE_HASH,
            b256!("bdbdb71d7860376ba52b25a5028beea23581364a40522f6bcfb86bb1f2dca633")
        );
        assert_eq!(
            Flash::SIGNATURE,
            "Flash(address,address,uint256,uint256,uint256,uint256)"
        );
    }

    #[test]
    fn test_extract_keeps_only_flash_logs_in_order() {
        let tx_hash = B256::repeat_byte(1);
        let second_pool = address!("0000000000000000000000000000000000000002");
        let tx = TransactionEvent::new(
            tx_hash,
            Some(1),
            vec![
                other_log(tx_hash),
                flash_log(POOL, 100, tx_hash),
                other_log(tx_hash),
                flash_log(second_pool, 200, tx_hash),
            ],
        );

        let events = extract_flash_events(&tx);
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].pool, POOL);
        assert_eq!(events[0].amount0, U256::from(100));
        assert_eq!(events[0].sender, SENDER);
        assert_eq!(events[0].recipient, RECIPIENT);
        assert_eq!(events[1].pool, second_pool);
        assert_eq!(events[1].amount0, U256::from(200));
    }

    #[test]
    fn test_extract_no_matching_logs() {
        let tx_hash = B256::repeat_byte(2);
        let tx = TransactionEvent::new(tx_hash, None, vec![other_log(tx_hash)]);

        assert!(tx.filter_log(Flash::SIGNATURE_HASH).is_empty());
        assert!(extract_flash_events(&tx).is_empty());
    }

    #[test]
    fn test_extract_skips_malformed_flash_log() {
        let tx_hash = B256::repeat_byte(3);
        let malformed = Log {
            inner: alloy::primitives::Log {
                address: POOL,
                data: LogData::new_unchecked(vec![Flash::SIGNATURE_HASH], Bytes::new()),
            },
            transaction_hash: Some(tx_hash),
            ..Default::default()
        };
        let tx = TransactionEvent::new(tx_hash, None, vec![malformed]);

        assert_eq!(tx.filter_log(Flash::SIGNATURE_HASH).len(), 1);
        assert!(extract_flash_events(&tx).is_empty());
    }

    #[test]
    fn test_group_by_transaction() {
        let a = B256::repeat_byte(0xa);
        let b = B256::repeat_byte(0xb);
        let mut pending = flash_log(POOL, 1, a);
        pending.transaction_hash = None;

        let grouped = group_by_transaction(vec![
            flash_log(POOL, 1, a),
            flash_log(POOL, 2, b),
            pending,
            flash_log(POOL, 3, a),
        ]);

        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped[0].hash(), a);
        assert_eq!(grouped[0].logs().len(), 2);
        assert_eq!(grouped[0].block_number(), Some(1));
        assert_eq!(grouped[1].hash(), b);
        assert_eq!(grouped[1].logs().len(), 1);
    }

    #[test]
    fn test_filter_creation() {
        let filter = create_flash_filter(1000, 2000);

        assert_eq!(filter.get_from_block(), Some(1000));
        assert_eq!(filter.get_to_block(), Some(2000));
        assert!(filter.topics[0].matches(&Flash::SIGNATURE_HASH));
        assert!(!filter.topics[0].matches(&B256::ZERO));
        assert!(filter.topics[1].is_empty());
        assert!(filter.address.is_empty());
    }
}
