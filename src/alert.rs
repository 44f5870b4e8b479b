//! Alert records for large flash swaps.
//!
//! A [`SwapRecord`] carries the raw amounts and computed USD values of one
//! validated flash. [`evaluate_swap`] turns it into an [`Alert`] when the
//! combined USD value strictly exceeds the configured threshold.
//!
//! Every number in alert metadata is a plain base-10 string: raw amounts
//! keep all 256 bits of precision and USD values never use exponent notation.

use crate::address::canonical;
use crate::pricing::u256_to_bigint;
use alloy::primitives::{Address, U256};
use bigdecimal::{BigDecimal, Zero};
use serde::Serialize;
use std::collections::BTreeMap;

/// Alert name.
pub const ALERT_NAME: &str = "Uniswap V3 Large Flash Swap";

/// Alert identifier.
pub const ALERT_ID: &str = "UNISWAP-V3-FLASH-SWAP";

/// Metadata key: pool address.
pub const KEY_POOL_ADDRESS: &str = "poolAddress";
/// Metadata key: raw token0 amount.
pub const KEY_TOKEN0_AMOUNT: &str = "token0Amount";
/// Metadata key: raw token1 amount.
pub const KEY_TOKEN1_AMOUNT: &str = "token1Amount";
/// Metadata key: flash sender.
pub const KEY_SENDER: &str = "sender";
/// Metadata key: token0 USD value.
pub const KEY_VALUE0_USD: &str = "value0USD";
/// Metadata key: token1 USD value.
pub const KEY_VALUE1_USD: &str = "value1USD";
/// Metadata key: threshold in force.
pub const KEY_THRESHOLD_USD: &str = "flashSwapThresholdUSD";

/// Alert severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Severity {
    /// Informational
    Info,
}

/// Alert type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FindingType {
    /// Informational
    Info,
}

/// A validated flash swap with its USD valuation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapRecord {
    /// Pool that emitted the Flash event
    pub pool: Address,
    /// Flash initiator
    pub sender: Address,
    /// Raw token0 amount
    pub amount0: U256,
    /// Raw token1 amount
    pub amount1: U256,
    /// USD value of the token0 leg
    pub value0_usd: BigDecimal,
    /// USD value of the token1 leg
    pub value1_usd: BigDecimal,
}

impl SwapRecord {
    /// Record with both USD values still at zero.
    #[must_use]
    pub fn new(pool: Address, sender: Address, amount0: U256, amount1: U256) -> Self {
        Self {
            pool,
            sender,
            amount0,
            amount1,
            value0_usd: BigDecimal::zero(),
            value1_usd: BigDecimal::zero(),
        }
    }

    /// Combined USD value of both legs.
    #[must_use]
    pub fn total_usd(&self) -> BigDecimal {
        &self.value0_usd + &self.value1_usd
    }
}

/// An emitted finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    /// Alert name
    pub name: String,
    /// Human-readable description
    pub description: String,
    /// Stable alert identifier
    pub alert_id: String,
    /// Severity
    pub severity: Severity,
    /// Type
    #[serde(rename = "type")]
    pub finding_type: FindingType,
    /// Protocol tag
    pub protocol: String,
    /// String metadata
    pub metadata: BTreeMap<String, String>,
}

impl Alert {
    /// Build the large flash swap alert for `swap`.
    #[must_use]
    pub fn large_flash_swap(swap: &SwapRecord, threshold: &BigDecimal, protocol: &str) -> Self {
        let pool = canonical(&swap.pool);

        let metadata = BTreeMap::from([
            (KEY_POOL_ADDRESS.to_string(), pool.clone()),
            (
                KEY_TOKEN0_AMOUNT.to_string(),
                u256_to_bigint(swap.amount0).to_string(),
            ),
            (
                KEY_TOKEN1_AMOUNT.to_string(),
                u256_to_bigint(swap.amount1).to_string(),
            ),
            (KEY_SENDER.to_string(), canonical(&swap.sender)),
            (KEY_VALUE0_USD.to_string(), decimal_string(&swap.value0_usd)),
            (KEY_VALUE1_USD.to_string(), decimal_string(&swap.value1_usd)),
            (KEY_THRESHOLD_USD.to_string(), decimal_string(threshold)),
        ]);

        Self {
            name: ALERT_NAME.to_string(),
            description: format!("Large flash swap detected on pool {pool}"),
            alert_id: ALERT_ID.to_string(),
            severity: Severity::Info,
            finding_type: FindingType::Info,
            protocol: protocol.to_string(),
            metadata,
        }
    }
}

/// Alert for `swap` if its combined USD value is strictly above `threshold`.
#[must_use]
pub fn evaluate_swap(swap: &SwapRecord, threshold: &BigDecimal, protocol: &str) -> Option<Alert> {
    (swap.total_usd() > *threshold).then(|| Alert::large_flash_swap(swap, threshold, protocol))
}

/// Plain base-10 rendering without trailing zeros or exponent.
#[must_use]
pub fn decimal_string(value: &BigDecimal) -> String {
    value.normalized().to_plain_string()
}
