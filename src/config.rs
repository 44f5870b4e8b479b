//! Configuration management for the flash swap monitor.
//!
//! Configuration is loaded from environment variables using the `dotenvy`
//! crate. All operations return [`MonitorResult`].
//!
//! ## Environment Variables
//!
//! Required (one of):
//! - `RPC_URL`: Full HTTP(S) endpoint of an Ethereum node
//! - `ALCHEMY_API_KEY`: Alchemy key, used to build the mainnet URL when `RPC_URL` is unset
//!
//! Optional (with defaults):
//! - `FLASH_SWAP_THRESHOLD_USD`: Alert threshold in USD (default: 10000000)
//! - `UNISWAP_V3_FACTORY`: Factory address (default: mainnet Uniswap V3 factory)
//! - `PRICE_API_URL`: Price index base URL (default: CoinGecko v3)
//! - `PRICE_API_PLATFORM`: Chain identifier for the price index (default: ethereum)
//! - `PROTOCOL`: Protocol tag attached to alerts (default: uniswap)
//! - `FAILURE_POLICY`: `fail-fast` or `isolate` (default: fail-fast)
//! - `POLL_INTERVAL_SECS`: Polling interval in watch mode (default: 12)
//! - `BATCH_SIZE`: Maximum blocks per log query (default: 10)
//! - `RUST_LOG`: Logging level (default: "info")
//!
//! ## Example
//!
//! ```no_run
//! use uniswap_flash_monitor::config::Config;
//! use uniswap_flash_monitor::error::MonitorResult;
//!
//! # fn main() -> MonitorResult<()> {
//! let config = Config::from_env()?;
//! println!("Threshold: {}", config.threshold_usd());
//! # Ok(())
//! # }
//! ```

use crate::error::{MonitorError, MonitorResult};
use alloy::primitives::{address, Address};
use bigdecimal::{BigDecimal, Zero};
use std::env;
use std::str::FromStr;

/// Mainnet Uniswap V3 factory.
pub const UNISWAP_V3_FACTORY: Address = address!("1F98431c8aD98523631AE4a59f267346ea31F984");

/// Default CoinGecko API base URL.
pub const DEFAULT_PRICE_API_URL: &str = "https://api.coingecko.com/api/v3";

const DEFAULT_THRESHOLD_USD: &str = "10000000";

/// What to do when a swap that passed pool validation fails later on
/// (price lookup or decimals query).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// The whole transaction fails with the first error.
    #[default]
    FailFast,
    /// The failing swap is logged and skipped; other alerts are kept.
    Isolate,
}

impl FromStr for FailurePolicy {
    type Err = MonitorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fail-fast" | "failfast" => Ok(Self::FailFast),
            "isolate" => Ok(Self::Isolate),
            other => Err(MonitorError::config(
                format!("FAILURE_POLICY must be 'fail-fast' or 'isolate', got: {other}"),
                None,
            )),
        }
    }
}

/// Runtime configuration for the monitor.
#[derive(Debug, Clone)]
pub struct Config {
    /// Ethereum RPC URL
    rpc_url: String,

    /// Combined USD value a flash swap must exceed to raise an alert
    threshold_usd: BigDecimal,

    /// Factory used to verify pool authenticity
    factory_address: Address,

    /// Price index base URL
    price_api_url: String,

    /// Chain identifier understood by the price index
    price_platform: String,

    /// Protocol tag attached to alerts
    protocol: String,

    /// Post-validation failure handling
    failure_policy: FailurePolicy,

    /// Polling interval in seconds (watch mode)
    poll_interval_secs: u64,

    /// Maximum blocks per log query (watch mode)
    batch_size: u64,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Loads `.env` first if present, then delegates to [`Config::from_vars`].
    /// Variables already set in the process environment take precedence over
    /// the `.env` file.
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing or any value fails
    /// validation.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use uniswap_flash_monitor::config::Config;
    ///
    /// # fn main() -> uniswap_flash_monitor::error::MonitorResult<()> {
    /// std::env::set_var("RPC_URL", "http://localhost:8545");
    /// std::env::set_var("FLASH_SWAP_THRESHOLD_USD", "2500000");
    ///
    /// let config = Config::from_env()?;
    /// assert_eq!(config.rpc_url(), "http://localhost:8545");
    /// # Ok(())
    /// # }
    /// ```
    pub fn from_env() -> MonitorResult<Self> {
        // Load .env file if present (ignore error if file doesn't exist)
        dotenvy::dotenv().ok();

        Self::from_vars(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    ///
    /// # Arguments
    ///
    /// * `lookup` - Returns the value of a variable by name, or `None` if unset
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Neither `RPC_URL` nor `ALCHEMY_API_KEY` is usable
    /// - The threshold is not a non-negative decimal
    /// - The factory is not a valid address
    /// - A numeric option does not parse
    ///
    /// # Example
    ///
    /// ```
    /// use std::collections::HashMap;
    /// use uniswap_flash_monitor::config::{Config, FailurePolicy};
    ///
    /// let vars = HashMap::from([
    ///     ("ALCHEMY_API_KEY", "demo-key"),
    ///     ("FAILURE_POLICY", "isolate"),
    /// ]);
    /// let config = Config::from_vars(|key| vars.get(key).map(|v| (*v).to_string()));
    ///
    /// assert!(config.is_ok());
    /// if let Ok(config) = config {
    ///     assert_eq!(config.rpc_url(), "https://eth-mainnet.g.alchemy.com/v2/demo-key");
    ///     assert_eq!(config.failure_policy(), FailurePolicy::Isolate);
    /// }
    /// ```
    pub fn from_vars<F>(lookup: F) -> MonitorResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let rpc_url = match lookup("RPC_URL").filter(|url| !url.is_empty()) {
            Some(url) => url,
            None => {
                let key = lookup("ALCHEMY_API_KEY").ok_or_else(|| {
                    MonitorError::config("RPC_URL or ALCHEMY_API_KEY must be set", None)
                })?;
                if key.is_empty() || key == "your_alchemy_api_key_here" {
                    return Err(MonitorError::config(
                        "ALCHEMY_API_KEY must be set to a valid Alchemy API key",
                        None,
                    ));
                }
                format!("https://eth-mainnet.g.alchemy.com/v2/{key}")
            }
        };

        let raw_threshold = lookup("FLASH_SWAP_THRESHOLD_USD")
            .unwrap_or_else(|| DEFAULT_THRESHOLD_USD.to_string());
        let threshold_usd = BigDecimal::from_str(raw_threshold.trim()).map_err(|e| {
            MonitorError::config(
                format!("FLASH_SWAP_THRESHOLD_USD must be a decimal number, got: {raw_threshold}"),
                Some(Box::new(e)),
            )
        })?;
        if threshold_usd < BigDecimal::zero() {
            return Err(MonitorError::config(
                "FLASH_SWAP_THRESHOLD_USD cannot be negative",
                None,
            ));
        }

        let factory_address = match lookup("UNISWAP_V3_FACTORY") {
            Some(raw) => raw.parse::<Address>().map_err(|e| {
                MonitorError::config(
                    format!("UNISWAP_V3_FACTORY must be a valid Ethereum address, got: {raw}"),
                    Some(Box::new(e)),
                )
            })?,
            None => UNISWAP_V3_FACTORY,
        };

        let price_api_url = lookup("PRICE_API_URL")
            .unwrap_or_else(|| DEFAULT_PRICE_API_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let price_platform = lookup("PRICE_API_PLATFORM").unwrap_or_else(|| "ethereum".to_string());
        let protocol = lookup("PROTOCOL").unwrap_or_else(|| "uniswap".to_string());

        let failure_policy = lookup("FAILURE_POLICY")
            .map(|raw| raw.parse::<FailurePolicy>())
            .transpose()?
            .unwrap_or_default();

        let poll_interval_secs = lookup("POLL_INTERVAL_SECS")
            .unwrap_or_else(|| "12".to_string())
            .parse::<u64>()
            .map_err(|e| {
                MonitorError::config(
                    "POLL_INTERVAL_SECS must be a valid number",
                    Some(Box::new(e)),
                )
            })?;

        let batch_size = lookup("BATCH_SIZE")
            .unwrap_or_else(|| "10".to_string())
            .parse::<u64>()
            .map_err(|e| {
                MonitorError::config("BATCH_SIZE must be a valid number", Some(Box::new(e)))
            })?;
        if batch_size == 0 {
            return Err(MonitorError::config("BATCH_SIZE must be at least 1", None));
        }

        Ok(Self {
            rpc_url,
            threshold_usd,
            factory_address,
            price_api_url,
            price_platform,
            protocol,
            failure_policy,
            poll_interval_secs,
            batch_size,
        })
    }

    /// Get the Ethereum RPC URL.
    #[must_use]
    pub fn rpc_url(&self) -> &str {
        &self.rpc_url
    }

    /// Get the alert threshold in USD.
    #[must_use]
    pub const fn threshold_usd(&self) -> &BigDecimal {
        &self.threshold_usd
    }

    /// Get the factory address.
    #[must_use]
    pub const fn factory_address(&self) -> Address {
        self.factory_address
    }

    /// Get the price index base URL.
    #[must_use]
    pub fn price_api_url(&self) -> &str {
        &self.price_api_url
    }

    /// Get the price index chain identifier.
    #[must_use]
    pub fn price_platform(&self) -> &str {
        &self.price_platform
    }

    /// Get the protocol tag.
    #[must_use]
    pub fn protocol(&self) -> &str {
        &self.protocol
    }

    /// Get the failure policy.
    #[must_use]
    pub const fn failure_policy(&self) -> FailurePolicy {
        self.failure_policy
    }

    /// Get the polling interval in seconds.
    #[must_use]
    pub const fn poll_interval_secs(&self) -> u64 {
        self.poll_interval_secs
    }

    /// Get the batch size (max blocks per query).
    #[must_use]
    pub const fn batch_size(&self) -> u64 {
        self.batch_size
    }
}
