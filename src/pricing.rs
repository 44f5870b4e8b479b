//! USD pricing of flash swap legs.
//!
//! Unit prices come from a token price index keyed by chain and contract
//! address (CoinGecko's `simple/token_price` endpoint by default). Both
//! tokens of a pool are priced in a single request.
//!
//! # Value Calculation
//!
//! ```text
//! value_usd = amount / 10^decimals * unit_price_usd
//! ```
//!
//! All arithmetic is done on [`BigDecimal`]; raw amounts may use the full
//! 256-bit range, so nothing here goes through floating point.
//!
//! # Example
//!
//! ```
//! use alloy::primitives::U256;
//! use bigdecimal::BigDecimal;
//! use std::str::FromStr;
//! use uniswap_flash_monitor::pricing::to_usd_value;
//!
//! // 2.5 tokens with 6 decimals at $2 each
//! let value = to_usd_value(U256::from(2_500_000u64), 6, &BigDecimal::from(2)).unwrap();
//! assert_eq!(value, BigDecimal::from_str("5").unwrap());
//! ```

use crate::address::canonical;
use crate::chain::ChainReader;
use crate::error::{MonitorError, MonitorResult};
use alloy::primitives::{Address, U256};
use async_trait::async_trait;
use bigdecimal::num_bigint::{BigInt, Sign};
use bigdecimal::{BigDecimal, Zero};
use serde_json::value::RawValue;
use std::collections::HashMap;
use std::str::FromStr;
use tracing::{debug, instrument};

/// Source of current USD unit prices.
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Unit prices of `token_a` and `token_b`, in that order.
    ///
    /// Fails if the index errors or omits either token.
    async fn usd_prices(
        &self,
        token_a: Address,
        token_b: Address,
    ) -> MonitorResult<(BigDecimal, BigDecimal)>;
}

/// [`PriceSource`] backed by the CoinGecko token price API.
#[derive(Debug, Clone)]
pub struct CoinGeckoClient {
    http: reqwest::Client,
    base_url: String,
    platform: String,
}

impl CoinGeckoClient {
    /// Create a client for `platform` (e.g. `ethereum`) at `base_url`.
    #[must_use]
    pub fn new(base_url: impl Into<String>, platform: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            platform: platform.into(),
        }
    }

    /// Replace the HTTP client, e.g. to set timeouts or proxy rules.
    #[must_use]
    pub fn with_http_client(mut self, http: reqwest::Client) -> Self {
        self.http = http;
        self
    }

    /// Endpoint queried for this client's platform.
    #[must_use]
    pub fn endpoint(&self) -> String {
        format!("{}/simple/token_price/{}", self.base_url, self.platform)
    }
}

#[async_trait]
impl PriceSource for CoinGeckoClient {
    #[instrument(skip(self), fields(platform = %self.platform))]
    async fn usd_prices(
        &self,
        token_a: Address,
        token_b: Address,
    ) -> MonitorResult<(BigDecimal, BigDecimal)> {
        let addresses = format!("{},{}", canonical(&token_a), canonical(&token_b));
        debug!(%addresses, "Requesting USD prices");

        let response = self
            .http
            .get(self.endpoint())
            .query(&[
                ("contract_addresses", addresses.as_str()),
                ("vs_currencies", "usd"),
            ])
            .send()
            .await
            .map_err(|e| MonitorError::price("Price request failed", Some(Box::new(e))))?
            .error_for_status()
            .map_err(|e| MonitorError::price("Price index returned an error", Some(Box::new(e))))?;

        let body = response
            .text()
            .await
            .map_err(|e| MonitorError::price("Failed to read price response", Some(Box::new(e))))?;

        let prices = parse_price_response(&body)?;
        Ok((
            price_for(&prices, &token_a)?,
            price_for(&prices, &token_b)?,
        ))
    }
}

/// Parse a `{ "<address>": { "usd": <number> } }` body.
///
/// Keys are lower-cased. Entries without a usable `usd` field are left out
/// so that the caller reports them as missing.
///
/// Prices are read from the number's JSON text as sent, so a price with
/// more significant digits than an `f64` holds is kept exactly. Quoted
/// decimal strings are accepted as well.
///
/// # Errors
///
/// Returns an error if the body is not an object of per-address objects.
pub fn parse_price_response(body: &str) -> MonitorResult<HashMap<String, BigDecimal>> {
    let entries: HashMap<String, HashMap<String, Box<RawValue>>> = serde_json::from_str(body)
        .map_err(|e| {
            MonitorError::price("Price response is not an address to price map", Some(Box::new(e)))
        })?;

    let mut prices = HashMap::with_capacity(entries.len());
    for (address, entry) in entries {
        let Some(price) = entry.get("usd").and_then(|raw| decimal_from_raw(raw)) else {
            debug!(%address, "No USD price in response entry");
            continue;
        };
        prices.insert(address.to_ascii_lowercase(), price);
    }

    Ok(prices)
}

fn decimal_from_raw(raw: &RawValue) -> Option<BigDecimal> {
    let text = raw.get().trim();
    if text.starts_with('"') {
        let quoted: String = serde_json::from_str(text).ok()?;
        return BigDecimal::from_str(quoted.trim()).ok();
    }
    BigDecimal::from_str(text).ok()
}

/// Look up the price of `token` in a parsed response.
///
/// # Errors
///
/// Returns an error if the token is absent or its price is negative.
pub fn price_for(prices: &HashMap<String, BigDecimal>, token: &Address) -> MonitorResult<BigDecimal> {
    let key = canonical(token);
    let price = prices
        .get(&key)
        .cloned()
        .ok_or_else(|| MonitorError::price(format!("No USD price returned for {key}"), None))?;

    if price < BigDecimal::zero() {
        return Err(MonitorError::price(
            format!("Negative USD price for {key}"),
            None,
        ));
    }
    Ok(price)
}

/// Exact conversion of a raw 256-bit integer into a [`BigInt`].
#[must_use]
pub fn u256_to_bigint(amount: U256) -> BigInt {
    BigInt::from_bytes_be(Sign::Plus, &amount.to_be_bytes::<32>())
}

/// Compute `amount / 10^decimals * price`.
///
/// # Errors
///
/// Returns an error if `price` is negative.
pub fn to_usd_value(amount: U256, decimals: u8, price: &BigDecimal) -> MonitorResult<BigDecimal> {
    if *price < BigDecimal::zero() {
        return Err(MonitorError::math("USD price cannot be negative", None));
    }

    let tokens = BigDecimal::new(u256_to_bigint(amount), i64::from(decimals));
    Ok(tokens * price)
}

/// USD value of one swap leg.
///
/// A zero amount is worth zero and never triggers a `decimals()` call.
///
/// # Errors
///
/// Returns an error if the decimals query fails.
pub async fn usd_value(
    chain: &dyn ChainReader,
    amount: U256,
    token: Address,
    price: &BigDecimal,
) -> MonitorResult<BigDecimal> {
    if amount.is_zero() {
        return Ok(BigDecimal::zero());
    }

    let decimals = chain.decimals(token).await?;
    to_usd_value(amount, decimals, price)
}
