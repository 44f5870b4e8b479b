//! Long-lived, read-only monitor context.
//!
//! [`initialize`] turns a [`Config`] into a [`MonitorContext`]: it opens the
//! RPC provider, wraps it in the contract reader used for factory, pool and
//! token calls, and sets up the price index client. The context is never
//! mutated afterwards and is shared across concurrent transactions.

use crate::chain::{AlloyChainReader, ChainReader};
use crate::config::{Config, FailurePolicy};
use crate::error::MonitorResult;
use crate::pricing::{CoinGeckoClient, PriceSource};
use crate::rpc::{create_provider, Provider};
use alloy::primitives::Address;
use bigdecimal::BigDecimal;
use std::sync::Arc;
use tracing::info;

/// Everything the handler needs to process a transaction.
#[derive(Clone)]
pub struct MonitorContext {
    threshold_usd: BigDecimal,
    factory: Address,
    chain: Arc<dyn ChainReader>,
    prices: Arc<dyn PriceSource>,
    protocol: String,
    failure_policy: FailurePolicy,
}

impl MonitorContext {
    /// Context with protocol tag `uniswap` and [`FailurePolicy::FailFast`].
    #[must_use]
    pub fn new(
        threshold_usd: BigDecimal,
        factory: Address,
        chain: Arc<dyn ChainReader>,
        prices: Arc<dyn PriceSource>,
    ) -> Self {
        Self {
            threshold_usd,
            factory,
            chain,
            prices,
            protocol: "uniswap".to_string(),
            failure_policy: FailurePolicy::default(),
        }
    }

    /// Override the protocol tag.
    #[must_use]
    pub fn with_protocol(mut self, protocol: impl Into<String>) -> Self {
        self.protocol = protocol.into();
        self
    }

    /// Override the failure policy.
    #[must_use]
    pub const fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    /// Alert threshold in USD.
    #[must_use]
    pub const fn threshold_usd(&self) -> &BigDecimal {
        &self.threshold_usd
    }

    /// Factory used for pool validation.
    #[must_use]
    pub const fn factory(&self) -> Address {
        self.factory
    }

    /// Contract reader.
    #[must_use]
    pub fn chain(&self) -> &dyn ChainReader {
        self.chain.as_ref()
    }

    /// Price source.
    #[must_use]
    pub fn prices(&self) -> &dyn PriceSource {
        self.prices.as_ref()
    }

    /// Protocol tag.
    #[must_use]
    pub fn protocol(&self) -> &str {
        &self.protocol
    }

    /// Failure policy.
    #[must_use]
    pub const fn failure_policy(&self) -> FailurePolicy {
        self.failure_policy
    }
}

impl std::fmt::Debug for MonitorContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MonitorContext")
            .field("threshold_usd", &self.threshold_usd)
            .field("factory", &self.factory)
            .field("protocol", &self.protocol)
            .field("failure_policy", &self.failure_policy)
            .finish_non_exhaustive()
    }
}

/// Build the production context from configuration.
///
/// Creates the HTTP provider from `RPC_URL` and hands it to
/// [`with_provider`].
///
/// # Errors
///
/// Returns an error if the RPC URL cannot be parsed.
pub async fn initialize(config: &Config) -> MonitorResult<MonitorContext> {
    let provider = create_provider(config.rpc_url()).await?;
    Ok(with_provider(config, provider))
}

/// Build the production context around an existing provider.
///
/// The provider is cheap to clone, so callers that also need it for log
/// queries can share one connection with the contract reader.
#[must_use]
pub fn with_provider(config: &Config, provider: Provider) -> MonitorContext {
    let chain: Arc<dyn ChainReader> = Arc::new(AlloyChainReader::new(provider));
    let prices: Arc<dyn PriceSource> = Arc::new(CoinGeckoClient::new(
        config.price_api_url(),
        config.price_platform(),
    ));

    info!(
        factory = %config.factory_address(),
        threshold_usd = %config.threshold_usd(),
        protocol = config.protocol(),
        failure_policy = ?config.failure_policy(),
        "Monitor context initialized"
    );

    MonitorContext::new(
        config.threshold_usd().clone(),
        config.factory_address(),
        chain,
        prices,
    )
    .with_protocol(config.protocol())
    .with_failure_policy(config.failure_policy())
}
