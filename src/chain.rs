//! Read-only contract calls against the chain.
//!
//! The pipeline talks to contracts only through the [`ChainReader`] trait so
//! tests can substitute an in-memory chain. [`AlloyChainReader`] is the
//! production implementation, issuing `eth_call`s through the `sol!`
//! bindings in [`crate::events`].

use crate::error::{MonitorError, MonitorResult};
use crate::events::{IERC20Metadata, IUniswapV3Factory, IUniswapV3Pool};
use crate::rpc::Provider;
use alloy::primitives::aliases::U24;
use alloy::primitives::Address;
use async_trait::async_trait;
use tracing::debug;

/// Contract reads used by the flash swap pipeline.
#[async_trait]
pub trait ChainReader: Send + Sync {
    /// `token0()` of a Uniswap V3 pool.
    async fn token0(&self, pool: Address) -> MonitorResult<Address>;

    /// `token1()` of a Uniswap V3 pool.
    async fn token1(&self, pool: Address) -> MonitorResult<Address>;

    /// `fee()` tier of a Uniswap V3 pool.
    async fn fee(&self, pool: Address) -> MonitorResult<U24>;

    /// Address the factory holds for `(token_a, token_b, fee)`.
    async fn get_pool(
        &self,
        factory: Address,
        token_a: Address,
        token_b: Address,
        fee: U24,
    ) -> MonitorResult<Address>;

    /// ERC-20 `decimals()`.
    async fn decimals(&self, token: Address) -> MonitorResult<u8>;
}

/// [`ChainReader`] backed by an Alloy HTTP provider.
#[derive(Clone)]
pub struct AlloyChainReader {
    provider: Provider,
}

impl AlloyChainReader {
    /// Wrap a provider.
    #[must_use]
    pub const fn new(provider: Provider) -> Self {
        Self { provider }
    }
}

fn call_failed(method: &str, target: Address, e: alloy::contract::Error) -> MonitorError {
    MonitorError::rpc(format!("{method} call to {target} failed"), Some(Box::new(e)))
}

#[async_trait]
impl ChainReader for AlloyChainReader {
    async fn token0(&self, pool: Address) -> MonitorResult<Address> {
        let contract = IUniswapV3Pool::new(pool, &self.provider);
        let token = contract
            .token0()
            .call()
            .await
            .map_err(|e| call_failed("token0", pool, e))?
            ._0;
        debug!(%pool, %token, "token0");
        Ok(token)
    }

    async fn token1(&self, pool: Address) -> MonitorResult<Address> {
        let contract = IUniswapV3Pool::new(pool, &self.provider);
        let token = contract
            .token1()
            .call()
            .await
            .map_err(|e| call_failed("token1", pool, e))?
            ._0;
        debug!(%pool, %token, "token1");
        Ok(token)
    }

    async fn fee(&self, pool: Address) -> MonitorResult<U24> {
        let contract = IUniswapV3Pool::new(pool, &self.provider);
        let fee = contract
            .fee()
            .call()
            .await
            .map_err(|e| call_failed("fee", pool, e))?
            ._0;
        debug!(%pool, %fee, "fee");
        Ok(fee)
    }

    async fn get_pool(
        &self,
        factory: Address,
        token_a: Address,
        token_b: Address,
        fee: U24,
    ) -> MonitorResult<Address> {
        let contract = IUniswapV3Factory::new(factory, &self.provider);
        let pool = contract
            .getPool(token_a, token_b, fee)
            .call()
            .await
            .map_err(|e| call_failed("getPool", factory, e))?
            .pool;
        debug!(%factory, %token_a, %token_b, %fee, %pool, "getPool");
        Ok(pool)
    }

    async fn decimals(&self, token: Address) -> MonitorResult<u8> {
        let contract = IERC20Metadata::new(token, &self.provider);
        let decimals = contract
            .decimals()
            .call()
            .await
            .map_err(|e| call_failed("decimals", token, e))?
            ._0;
        debug!(%token, decimals, "decimals");
        Ok(decimals)
    }
}
