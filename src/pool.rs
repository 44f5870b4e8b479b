//! Pool authenticity check.
//!
//! Any contract can emit a log with the `Flash` signature. A candidate is
//! accepted only if the factory maps the candidate's own `(token0, token1,
//! fee)` back to the candidate's address. Every failure along the way
//! (missing interface, revert, transport error, mismatch) yields `None`.

use crate::address::{canonical, same_address};
use crate::chain::ChainReader;
use crate::error::MonitorResult;
use alloy::primitives::aliases::U24;
use alloy::primitives::Address;
use tracing::debug;

/// Tokens and fee tier of a pool that passed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolTokens {
    /// Pool `token0`
    pub token0: Address,
    /// Pool `token1`
    pub token1: Address,
    /// Pool fee tier in hundredths of a basis point
    pub fee: U24,
}

/// Verify that `candidate` is a pool deployed by `factory`.
pub async fn validate_pool(
    chain: &dyn ChainReader,
    factory: Address,
    candidate: Address,
) -> Option<PoolTokens> {
    match lookup_pool(chain, factory, candidate).await {
        Ok(Some(tokens)) => Some(tokens),
        Ok(None) => {
            debug!(pool = %canonical(&candidate), "Factory does not know this pool");
            None
        }
        Err(e) => {
            debug!(pool = %canonical(&candidate), error = %e, "Pool validation call failed");
            None
        }
    }
}

async fn lookup_pool(
    chain: &dyn ChainReader,
    factory: Address,
    candidate: Address,
) -> MonitorResult<Option<PoolTokens>> {
    let (token0, token1, fee) = futures_util::try_join!(
        chain.token0(candidate),
        chain.token1(candidate),
        chain.fee(candidate)
    )?;

    let expected = chain.get_pool(factory, token0, token1, fee).await?;

    if same_address(&canonical(&expected), &canonical(&candidate)) {
        Ok(Some(PoolTokens {
            token0,
            token1,
            fee,
        }))
    } else {
        Ok(None)
    }
}
