//! Contract reads against a forked mainnet.
//!
//! These tests need `anvil` on the `PATH` and a mainnet endpoint in
//! `RPC_URL` (or `ALCHEMY_API_KEY`). The fork block can be overridden with
//! `ANVIL_FORK_BLOCK`.
//!
//! ```bash
//! cargo test --test anvil_fork -- --ignored
//! ```

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use alloy::node_bindings::{Anvil, AnvilInstance};
use alloy::primitives::{address, Address};
use eyre::Context;
use std::env;
use uniswap_flash_monitor::{
    chain::{AlloyChainReader, ChainReader},
    config::{Config, UNISWAP_V3_FACTORY},
    error::MonitorResult,
    pool::validate_pool,
    rpc::create_provider,
};

/// Block with the USDC/WETH 0.05% pool long deployed.
const DEFAULT_FORK_BLOCK: u64 = 19_000_000;

const USDC_WETH_005: Address = address!("88e6A0c2dDD26FEEb64F039a2c41296FcB3f5640");
const USDC: Address = address!("A0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48");
const WETH: Address = address!("C02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2");

fn fork_block() -> u64 {
    env::var("ANVIL_FORK_BLOCK")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_FORK_BLOCK)
}

fn start_anvil_fork() -> MonitorResult<AnvilInstance> {
    let config = Config::from_env()?;

    let anvil = Anvil::new()
        .fork(config.rpc_url())
        .fork_block_number(fork_block())
        .try_spawn()
        .wrap_err("Failed to spawn Anvil instance")?;

    tracing::info!(endpoint = %anvil.endpoint(), "Anvil started");
    Ok(anvil)
}

async fn fork_reader(anvil: &AnvilInstance) -> AlloyChainReader {
    let provider = create_provider(&anvil.endpoint()).await.unwrap();
    AlloyChainReader::new(provider)
}

#[tokio::test]
#[ignore = "requires anvil and a mainnet RPC endpoint"]
async fn test_real_pool_is_genuine() {
    let anvil = start_anvil_fork().unwrap();
    let reader = fork_reader(&anvil).await;

    let tokens = validate_pool(&reader, UNISWAP_V3_FACTORY, USDC_WETH_005)
        .await
        .expect("factory should recognise the pool");

    assert_eq!(tokens.token0, USDC);
    assert_eq!(tokens.token1, WETH);
    assert_eq!(tokens.fee.to::<u32>(), 500);
}

#[tokio::test]
#[ignore = "requires anvil and a mainnet RPC endpoint"]
async fn test_token_is_not_a_pool() {
    let anvil = start_anvil_fork().unwrap();
    let reader = fork_reader(&anvil).await;

    assert!(validate_pool(&reader, UNISWAP_V3_FACTORY, USDC).await.is_none());
}

#[tokio::test]
#[ignore = "requires anvil and a mainnet RPC endpoint"]
async fn test_token_decimals() {
    let anvil = start_anvil_fork().unwrap();
    let reader = fork_reader(&anvil).await;

    assert_eq!(reader.decimals(USDC).await.unwrap(), 6);
    assert_eq!(reader.decimals(WETH).await.unwrap(), 18);
}
