//! In-memory chain and price index shared by the integration tests.
//!
//! Both fakes count every call so tests can assert on how much external
//! work the pipeline issued.

#![allow(dead_code)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use alloy::primitives::aliases::U24;
use alloy::primitives::{address, Address, B256, U256};
use alloy::rpc::types::Log;
use alloy::sol_types::SolEvent;
use async_trait::async_trait;
use bigdecimal::BigDecimal;
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use uniswap_flash_monitor::chain::ChainReader;
use uniswap_flash_monitor::context::MonitorContext;
use uniswap_flash_monitor::error::{MonitorError, MonitorResult};
use uniswap_flash_monitor::events::{Flash, TransactionEvent};
use uniswap_flash_monitor::pricing::PriceSource;

pub const FACTORY: Address = address!("1F98431c8aD98523631AE4a59f267346ea31F984");
pub const POOL: Address = address!("88e6A0c2dDD26FEEb64F039a2c41296FcB3f5640");
pub const SECOND_POOL: Address = address!("8ad599c3A0ff1De082011EFDDc58f1908eb6e6D8");
pub const TOKEN0: Address = address!("A0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48");
pub const TOKEN1: Address = address!("C02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2");
pub const SENDER: Address = address!("00000000000000000000000000000000DeaDBeef");
pub const RECIPIENT: Address = address!("000000000000000000000000000000000000bEEF");

pub fn dec(s: &str) -> BigDecimal {
    BigDecimal::from_str(s).unwrap()
}

#[derive(Debug, Clone, Copy)]
struct PoolInfo {
    token0: Address,
    token1: Address,
    fee: U24,
}

/// Chain with configurable pools, factory registrations and token decimals.
#[derive(Default)]
pub struct FakeChain {
    pools: HashMap<Address, PoolInfo>,
    registry: HashMap<(Address, Address, U24), Address>,
    decimals: HashMap<Address, u8>,
    pool_calls: AtomicUsize,
    factory_calls: AtomicUsize,
    decimals_queried: Mutex<Vec<Address>>,
}

impl FakeChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// A pool the factory also knows about.
    pub fn with_genuine_pool(mut self, pool: Address, token0: Address, token1: Address) -> Self {
        let fee = U24::from(500u32);
        self.pools.insert(pool, PoolInfo { token0, token1, fee });
        self.registry.insert((token0, token1, fee), pool);
        self
    }

    /// A contract answering the pool interface that the factory never deployed.
    pub fn with_impostor_pool(mut self, pool: Address, token0: Address, token1: Address) -> Self {
        self.pools.insert(
            pool,
            PoolInfo {
                token0,
                token1,
                fee: U24::from(500u32),
            },
        );
        self
    }

    pub fn with_decimals(mut self, token: Address, decimals: u8) -> Self {
        self.decimals.insert(token, decimals);
        self
    }

    pub fn pool_calls(&self) -> usize {
        self.pool_calls.load(Ordering::SeqCst)
    }

    pub fn factory_calls(&self) -> usize {
        self.factory_calls.load(Ordering::SeqCst)
    }

    pub fn decimals_queried(&self) -> Vec<Address> {
        self.decimals_queried.lock().unwrap().clone()
    }

    pub fn total_calls(&self) -> usize {
        self.pool_calls() + self.factory_calls() + self.decimals_queried().len()
    }

    fn pool(&self, pool: Address) -> MonitorResult<PoolInfo> {
        self.pool_calls.fetch_add(1, Ordering::SeqCst);
        self.pools
            .get(&pool)
            .copied()
            .ok_or_else(|| MonitorError::rpc(format!("execution reverted at {pool}"), None))
    }
}

#[async_trait]
impl ChainReader for FakeChain {
    async fn token0(&self, pool: Address) -> MonitorResult<Address> {
        Ok(self.pool(pool)?.token0)
    }

    async fn token1(&self, pool: Address) -> MonitorResult<Address> {
        Ok(self.pool(pool)?.token1)
    }

    async fn fee(&self, pool: Address) -> MonitorResult<U24> {
        Ok(self.pool(pool)?.fee)
    }

    async fn get_pool(
        &self,
        factory: Address,
        token_a: Address,
        token_b: Address,
        fee: U24,
    ) -> MonitorResult<Address> {
        self.factory_calls.fetch_add(1, Ordering::SeqCst);
        if factory != FACTORY {
            return Err(MonitorError::rpc("unknown factory", None));
        }
        Ok(self
            .registry
            .get(&(token_a, token_b, fee))
            .copied()
            .unwrap_or(Address::ZERO))
    }

    async fn decimals(&self, token: Address) -> MonitorResult<u8> {
        self.decimals_queried.lock().unwrap().push(token);
        self.decimals
            .get(&token)
            .copied()
            .ok_or_else(|| MonitorError::rpc(format!("decimals() reverted for {token}"), None))
    }
}

/// Price index with a fixed price list.
#[derive(Default)]
pub struct FakePrices {
    prices: HashMap<Address, BigDecimal>,
    calls: AtomicUsize,
}

impl FakePrices {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_price(mut self, token: Address, usd: &str) -> Self {
        self.prices.insert(token, dec(usd));
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn lookup(&self, token: Address) -> MonitorResult<BigDecimal> {
        self.prices
            .get(&token)
            .cloned()
            .ok_or_else(|| MonitorError::price(format!("No USD price returned for {token}"), None))
    }
}

#[async_trait]
impl PriceSource for FakePrices {
    async fn usd_prices(
        &self,
        token_a: Address,
        token_b: Address,
    ) -> MonitorResult<(BigDecimal, BigDecimal)> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok((self.lookup(token_a)?, self.lookup(token_b)?))
    }
}

pub fn context(
    threshold: &str,
    chain: &Arc<FakeChain>,
    prices: &Arc<FakePrices>,
) -> MonitorContext {
    let chain: Arc<dyn ChainReader> = chain.clone();
    let prices: Arc<dyn PriceSource> = prices.clone();
    MonitorContext::new(dec(threshold), FACTORY, chain, prices)
}

/// A Flash log emitted by `emitter`.
pub fn flash_log(emitter: Address, amount0: U256, amount1: U256) -> Log {
    let event = Flash {
        sender: SENDER,
        recipient: RECIPIENT,
        amount0,
        amount1,
        paid0: U256::ZERO,
        paid1: U256::ZERO,
    };
    Log {
        inner: alloy::primitives::Log {
            address: emitter,
            data: event.encode_log_data(),
        },
        ..Default::default()
    }
}

/// A non-Flash log (an ERC-20 Transfer topic).
pub fn transfer_log(emitter: Address) -> Log {
    let topic = B256::from_str("0xddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef")
        .unwrap();
    Log {
        inner: alloy::primitives::Log {
            address: emitter,
            data: alloy::primitives::LogData::new_unchecked(
                vec![topic, B256::ZERO, B256::ZERO],
                alloy::primitives::Bytes::from(U256::from(1u64).to_be_bytes::<32>().to_vec()),
            ),
        },
        ..Default::default()
    }
}

pub fn transaction(id: u8, logs: Vec<Log>) -> TransactionEvent {
    TransactionEvent::new(B256::repeat_byte(id), Some(19_000_000), logs)
}
