//! # Uniswap V3 Flash Swap Monitor
//!
//! Watches transactions for Uniswap V3 `Flash` events and raises an alert
//! when the USD value borrowed in a single flash exceeds a threshold.
//!
//! ## Pipeline
//!
//! For every transaction:
//!
//! 1. **Extract** ([`events`]) - keep logs carrying the `Flash` topic
//! 2. **Validate** ([`pool`]) - the factory must map the emitter's
//!    `(token0, token1, fee)` back to the emitter
//! 3. **Price** ([`pricing`]) - one batched USD price lookup per pool
//! 4. **Value** ([`pricing`]) - `amount / 10^decimals * price`, exact
//! 5. **Alert** ([`alert`]) - total strictly above the threshold
//!
//! The pipeline lives in [`handler::FlashSwapHandler`], which is built from
//! a read-only [`context::MonitorContext`]. Contract reads and price lookups
//! go through the [`chain::ChainReader`] and [`pricing::PriceSource`] traits.
//!
//! ## Quick Start
//!
//! ```bash
//! RPC_URL=https://... cargo run --release -- watch
//! RPC_URL=https://... cargo run --release -- tx 0x<hash>
//! ```
//!
//! ### Using as a Library
//!
//! ```rust,no_run
//! use uniswap_flash_monitor::{config::Config, context, handler::FlashSwapHandler, rpc};
//! use alloy::primitives::B256;
//!
//! # async fn example() -> uniswap_flash_monitor::error::MonitorResult<()> {
//! let config = Config::from_env()?;
//! let handler = FlashSwapHandler::new();
//! handler.initialize(context::initialize(&config).await?)?;
//!
//! let provider = rpc::create_provider(config.rpc_url()).await?;
//! let tx = rpc::get_transaction_logs(&provider, B256::ZERO).await?;
//! for alert in handler.handle_transaction(&tx).await? {
//!     println!("{}", alert.description);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Testing
//!
//! ```bash
//! cargo test                      # unit + integration tests
//! cargo test -- --ignored         # network tests (RPC_URL required)
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod address;
pub mod alert;
pub mod chain;
pub mod cli;
pub mod config;
pub mod context;
pub mod error;
pub mod events;
pub mod handler;
pub mod observability;
pub mod pool;
pub mod pricing;
pub mod rpc;
