//! Per-transaction flash swap pipeline.
//!
//! ```text
//! TransactionEvent
//!     ↓ extract_flash_events      (no match → Ok(empty), zero calls)
//! FlashEvent × n                  (processed concurrently)
//!     ↓ validate_pool             (any failure → dropped silently)
//!     ↓ PriceSource::usd_prices   (one batched request per swap)
//!     ↓ usd_value × 2             (zero amount → no decimals call)
//!     ↓ evaluate_swap             (total > threshold → Alert)
//! Vec<Alert>
//! ```
//!
//! Errors after validation follow the context's [`FailurePolicy`].

use crate::alert::{evaluate_swap, Alert, SwapRecord};
use crate::config::FailurePolicy;
use crate::context::MonitorContext;
use crate::error::{MonitorError, MonitorResult};
use crate::events::{extract_flash_events, FlashEvent, TransactionEvent};
use crate::pool::validate_pool;
use crate::pricing::usd_value;
use alloy::primitives::B256;
use futures_util::future::{join_all, try_join_all};
use std::sync::{Arc, OnceLock};
use tracing::{debug, info, instrument, warn};

/// Flash swap handler.
///
/// Holds the [`MonitorContext`] once [`initialize`](Self::initialize) has
/// run. The handler is `Sync` and may be shared across tasks that process
/// different transactions at the same time.
#[derive(Debug, Default)]
pub struct FlashSwapHandler {
    context: OnceLock<Arc<MonitorContext>>,
}

impl FlashSwapHandler {
    /// Handler without a context; every call fails until initialized.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            context: OnceLock::new(),
        }
    }

    /// Handler that is ready to use.
    #[must_use]
    pub fn with_context(context: MonitorContext) -> Self {
        Self {
            context: OnceLock::from(Arc::new(context)),
        }
    }

    /// Install the context.
    ///
    /// # Errors
    ///
    /// Returns an error if a context is already installed.
    pub fn initialize(&self, context: MonitorContext) -> MonitorResult<()> {
        self.context
            .set(Arc::new(context))
            .map_err(|_| MonitorError::config("Handler is already initialized", None))
    }

    /// Whether [`initialize`](Self::initialize) has run.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.context.get().is_some()
    }

    /// The installed context.
    ///
    /// # Errors
    ///
    /// Returns [`MonitorError::Uninitialized`] before initialization.
    pub fn context(&self) -> MonitorResult<&MonitorContext> {
        self.context
            .get()
            .map(Arc::as_ref)
            .ok_or(MonitorError::Uninitialized)
    }

    /// Run the pipeline for one transaction.
    ///
    /// # Errors
    ///
    /// Returns [`MonitorError::Uninitialized`] before initialization. Under
    /// [`FailurePolicy::FailFast`], also returns the first price or decimals
    /// error of any swap that passed pool validation.
    #[instrument(skip_all, fields(tx = %tx.hash()))]
    pub async fn handle_transaction(&self, tx: &TransactionEvent) -> MonitorResult<Vec<Alert>> {
        let context = self.context()?;

        let flashes = extract_flash_events(tx);
        if flashes.is_empty() {
            return Ok(Vec::new());
        }
        debug!(count = flashes.len(), "Flash events found");

        let tasks = flashes.iter().map(|flash| process_flash(context, flash));

        let alerts: Vec<Alert> = match context.failure_policy() {
            FailurePolicy::FailFast => try_join_all(tasks).await?.into_iter().flatten().collect(),
            FailurePolicy::Isolate => join_all(tasks)
                .await
                .into_iter()
                .zip(&flashes)
                .filter_map(|(outcome, flash)| match outcome {
                    Ok(alert) => alert,
                    Err(e) => {
                        warn!(pool = %flash.pool, error = %e, "Dropping flash swap after failure");
                        None
                    }
                })
                .collect(),
        };

        if !alerts.is_empty() {
            info!(alerts = alerts.len(), "Large flash swaps detected");
        }

        Ok(alerts)
    }

    /// Run the pipeline for several transactions concurrently.
    ///
    /// Results are returned in input order, each paired with its hash.
    pub async fn handle_batch(
        &self,
        txs: &[TransactionEvent],
    ) -> Vec<(B256, MonitorResult<Vec<Alert>>)> {
        join_all(
            txs.iter()
                .map(|tx| async move { (tx.hash(), self.handle_transaction(tx).await) }),
        )
        .await
    }
}

async fn process_flash(context: &MonitorContext, flash: &FlashEvent) -> MonitorResult<Option<Alert>> {
    let Some(tokens) = validate_pool(context.chain(), context.factory(), flash.pool).await else {
        return Ok(None);
    };

    let (price0, price1) = context
        .prices()
        .usd_prices(tokens.token0, tokens.token1)
        .await?;

    let (value0_usd, value1_usd) = futures_util::try_join!(
        usd_value(context.chain(), flash.amount0, tokens.token0, &price0),
        usd_value(context.chain(), flash.amount1, tokens.token1, &price1)
    )?;

    let record = SwapRecord {
        value0_usd,
        value1_usd,
        ..SwapRecord::new(flash.pool, flash.sender, flash.amount0, flash.amount1)
    };
    debug!(
        pool = %record.pool,
        value0_usd = %record.value0_usd,
        value1_usd = %record.value1_usd,
        "Flash swap valued"
    );

    Ok(evaluate_swap(
        &record,
        context.threshold_usd(),
        context.protocol(),
    ))
}
