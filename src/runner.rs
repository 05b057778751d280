use std::future::Future;
use std::time::Duration;

use tokio::time::{timeout_at, Instant};

use crate::error::TurtleError;
use crate::execution::{MarketFeed, OrderSink};
use crate::models::StrategyState;
use crate::persistence::StateStore;
use crate::strategy::TurtleStrategy;
use crate::Result;

/// Why the trading loop stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    FeedEnded,
    Shutdown,
}

/// Single-threaded driver: one wait per update, handlers run to completion
///
/// Startup waits (up to a deadline) for enough data to compute the
/// parameters; afterwards every update goes to the strategy. The state
/// file is written when the loop ends, on error paths included.
pub struct TurtleRunner<F, S> {
    feed: F,
    sink: S,
    strategy: TurtleStrategy,
    store: StateStore,
    startup_deadline: Duration,
}

impl<F: MarketFeed, S: OrderSink> TurtleRunner<F, S> {
    pub fn new(
        feed: F,
        sink: S,
        strategy: TurtleStrategy,
        store: StateStore,
        startup_deadline: Duration,
    ) -> Self {
        Self {
            feed,
            sink,
            strategy,
            store,
            startup_deadline,
        }
    }

    pub fn strategy(&self) -> &TurtleStrategy {
        &self.strategy
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn state(&self) -> StrategyState {
        self.strategy.state()
    }

    /// Run until the feed ends, `shutdown` resolves or a fatal error occurs
    pub async fn run(&mut self, shutdown: impl Future<Output = ()>) -> Result<StopReason> {
        tokio::pin!(shutdown);

        let outcome = self.run_inner(&mut shutdown).await;

        let state = self.strategy.state();
        match self.store.save(&state) {
            Ok(()) => tracing::info!(
                "Saved state: position {}, last price {:?}",
                state.position,
                state.last_price
            ),
            Err(e) => {
                tracing::error!("Failed to save state: {}", e);
                if outcome.is_ok() {
                    return Err(e.into());
                }
            }
        }

        outcome
    }

    async fn run_inner<D>(&mut self, shutdown: &mut std::pin::Pin<&mut D>) -> Result<StopReason>
    where
        D: Future<Output = ()>,
    {
        tracing::info!("Waiting for candles and account data...");
        if let Some(reason) = self.wait_for_parameters(shutdown).await? {
            return Ok(reason);
        }

        let state = self.strategy.state();
        tracing::info!(
            "Strategy running: position {}, last price {:?}",
            state.position,
            state.last_price
        );

        loop {
            let update = tokio::select! {
                biased;
                _ = shutdown.as_mut() => {
                    tracing::info!("Shutdown requested");
                    return Ok(StopReason::Shutdown);
                }
                update = self.feed.next_update() => update?,
            };

            let Some(update) = update else {
                tracing::info!("Market feed ended");
                return Ok(StopReason::FeedEnded);
            };

            self.strategy.handle_update(update, &mut self.sink)?;
        }
    }

    /// Feed updates to the strategy until its parameters can be computed
    ///
    /// Returns `Some` if shutdown was requested first.
    async fn wait_for_parameters<D>(
        &mut self,
        shutdown: &mut std::pin::Pin<&mut D>,
    ) -> Result<Option<StopReason>>
    where
        D: Future<Output = ()>,
    {
        let deadline = Instant::now() + self.startup_deadline;

        loop {
            match self.strategy.recalc_parameters() {
                Ok(_) => return Ok(None),
                Err(e) if e.is_data_pending() => {
                    tracing::debug!("Parameters not ready: {}", e);
                }
                Err(e) => return Err(e.into()),
            }

            let update = tokio::select! {
                biased;
                _ = shutdown.as_mut() => return Ok(Some(StopReason::Shutdown)),
                update = timeout_at(deadline, self.feed.next_update()) => update,
            };

            match update {
                Ok(Ok(Some(update))) => self.strategy.observe(update),
                Ok(Ok(None)) | Err(_) => {
                    return Err(TurtleError::DataUnavailable(self.startup_deadline).into())
                }
                Ok(Err(e)) => return Err(e),
            }
        }
    }
}
