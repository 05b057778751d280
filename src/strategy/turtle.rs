use super::signals::{evaluate_entry, evaluate_position, TurtleSignal};
use super::{Parameters, StrategyConfig};
use crate::error::TurtleError;
use crate::execution::{CandleBuffer, CandleUpdate, OrderSink};
use crate::models::{AccountSnapshot, Candle, MarketUpdate, OrderInstruction, Quote, StrategyState};

/// Turtle trading state machine for one contract
///
/// Flat: waits for a Donchian breakout. Long/short: adds a unit every
/// half N in its favour (risk permitting), stops out at 2N against the last
/// entry, and exits when price crosses the shorter exit channel.
pub struct TurtleStrategy {
    symbol: String,
    config: StrategyConfig,
    state: StrategyState,
    candles: CandleBuffer,
    quote: Option<Quote>,
    account: Option<AccountSnapshot>,
    params: Option<Parameters>,
}

impl TurtleStrategy {
    pub fn new(symbol: &str, config: StrategyConfig, state: StrategyState) -> Self {
        let candles = CandleBuffer::new(config.window_len());

        Self {
            symbol: symbol.to_string(),
            config,
            state: state.normalized(),
            candles,
            quote: None,
            account: None,
            params: None,
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn config(&self) -> &StrategyConfig {
        &self.config
    }

    pub fn state(&self) -> StrategyState {
        self.state
    }

    pub fn parameters(&self) -> Option<&Parameters> {
        self.params.as_ref()
    }

    pub fn candles(&self) -> &CandleBuffer {
        &self.candles
    }

    /// Record an update without trading on it (used while starting up)
    pub fn observe(&mut self, update: MarketUpdate) {
        match update {
            MarketUpdate::Quote(quote) => self.quote = Some(quote),
            MarketUpdate::Candle(candle) => {
                self.candles.push(candle);
            }
            MarketUpdate::Account(account) => self.account = Some(account),
        }
    }

    /// Recompute N, the unit size and the channels from the current window
    pub fn recalc_parameters(&mut self) -> Result<&Parameters, TurtleError> {
        let params = Parameters::calculate(
            &self.candles.get_candles(),
            self.quote.as_ref(),
            self.account.as_ref(),
            &self.config,
        )?;

        tracing::info!(
            n = params.volatility_n,
            unit = params.unit_size,
            "Donchian channel: entry {:.2} / {:.2}, exit {:.2} / {:.2}",
            params.channel_high_entry,
            params.channel_low_entry,
            params.channel_high_exit,
            params.channel_low_exit
        );

        Ok(self.params.insert(params))
    }

    /// Route one live update to its handler
    pub fn handle_update<S: OrderSink>(
        &mut self,
        update: MarketUpdate,
        sink: &mut S,
    ) -> Result<Vec<OrderInstruction>, TurtleError> {
        match update {
            MarketUpdate::Quote(quote) => self.on_quote(quote, sink),
            MarketUpdate::Candle(candle) => {
                self.on_candle(candle)?;
                Ok(Vec::new())
            }
            MarketUpdate::Account(account) => {
                self.account = Some(account);
                Ok(Vec::new())
            }
        }
    }

    /// Maintain the window; a new bar refreshes the thresholds
    ///
    /// While flat a new bar triggers a full recalculation. While holding a
    /// position N and the unit stay as they were at entry and both channels
    /// follow the trailing window. With `recalc_on_new_candle` off only the
    /// exit channel ever moves after startup.
    pub fn on_candle(&mut self, candle: Candle) -> Result<CandleUpdate, TurtleError> {
        let update = self.candles.push(candle);
        if update != CandleUpdate::NewBar || self.params.is_none() {
            return Ok(update);
        }

        if self.state.is_flat() && self.config.recalc_on_new_candle {
            self.recalc_parameters()?;
        } else if let Some(params) = self.params.as_mut() {
            let candles = self.candles.get_candles();
            if self.config.recalc_on_new_candle {
                params.refresh_channels(&candles, &self.config)?;
            } else {
                params.refresh_exit_channel(&candles, &self.config)?;
            }
            tracing::debug!(
                "Channels refreshed: entry {:.2} / {:.2}, exit {:.2} / {:.2}",
                params.channel_high_entry,
                params.channel_low_entry,
                params.channel_high_exit,
                params.channel_low_exit
            );
        }

        Ok(update)
    }

    /// Evaluate the rules when the last price has changed
    pub fn on_quote<S: OrderSink>(
        &mut self,
        quote: Quote,
        sink: &mut S,
    ) -> Result<Vec<OrderInstruction>, TurtleError> {
        let changed = self
            .quote
            .as_ref()
            .map_or(true, |previous| previous.last_price != quote.last_price);
        let price = quote.last_price;
        self.quote = Some(quote);

        if !changed || !price.is_finite() {
            return Ok(Vec::new());
        }

        self.on_price(price, sink)
    }

    /// Entry rule while flat, pyramiding/exit rules otherwise
    pub fn on_price<S: OrderSink>(
        &mut self,
        price: f64,
        sink: &mut S,
    ) -> Result<Vec<OrderInstruction>, TurtleError> {
        let Some(params) = self.params else {
            tracing::debug!("Price {:.2} ignored, parameters not ready", price);
            return Ok(Vec::new());
        };
        tracing::debug!("Last price: {:.2}", price);

        let signals = if self.state.is_flat() {
            evaluate_entry(price, &params).into_iter().collect()
        } else {
            let pyramiding_allowed = match self.config.risk.check_pyramiding(self.account.as_ref()) {
                Ok(()) => true,
                Err(trip) => {
                    tracing::debug!("Pyramiding blocked: {:?}", trip);
                    false
                }
            };
            evaluate_position(&self.state, price, &params, &self.config, pyramiding_allowed)
        };

        let mut orders = Vec::new();
        for signal in signals {
            let target = signal.target_position(self.state.position, params.unit_size);
            match signal {
                TurtleSignal::EnterLong | TurtleSignal::EnterShort if params.unit_size == 0 => {
                    tracing::warn!(
                        "{:?} at {:.2} skipped: unit size is 0 (account too small for N = {:.2})",
                        signal,
                        price,
                        params.volatility_n
                    );
                    continue;
                }
                TurtleSignal::EnterLong => tracing::info!(
                    "Price {:.2} > channel high {:.2}, buying 1 unit ({} lots)",
                    price,
                    params.channel_high_entry,
                    params.unit_size
                ),
                TurtleSignal::EnterShort => tracing::info!(
                    "Price {:.2} < channel low {:.2}, selling 1 unit ({} lots)",
                    price,
                    params.channel_low_entry,
                    params.unit_size
                ),
                TurtleSignal::AddUnit => tracing::info!("Pyramiding: adding 1 unit at {:.2}", price),
                TurtleSignal::StopLoss => tracing::info!("Stop loss: closing all lots at {:.2}", price),
                TurtleSignal::ChannelExit => {
                    tracing::info!("Exit channel crossed: closing all lots at {:.2}", price)
                }
            }

            if let Some(order) = self.set_position(target, price, signal, sink)? {
                orders.push(order);
            }
        }

        Ok(orders)
    }

    /// Move the net position to `target` and tell the order sink
    ///
    /// Asking for the position already held (e.g. closing when flat) is a
    /// no-op and sends nothing.
    pub fn set_position<S: OrderSink>(
        &mut self,
        target: i64,
        price: f64,
        signal: TurtleSignal,
        sink: &mut S,
    ) -> Result<Option<OrderInstruction>, TurtleError> {
        if target == self.state.position {
            tracing::debug!("{:?} ignored, already at target position {}", signal, target);
            return Ok(None);
        }

        let order = OrderInstruction::new(&self.symbol, target, price, signal.reason());
        sink.set_target_position(order.clone())?;

        self.state = StrategyState {
            position: target,
            last_price: (target != 0).then_some(price),
        };

        if target == 0 && self.config.recalc_on_new_candle {
            self.recalc_after_close()?;
        }

        Ok(Some(order))
    }

    /// Resize and re-channel from the current window once flat again
    ///
    /// Missing data keeps the previous parameters.
    fn recalc_after_close(&mut self) -> Result<(), TurtleError> {
        match self.recalc_parameters() {
            Ok(_) => Ok(()),
            Err(e) if e.is_data_pending() => {
                tracing::debug!("Parameters kept after close: {}", e);
                Ok(())
            }
            Err(e) => Err(e),
        }
    }
}
