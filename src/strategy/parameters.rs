use super::StrategyConfig;
use crate::error::TurtleError;
use crate::indicators::{calculate_atr, calculate_donchian};
use crate::models::{AccountSnapshot, Candle, Quote};
use crate::risk::unit_size;

/// Thresholds the entry and exit rules compare prices against
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Parameters {
    pub volatility_n: f64,
    pub unit_size: u64,
    pub channel_high_entry: f64,
    pub channel_low_entry: f64,
    pub channel_high_exit: f64,
    pub channel_low_exit: f64,
}

impl Parameters {
    /// Derive N, the unit size and both Donchian channels
    ///
    /// Channels exclude the newest bar. Missing data yields a
    /// pending error; a non-positive N is a hard failure.
    pub fn calculate(
        candles: &[Candle],
        quote: Option<&Quote>,
        account: Option<&AccountSnapshot>,
        config: &StrategyConfig,
    ) -> Result<Self, TurtleError> {
        let need = config.min_candles_required();
        if candles.len() < need {
            return Err(TurtleError::InsufficientCandles {
                have: candles.len(),
                need,
            });
        }
        let quote = quote.ok_or(TurtleError::MissingQuote)?;
        let account = account.ok_or(TurtleError::MissingAccount)?;

        let insufficient = || TurtleError::InsufficientCandles {
            have: candles.len(),
            need,
        };

        let volatility_n =
            calculate_atr(candles, config.atr_days, config.atr_smoothing).ok_or_else(insufficient)?;
        let unit_size = unit_size(
            account.balance,
            quote.volume_multiple,
            volatility_n,
            config.risk.risk_per_unit,
        )?;

        let entry = calculate_donchian(candles, config.entry_channel_days).ok_or_else(insufficient)?;
        let exit = calculate_donchian(candles, config.exit_channel_days).ok_or_else(insufficient)?;

        Ok(Self {
            volatility_n,
            unit_size,
            channel_high_entry: entry.upper,
            channel_low_entry: entry.lower,
            channel_high_exit: exit.upper,
            channel_low_exit: exit.lower,
        })
    }

    /// Recompute both channels from the trailing window, keeping N and the unit
    pub fn refresh_channels(
        &mut self,
        candles: &[Candle],
        config: &StrategyConfig,
    ) -> Result<(), TurtleError> {
        let entry = calculate_donchian(candles, config.entry_channel_days).ok_or(
            TurtleError::InsufficientCandles {
                have: candles.len(),
                need: config.entry_channel_days + 1,
            },
        )?;
        self.refresh_exit_channel(candles, config)?;

        self.channel_high_entry = entry.upper;
        self.channel_low_entry = entry.lower;
        Ok(())
    }

    /// Recompute only the exit channel, keeping N, unit and entry bounds
    pub fn refresh_exit_channel(
        &mut self,
        candles: &[Candle],
        config: &StrategyConfig,
    ) -> Result<(), TurtleError> {
        let exit = calculate_donchian(candles, config.exit_channel_days).ok_or(
            TurtleError::InsufficientCandles {
                have: candles.len(),
                need: config.exit_channel_days + 1,
            },
        )?;

        self.channel_high_exit = exit.upper;
        self.channel_low_exit = exit.lower;
        Ok(())
    }
}
