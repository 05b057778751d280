// Turtle trading strategy module
pub mod parameters;
pub mod signals;
pub mod turtle;

pub use parameters::Parameters;
pub use signals::TurtleSignal;
pub use turtle::TurtleStrategy;

use serde::{Deserialize, Serialize};

use crate::indicators::AtrSmoothing;
use crate::risk::RiskLimits;

/// Configuration for the turtle rules
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StrategyConfig {
    pub entry_channel_days: usize, // Donchian lookback for breakout entries
    pub exit_channel_days: usize,  // Donchian lookback for profit exits
    pub atr_days: usize,           // Volatility (N) period
    pub atr_smoothing: AtrSmoothing,
    pub pyramid_step_n: f64, // Add a unit every this many N in our favour
    pub stop_loss_n: f64,    // Stop out this many N against the last entry
    pub recalc_on_new_candle: bool,
    pub risk: RiskLimits,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            entry_channel_days: 20,
            exit_channel_days: 10,
            atr_days: 20,
            atr_smoothing: AtrSmoothing::Simple,
            pyramid_step_n: 0.5,
            stop_loss_n: 2.0,
            recalc_on_new_candle: true,
            risk: RiskLimits::default(),
        }
    }
}

impl StrategyConfig {
    /// Daily bars kept in the rolling window
    ///
    /// # Example
    /// ```
    /// use turtlebot::strategy::StrategyConfig;
    ///
    /// let config = StrategyConfig::default();
    /// // max(20 + 1, 10 + 1, 20 * 5)
    /// assert_eq!(config.window_len(), 100);
    /// ```
    pub fn window_len(&self) -> usize {
        (self.entry_channel_days + 1)
            .max(self.exit_channel_days + 1)
            .max(self.atr_days * 5)
    }

    /// Fewest bars from which every parameter can be computed
    pub fn min_candles_required(&self) -> usize {
        self.entry_channel_days
            .max(self.exit_channel_days)
            .max(self.atr_days)
            + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_min_candles_required() {
        let config = StrategyConfig::default();
        assert_eq!(config.min_candles_required(), 21);
    }

    #[test]
    fn test_custom_window() {
        let config = StrategyConfig {
            entry_channel_days: 55,
            exit_channel_days: 20,
            atr_days: 5,
            ..Default::default()
        };

        assert_eq!(config.window_len(), 56);
        assert_eq!(config.min_candles_required(), 56);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: StrategyConfig =
            serde_json::from_str(r#"{"entry_channel_days": 55, "risk": {"max_risk_ratio": 0.3}}"#)
                .unwrap();

        assert_eq!(config.entry_channel_days, 55);
        assert_eq!(config.exit_channel_days, 10);
        assert_eq!(config.risk.max_risk_ratio, 0.3);
        assert_eq!(config.risk.risk_per_unit, 0.01);
        assert!(config.recalc_on_new_candle);
    }
}
