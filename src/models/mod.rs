use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Daily OHLCV bar for the traded contract
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Candle {
    pub symbol: String,
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// Latest quote for the traded contract
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Quote {
    pub symbol: String,
    pub last_price: f64,
    pub volume_multiple: f64, // Contract multiplier
    pub timestamp: DateTime<Utc>,
}

/// Account figures the strategy needs for sizing and the pyramiding cap
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct AccountSnapshot {
    pub balance: f64,
    pub risk_ratio: f64, // Margin utilisation, 0.0 - 1.0
}

/// One update from the market data / account collaborator
#[derive(Debug, Clone, PartialEq)]
pub enum MarketUpdate {
    Quote(Quote),
    Candle(Candle),
    Account(AccountSnapshot),
}

/// Net position direction
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Direction {
    Flat,
    Long,
    Short,
}

/// Persistent strategy state
///
/// `position` is the net lot count (positive long, negative short).
/// `last_price` is the price of the last entry or pyramid add, and is
/// `None` exactly when the position is flat.
///
/// A flat state is written as `"last_price": null`. Files that encode the
/// missing price as a bare `NaN` are not valid JSON and are rejected on
/// load, so such a file has to be rewritten before a restart.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct StrategyState {
    pub position: i64,
    #[serde(default)]
    pub last_price: Option<f64>,
}

impl StrategyState {
    pub fn flat() -> Self {
        Self::default()
    }

    pub fn is_flat(&self) -> bool {
        self.position == 0
    }

    pub fn direction(&self) -> Direction {
        match self.position {
            0 => Direction::Flat,
            p if p > 0 => Direction::Long,
            _ => Direction::Short,
        }
    }

    /// Drop a stale entry price left on a flat position
    pub fn normalized(mut self) -> Self {
        if self.position == 0 {
            self.last_price = None;
        }
        self
    }
}

/// Why a target position was issued
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TradeReason {
    BreakoutLong,
    BreakoutShort,
    Pyramid,
    StopLoss,
    ChannelExit,
}

/// Target net position handed to the order sink
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderInstruction {
    pub id: Uuid,
    pub symbol: String,
    pub target_position: i64,
    pub reference_price: f64,
    pub reason: TradeReason,
    pub issued_at: DateTime<Utc>,
}

impl OrderInstruction {
    pub fn new(symbol: &str, target_position: i64, reference_price: f64, reason: TradeReason) -> Self {
        Self {
            id: Uuid::new_v4(),
            symbol: symbol.to_string(),
            target_position,
            reference_price,
            reason,
            issued_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction() {
        let mut state = StrategyState::flat();
        assert_eq!(state.direction(), Direction::Flat);
        assert!(state.is_flat());

        state.position = 3;
        assert_eq!(state.direction(), Direction::Long);

        state.position = -3;
        assert_eq!(state.direction(), Direction::Short);
        assert!(!state.is_flat());
    }

    #[test]
    fn test_normalized_clears_price_when_flat() {
        let state = StrategyState {
            position: 0,
            last_price: Some(3500.0),
        };
        assert_eq!(state.normalized().last_price, None);

        let state = StrategyState {
            position: 2,
            last_price: Some(3500.0),
        };
        assert_eq!(state.normalized().last_price, Some(3500.0));
    }

    #[test]
    fn test_state_json_shape() {
        let state = StrategyState {
            position: -4,
            last_price: Some(3612.5),
        };
        let json = serde_json::to_value(state).unwrap();
        assert_eq!(json["position"], -4);
        assert_eq!(json["last_price"], 3612.5);

        let flat: StrategyState = serde_json::from_str(r#"{"position": 0}"#).unwrap();
        assert_eq!(flat, StrategyState::flat());

        let flat: StrategyState =
            serde_json::from_str(r#"{"position": 0, "last_price": null}"#).unwrap();
        assert_eq!(flat.last_price, None);
    }

    #[test]
    fn test_order_instruction_creation() {
        let order = OrderInstruction::new("SHFE.hc1901", 5, 3500.0, TradeReason::BreakoutLong);

        assert_eq!(order.symbol, "SHFE.hc1901");
        assert_eq!(order.target_position, 5);
        assert_eq!(order.reason, TradeReason::BreakoutLong);
    }
}
