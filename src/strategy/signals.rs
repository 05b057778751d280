use super::{Parameters, StrategyConfig};
use crate::models::{Direction, StrategyState, TradeReason};

/// Transition requested by the turtle rules
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurtleSignal {
    EnterLong,
    EnterShort,
    AddUnit,
    StopLoss,
    ChannelExit,
}

impl TurtleSignal {
    pub fn reason(self) -> TradeReason {
        match self {
            TurtleSignal::EnterLong => TradeReason::BreakoutLong,
            TurtleSignal::EnterShort => TradeReason::BreakoutShort,
            TurtleSignal::AddUnit => TradeReason::Pyramid,
            TurtleSignal::StopLoss => TradeReason::StopLoss,
            TurtleSignal::ChannelExit => TradeReason::ChannelExit,
        }
    }

    /// Net position this signal asks for, given the current one
    pub fn target_position(self, current: i64, unit: u64) -> i64 {
        let unit = i64::try_from(unit).unwrap_or(i64::MAX);
        match self {
            TurtleSignal::EnterLong => current.saturating_add(unit),
            TurtleSignal::EnterShort => current.saturating_sub(unit),
            TurtleSignal::AddUnit => current.saturating_add(current.signum() * unit),
            TurtleSignal::StopLoss | TurtleSignal::ChannelExit => 0,
        }
    }
}

/// Breakout entry while flat
///
/// Strictly above the entry channel goes long, strictly below goes short.
pub fn evaluate_entry(price: f64, params: &Parameters) -> Option<TurtleSignal> {
    if price > params.channel_high_entry {
        Some(TurtleSignal::EnterLong)
    } else if price < params.channel_low_entry {
        Some(TurtleSignal::EnterShort)
    } else {
        None
    }
}

/// Pyramiding, stop-loss and channel exit while holding a position
///
/// Pyramiding and the stop are exclusive; the channel exit is checked
/// independently, so a stop and an exit can both fire on one price.
/// All boundaries are inclusive. Without a recorded entry price only the
/// channel exit can fire.
pub fn evaluate_position(
    state: &StrategyState,
    price: f64,
    params: &Parameters,
    config: &StrategyConfig,
    pyramiding_allowed: bool,
) -> Vec<TurtleSignal> {
    let mut signals = Vec::new();
    let n = params.volatility_n;

    match state.direction() {
        Direction::Flat => {}
        Direction::Long => {
            if let Some(last) = state.last_price {
                if price >= last + config.pyramid_step_n * n && pyramiding_allowed {
                    signals.push(TurtleSignal::AddUnit);
                } else if price <= last - config.stop_loss_n * n {
                    signals.push(TurtleSignal::StopLoss);
                }
            }
            if price <= params.channel_low_exit {
                signals.push(TurtleSignal::ChannelExit);
            }
        }
        Direction::Short => {
            if let Some(last) = state.last_price {
                if price <= last - config.pyramid_step_n * n && pyramiding_allowed {
                    signals.push(TurtleSignal::AddUnit);
                } else if price >= last + config.stop_loss_n * n {
                    signals.push(TurtleSignal::StopLoss);
                }
            }
            if price >= params.channel_high_exit {
                signals.push(TurtleSignal::ChannelExit);
            }
        }
    }

    signals
}
