use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Domain errors raised by the strategy, its collaborators and the state store
#[derive(Debug, Error)]
pub enum TurtleError {
    #[error("no usable market data within {0:?} of startup, check the quote connection and account login")]
    DataUnavailable(Duration),

    #[error("insufficient candles: {have}, need {need}")]
    InsufficientCandles { have: usize, need: usize },

    #[error("no quote received yet")]
    MissingQuote,

    #[error("no account snapshot received yet")]
    MissingAccount,

    #[error("volatility must be positive to size a unit, got {0}")]
    NonPositiveVolatility(f64),

    #[error("contract multiplier must be positive, got {0}")]
    InvalidMultiplier(f64),

    #[error("order sink is closed")]
    OrderSinkClosed,

    #[error("state file {path}: {source}")]
    StateIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("state file {path} is not valid JSON: {source}")]
    StateFormat {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl TurtleError {
    /// True for errors that go away once more market data arrives
    pub fn is_data_pending(&self) -> bool {
        matches!(
            self,
            TurtleError::InsufficientCandles { .. }
                | TurtleError::MissingQuote
                | TurtleError::MissingAccount
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_pending_classification() {
        assert!(TurtleError::MissingQuote.is_data_pending());
        assert!(TurtleError::MissingAccount.is_data_pending());
        assert!(TurtleError::InsufficientCandles { have: 3, need: 100 }.is_data_pending());

        assert!(!TurtleError::NonPositiveVolatility(0.0).is_data_pending());
        assert!(!TurtleError::InvalidMultiplier(0.0).is_data_pending());
        assert!(!TurtleError::DataUnavailable(Duration::from_secs(5)).is_data_pending());
    }

    #[test]
    fn test_error_messages() {
        let err = TurtleError::InsufficientCandles { have: 3, need: 100 };
        assert_eq!(err.to_string(), "insufficient candles: 3, need 100");

        let err = TurtleError::NonPositiveVolatility(0.0);
        assert!(err.to_string().contains("volatility must be positive"));
    }
}
