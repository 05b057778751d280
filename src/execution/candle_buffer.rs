use crate::models::Candle;
use std::collections::VecDeque;

/// What a pushed candle did to the window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandleUpdate {
    /// A bar with a newer timestamp was appended
    NewBar,
    /// The newest (in-progress) bar was revised in place
    Revised,
    /// The candle was older than the newest bar and was dropped
    Stale,
}

/// Rolling window of daily candles for the traded contract
///
/// Append-only with oldest eviction. The newest bar may still be forming.
#[derive(Debug, Clone)]
pub struct CandleBuffer {
    data: VecDeque<Candle>,
    max_candles: usize,
}

impl CandleBuffer {
    /// Create a new candle buffer
    ///
    /// # Arguments
    /// * `max_candles` - Maximum number of candles to keep
    pub fn new(max_candles: usize) -> Self {
        Self {
            data: VecDeque::with_capacity(max_candles),
            max_candles,
        }
    }

    /// Add or revise a candle
    ///
    /// If the buffer is full, removes the oldest candle
    pub fn push(&mut self, candle: Candle) -> CandleUpdate {
        if let Some(latest) = self.data.back_mut() {
            if candle.timestamp == latest.timestamp {
                *latest = candle;
                return CandleUpdate::Revised;
            }
            if candle.timestamp < latest.timestamp {
                return CandleUpdate::Stale;
            }
        }

        self.data.push_back(candle);

        while self.data.len() > self.max_candles {
            self.data.pop_front();
        }

        CandleUpdate::NewBar
    }

    /// Get all candles, oldest first
    pub fn get_candles(&self) -> Vec<Candle> {
        self.data.iter().cloned().collect()
    }

    /// Newest (possibly in-progress) candle
    pub fn latest(&self) -> Option<&Candle> {
        self.data.back()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn max_candles(&self) -> usize {
        self.max_candles
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn create_test_candle(day: i64, price: f64) -> Candle {
        Candle {
            symbol: "SHFE.hc1901".to_string(),
            timestamp: Utc.with_ymd_and_hms(2018, 6, 1, 0, 0, 0).unwrap()
                + chrono::Duration::days(day),
            open: price,
            high: price,
            low: price,
            close: price,
            volume: 1000.0,
        }
    }

    #[test]
    fn test_new_buffer() {
        let buffer = CandleBuffer::new(100);
        assert_eq!(buffer.max_candles(), 100);
        assert!(buffer.is_empty());
        assert!(buffer.latest().is_none());
    }

    #[test]
    fn test_push_appends_new_bars() {
        let mut buffer = CandleBuffer::new(100);

        assert_eq!(buffer.push(create_test_candle(0, 100.0)), CandleUpdate::NewBar);
        assert_eq!(buffer.push(create_test_candle(1, 101.0)), CandleUpdate::NewBar);
        assert_eq!(buffer.push(create_test_candle(2, 102.0)), CandleUpdate::NewBar);

        let candles = buffer.get_candles();
        assert_eq!(candles.len(), 3);
        assert_eq!(candles[0].close, 100.0);
        assert_eq!(candles[2].close, 102.0);
    }

    #[test]
    fn test_same_timestamp_revises_latest() {
        let mut buffer = CandleBuffer::new(100);

        buffer.push(create_test_candle(0, 100.0));
        buffer.push(create_test_candle(1, 101.0));
        assert_eq!(buffer.push(create_test_candle(1, 105.0)), CandleUpdate::Revised);

        assert_eq!(buffer.len(), 2);
        assert_eq!(buffer.latest().unwrap().close, 105.0);
    }

    #[test]
    fn test_older_candle_is_stale() {
        let mut buffer = CandleBuffer::new(100);

        buffer.push(create_test_candle(0, 100.0));
        buffer.push(create_test_candle(1, 101.0));
        assert_eq!(buffer.push(create_test_candle(0, 99.0)), CandleUpdate::Stale);

        assert_eq!(buffer.len(), 2);
        assert_eq!(buffer.get_candles()[0].close, 100.0);
    }

    #[test]
    fn test_max_candles_limit() {
        let mut buffer = CandleBuffer::new(5);

        for i in 0..10 {
            buffer.push(create_test_candle(i, 100.0 + i as f64));
        }

        let candles = buffer.get_candles();
        assert_eq!(candles.len(), 5); // Should only keep last 5

        assert_eq!(candles[0].close, 105.0);
        assert_eq!(candles[4].close, 109.0);
    }
}
