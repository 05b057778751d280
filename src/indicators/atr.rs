/// Average True Range (ATR) indicator, the turtle "N"
///
/// True Range is the greatest of:
/// - Current High - Current Low
/// - Abs(Current High - Previous Close)
/// - Abs(Previous Close - Current Low)
///
/// Two smoothings are offered: a fixed-length simple moving average of the
/// true ranges, and Wilder's recursive smoothing N = ((p-1) * PDN + TR) / p.
use serde::{Deserialize, Serialize};

use super::moving_average::calculate_sma;
use crate::models::Candle;

/// How true ranges are averaged into N
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum AtrSmoothing {
    #[default]
    Simple,
    Wilder,
}

/// True ranges for every candle that has a predecessor
///
/// The result has `candles.len() - 1` entries.
pub fn true_ranges(candles: &[Candle]) -> Vec<f64> {
    candles
        .windows(2)
        .map(|pair| {
            let high = pair[1].high;
            let low = pair[1].low;
            let prev_close = pair[0].close;

            (high - low)
                .max((high - prev_close).abs())
                .max((prev_close - low).abs())
        })
        .collect()
}

/// Calculate ATR with the requested smoothing
///
/// Returns None if there are fewer than `period + 1` candles
pub fn calculate_atr(candles: &[Candle], period: usize, smoothing: AtrSmoothing) -> Option<f64> {
    match smoothing {
        AtrSmoothing::Simple => calculate_simple_atr(candles, period),
        AtrSmoothing::Wilder => calculate_wilder_atr(candles, period),
    }
}

/// Simple moving average of the last `period` true ranges
pub fn calculate_simple_atr(candles: &[Candle], period: usize) -> Option<f64> {
    if period == 0 || candles.len() < period + 1 {
        return None;
    }

    calculate_sma(&true_ranges(candles), period)
}

/// Wilder-smoothed ATR
pub fn calculate_wilder_atr(candles: &[Candle], period: usize) -> Option<f64> {
    if period == 0 || candles.len() < period + 1 {
        return None;
    }

    let true_ranges = true_ranges(candles);

    // First ATR is simple average of first 'period' true ranges
    let first_atr: f64 = true_ranges.iter().take(period).sum::<f64>() / period as f64;

    let atr = true_ranges[period..].iter().fold(first_atr, |atr, tr| {
        (atr * (period as f64 - 1.0) + tr) / period as f64
    });

    Some(atr)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn create_test_candles(prices: &[(f64, f64, f64, f64)]) -> Vec<Candle> {
        prices
            .iter()
            .enumerate()
            .map(|(i, &(open, high, low, close))| Candle {
                symbol: "TEST".to_string(),
                timestamp: Utc::now() + chrono::Duration::days(i as i64),
                open,
                high,
                low,
                close,
                volume: 1000.0,
            })
            .collect()
    }

    #[test]
    fn test_true_range_uses_previous_close_gaps() {
        let candles = create_test_candles(&[
            (100.0, 101.0, 99.0, 100.0),
            // Gap up: high - prev close dominates
            (108.0, 110.0, 107.0, 109.0),
            // Gap down: prev close - low dominates
            (100.0, 101.0, 98.0, 99.0),
        ]);

        let trs = true_ranges(&candles);
        assert_eq!(trs, vec![10.0, 11.0]);
    }

    #[test]
    fn test_flat_market_atr_equals_range() {
        let candles = create_test_candles(&[(100.0, 101.0, 99.0, 100.0); 25]);

        assert_eq!(calculate_atr(&candles, 20, AtrSmoothing::Simple), Some(2.0));
        assert_eq!(calculate_atr(&candles, 20, AtrSmoothing::Wilder), Some(2.0));
    }

    #[test]
    fn test_simple_atr_only_uses_last_period() {
        let mut prices = vec![(100.0, 110.0, 90.0, 100.0); 10];
        prices.extend(vec![(100.0, 101.0, 99.0, 100.0); 5]);
        let candles = create_test_candles(&prices);

        // Last 4 true ranges are all 2.0
        assert_eq!(calculate_simple_atr(&candles, 4), Some(2.0));
    }

    #[test]
    fn test_wilder_atr_remembers_volatility() {
        let mut prices = vec![(100.0, 110.0, 90.0, 100.0); 10];
        prices.extend(vec![(100.0, 101.0, 99.0, 100.0); 5]);
        let candles = create_test_candles(&prices);

        let wilder = calculate_wilder_atr(&candles, 4).unwrap();
        assert!(wilder > 2.0);
        assert!(wilder < 20.0);
    }

    #[test]
    fn test_insufficient_data() {
        let candles = create_test_candles(&[(100.0, 101.0, 99.0, 100.0); 20]);

        assert!(calculate_atr(&candles, 20, AtrSmoothing::Simple).is_none());
        assert!(calculate_atr(&candles, 20, AtrSmoothing::Wilder).is_none());
        assert!(calculate_atr(&candles, 0, AtrSmoothing::Simple).is_none());
    }

    #[test]
    fn test_smoothing_deserializes_lowercase() {
        let smoothing: AtrSmoothing = serde_json::from_str("\"wilder\"").unwrap();
        assert_eq!(smoothing, AtrSmoothing::Wilder);
        assert_eq!(AtrSmoothing::default(), AtrSmoothing::Simple);
    }
}
