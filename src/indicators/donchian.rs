/// Donchian channel over completed bars
///
/// The newest candle is treated as the in-progress bar and is always
/// excluded, so a breakout is measured against the `lookback` bars before it.
use crate::models::Candle;

/// Upper and lower channel bounds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DonchianChannel {
    pub upper: f64,
    pub lower: f64,
}

/// Bars preceding the newest one, or None if there are fewer than `lookback`
fn trailing_bars(candles: &[Candle], lookback: usize) -> Option<&[Candle]> {
    if lookback == 0 || candles.len() < lookback + 1 {
        return None;
    }

    let end = candles.len() - 1;
    Some(&candles[end - lookback..end])
}

/// Highest high over the trailing `lookback` completed bars
pub fn channel_high(candles: &[Candle], lookback: usize) -> Option<f64> {
    trailing_bars(candles, lookback)
        .map(|bars| bars.iter().fold(f64::MIN, |max, c| max.max(c.high)))
}

/// Lowest low over the trailing `lookback` completed bars
pub fn channel_low(candles: &[Candle], lookback: usize) -> Option<f64> {
    trailing_bars(candles, lookback)
        .map(|bars| bars.iter().fold(f64::MAX, |min, c| min.min(c.low)))
}

/// Both bounds at once
pub fn calculate_donchian(candles: &[Candle], lookback: usize) -> Option<DonchianChannel> {
    Some(DonchianChannel {
        upper: channel_high(candles, lookback)?,
        lower: channel_low(candles, lookback)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn create_test_candles(ranges: &[(f64, f64)]) -> Vec<Candle> {
        ranges
            .iter()
            .enumerate()
            .map(|(i, &(high, low))| Candle {
                symbol: "TEST".to_string(),
                timestamp: Utc::now() + chrono::Duration::days(i as i64),
                open: (high + low) / 2.0,
                high,
                low,
                close: (high + low) / 2.0,
                volume: 1000.0,
            })
            .collect()
    }

    #[test]
    fn test_channel_excludes_newest_bar() {
        let candles = create_test_candles(&[
            (105.0, 95.0),
            (110.0, 100.0),
            (108.0, 98.0),
            // In-progress bar with extreme range must not count
            (200.0, 10.0),
        ]);

        let channel = calculate_donchian(&candles, 3).unwrap();
        assert_eq!(channel.upper, 110.0);
        assert_eq!(channel.lower, 95.0);
    }

    #[test]
    fn test_channel_uses_only_lookback_bars() {
        let candles = create_test_candles(&[
            (150.0, 50.0), // Outside a 2-bar lookback
            (110.0, 100.0),
            (108.0, 98.0),
            (104.0, 102.0),
        ]);

        assert_eq!(channel_high(&candles, 2), Some(110.0));
        assert_eq!(channel_low(&candles, 2), Some(98.0));
    }

    #[test]
    fn test_upper_never_below_lower() {
        let candles = create_test_candles(&[
            (101.0, 99.0),
            (103.0, 97.0),
            (100.5, 100.0),
            (102.0, 98.5),
            (99.0, 96.0),
            (104.0, 101.0),
        ]);

        for lookback in 1..candles.len() {
            let channel = calculate_donchian(&candles, lookback).unwrap();
            assert!(channel.upper >= channel.lower, "lookback {}", lookback);
        }
    }

    #[test]
    fn test_insufficient_data() {
        let candles = create_test_candles(&[(101.0, 99.0), (102.0, 98.0)]);

        assert!(calculate_donchian(&candles, 2).is_none());
        assert!(calculate_donchian(&candles, 0).is_none());
        assert!(calculate_donchian(&candles, 1).is_some());
    }
}
