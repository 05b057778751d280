use std::collections::VecDeque;
use std::time::Duration;

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::price_feed::MarketFeed;
use crate::models::{AccountSnapshot, Candle, MarketUpdate, Quote};
use crate::Result;

/// Market regime the synthetic feed simulates
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum MarketScenario {
    /// Steady uptrend with noise (+1% daily average)
    #[default]
    Uptrend,
    /// Steady downtrend with noise (-1% daily average)
    Downtrend,
    /// Mean-reverting around the base price
    Sideways,
    /// Large daily swings (±4%)
    Volatile,
}

impl MarketScenario {
    /// (drift, noise) as fractions of price per day
    fn daily_profile(self) -> (f64, f64) {
        match self {
            MarketScenario::Uptrend => (0.01, 0.015),
            MarketScenario::Downtrend => (-0.01, 0.015),
            MarketScenario::Sideways => (0.0, 0.01),
            MarketScenario::Volatile => (0.0, 0.04),
        }
    }
}

/// Settings for the paper-trading feed and account
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SyntheticFeedConfig {
    pub seed: u64,
    pub scenario: MarketScenario,
    pub base_price: f64,
    pub tick_size: f64,
    pub history_bars: usize, // Completed daily bars emitted before live trading
    pub days: usize,         // Live days to simulate before the feed ends
    pub ticks_per_day: usize,
    pub volume_multiple: f64,
    pub balance: f64,
    pub risk_ratio: f64,
    pub tick_interval_ms: u64, // Pause between quotes, 0 for as fast as possible
}

impl Default for SyntheticFeedConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            scenario: MarketScenario::Uptrend,
            base_price: 3500.0,
            tick_size: 1.0,
            history_bars: 100,
            days: 60,
            ticks_per_day: 8,
            volume_multiple: 10.0,
            balance: 1_000_000.0,
            risk_ratio: 0.1,
            tick_interval_ms: 0,
        }
    }
}

/// Seeded random daily bars and intraday ticks for paper trading
///
/// Emits one account snapshot, then `history_bars` completed bars, then for
/// each live day a new bar followed by `ticks_per_day` quote/bar revisions.
pub struct SyntheticFeed {
    symbol: String,
    config: SyntheticFeedConfig,
    rng: StdRng,
    pending: VecDeque<MarketUpdate>,
    current_price: f64,
    next_bar_time: DateTime<Utc>,
    days_emitted: usize,
}

impl SyntheticFeed {
    pub fn new(symbol: &str, config: SyntheticFeedConfig) -> Self {
        let today = Utc::now()
            .date_naive()
            .and_hms_opt(0, 0, 0)
            .unwrap_or_default()
            .and_utc();
        let start_time = today - chrono::Duration::days(config.history_bars as i64);

        let mut feed = Self {
            symbol: symbol.to_string(),
            rng: StdRng::seed_from_u64(config.seed),
            pending: VecDeque::new(),
            current_price: config.base_price,
            next_bar_time: start_time,
            days_emitted: 0,
            config,
        };

        feed.pending.push_back(MarketUpdate::Account(AccountSnapshot {
            balance: feed.config.balance,
            risk_ratio: feed.config.risk_ratio,
        }));
        feed.generate_history();

        tracing::info!(
            symbol = %feed.symbol,
            scenario = ?feed.config.scenario,
            history_bars = feed.config.history_bars,
            days = feed.config.days,
            "Synthetic feed ready"
        );

        feed
    }

    fn generate_history(&mut self) {
        for _ in 0..self.config.history_bars {
            let (drift, noise) = self.config.scenario.daily_profile();
            let close = self.step_price(drift, noise);
            let candle = self.create_candle(close, self.next_bar_time);
            self.pending.push_back(MarketUpdate::Candle(candle));
            self.next_bar_time += chrono::Duration::days(1);
        }
    }

    /// Queue one live day: a new bar, then intraday revisions with quotes
    fn generate_day(&mut self) {
        let ticks = self.config.ticks_per_day.max(1);
        let (drift, noise) = self.config.scenario.daily_profile();
        let scale = (ticks as f64).sqrt();

        let open = self.round_to_tick(self.current_price);
        let mut bar = Candle {
            symbol: self.symbol.clone(),
            timestamp: self.next_bar_time,
            open,
            high: open,
            low: open,
            close: open,
            volume: 0.0,
        };
        self.pending.push_back(MarketUpdate::Candle(bar.clone()));

        for _ in 0..ticks {
            let price = self.step_price(drift / ticks as f64, noise / scale);

            bar.high = bar.high.max(price);
            bar.low = bar.low.min(price);
            bar.close = price;
            bar.volume += self.rng.gen_range(500.0..1500.0);

            self.pending.push_back(MarketUpdate::Candle(bar.clone()));
            self.pending.push_back(MarketUpdate::Quote(Quote {
                symbol: self.symbol.clone(),
                last_price: price,
                volume_multiple: self.config.volume_multiple,
                timestamp: Utc::now(),
            }));
        }

        self.next_bar_time += chrono::Duration::days(1);
        self.days_emitted += 1;
    }

    /// Advance the price by drift + noise (fractions of price) and return it
    fn step_price(&mut self, drift: f64, noise: f64) -> f64 {
        let mut change = self.current_price * drift;
        if noise > 0.0 {
            change += self.current_price * self.rng.gen_range(-noise..noise);
        }
        if self.config.scenario == MarketScenario::Sideways {
            // Pull back toward the base price
            change += (self.config.base_price - self.current_price) * 0.1;
        }

        // Prevent price from going too low
        self.current_price = (self.current_price + change).max(self.config.base_price * 0.2);
        self.current_price = self.round_to_tick(self.current_price);
        self.current_price
    }

    fn round_to_tick(&self, price: f64) -> f64 {
        if self.config.tick_size > 0.0 {
            (price / self.config.tick_size).round() * self.config.tick_size
        } else {
            price
        }
    }

    /// Helper to create a completed daily bar around a close price
    fn create_candle(&mut self, close: f64, timestamp: DateTime<Utc>) -> Candle {
        let (_, noise) = self.config.scenario.daily_profile();

        let up: f64 = self.rng.gen_range(0.0..noise);
        let down: f64 = self.rng.gen_range(0.0..noise);
        let high = self.round_to_tick(close * (1.0 + up));
        let low = self.round_to_tick(close * (1.0 - down));

        let open_raw = close * (1.0 + self.rng.gen_range(-noise..noise));
        let open = self.round_to_tick(open_raw).clamp(low, high);

        Candle {
            symbol: self.symbol.clone(),
            timestamp,
            open,
            high: high.max(close),
            low: low.min(close),
            close,
            volume: self.rng.gen_range(5_000.0..15_000.0),
        }
    }
}

impl MarketFeed for SyntheticFeed {
    async fn next_update(&mut self) -> Result<Option<MarketUpdate>> {
        if self.pending.is_empty() {
            if self.days_emitted >= self.config.days {
                return Ok(None);
            }
            self.generate_day();
        }

        let update = self.pending.pop_front();

        if self.config.tick_interval_ms > 0 && matches!(update, Some(MarketUpdate::Quote(_))) {
            tokio::time::sleep(Duration::from_millis(self.config.tick_interval_ms)).await;
        }

        Ok(update)
    }
}
