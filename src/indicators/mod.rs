// Technical indicators module
// Implements ATR (turtle N) and Donchian channels

pub mod atr;
pub mod donchian;
pub mod moving_average;

pub use atr::{calculate_atr, calculate_simple_atr, calculate_wilder_atr, true_ranges, AtrSmoothing};
pub use donchian::{calculate_donchian, channel_high, channel_low, DonchianChannel};
pub use moving_average::calculate_sma;
