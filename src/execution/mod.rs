// Market data and order routing collaborators
pub mod candle_buffer;
pub mod executor;
pub mod price_feed;
pub mod synthetic_feed;

pub use candle_buffer::{CandleBuffer, CandleUpdate};
pub use executor::{ChannelOrderSink, OrderSink, PaperOrderSink};
pub use price_feed::{ChannelFeed, MarketFeed};
pub use synthetic_feed::{MarketScenario, SyntheticFeed, SyntheticFeedConfig};
