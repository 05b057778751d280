use tokio::sync::mpsc;

use crate::models::MarketUpdate;
use crate::Result;

/// Source of quotes, candles and account snapshots
///
/// `next_update` is the strategy's single suspension point. `Ok(None)`
/// means the feed has ended.
#[allow(async_fn_in_trait)]
pub trait MarketFeed {
    async fn next_update(&mut self) -> Result<Option<MarketUpdate>>;
}

/// Feed backed by a channel, filled by an external gateway task
pub struct ChannelFeed {
    rx: mpsc::Receiver<MarketUpdate>,
}

impl ChannelFeed {
    /// Create a feed and the sender a gateway pushes updates into
    pub fn new(buffer: usize) -> (mpsc::Sender<MarketUpdate>, Self) {
        let (tx, rx) = mpsc::channel(buffer);
        (tx, Self { rx })
    }
}

impl MarketFeed for ChannelFeed {
    async fn next_update(&mut self) -> Result<Option<MarketUpdate>> {
        Ok(self.rx.recv().await)
    }
}
