use tokio::sync::mpsc;

use crate::error::TurtleError;
use crate::models::OrderInstruction;

/// Accepts target net positions and reconciles them with the broker
///
/// Implementations own execution: the strategy only states where the net
/// position should end up.
pub trait OrderSink {
    fn set_target_position(&mut self, order: OrderInstruction) -> Result<(), TurtleError>;
}

/// In-memory sink for paper trading
///
/// Every target is treated as filled immediately.
#[derive(Debug, Default)]
pub struct PaperOrderSink {
    instructions: Vec<OrderInstruction>,
    net_position: i64,
}

impl PaperOrderSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from a position already held at the broker (e.g. restored state)
    pub fn with_position(net_position: i64) -> Self {
        Self {
            instructions: Vec::new(),
            net_position,
        }
    }

    /// All instructions received, oldest first
    pub fn instructions(&self) -> &[OrderInstruction] {
        &self.instructions
    }

    /// Simulated broker-side net position
    pub fn net_position(&self) -> i64 {
        self.net_position
    }
}

impl OrderSink for PaperOrderSink {
    fn set_target_position(&mut self, order: OrderInstruction) -> Result<(), TurtleError> {
        let delta = order.target_position - self.net_position;

        tracing::info!(
            symbol = %order.symbol,
            target = order.target_position,
            delta,
            price = order.reference_price,
            reason = ?order.reason,
            "Paper fill"
        );

        self.net_position = order.target_position;
        self.instructions.push(order);
        Ok(())
    }
}

/// Forwards instructions to a gateway task over a channel
#[derive(Debug, Clone)]
pub struct ChannelOrderSink {
    tx: mpsc::UnboundedSender<OrderInstruction>,
}

impl ChannelOrderSink {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<OrderInstruction>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl OrderSink for ChannelOrderSink {
    fn set_target_position(&mut self, order: OrderInstruction) -> Result<(), TurtleError> {
        self.tx
            .send(order)
            .map_err(|_| TurtleError::OrderSinkClosed)
    }
}
