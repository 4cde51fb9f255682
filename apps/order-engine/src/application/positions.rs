//! Position Projector
//!
//! Maintains a per-symbol net position projection from the stream of
//! order updates on the notification bus. The projection is derived
//! state: it is rebuilt from events, never mutated by commands, and a
//! late fill on a terminal order still moves the position.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use rust_decimal::Decimal;
use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::application::bus::OrderUpdateBroadcast;
use crate::domain::order_lifecycle::{OrderEvent, OrderSide};
use crate::domain::shared::{Symbol, Timestamp};

/// Net position in a single symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position {
    /// The symbol.
    pub symbol: Symbol,
    /// Signed net quantity. Buys add, sells subtract.
    pub net_quantity: Decimal,
    /// Total quantity bought.
    pub bought_quantity: Decimal,
    /// Total quantity sold.
    pub sold_quantity: Decimal,
    /// Signed traded notional. Buys add `qty * px`, sells subtract.
    pub net_notional: Decimal,
    /// When the most recent fill was applied.
    pub last_fill_at: Option<Timestamp>,
}

impl Position {
    fn flat(symbol: Symbol) -> Self {
        Self {
            symbol,
            net_quantity: Decimal::ZERO,
            bought_quantity: Decimal::ZERO,
            sold_quantity: Decimal::ZERO,
            net_notional: Decimal::ZERO,
            last_fill_at: None,
        }
    }

    /// Whether the position is flat.
    #[must_use]
    pub fn is_flat(&self) -> bool {
        self.net_quantity.is_zero()
    }

    /// Average cost per unit of the net position, `None` when flat.
    #[must_use]
    pub fn average_price(&self) -> Option<Decimal> {
        if self.net_quantity.is_zero() {
            None
        } else {
            Some(self.net_notional / self.net_quantity)
        }
    }

    fn apply_fill(&mut self, side: OrderSide, quantity: Decimal, price: Decimal, at: Timestamp) {
        let sign = Decimal::from(side.sign());
        self.net_quantity += sign * quantity;
        self.net_notional += sign * quantity * price;
        match side {
            OrderSide::Buy => self.bought_quantity += quantity,
            OrderSide::Sell => self.sold_quantity += quantity,
        }
        self.last_fill_at = Some(at);
    }
}

/// Projects per-symbol net positions from order update broadcasts.
///
/// Only fill-bearing events move a position. An `OrderFilled` event is
/// always preceded by the `OrderPartiallyFilled` event for the final
/// execution, so the projector counts partial-fill events exclusively
/// and never double-counts the closing fill.
#[derive(Debug, Default)]
pub struct PositionProjector {
    positions: RwLock<HashMap<Symbol, Position>>,
}

impl PositionProjector {
    /// Create an empty projector.
    #[must_use]
    pub fn new() -> Self {
        Self {
            positions: RwLock::new(HashMap::new()),
        }
    }

    /// Apply a single order update to the projection.
    pub fn apply(&self, update: &OrderUpdateBroadcast) {
        let symbol = update.order.symbol().clone();
        let side = update.order.side();

        for event in &update.events {
            if let OrderEvent::PartiallyFilled(fill) = event {
                let mut positions = self.positions.write().unwrap();
                let position = positions
                    .entry(symbol.clone())
                    .or_insert_with(|| Position::flat(symbol.clone()));
                position.apply_fill(
                    side,
                    fill.fill_quantity.amount(),
                    fill.fill_price.amount(),
                    fill.occurred_at,
                );
                debug!(
                    symbol = %symbol,
                    net_quantity = %position.net_quantity,
                    "Position updated"
                );
            }
        }
    }

    /// Get the position in a symbol, if any fills have been seen.
    #[must_use]
    pub fn position(&self, symbol: &Symbol) -> Option<Position> {
        self.positions.read().unwrap().get(symbol).cloned()
    }

    /// Snapshot all positions.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Position> {
        self.positions.read().unwrap().values().cloned().collect()
    }

    /// Run the projector against a bus subscription until the bus closes.
    ///
    /// A lagged receiver logs a warning and continues; missed updates
    /// mean missed fills, so lag on this channel is an operational
    /// problem, not a correctness strategy.
    pub async fn run(
        self: Arc<Self>,
        mut updates: broadcast::Receiver<OrderUpdateBroadcast>,
    ) {
        loop {
            match updates.recv().await {
                Ok(update) => self.apply(&update),
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    warn!(missed, "Position projector lagged behind order updates");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    }
}
