//! In-memory order store with per-order exclusive access.
//!
//! The process-local store is the authority for order state. Each order
//! sits behind its own mutex: mutations on one order serialize, different
//! orders never contend, and there is no global engine lock. Reads hand
//! out point-in-time snapshots, so callers iterate lock-free.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use crate::domain::order_lifecycle::Order;
use crate::domain::shared::{ClientOrderId, CounterpartyOrderId};

/// Order store error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// No order with this client order id.
    #[error("Order not found: {client_order_id}")]
    NotFound {
        /// The missing client order id.
        client_order_id: String,
    },

    /// An order with this client order id already exists.
    ///
    /// Client order ids are never reused, so this is always a caller bug
    /// or a duplicate submission.
    #[error("Duplicate client order id: {client_order_id}")]
    DuplicateClientOrderId {
        /// The conflicting client order id.
        client_order_id: String,
    },
}

/// In-memory order store keyed by client order id, with a secondary
/// index from counterparty order id.
///
/// The counterparty index is refreshed inside [`OrderStore::update`]
/// while the per-order lock is held, so it can never be observed out of
/// step with the order it points at.
#[derive(Debug, Default)]
pub struct OrderStore {
    orders: RwLock<HashMap<ClientOrderId, Arc<Mutex<Order>>>>,
    counterparty_index: RwLock<HashMap<CounterpartyOrderId, ClientOrderId>>,
}

impl OrderStore {
    /// Create a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            orders: RwLock::new(HashMap::new()),
            counterparty_index: RwLock::new(HashMap::new()),
        }
    }

    /// Insert a newly created order.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateClientOrderId` if the id is already present.
    pub fn create(&self, order: Order) -> Result<(), StoreError> {
        let id = order.client_order_id().clone();
        let mut orders = self.orders.write().unwrap();
        if orders.contains_key(&id) {
            return Err(StoreError::DuplicateClientOrderId {
                client_order_id: id.into_inner(),
            });
        }

        if let Some(counterparty_id) = order.counterparty_order_id() {
            self.counterparty_index
                .write()
                .unwrap()
                .insert(counterparty_id.clone(), id.clone());
        }
        orders.insert(id, Arc::new(Mutex::new(order)));
        Ok(())
    }

    /// Get a point-in-time snapshot of an order.
    #[must_use]
    pub fn get(&self, client_order_id: &ClientOrderId) -> Option<Order> {
        let cell = self.cell(client_order_id)?;
        let order = cell.lock().unwrap();
        Some(order.clone())
    }

    /// Look up an order by its counterparty-assigned id.
    #[must_use]
    pub fn find_by_counterparty_id(
        &self,
        counterparty_order_id: &CounterpartyOrderId,
    ) -> Option<Order> {
        let client_id = self.resolve_counterparty_id(counterparty_order_id)?;
        self.get(&client_id)
    }

    /// Resolve a counterparty id to the owning client order id.
    #[must_use]
    pub fn resolve_counterparty_id(
        &self,
        counterparty_order_id: &CounterpartyOrderId,
    ) -> Option<ClientOrderId> {
        self.counterparty_index
            .read()
            .unwrap()
            .get(counterparty_order_id)
            .cloned()
    }

    /// Mutate an order under its exclusive lock.
    ///
    /// The mutation runs with the per-order mutex held; a subsequent
    /// `get` observes the completed mutation (read-your-writes). Returns
    /// the closure's result together with a snapshot taken before the
    /// lock is released. If the mutation bound a counterparty id, the
    /// secondary index is updated before the lock drops.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the order does not exist.
    pub fn update<T>(
        &self,
        client_order_id: &ClientOrderId,
        mutation: impl FnOnce(&mut Order) -> T,
    ) -> Result<(T, Order), StoreError> {
        let cell = self
            .cell(client_order_id)
            .ok_or_else(|| StoreError::NotFound {
                client_order_id: client_order_id.as_str().to_string(),
            })?;

        let mut order = cell.lock().unwrap();
        let had_counterparty_id = order.counterparty_order_id().is_some();
        let result = mutation(&mut order);

        if !had_counterparty_id {
            if let Some(counterparty_id) = order.counterparty_order_id() {
                self.counterparty_index
                    .write()
                    .unwrap()
                    .insert(counterparty_id.clone(), client_order_id.clone());
            }
        }

        let snapshot = order.clone();
        Ok((result, snapshot))
    }

    /// Snapshot every order in the store.
    ///
    /// Each order's lock is taken briefly in turn; the returned vector is
    /// safe to iterate without holding anything.
    #[must_use]
    pub fn list(&self) -> Vec<Order> {
        let cells: Vec<Arc<Mutex<Order>>> =
            self.orders.read().unwrap().values().cloned().collect();
        cells
            .iter()
            .map(|cell| cell.lock().unwrap().clone())
            .collect()
    }

    /// Number of orders in the store.
    #[must_use]
    pub fn len(&self) -> usize {
        self.orders.read().unwrap().len()
    }

    /// Check if the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.orders.read().unwrap().is_empty()
    }

    fn cell(&self, client_order_id: &ClientOrderId) -> Option<Arc<Mutex<Order>>> {
        self.orders.read().unwrap().get(client_order_id).cloned()
    }
}
