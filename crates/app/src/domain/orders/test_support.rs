//! In-memory collaborators for exercising the placement coordinator.

use std::{sync::Mutex, time::Duration};

use async_trait::async_trait;
use jiff::Timestamp;
use rust_decimal::Decimal;
use rustc_hash::{FxHashMap, FxHashSet};
use sqlx::Error as SqlxError;

use crate::domain::{
    orders::{
        data::{OrderConfirmation, OrderDraft, OrderFilter},
        errors::{OrderLedgerError, OrderPlacementError},
        ledger::OrderLedger,
        observer::{CompensationFailure, PlacementObserver},
        placement::PlacementStage,
        records::{OrderRecord, OrderUuid},
    },
    products::{
        InventoryError, InventoryStore,
        records::{ProductRecord, ProductUuid},
    },
};

#[derive(Debug, Default)]
struct InventoryState {
    stock: FxHashMap<ProductUuid, i64>,
    adjustments: usize,
    restocks: Vec<(ProductUuid, u32)>,
    failing_reservations: FxHashSet<ProductUuid>,
    failing_restocks: FxHashSet<ProductUuid>,
    delays: FxHashMap<ProductUuid, Duration>,
}

#[derive(Debug, Default)]
pub(crate) struct InMemoryInventory {
    state: Mutex<InventoryState>,
}

impl InMemoryInventory {
    pub(crate) fn add_product(&self, stock: i64) -> ProductUuid {
        let product = ProductUuid::new();
        self.state.lock().expect("inventory lock").stock.insert(product, stock);
        product
    }

    pub(crate) fn stock(&self, product: ProductUuid) -> Option<i64> {
        self.state
            .lock()
            .expect("inventory lock")
            .stock
            .get(&product)
            .copied()
    }

    pub(crate) fn adjustment_count(&self) -> usize {
        self.state.lock().expect("inventory lock").adjustments
    }

    /// Successful restocks, in the order they happened.
    pub(crate) fn restocks(&self) -> Vec<(ProductUuid, u32)> {
        self.state.lock().expect("inventory lock").restocks.clone()
    }

    pub(crate) fn fail_reservations_for(&self, product: ProductUuid) {
        self.state
            .lock()
            .expect("inventory lock")
            .failing_reservations
            .insert(product);
    }

    pub(crate) fn fail_restocks_for(&self, product: ProductUuid) {
        self.state
            .lock()
            .expect("inventory lock")
            .failing_restocks
            .insert(product);
    }

    pub(crate) fn delay_for(&self, product: ProductUuid, delay: Duration) {
        self.state
            .lock()
            .expect("inventory lock")
            .delays
            .insert(product, delay);
    }

    async fn adjust(
        &self,
        product: ProductUuid,
        delta: i64,
        guarded: bool,
    ) -> Result<ProductRecord, InventoryError> {
        let delay = self
            .state
            .lock()
            .expect("inventory lock")
            .delays
            .get(&product)
            .copied();

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let mut state = self.state.lock().expect("inventory lock");
        state.adjustments += 1;

        let failing = if delta < 0 {
            &state.failing_reservations
        } else {
            &state.failing_restocks
        };

        if failing.contains(&product) {
            return Err(InventoryError::Sql(SqlxError::PoolTimedOut));
        }

        let stock = state
            .stock
            .get_mut(&product)
            .ok_or(InventoryError::NotFound)?;

        if guarded && *stock + delta < 0 {
            return Err(InventoryError::InsufficientStock);
        }

        *stock += delta;
        let stock = *stock;

        if delta > 0 {
            let quantity = u32::try_from(delta).expect("restock fits in u32");
            state.restocks.push((product, quantity));
        }

        Ok(ProductRecord {
            uuid: product,
            name: format!("Product {product}"),
            description: String::new(),
            image_url: None,
            price: Decimal::ONE,
            stock,
            created_at: Timestamp::UNIX_EPOCH,
            updated_at: Timestamp::UNIX_EPOCH,
        })
    }
}

#[async_trait]
impl InventoryStore for InMemoryInventory {
    async fn adjust_stock(
        &self,
        product: ProductUuid,
        delta: i64,
    ) -> Result<ProductRecord, InventoryError> {
        self.adjust(product, delta, false).await
    }

    async fn adjust_stock_guarded(
        &self,
        product: ProductUuid,
        delta: i64,
    ) -> Result<ProductRecord, InventoryError> {
        self.adjust(product, delta, true).await
    }
}

#[derive(Debug, Default)]
pub(crate) struct InMemoryLedger {
    orders: Mutex<Vec<OrderRecord>>,
    delay: Option<Duration>,
}

impl InMemoryLedger {
    pub(crate) fn with_delay(delay: Duration) -> Self {
        Self {
            orders: Mutex::default(),
            delay: Some(delay),
        }
    }

    pub(crate) fn orders(&self) -> Vec<OrderRecord> {
        self.orders.lock().expect("ledger lock").clone()
    }
}

#[async_trait]
impl OrderLedger for InMemoryLedger {
    async fn insert_order(&self, order: OrderDraft) -> Result<OrderUuid, OrderLedgerError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let uuid = order.uuid;

        self.orders.lock().expect("ledger lock").push(OrderRecord {
            uuid,
            user: order.user,
            items: order.items,
            total_items: order.total_items,
            total: order.total,
            date: order.date,
            created_at: Timestamp::now(),
        });

        Ok(uuid)
    }

    async fn find_orders(
        &self,
        filter: OrderFilter,
    ) -> Result<Vec<OrderRecord>, OrderLedgerError> {
        Ok(self
            .orders()
            .into_iter()
            .filter(|order| match filter {
                OrderFilter::All => true,
                OrderFilter::Owner(user) => order.user == user,
            })
            .collect())
    }
}

#[derive(Debug, Default)]
struct Observed {
    stages: Vec<PlacementStage>,
    missing_products: Vec<ProductUuid>,
    compensation_failures: Vec<(ProductUuid, u32)>,
    committed: Vec<OrderUuid>,
    failures: Vec<&'static str>,
}

#[derive(Debug, Default)]
pub(crate) struct RecordingObserver {
    observed: Mutex<Observed>,
}

impl RecordingObserver {
    pub(crate) fn stages(&self) -> Vec<PlacementStage> {
        self.observed.lock().expect("observer lock").stages.clone()
    }

    pub(crate) fn missing_products(&self) -> Vec<ProductUuid> {
        self.observed
            .lock()
            .expect("observer lock")
            .missing_products
            .clone()
    }

    pub(crate) fn compensation_failures(&self) -> Vec<(ProductUuid, u32)> {
        self.observed
            .lock()
            .expect("observer lock")
            .compensation_failures
            .clone()
    }

    pub(crate) fn committed(&self) -> Vec<OrderUuid> {
        self.observed.lock().expect("observer lock").committed.clone()
    }

    pub(crate) fn failures(&self) -> Vec<&'static str> {
        self.observed.lock().expect("observer lock").failures.clone()
    }
}

impl PlacementObserver for RecordingObserver {
    fn on_stage(&self, stage: PlacementStage) {
        self.observed.lock().expect("observer lock").stages.push(stage);
    }

    fn on_missing_product(&self, product: ProductUuid) {
        self.observed
            .lock()
            .expect("observer lock")
            .missing_products
            .push(product);
    }

    fn on_compensation_failed(&self, failure: &CompensationFailure) {
        self.observed
            .lock()
            .expect("observer lock")
            .compensation_failures
            .push((failure.product, failure.quantity));
    }

    fn on_committed(&self, confirmation: &OrderConfirmation) {
        self.observed
            .lock()
            .expect("observer lock")
            .committed
            .push(confirmation.order);
    }

    fn on_failed(&self, error: &OrderPlacementError) {
        self.observed
            .lock()
            .expect("observer lock")
            .failures
            .push(error.reason());
    }
}
