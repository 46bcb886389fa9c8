//! Order Ledger
//!
//! Append-only store of placed orders. Records are never updated after they
//! are written.

use async_trait::async_trait;
use mockall::automock;

use crate::{
    database::Db,
    domain::orders::{
        data::{OrderDraft, OrderFilter},
        errors::OrderLedgerError,
        records::{OrderRecord, OrderUuid},
        repository::PgOrdersRepository,
    },
};

#[automock]
#[async_trait]
pub trait OrderLedger: Send + Sync {
    /// Durably store `order`, header and lines together.
    async fn insert_order(&self, order: OrderDraft) -> Result<OrderUuid, OrderLedgerError>;

    /// Orders matching `filter`, oldest first.
    async fn find_orders(&self, filter: OrderFilter)
    -> Result<Vec<OrderRecord>, OrderLedgerError>;
}

#[derive(Debug, Clone)]
pub struct PgOrderLedger {
    db: Db,
    repository: PgOrdersRepository,
}

impl PgOrderLedger {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgOrdersRepository::new(),
        }
    }
}

#[async_trait]
impl OrderLedger for PgOrderLedger {
    async fn insert_order(&self, order: OrderDraft) -> Result<OrderUuid, OrderLedgerError> {
        let total_items = i64::try_from(order.total_items)?;

        let mut tx = self.db.begin().await?;

        self.repository
            .insert_order(
                &mut tx,
                order.uuid,
                order.user,
                total_items,
                order.total,
                &order.date,
            )
            .await?;

        for (position, line) in order.items.iter().enumerate() {
            let position = i32::try_from(position)?;

            self.repository
                .insert_order_item(&mut tx, order.uuid, position, line)
                .await?;
        }

        tx.commit().await?;

        Ok(order.uuid)
    }

    async fn find_orders(
        &self,
        filter: OrderFilter,
    ) -> Result<Vec<OrderRecord>, OrderLedgerError> {
        let owner = match filter {
            OrderFilter::All => None,
            OrderFilter::Owner(user) => Some(user),
        };

        let mut tx = self.db.begin().await?;

        let orders = self.repository.list_orders(&mut tx, owner).await?;

        tx.commit().await?;

        Ok(orders)
    }
}
