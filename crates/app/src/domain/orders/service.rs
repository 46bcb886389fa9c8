//! Orders service.

use async_trait::async_trait;
use mockall::automock;
use tracing::Instrument;

use crate::domain::{
    orders::{
        data::{CartLine, OrderConfirmation, OrderFilter},
        errors::{OrderLedgerError, OrderPlacementError},
        placement::OrderPlacementCoordinator,
        records::OrderRecord,
    },
    users::records::{Requester, UserUuid},
};

#[automock]
#[async_trait]
pub trait OrdersService: Send + Sync {
    /// Place an order for `user` from the submitted cart.
    ///
    /// Once started, a placement runs to completion or full rollback even if
    /// the returned future is dropped.
    async fn place_order(
        &self,
        user: UserUuid,
        lines: Vec<CartLine>,
    ) -> Result<OrderConfirmation, OrderPlacementError>;

    /// Every order for admins, otherwise only the requester's own orders.
    async fn list_orders(&self, requester: Requester)
    -> Result<Vec<OrderRecord>, OrderLedgerError>;
}

#[async_trait]
impl OrdersService for OrderPlacementCoordinator {
    async fn place_order(
        &self,
        user: UserUuid,
        lines: Vec<CartLine>,
    ) -> Result<OrderConfirmation, OrderPlacementError> {
        let coordinator = self.clone();

        tokio::spawn(async move { coordinator.place(user, lines).await }.in_current_span())
            .await
            .map_err(OrderPlacementError::Interrupted)?
    }

    #[tracing::instrument(
        name = "orders.service.list_orders",
        skip(self, requester),
        fields(user_uuid = %requester.user, role = %requester.role),
        err
    )]
    async fn list_orders(
        &self,
        requester: Requester,
    ) -> Result<Vec<OrderRecord>, OrderLedgerError> {
        let filter = if requester.is_admin() {
            OrderFilter::All
        } else {
            OrderFilter::Owner(requester.user)
        };

        self.ledger.find_orders(filter).await
    }
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, time::Duration};

    use mockall::predicate::eq;
    use rust_decimal::Decimal;
    use testresult::TestResult;
    use tokio::time::{sleep, timeout};

    use crate::domain::{
        orders::{
            MockOrderLedger, OrderPlacementConfig,
            test_support::{InMemoryInventory, InMemoryLedger},
        },
        products::{MockInventoryStore, records::ProductUuid},
        users::records::Role,
    };

    use super::*;

    fn line(product: ProductUuid, quantity: u32) -> CartLine {
        CartLine {
            product,
            quantity,
            price: Decimal::new(1999, 2),
            name: "Notebook".to_string(),
            image_url: None,
        }
    }

    async fn place(
        coordinator: &OrderPlacementCoordinator,
        inventory: &InMemoryInventory,
        user: UserUuid,
    ) -> TestResult<OrderConfirmation> {
        let product = inventory.add_product(10);

        let confirmation = coordinator
            .place_order(
                user,
                vec![CartLine {
                    product,
                    quantity: 1,
                    price: Decimal::new(1999, 2),
                    name: "Notebook".to_string(),
                    image_url: None,
                }],
            )
            .await?;

        Ok(confirmation)
    }

    #[tokio::test(start_paused = true)]
    async fn abandoned_placement_still_rolls_back() {
        let inventory = Arc::new(InMemoryInventory::default());
        let ledger = Arc::new(InMemoryLedger::default());
        let fast = inventory.add_product(5);
        let slow = inventory.add_product(5);
        inventory.delay_for(slow, Duration::from_secs(3));

        let coordinator = OrderPlacementCoordinator::new(
            inventory.clone(),
            ledger.clone(),
            OrderPlacementConfig {
                call_timeout: Duration::from_secs(2),
                ..OrderPlacementConfig::default()
            },
        );

        let abandoned = timeout(
            Duration::from_secs(1),
            coordinator.place_order(UserUuid::new(), vec![line(fast, 2), line(slow, 1)]),
        )
        .await;

        assert!(abandoned.is_err(), "caller should give up first");

        sleep(Duration::from_secs(10)).await;

        assert_eq!(inventory.stock(fast), Some(5));
        assert_eq!(inventory.restocks(), vec![(fast, 2)]);
        assert!(ledger.orders().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn abandoned_placement_still_commits() {
        let inventory = Arc::new(InMemoryInventory::default());
        let ledger = Arc::new(InMemoryLedger::default());
        let fast = inventory.add_product(5);
        let slow = inventory.add_product(5);
        inventory.delay_for(slow, Duration::from_secs(3));

        let coordinator = OrderPlacementCoordinator::new(
            inventory.clone(),
            ledger.clone(),
            OrderPlacementConfig::default(),
        );

        let abandoned = timeout(
            Duration::from_secs(1),
            coordinator.place_order(UserUuid::new(), vec![line(fast, 2), line(slow, 1)]),
        )
        .await;

        assert!(abandoned.is_err(), "caller should give up first");

        sleep(Duration::from_secs(10)).await;

        assert_eq!(inventory.stock(fast), Some(3));
        assert_eq!(inventory.stock(slow), Some(4));
        assert!(inventory.restocks().is_empty());
        assert_eq!(ledger.orders().len(), 1);
    }

    #[tokio::test]
    async fn users_only_see_their_own_orders() -> TestResult {
        let inventory = Arc::new(InMemoryInventory::default());
        let coordinator = OrderPlacementCoordinator::new(
            inventory.clone(),
            Arc::new(InMemoryLedger::default()),
            OrderPlacementConfig::default(),
        );

        let alice = UserUuid::new();
        let bob = UserUuid::new();

        let first = place(&coordinator, &inventory, alice).await?;
        place(&coordinator, &inventory, bob).await?;
        let second = place(&coordinator, &inventory, alice).await?;

        let orders = coordinator
            .list_orders(Requester {
                user: alice,
                role: Role::User,
            })
            .await?;

        let uuids: Vec<_> = orders.iter().map(|order| order.uuid).collect();
        assert_eq!(uuids, vec![first.order, second.order]);

        Ok(())
    }

    #[tokio::test]
    async fn admins_see_every_order() -> TestResult {
        let inventory = Arc::new(InMemoryInventory::default());
        let coordinator = OrderPlacementCoordinator::new(
            inventory.clone(),
            Arc::new(InMemoryLedger::default()),
            OrderPlacementConfig::default(),
        );

        place(&coordinator, &inventory, UserUuid::new()).await?;
        place(&coordinator, &inventory, UserUuid::new()).await?;

        let orders = coordinator
            .list_orders(Requester {
                user: UserUuid::new(),
                role: Role::Admin,
            })
            .await?;

        assert_eq!(orders.len(), 2);

        Ok(())
    }

    #[tokio::test]
    async fn list_orders_queries_ledger_by_owner() -> TestResult {
        let user = UserUuid::new();
        let mut ledger = MockOrderLedger::new();

        ledger
            .expect_find_orders()
            .once()
            .with(eq(OrderFilter::Owner(user)))
            .returning(|_| Ok(Vec::new()));

        let coordinator = OrderPlacementCoordinator::new(
            Arc::new(MockInventoryStore::new()),
            Arc::new(ledger),
            OrderPlacementConfig::default(),
        );

        let orders = coordinator
            .list_orders(Requester {
                user,
                role: Role::User,
            })
            .await?;

        assert!(orders.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn list_orders_propagates_ledger_errors() {
        let mut ledger = MockOrderLedger::new();

        ledger
            .expect_find_orders()
            .once()
            .returning(|_| Err(OrderLedgerError::Sql(sqlx::Error::PoolTimedOut)));

        let coordinator = OrderPlacementCoordinator::new(
            Arc::new(MockInventoryStore::new()),
            Arc::new(ledger),
            OrderPlacementConfig::default(),
        );

        let result = coordinator
            .list_orders(Requester {
                user: UserUuid::new(),
                role: Role::Admin,
            })
            .await;

        assert!(
            matches!(result, Err(OrderLedgerError::Sql(_))),
            "expected Sql, got {result:?}"
        );
    }
}
