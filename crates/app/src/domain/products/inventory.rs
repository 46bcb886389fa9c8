//! Inventory Store
//!
//! Per-product stock counters. Every adjustment is a single-row atomic
//! increment, so concurrent adjustments on the same product never lose
//! updates. There is no multi-product transaction: callers that touch several
//! products must compensate themselves on failure.

use async_trait::async_trait;
use mockall::automock;
use sqlx::Error;
use thiserror::Error;

use crate::domain::products::{
    PgProductsService,
    records::{ProductRecord, ProductUuid},
};

#[derive(Debug, Error)]
pub enum InventoryError {
    #[error("product not found")]
    NotFound,

    #[error("insufficient stock")]
    InsufficientStock,

    #[error("storage error")]
    Sql(#[source] Error),
}

impl From<Error> for InventoryError {
    fn from(error: Error) -> Self {
        if matches!(error, Error::RowNotFound) {
            return Self::NotFound;
        }

        Self::Sql(error)
    }
}

#[automock]
#[async_trait]
pub trait InventoryStore: Send + Sync {
    /// Add `delta` to the product's stock and return the updated product.
    ///
    /// Negative deltas reserve stock, positive deltas restock. Stock is allowed
    /// to go negative.
    async fn adjust_stock(
        &self,
        product: ProductUuid,
        delta: i64,
    ) -> Result<ProductRecord, InventoryError>;

    /// Add `delta` to the product's stock unless the result would be negative,
    /// in which case [`InventoryError::InsufficientStock`] is returned and
    /// nothing changes.
    async fn adjust_stock_guarded(
        &self,
        product: ProductUuid,
        delta: i64,
    ) -> Result<ProductRecord, InventoryError>;
}

#[async_trait]
impl InventoryStore for PgProductsService {
    async fn adjust_stock(
        &self,
        product: ProductUuid,
        delta: i64,
    ) -> Result<ProductRecord, InventoryError> {
        let mut tx = self.db.begin().await?;

        let updated = self
            .repository
            .adjust_stock(&mut tx, product, delta)
            .await?
            .ok_or(InventoryError::NotFound)?;

        tx.commit().await?;

        Ok(updated)
    }

    async fn adjust_stock_guarded(
        &self,
        product: ProductUuid,
        delta: i64,
    ) -> Result<ProductRecord, InventoryError> {
        let mut tx = self.db.begin().await?;

        let updated = self
            .repository
            .adjust_stock_guarded(&mut tx, product, delta)
            .await?;

        let Some(updated) = updated else {
            let exists = self.repository.product_exists(&mut tx, product).await?;

            return Err(if exists {
                InventoryError::InsufficientStock
            } else {
                InventoryError::NotFound
            });
        };

        tx.commit().await?;

        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use testresult::TestResult;

    use crate::{
        domain::products::{ProductsService, data::NewProduct},
        test::TestContext,
    };

    use super::*;

    async fn create_product(ctx: &TestContext, stock: i64) -> TestResult<ProductUuid> {
        let uuid = ProductUuid::new();

        ctx.products
            .create_product(NewProduct {
                uuid,
                name: format!("Product {uuid}"),
                description: String::new(),
                image_url: None,
                price: Decimal::new(999, 2),
                stock,
            })
            .await?;

        Ok(uuid)
    }

    #[tokio::test]
    async fn adjust_stock_decrements_and_restocks() -> TestResult {
        let ctx = TestContext::new().await;
        let product = create_product(&ctx, 10).await?;

        let reserved = ctx.products.adjust_stock(product, -3).await?;
        assert_eq!(reserved.stock, 7);

        let restocked = ctx.products.adjust_stock(product, 3).await?;
        assert_eq!(restocked.stock, 10);

        Ok(())
    }

    #[tokio::test]
    async fn adjust_stock_may_go_negative() -> TestResult {
        let ctx = TestContext::new().await;
        let product = create_product(&ctx, 1).await?;

        let updated = ctx.products.adjust_stock(product, -2).await?;

        assert_eq!(updated.stock, -1);

        Ok(())
    }

    #[tokio::test]
    async fn adjust_stock_unknown_product_returns_not_found() {
        let ctx = TestContext::new().await;

        let result = ctx.products.adjust_stock(ProductUuid::new(), -1).await;

        assert!(
            matches!(result, Err(InventoryError::NotFound)),
            "expected NotFound, got {result:?}"
        );
    }

    #[tokio::test]
    async fn guarded_adjustment_refuses_to_oversell() -> TestResult {
        let ctx = TestContext::new().await;
        let product = create_product(&ctx, 2).await?;

        let result = ctx.products.adjust_stock_guarded(product, -3).await;

        assert!(
            matches!(result, Err(InventoryError::InsufficientStock)),
            "expected InsufficientStock, got {result:?}"
        );

        let unchanged = ctx.products.get_product(product).await?;
        assert_eq!(unchanged.stock, 2);

        let updated = ctx.products.adjust_stock_guarded(product, -2).await?;
        assert_eq!(updated.stock, 0);

        Ok(())
    }

    #[tokio::test]
    async fn guarded_adjustment_unknown_product_returns_not_found() {
        let ctx = TestContext::new().await;

        let result = ctx
            .products
            .adjust_stock_guarded(ProductUuid::new(), -1)
            .await;

        assert!(
            matches!(result, Err(InventoryError::NotFound)),
            "expected NotFound, got {result:?}"
        );
    }

    #[tokio::test]
    async fn concurrent_decrements_do_not_lose_updates() -> TestResult {
        let ctx = TestContext::new().await;
        let product = create_product(&ctx, 50).await?;

        let mut handles = Vec::new();

        for _ in 0..10 {
            let products = ctx.products.clone();
            handles.push(tokio::spawn(async move {
                products.adjust_stock(product, -1).await
            }));
        }

        for handle in handles {
            handle.await??;
        }

        let product = ctx.products.get_product(product).await?;
        assert_eq!(product.stock, 40);

        Ok(())
    }
}
