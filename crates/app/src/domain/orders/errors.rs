//! Orders errors.

use std::num::TryFromIntError;

use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind},
};
use thiserror::Error;
use tokio::task::JoinError;

use crate::domain::{
    orders::placement::PlacementStage, products::InventoryError, products::records::ProductUuid,
};

/// Order Assembler errors. Assembly is pure, so these always describe the cart.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssemblyError {
    #[error("cart is empty")]
    EmptyCart,

    #[error("invalid quantity for product {0}")]
    InvalidQuantity(ProductUuid),

    #[error("negative price for product {0}")]
    NegativePrice(ProductUuid),

    #[error("price for product {0} has more than two decimal places")]
    PriceScale(ProductUuid),

    #[error("order total overflowed")]
    Overflow,
}

#[derive(Debug, Error)]
pub enum OrderLedgerError {
    #[error("order already exists")]
    AlreadyExists,

    #[error("invalid data")]
    InvalidData,

    #[error("invalid item count")]
    InvalidCount(#[from] TryFromIntError),

    #[error("storage error")]
    Sql(#[source] Error),
}

impl From<Error> for OrderLedgerError {
    fn from(error: Error) -> Self {
        match error.as_database_error().map(DatabaseError::kind) {
            Some(ErrorKind::UniqueViolation) => Self::AlreadyExists,
            Some(ErrorKind::NotNullViolation | ErrorKind::CheckViolation) => Self::InvalidData,
            Some(ErrorKind::ForeignKeyViolation | ErrorKind::Other | _) | None => {
                Self::Sql(error)
            }
        }
    }
}

/// Terminal failure of an order placement. Whenever one of these is returned
/// after reservations began, the reservations have already been compensated
/// (best effort).
#[derive(Debug, Error)]
pub enum OrderPlacementError {
    #[error("cart is empty")]
    EmptyCart,

    #[error("product not found: {0}")]
    ProductNotFound(ProductUuid),

    #[error("insufficient stock for product {0}")]
    InsufficientStock(ProductUuid),

    #[error("failed to reserve stock for product {product}")]
    Reservation {
        product: ProductUuid,
        #[source]
        source: InventoryError,
    },

    #[error("failed to assemble order")]
    Assembly(#[from] AssemblyError),

    #[error("failed to persist order")]
    Persistence(#[source] OrderLedgerError),

    #[error("timed out while {0}")]
    Timeout(PlacementStage),

    /// The placement task panicked or was cancelled by runtime shutdown.
    #[error("order placement task did not complete")]
    Interrupted(#[source] JoinError),
}

impl OrderPlacementError {
    /// Short, stable label for metrics and structured logs.
    #[must_use]
    pub const fn reason(&self) -> &'static str {
        match self {
            Self::EmptyCart => "empty_cart",
            Self::ProductNotFound(_) => "product_not_found",
            Self::InsufficientStock(_) => "insufficient_stock",
            Self::Reservation { .. } => "reservation",
            Self::Assembly(_) => "assembly",
            Self::Persistence(_) => "persistence",
            Self::Timeout(_) => "timeout",
            Self::Interrupted(_) => "interrupted",
        }
    }
}
