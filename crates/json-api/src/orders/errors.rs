//! Order Errors

use salvo::http::StatusError;
use tracing::error;

use storefront_app::domain::orders::{OrderLedgerError, OrderPlacementError};

pub(crate) fn placement_status_error(error: OrderPlacementError) -> StatusError {
    match error {
        OrderPlacementError::EmptyCart => StatusError::bad_request().brief("Cart is empty"),
        OrderPlacementError::Assembly(source) => {
            StatusError::bad_request().brief(source.to_string())
        }
        OrderPlacementError::ProductNotFound(product) => {
            StatusError::not_found().brief(format!("Product {product} not found"))
        }
        OrderPlacementError::InsufficientStock(product) => {
            StatusError::conflict().brief(format!("Insufficient stock for product {product}"))
        }
        error @ (OrderPlacementError::Reservation { .. }
        | OrderPlacementError::Persistence(_)
        | OrderPlacementError::Timeout(_)
        | OrderPlacementError::Interrupted(_)) => {
            error!(error = %error, reason = error.reason(), "order placement failed");

            StatusError::internal_server_error().brief("Order placement failed")
        }
    }
}

pub(crate) fn ledger_status_error(error: OrderLedgerError) -> StatusError {
    error!(error = %error, "failed to load orders");

    StatusError::internal_server_error()
}
