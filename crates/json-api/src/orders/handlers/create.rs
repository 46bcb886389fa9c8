//! Place Order Handler

use std::sync::Arc;

use rust_decimal::Decimal;
use salvo::{
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use storefront_app::domain::orders::data::{CartLine, OrderConfirmation};

use crate::{extensions::*, orders::errors::placement_status_error, state::State};

/// A line of the submitted cart. Name, price and image are copied into the
/// order as sent.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CartLineRequest {
    #[serde(rename = "itemID")]
    pub item_id: Uuid,

    pub name: String,

    #[salvo(schema(value_type = String))]
    pub price: Decimal,

    pub quantity: u32,

    #[serde(default, rename = "imageURL")]
    pub image_url: Option<String>,
}

impl From<CartLineRequest> for CartLine {
    fn from(line: CartLineRequest) -> Self {
        CartLine {
            product: line.item_id.into(),
            quantity: line.quantity,
            price: line.price,
            name: line.name,
            image_url: line.image_url,
        }
    }
}

/// Place Order Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct PlaceOrderRequest {
    pub items: Vec<CartLineRequest>,
}

/// Order Placed Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct OrderPlacedResponse {
    pub order_id: Uuid,

    /// Order total including the surcharge, two decimal places
    pub total: String,

    pub total_items: u64,
}

impl From<OrderConfirmation> for OrderPlacedResponse {
    fn from(confirmation: OrderConfirmation) -> Self {
        OrderPlacedResponse {
            order_id: confirmation.order.into_uuid(),
            total: format!("{:.2}", confirmation.total),
            total_items: confirmation.total_items,
        }
    }
}

/// Place Order Handler
#[endpoint(
    tags("orders"),
    summary = "Place Order",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::CREATED, description = "Order placed"),
        (status_code = StatusCode::BAD_REQUEST, description = "Empty cart or invalid line"),
        (status_code = StatusCode::NOT_FOUND, description = "Product not found"),
        (status_code = StatusCode::CONFLICT, description = "Insufficient stock"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Order placement failed"),
    ),
)]
pub(crate) async fn handler(
    json: JsonBody<PlaceOrderRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<OrderPlacedResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let requester = depot.requester_or_401()?;

    let lines = json
        .into_inner()
        .items
        .into_iter()
        .map(CartLine::from)
        .collect();

    let confirmation = state
        .app
        .orders
        .place_order(requester.user, lines)
        .await
        .map_err(placement_status_error)?;

    res.status_code(StatusCode::CREATED);

    Ok(Json(confirmation.into()))
}
