//! List Orders Handler

use std::sync::Arc;

use salvo::{oapi::ToSchema, prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use storefront_app::domain::orders::records::{OrderLineRecord, OrderRecord};

use crate::{extensions::*, orders::errors::ledger_status_error, state::State};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct OrderLineResponse {
    #[serde(rename = "itemID")]
    pub item_id: Uuid,

    pub name: String,

    /// Unit price as it was when the order was placed
    pub price: String,

    pub quantity: u32,

    #[serde(rename = "imageURL")]
    pub image_url: Option<String>,
}

impl From<OrderLineRecord> for OrderLineResponse {
    fn from(line: OrderLineRecord) -> Self {
        OrderLineResponse {
            item_id: line.item.into_uuid(),
            name: line.name,
            price: format!("{:.2}", line.price),
            quantity: line.quantity,
            image_url: line.image_url,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct OrderResponse {
    pub order_number: Uuid,

    #[serde(rename = "userID")]
    pub user_id: Uuid,

    pub total_items: u64,

    /// Human readable order date, e.g. "March 5, 2024"
    pub date: String,

    pub total: String,

    pub items: Vec<OrderLineResponse>,
}

impl From<OrderRecord> for OrderResponse {
    fn from(order: OrderRecord) -> Self {
        OrderResponse {
            order_number: order.uuid.into_uuid(),
            user_id: order.user.into_uuid(),
            total_items: order.total_items,
            date: order.date,
            total: format!("{:.2}", order.total),
            items: order.items.into_iter().map(OrderLineResponse::from).collect(),
        }
    }
}

/// List Orders Handler
///
/// Admins see every order, everyone else only their own.
#[endpoint(
    tags("orders"),
    summary = "List Orders",
    security(("bearer_auth" = []))
)]
pub(crate) async fn handler(depot: &mut Depot) -> Result<Json<Vec<OrderResponse>>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let requester = depot.requester_or_401()?;

    let orders = state
        .app
        .orders
        .list_orders(requester)
        .await
        .map_err(ledger_status_error)?;

    Ok(Json(orders.into_iter().map(OrderResponse::from).collect()))
}
