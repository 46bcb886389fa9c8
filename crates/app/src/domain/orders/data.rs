//! Orders Data

use rust_decimal::Decimal;

use crate::domain::{
    orders::records::{OrderLineRecord, OrderUuid},
    products::records::ProductUuid,
    users::records::UserUuid,
};

/// A client-submitted cart line. Price, name and image are echoed by the
/// client and copied into the order as-is.
#[derive(Debug, Clone, PartialEq)]
pub struct CartLine {
    pub product: ProductUuid,
    pub quantity: u32,
    pub price: Decimal,
    pub name: String,
    pub image_url: Option<String>,
}

/// A fully computed order that has not been persisted yet.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderDraft {
    pub uuid: OrderUuid,
    pub user: UserUuid,
    pub items: Vec<OrderLineRecord>,
    pub total_items: u64,
    pub total: Decimal,
    pub date: String,
}

/// Which orders a ledger query returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderFilter {
    All,
    Owner(UserUuid),
}

/// Returned to the caller of a successful placement.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderConfirmation {
    pub order: OrderUuid,
    pub total: Decimal,
    pub total_items: u64,
}

impl From<&OrderDraft> for OrderConfirmation {
    fn from(draft: &OrderDraft) -> Self {
        Self {
            order: draft.uuid,
            total: draft.total,
            total_items: draft.total_items,
        }
    }
}
