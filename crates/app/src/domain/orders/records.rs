//! Order Records

use jiff::Timestamp;
use rust_decimal::Decimal;

use crate::{
    domain::{products::records::ProductUuid, users::records::UserUuid},
    uuids::TypedUuid,
};

/// Order UUID
pub type OrderUuid = TypedUuid<OrderRecord>;

/// Snapshot of one cart line at placement time. Holds no live reference to the
/// product it was copied from.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderLineRecord {
    pub item: ProductUuid,
    pub name: String,
    pub price: Decimal,
    pub quantity: u32,
    pub image_url: Option<String>,
}

/// Order Record
#[derive(Debug, Clone, PartialEq)]
pub struct OrderRecord {
    pub uuid: OrderUuid,
    pub user: UserUuid,
    pub items: Vec<OrderLineRecord>,
    pub total_items: u64,
    pub total: Decimal,
    /// Placement date, e.g. `"March 7, 2026"`.
    pub date: String,
    pub created_at: Timestamp,
}
