//! Product Records

use jiff::Timestamp;
use rust_decimal::Decimal;

use crate::uuids::TypedUuid;

/// Product UUID
pub type ProductUuid = TypedUuid<ProductRecord>;

/// Product Record
#[derive(Debug, Clone, PartialEq)]
pub struct ProductRecord {
    pub uuid: ProductUuid,
    pub name: String,
    pub description: String,
    pub image_url: Option<String>,
    pub price: Decimal,
    /// Live stock count. May be negative after unguarded concurrent decrements.
    pub stock: i64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
