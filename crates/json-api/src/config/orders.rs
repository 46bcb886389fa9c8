//! Order Placement Config

use std::time::Duration;

use clap::Args;
use jiff::tz::TimeZone;
use rust_decimal::Decimal;
use storefront_app::domain::orders::{MissingProductPolicy, OrderPlacementConfig};

/// Order placement settings.
#[derive(Debug, Args)]
pub struct OrdersConfig {
    /// Flat amount added to every order total
    #[arg(long, env = "ORDER_SURCHARGE", default_value = "10")]
    pub order_surcharge: Decimal,

    /// What to do with cart lines naming unknown products (ignore, abort)
    #[arg(long, env = "ORDER_MISSING_PRODUCT_POLICY", default_value = "ignore")]
    pub order_missing_product_policy: MissingProductPolicy,

    /// Refuse orders that would take stock below zero
    #[arg(long, env = "ORDER_GUARD_STOCK", default_value_t = false)]
    pub order_guard_stock: bool,

    /// Timeout for each inventory or ledger call, in milliseconds
    #[arg(long, env = "ORDER_CALL_TIMEOUT_MS", default_value_t = 5_000_u64)]
    pub order_call_timeout_ms: u64,
}

impl OrdersConfig {
    #[must_use]
    pub fn into_placement_config(self) -> OrderPlacementConfig {
        OrderPlacementConfig {
            surcharge: self.order_surcharge,
            missing_product: self.order_missing_product_policy,
            guard_stock: self.order_guard_stock,
            call_timeout: Duration::from_millis(self.order_call_timeout_ms),
            time_zone: TimeZone::system(),
        }
    }
}
