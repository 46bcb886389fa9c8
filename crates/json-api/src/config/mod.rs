//! Server configuration module

use clap::Parser;

use crate::config::{
    db::DatabaseConfig,
    observability::{LoggingConfig, ObservabilityConfig},
    orders::OrdersConfig,
    server::ServerRuntimeConfig,
};

pub(crate) mod db;
pub(crate) mod observability;
pub(crate) mod orders;
pub(crate) mod server;

/// Storefront JSON API Server configuration
#[derive(Debug, Parser)]
#[command(name = "storefront-json", about = "Storefront JSON API Server", long_about = None)]
pub struct ServerConfig {
    /// Server network settings.
    #[command(flatten)]
    pub server: ServerRuntimeConfig,

    /// Logging output settings.
    #[command(flatten)]
    pub logging: LoggingConfig,

    /// Request logging settings.
    #[command(flatten)]
    pub observability: ObservabilityConfig,

    /// Application database settings.
    #[command(flatten)]
    pub database: DatabaseConfig,

    /// Order placement settings.
    #[command(flatten)]
    pub orders: OrdersConfig,
}

impl ServerConfig {
    /// Load configuration from environment and CLI arguments
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be parsed
    pub fn load() -> Result<Self, clap::Error> {
        // Missing .env is fine
        _ = dotenvy::dotenv();

        Self::try_parse()
    }

    #[must_use]
    pub fn socket_addr(&self) -> String {
        self.server.socket_addr()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use rust_decimal::Decimal;
    use storefront_app::domain::orders::MissingProductPolicy;
    use testresult::TestResult;

    use super::*;

    #[test]
    fn defaults_match_documented_values() -> TestResult {
        let config = ServerConfig::try_parse_from([
            "storefront-json",
            "--database-url",
            "postgres://localhost/storefront",
        ])?;

        assert_eq!(config.socket_addr(), "0.0.0.0:8698");
        assert_eq!(config.observability.slow_request_threshold_ms, 1_000);

        let orders = config.orders.into_placement_config();

        assert_eq!(orders.surcharge, Decimal::TEN);
        assert_eq!(orders.missing_product, MissingProductPolicy::Ignore);
        assert!(!orders.guard_stock);
        assert_eq!(orders.call_timeout, Duration::from_secs(5));

        Ok(())
    }

    #[test]
    fn order_settings_can_be_overridden() -> TestResult {
        let config = ServerConfig::try_parse_from([
            "storefront-json",
            "--database-url",
            "postgres://localhost/storefront",
            "--order-surcharge",
            "4.50",
            "--order-missing-product-policy",
            "abort",
            "--order-guard-stock",
            "--order-call-timeout-ms",
            "250",
        ])?;

        let orders = config.orders.into_placement_config();

        assert_eq!(orders.surcharge, Decimal::new(450, 2));
        assert_eq!(orders.missing_product, MissingProductPolicy::Abort);
        assert!(orders.guard_stock);
        assert_eq!(orders.call_timeout, Duration::from_millis(250));

        Ok(())
    }

    #[test]
    fn unknown_missing_product_policy_is_rejected() {
        let result = ServerConfig::try_parse_from([
            "storefront-json",
            "--database-url",
            "postgres://localhost/storefront",
            "--order-missing-product-policy",
            "sometimes",
        ]);

        assert!(result.is_err());
    }
}
