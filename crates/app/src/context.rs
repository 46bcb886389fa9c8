//! App Context

use std::sync::Arc;

use thiserror::Error;

use crate::{
    auth::{AuthService, PgAuthService},
    database::{self, Db},
    domain::{
        orders::{
            OrderPlacementConfig, OrderPlacementCoordinator, OrdersService, PgOrderLedger,
            observer::PlacementObserver,
        },
        products::{PgProductsService, ProductsService},
        users::{PgUsersService, UsersService},
    },
};

#[derive(Debug, Error)]
pub enum AppInitError {
    #[error("failed to connect to database")]
    Database(#[source] sqlx::Error),

    #[error("failed to apply database migrations")]
    Migrate(#[source] sqlx::migrate::MigrateError),
}

#[derive(Clone)]
pub struct AppContext {
    pub products: Arc<dyn ProductsService>,
    pub orders: Arc<dyn OrdersService>,
    pub users: Arc<dyn UsersService>,
    pub auth: Arc<dyn AuthService>,
}

impl AppContext {
    /// Build application context from a database URL, applying pending
    /// migrations first.
    ///
    /// # Errors
    ///
    /// Returns an error when establishing a database connection or migrating
    /// the schema fails.
    pub async fn from_database_url(
        url: &str,
        orders: OrderPlacementConfig,
        observer: Arc<dyn PlacementObserver>,
    ) -> Result<Self, AppInitError> {
        let pool = database::connect(url)
            .await
            .map_err(AppInitError::Database)?;

        database::migrate(&pool)
            .await
            .map_err(AppInitError::Migrate)?;

        let db = Db::new(pool.clone());
        let products = Arc::new(PgProductsService::new(db.clone()));

        let coordinator = OrderPlacementCoordinator::new(
            products.clone(),
            Arc::new(PgOrderLedger::new(db.clone())),
            orders,
        )
        .with_observer(observer);

        Ok(Self {
            products,
            orders: Arc::new(coordinator),
            users: Arc::new(PgUsersService::new(db)),
            auth: Arc::new(PgAuthService::new(pool)),
        })
    }
}
