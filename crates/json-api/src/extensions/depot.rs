//! Depot helper extensions.

use std::any::Any;

use salvo::prelude::{Depot, StatusError};
use storefront_app::domain::users::records::Requester;

/// Helpers for mapping depot extraction failures to HTTP errors.
pub(crate) trait DepotExt {
    fn obtain_or_500<T: Any + Send + Sync>(&self) -> Result<&T, StatusError>;

    fn insert_requester(&mut self, requester: Requester);

    fn requester_or_401(&self) -> Result<Requester, StatusError>;

    /// The authenticated requester, provided they are an admin.
    fn admin_or_403(&self) -> Result<Requester, StatusError>;
}

impl DepotExt for Depot {
    fn obtain_or_500<T: Any + Send + Sync>(&self) -> Result<&T, StatusError> {
        self.obtain::<T>()
            .map_err(|_ignored| StatusError::internal_server_error())
    }

    fn insert_requester(&mut self, requester: Requester) {
        self.inject(requester);
    }

    fn requester_or_401(&self) -> Result<Requester, StatusError> {
        self.obtain::<Requester>()
            .copied()
            .map_err(|_ignored| StatusError::unauthorized())
    }

    fn admin_or_403(&self) -> Result<Requester, StatusError> {
        let requester = self.requester_or_401()?;

        if !requester.is_admin() {
            return Err(StatusError::forbidden().brief("Admin role required"));
        }

        Ok(requester)
    }
}
