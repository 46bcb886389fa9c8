//! Orders
//!
//! Order placement reserves stock line by line, assembles an immutable order
//! snapshot and appends it to the ledger. Inventory and ledger writes are not
//! one transaction: if anything after the first reservation fails, the
//! reservations made so far are compensated with restocks on a best-effort
//! basis.

pub mod assembler;
pub mod clock;
pub mod data;
pub mod errors;
pub mod ledger;
pub mod observer;
pub mod placement;
pub mod records;
mod repository;
pub mod service;

#[cfg(test)]
mod test_support;

pub use errors::*;
pub use ledger::{MockOrderLedger, OrderLedger, PgOrderLedger};
pub use placement::{MissingProductPolicy, OrderPlacementConfig, OrderPlacementCoordinator};
pub use service::*;
