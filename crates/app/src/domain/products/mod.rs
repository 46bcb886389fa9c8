//! Products

pub mod data;
pub mod errors;
pub mod inventory;
pub mod records;
mod repository;
pub mod service;

pub use errors::ProductsServiceError;
pub use inventory::{InventoryError, InventoryStore, MockInventoryStore};
pub use service::*;
