//! Placement observer
//!
//! Hooks for watching order placements. Compensation failures are never
//! surfaced to the caller of a placement, so an observer is the only place
//! besides the logs where they can be picked up.

use std::fmt::Debug;

use crate::domain::{
    orders::{
        data::OrderConfirmation, errors::OrderPlacementError, placement::PlacementStage,
    },
    products::{InventoryError, records::ProductUuid},
};

/// Why a restock during rollback did not happen.
#[derive(Debug)]
pub enum CompensationCause {
    Store(InventoryError),
    TimedOut,
}

/// A reservation that could not be given back. The product's stock is now
/// lower than it should be by `quantity`.
#[derive(Debug)]
pub struct CompensationFailure {
    pub product: ProductUuid,
    pub quantity: u32,
    pub cause: CompensationCause,
}

pub trait PlacementObserver: Send + Sync + Debug {
    /// Called on every state transition.
    fn on_stage(&self, _stage: PlacementStage) {}

    /// Called when a cart line names a product that does not exist.
    fn on_missing_product(&self, _product: ProductUuid) {}

    fn on_compensation_failed(&self, _failure: &CompensationFailure) {}

    fn on_committed(&self, _confirmation: &OrderConfirmation) {}

    fn on_failed(&self, _error: &OrderPlacementError) {}
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl PlacementObserver for NoopObserver {}
