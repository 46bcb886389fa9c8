//! Order Placement Coordinator
//!
//! Drives one placement through
//! `Start -> Reserving -> Assembling -> Persisting -> Committed`, or through
//! `RollingBack -> Failed` once something goes wrong after reservations
//! began. Rollback restocks every reservation recorded so far and never
//! fails itself; restock errors are logged and reported to the observer.

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    future::Future,
    str::FromStr,
    sync::Arc,
    time::Duration,
};

use jiff::tz::TimeZone;
use rust_decimal::Decimal;
use thiserror::Error;
use tokio::time::timeout;
use tracing::{Span, debug, error, info, warn};

use crate::domain::{
    orders::{
        assembler::{DEFAULT_SURCHARGE, OrderAssembler},
        clock::{Clock, SystemClock},
        data::{CartLine, OrderConfirmation, OrderDraft},
        errors::OrderPlacementError,
        ledger::OrderLedger,
        observer::{CompensationCause, CompensationFailure, NoopObserver, PlacementObserver},
    },
    products::{InventoryError, InventoryStore, records::ProductUuid},
    users::records::UserUuid,
};

/// What to do when a cart line names a product the inventory does not know.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingProductPolicy {
    /// Log the line, keep it in the order and carry on.
    #[default]
    Ignore,

    /// Fail the placement with [`OrderPlacementError::ProductNotFound`].
    Abort,
}

impl MissingProductPolicy {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ignore => "ignore",
            Self::Abort => "abort",
        }
    }
}

impl Display for MissingProductPolicy {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("unknown missing product policy: {0}")]
pub struct UnknownMissingProductPolicyError(String);

impl FromStr for MissingProductPolicy {
    type Err = UnknownMissingProductPolicyError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "ignore" => Ok(Self::Ignore),
            "abort" => Ok(Self::Abort),
            _ => Err(UnknownMissingProductPolicyError(value.to_string())),
        }
    }
}

#[derive(Debug, Clone)]
pub struct OrderPlacementConfig {
    /// Flat amount added to every order total.
    pub surcharge: Decimal,
    pub missing_product: MissingProductPolicy,
    /// Refuse reservations that would take stock below zero.
    pub guard_stock: bool,
    /// Upper bound for each inventory or ledger call.
    pub call_timeout: Duration,
    /// Zone the order date stamp is rendered in.
    pub time_zone: TimeZone,
}

impl Default for OrderPlacementConfig {
    fn default() -> Self {
        Self {
            surcharge: DEFAULT_SURCHARGE,
            missing_product: MissingProductPolicy::Ignore,
            guard_stock: false,
            call_timeout: Duration::from_secs(5),
            time_zone: TimeZone::system(),
        }
    }
}

/// Placement state, without the data each state carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlacementStage {
    Start,
    Reserving,
    Assembling,
    Persisting,
    RollingBack,
    Committed,
    Failed,
}

impl PlacementStage {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Reserving => "reserving",
            Self::Assembling => "assembling",
            Self::Persisting => "persisting",
            Self::RollingBack => "rolling_back",
            Self::Committed => "committed",
            Self::Failed => "failed",
        }
    }
}

impl Display for PlacementStage {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

enum Placement {
    Start,
    Reserving,
    Assembling,
    Persisting(OrderDraft),
    RollingBack(OrderPlacementError),
    Committed(OrderConfirmation),
    Failed(OrderPlacementError),
}

impl Placement {
    const fn stage(&self) -> PlacementStage {
        match self {
            Self::Start => PlacementStage::Start,
            Self::Reserving => PlacementStage::Reserving,
            Self::Assembling => PlacementStage::Assembling,
            Self::Persisting(_) => PlacementStage::Persisting,
            Self::RollingBack(_) => PlacementStage::RollingBack,
            Self::Committed(_) => PlacementStage::Committed,
            Self::Failed(_) => PlacementStage::Failed,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Reservation {
    product: ProductUuid,
    quantity: u32,
}

/// Reservations made by one placement, in the order they were made.
#[derive(Debug, Default)]
struct Reservations(Vec<Reservation>);

impl Reservations {
    fn record(&mut self, line: &CartLine) {
        self.0.push(Reservation {
            product: line.product,
            quantity: line.quantity,
        });
    }

    fn len(&self) -> usize {
        self.0.len()
    }

    /// Most recent first.
    fn drain_latest_first(&mut self) -> impl Iterator<Item = Reservation> + '_ {
        self.0.drain(..).rev()
    }
}

#[derive(Clone)]
pub struct OrderPlacementCoordinator {
    inventory: Arc<dyn InventoryStore>,
    pub(super) ledger: Arc<dyn OrderLedger>,
    assembler: OrderAssembler,
    clock: Arc<dyn Clock>,
    observer: Arc<dyn PlacementObserver>,
    missing_product: MissingProductPolicy,
    guard_stock: bool,
    call_timeout: Duration,
}

impl OrderPlacementCoordinator {
    #[must_use]
    pub fn new(
        inventory: Arc<dyn InventoryStore>,
        ledger: Arc<dyn OrderLedger>,
        config: OrderPlacementConfig,
    ) -> Self {
        Self {
            inventory,
            ledger,
            assembler: OrderAssembler::new(config.surcharge, config.time_zone),
            clock: Arc::new(SystemClock),
            observer: Arc::new(NoopObserver),
            missing_product: config.missing_product,
            guard_stock: config.guard_stock,
            call_timeout: config.call_timeout,
        }
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn PlacementObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Reserve stock for every line, assemble the order and append it to the
    /// ledger.
    ///
    /// # Errors
    ///
    /// Returns the first failure encountered. By the time an error is
    /// returned every reservation made by this call has been compensated as
    /// far as the inventory allowed.
    #[tracing::instrument(
        name = "orders.placement.place_order",
        skip(self, lines),
        fields(
            user_uuid = %user,
            line_count = lines.len(),
            order_uuid = tracing::field::Empty,
            reserved_count = tracing::field::Empty
        ),
        err
    )]
    pub async fn place(
        &self,
        user: UserUuid,
        lines: Vec<CartLine>,
    ) -> Result<OrderConfirmation, OrderPlacementError> {
        let span = Span::current();
        let mut reservations = Reservations::default();
        let mut state = Placement::Start;

        loop {
            let stage = state.stage();

            debug!(%stage, "order placement transition");
            self.observer.on_stage(stage);

            state = match state {
                Placement::Start => {
                    if lines.is_empty() {
                        Placement::Failed(OrderPlacementError::EmptyCart)
                    } else {
                        Placement::Reserving
                    }
                }
                Placement::Reserving => {
                    let reserved = self.reserve(&lines, &mut reservations).await;

                    span.record("reserved_count", reservations.len());

                    match reserved {
                        Ok(()) => Placement::Assembling,
                        Err(error) => Placement::RollingBack(error),
                    }
                }
                Placement::Assembling => {
                    match self.assembler.assemble(user, &lines, self.clock.now()) {
                        Ok(draft) => {
                            span.record("order_uuid", tracing::field::display(draft.uuid));

                            Placement::Persisting(draft)
                        }
                        Err(error) => Placement::RollingBack(error.into()),
                    }
                }
                Placement::Persisting(draft) => {
                    let confirmation = OrderConfirmation::from(&draft);

                    match self
                        .bounded(PlacementStage::Persisting, self.ledger.insert_order(draft))
                        .await
                    {
                        Ok(Ok(_)) => Placement::Committed(confirmation),
                        Ok(Err(error)) => {
                            Placement::RollingBack(OrderPlacementError::Persistence(error))
                        }
                        Err(error) => Placement::RollingBack(error),
                    }
                }
                Placement::RollingBack(error) => {
                    self.compensate(&mut reservations).await;

                    Placement::Failed(error)
                }
                Placement::Committed(confirmation) => {
                    info!(
                        order_uuid = %confirmation.order,
                        total = %confirmation.total,
                        total_items = confirmation.total_items,
                        "placed order"
                    );

                    self.observer.on_committed(&confirmation);

                    return Ok(confirmation);
                }
                Placement::Failed(error) => {
                    self.observer.on_failed(&error);

                    return Err(error);
                }
            };
        }
    }

    async fn reserve(
        &self,
        lines: &[CartLine],
        reservations: &mut Reservations,
    ) -> Result<(), OrderPlacementError> {
        for line in lines {
            let delta = -i64::from(line.quantity);

            let adjusted = if self.guard_stock {
                self.bounded(
                    PlacementStage::Reserving,
                    self.inventory.adjust_stock_guarded(line.product, delta),
                )
                .await
            } else {
                self.bounded(
                    PlacementStage::Reserving,
                    self.inventory.adjust_stock(line.product, delta),
                )
                .await
            };

            let adjusted = match adjusted {
                Ok(adjusted) => adjusted,
                Err(timed_out) => {
                    // The store may or may not have applied the decrement.
                    error!(
                        product = %line.product,
                        quantity = line.quantity,
                        "stock reservation timed out; outcome unknown"
                    );

                    return Err(timed_out);
                }
            };

            match adjusted {
                Ok(product) => {
                    debug!(
                        product = %line.product,
                        quantity = line.quantity,
                        stock = product.stock,
                        "reserved stock"
                    );

                    reservations.record(line);
                }
                Err(InventoryError::NotFound) => {
                    warn!(
                        product = %line.product,
                        quantity = line.quantity,
                        policy = %self.missing_product,
                        "product not found while reserving stock"
                    );

                    self.observer.on_missing_product(line.product);

                    match self.missing_product {
                        MissingProductPolicy::Ignore => reservations.record(line),
                        MissingProductPolicy::Abort => {
                            return Err(OrderPlacementError::ProductNotFound(line.product));
                        }
                    }
                }
                Err(InventoryError::InsufficientStock) => {
                    return Err(OrderPlacementError::InsufficientStock(line.product));
                }
                Err(source) => {
                    return Err(OrderPlacementError::Reservation {
                        product: line.product,
                        source,
                    });
                }
            }
        }

        Ok(())
    }

    /// Give back every recorded reservation. Never fails.
    async fn compensate(&self, reservations: &mut Reservations) {
        for reservation in reservations.drain_latest_first() {
            let restocked = timeout(
                self.call_timeout,
                self.inventory
                    .adjust_stock(reservation.product, i64::from(reservation.quantity)),
            )
            .await;

            let cause = match restocked {
                Ok(Ok(product)) => {
                    debug!(
                        product = %reservation.product,
                        quantity = reservation.quantity,
                        stock = product.stock,
                        "restocked reservation"
                    );

                    continue;
                }
                Ok(Err(error)) => CompensationCause::Store(error),
                Err(_elapsed) => CompensationCause::TimedOut,
            };

            let failure = CompensationFailure {
                product: reservation.product,
                quantity: reservation.quantity,
                cause,
            };

            error!(
                product = %failure.product,
                quantity = failure.quantity,
                error = ?failure.cause,
                "failed to restock reservation during rollback"
            );

            self.observer.on_compensation_failed(&failure);
        }
    }

    async fn bounded<F: Future>(
        &self,
        stage: PlacementStage,
        call: F,
    ) -> Result<F::Output, OrderPlacementError> {
        timeout(self.call_timeout, call)
            .await
            .map_err(|_elapsed| OrderPlacementError::Timeout(stage))
    }
}
