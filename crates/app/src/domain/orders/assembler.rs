//! Order Assembler
//!
//! Pure computation of an order snapshot from a cart. No I/O.

use jiff::{Timestamp, tz::TimeZone};
use rust_decimal::{Decimal, RoundingStrategy};

use crate::domain::{
    orders::{
        data::{CartLine, OrderDraft},
        errors::AssemblyError,
        records::{OrderLineRecord, OrderUuid},
    },
    users::records::UserUuid,
};

/// Flat amount added to every order total.
pub const DEFAULT_SURCHARGE: Decimal = Decimal::TEN;

/// `strftime` pattern of the order date stamp, e.g. `March 7, 2026`.
pub const DATE_STAMP_FORMAT: &str = "%B %-d, %Y";

/// Round to two decimal places, halves away from zero.
#[must_use]
pub fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Format a placement instant as `"<MonthName> <Day>, <Year>"` in `time_zone`.
#[must_use]
pub fn date_stamp(at: Timestamp, time_zone: &TimeZone) -> String {
    at.to_zoned(time_zone.clone())
        .strftime(DATE_STAMP_FORMAT)
        .to_string()
}

#[derive(Debug, Clone)]
pub struct OrderAssembler {
    surcharge: Decimal,
    time_zone: TimeZone,
}

impl OrderAssembler {
    #[must_use]
    pub fn new(surcharge: Decimal, time_zone: TimeZone) -> Self {
        Self {
            surcharge,
            time_zone,
        }
    }

    /// Compute the order for `lines`, placed by `user` at `now`.
    ///
    /// Totals are deterministic for identical inputs; only the order id is
    /// freshly generated on every call.
    pub fn assemble(
        &self,
        user: UserUuid,
        lines: &[CartLine],
        now: Timestamp,
    ) -> Result<OrderDraft, AssemblyError> {
        if lines.is_empty() {
            return Err(AssemblyError::EmptyCart);
        }

        let mut items = Vec::with_capacity(lines.len());
        let mut subtotal = Decimal::ZERO;
        let mut total_items = 0_u64;

        for line in lines {
            if line.quantity == 0 {
                return Err(AssemblyError::InvalidQuantity(line.product));
            }

            if line.price.is_sign_negative() && !line.price.is_zero() {
                return Err(AssemblyError::NegativePrice(line.product));
            }

            // Line prices are stored as NUMERIC(12, 2).
            if line.price.normalize().scale() > 2 {
                return Err(AssemblyError::PriceScale(line.product));
            }

            let line_total = Decimal::from(line.quantity)
                .checked_mul(line.price)
                .map(round2)
                .ok_or(AssemblyError::Overflow)?;

            subtotal = subtotal
                .checked_add(line_total)
                .ok_or(AssemblyError::Overflow)?;

            total_items += u64::from(line.quantity);

            items.push(OrderLineRecord {
                item: line.product,
                name: line.name.clone(),
                price: line.price,
                quantity: line.quantity,
                image_url: line.image_url.clone(),
            });
        }

        let total = subtotal
            .checked_add(self.surcharge)
            .map(round2)
            .ok_or(AssemblyError::Overflow)?;

        Ok(OrderDraft {
            uuid: OrderUuid::new(),
            user,
            items,
            total_items,
            total,
            date: date_stamp(now, &self.time_zone),
        })
    }
}
