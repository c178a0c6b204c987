use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockledger_core::{LedgerError, LedgerResult, LocationId, ProductId};

use crate::movement::StockEvent;

/// Current derived stock state for one product at one location.
///
/// At most one position exists per `(product_id, location)` pair. It is
/// created lazily (zeroed) on the first event for that pair and mutated on
/// every subsequent event; it is never deleted while events referencing it
/// exist. The position is a projection over the event log, never a source of
/// truth of its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockPosition {
    pub product_id: ProductId,
    pub location: LocationId,
    /// Sum of all quantity deltas folded so far. May be negative when the
    /// embedder's policy allows oversold stock.
    pub quantity_on_hand: i64,
    /// Quantity allocated to unfulfilled outbound commitments. Adjusted by
    /// the reservation API, never by stock events directly. Always >= 0.
    pub quantity_reserved: i64,
    /// Business time of the most recent movement folded in. Advance-only:
    /// backdated corrections never move it backwards.
    pub last_movement_at: Option<DateTime<Utc>>,
}

impl StockPosition {
    /// Empty position for a pair that has not seen any event yet.
    pub fn zero(product_id: ProductId, location: LocationId) -> Self {
        Self {
            product_id,
            location,
            quantity_on_hand: 0,
            quantity_reserved: 0,
            last_movement_at: None,
        }
    }

    /// Quantity eligible for new commitments: on-hand minus reserved.
    ///
    /// Always recomputed, never stored as a writable field. Can be negative
    /// when reservations exceed on-hand; that is a bug signal worth
    /// surfacing, not something to clamp away.
    pub fn available(&self) -> i64 {
        self.quantity_on_hand - self.quantity_reserved
    }

    /// Fold one event into the position.
    pub fn apply(&mut self, event: &StockEvent) {
        debug_assert_eq!(event.product_id, self.product_id);
        debug_assert_eq!(event.location, self.location);

        self.quantity_on_hand += event.quantity_delta;

        // Only advance the freshness marker forward; a backdated correction
        // updates history but not "most recent movement".
        match self.last_movement_at {
            Some(last) if event.performed_at < last => {}
            _ => self.last_movement_at = Some(event.performed_at),
        }
    }

    /// Commit `qty` units of available stock to an outbound obligation.
    ///
    /// Fails fast with `InsufficientStock` when `qty` exceeds the currently
    /// available quantity; state is unchanged on failure.
    pub fn reserve(&mut self, qty: i64) -> LedgerResult<()> {
        if qty <= 0 {
            return Err(LedgerError::validation(format!(
                "reservation quantity must be positive, got {qty}"
            )));
        }
        let available = self.available();
        if qty > available {
            return Err(LedgerError::InsufficientStock {
                requested: qty,
                available,
            });
        }
        self.quantity_reserved += qty;
        Ok(())
    }

    /// Give back `qty` previously reserved units.
    ///
    /// Releasing more than is outstanding is a caller bug: it fails with
    /// `InvalidState` rather than silently clamping below the documented
    /// floor of 0.
    pub fn release(&mut self, qty: i64) -> LedgerResult<()> {
        if qty <= 0 {
            return Err(LedgerError::validation(format!(
                "release quantity must be positive, got {qty}"
            )));
        }
        if qty > self.quantity_reserved {
            return Err(LedgerError::invalid_state(format!(
                "release of {qty} exceeds outstanding reservation of {}",
                self.quantity_reserved
            )));
        }
        self.quantity_reserved -= qty;
        Ok(())
    }
}
