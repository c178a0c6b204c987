use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockledger_core::{EventId, LedgerError, LedgerResult, LocationId, ProductId};

/// Kind of a stock-affecting occurrence.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MovementKind {
    Purchase,
    Sale,
    Adjustment,
    Transfer,
    Return,
    Damaged,
    Expired,
    Stocktake,
}

/// Which delta signs a movement kind admits.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SignPolicy {
    /// Delta must be >= 0 (stock coming in).
    Inbound,
    /// Delta must be <= 0 (stock going out).
    Outbound,
    /// Either sign (corrections, transfers, counts).
    Any,
}

impl MovementKind {
    /// Stable name used in logs and serialized events.
    pub fn as_str(self) -> &'static str {
        match self {
            MovementKind::Purchase => "purchase",
            MovementKind::Sale => "sale",
            MovementKind::Adjustment => "adjustment",
            MovementKind::Transfer => "transfer",
            MovementKind::Return => "return",
            MovementKind::Damaged => "damaged",
            MovementKind::Expired => "expired",
            MovementKind::Stocktake => "stocktake",
        }
    }

    /// The sign this kind mandates for `quantity_delta`.
    ///
    /// Enforcement is a policy choice (see `LedgerPolicy` in the engine); the
    /// mapping itself is fixed so a sign-flipped sale can never be recorded
    /// silently when enforcement is on.
    pub fn sign_policy(self) -> SignPolicy {
        match self {
            MovementKind::Purchase | MovementKind::Return => SignPolicy::Inbound,
            MovementKind::Sale | MovementKind::Damaged | MovementKind::Expired => {
                SignPolicy::Outbound
            }
            MovementKind::Adjustment | MovementKind::Transfer | MovementKind::Stocktake => {
                SignPolicy::Any
            }
        }
    }
}

impl core::fmt::Display for MovementKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A movement ready to be appended to the log (not yet assigned an id or a
/// sequence number).
///
/// The lifecycle mirrors the store itself: callers build a `MovementDraft`,
/// the log assigns identity, sequence and append time, and hands back an
/// immutable [`StockEvent`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovementDraft {
    pub product_id: ProductId,
    pub kind: MovementKind,
    /// Signed quantity: positive = inbound, negative = outbound. Zero is
    /// permitted (a no-op stocktake confirmation) but discouraged.
    pub quantity_delta: i64,
    /// Cost per unit in the smallest currency unit (e.g. cents).
    pub unit_cost: Option<u64>,
    pub location: LocationId,
    /// Free-text correlation id (purchase order, invoice number).
    pub reference: Option<String>,
    pub performed_by: Option<String>,
    /// Business time; may be backdated relative to the append time.
    pub performed_at: DateTime<Utc>,
    /// Caller-supplied deduplication key. Re-submitting a draft with the same
    /// key after a `Persistence` failure returns the original event instead
    /// of double counting.
    pub idempotency_key: Option<String>,
}

impl MovementDraft {
    /// Build a draft for the canonical `"main"` location, performed now.
    pub fn new(product_id: ProductId, kind: MovementKind, quantity_delta: i64) -> Self {
        Self {
            product_id,
            kind,
            quantity_delta,
            unit_cost: None,
            location: LocationId::main(),
            reference: None,
            performed_by: None,
            performed_at: Utc::now(),
            idempotency_key: None,
        }
    }

    pub fn at_location(mut self, location: LocationId) -> Self {
        self.location = location;
        self
    }

    pub fn with_unit_cost(mut self, unit_cost: u64) -> Self {
        self.unit_cost = Some(unit_cost);
        self
    }

    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }

    pub fn performed_by(mut self, actor: impl Into<String>) -> Self {
        self.performed_by = Some(actor.into());
        self
    }

    pub fn performed_at(mut self, at: DateTime<Utc>) -> Self {
        self.performed_at = at;
        self
    }

    pub fn with_idempotency_key(mut self, key: impl Into<String>) -> Self {
        self.idempotency_key = Some(key.into());
        self
    }

    /// Reject drafts whose delta sign contradicts the kind's sign policy.
    pub fn check_sign(&self) -> LedgerResult<()> {
        match self.kind.sign_policy() {
            SignPolicy::Inbound if self.quantity_delta < 0 => Err(LedgerError::validation(format!(
                "{} requires a non-negative quantity delta, got {}",
                self.kind, self.quantity_delta
            ))),
            SignPolicy::Outbound if self.quantity_delta > 0 => Err(LedgerError::validation(format!(
                "{} requires a non-positive quantity delta, got {}",
                self.kind, self.quantity_delta
            ))),
            _ => Ok(()),
        }
    }
}

/// A stored ledger entry (assigned an id, a sequence number and append time).
///
/// Events are immutable facts: never mutated, never deleted. Corrections are
/// modeled as new compensating events (e.g. an `adjustment` with the inverse
/// delta).
///
/// `sequence` is the global insertion position assigned by the log, starting
/// at 1, with no gaps and no reuse. `created_at` is strictly the append time
/// and is monotonically non-decreasing in insertion order, while
/// `performed_at` carries the (possibly backdated) business time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockEvent {
    pub id: EventId,
    pub sequence: u64,
    pub product_id: ProductId,
    pub kind: MovementKind,
    pub quantity_delta: i64,
    pub unit_cost: Option<u64>,
    pub location: LocationId,
    pub reference: Option<String>,
    pub performed_by: Option<String>,
    pub performed_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl StockEvent {
    /// Total cost of the movement: `|quantity_delta| × unit_cost` (0 when no
    /// cost was recorded). Derived, never stored independently.
    pub fn total_cost(&self) -> u64 {
        self.quantity_delta
            .unsigned_abs()
            .saturating_mul(self.unit_cost.unwrap_or(0))
    }
}
