use std::sync::RwLock;

use chrono::{DateTime, Utc};

use stockledger_core::{EventId, LedgerError, LedgerResult, LocationId, ProductId};
use stockledger_ledger::{MovementDraft, MovementKind, StockEvent};

/// Filter for reading the movement log. Empty filter matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MovementFilter {
    pub product_id: Option<ProductId>,
    pub location: Option<LocationId>,
    pub kind: Option<MovementKind>,
    /// Inclusive lower bound on `performed_at`.
    pub performed_after: Option<DateTime<Utc>>,
    /// Inclusive upper bound on `performed_at`.
    pub performed_before: Option<DateTime<Utc>>,
}

impl MovementFilter {
    fn matches(&self, event: &StockEvent) -> bool {
        if self.product_id.is_some_and(|p| p != event.product_id) {
            return false;
        }
        if self.location.as_ref().is_some_and(|l| *l != event.location) {
            return false;
        }
        if self.kind.is_some_and(|k| k != event.kind) {
            return false;
        }
        if self.performed_after.is_some_and(|t| event.performed_at < t) {
            return false;
        }
        if self.performed_before.is_some_and(|t| event.performed_at > t) {
            return false;
        }
        true
    }
}

/// Append-only, ordered log of stock movements (the event store).
///
/// Ordering is by append time, ties broken by insertion sequence; events
/// never reorder once appended and are never mutated or deleted. Sequence
/// numbers start at 1 with no gaps.
#[derive(Debug, Default)]
pub struct MovementLog {
    events: RwLock<Vec<StockEvent>>,
}

impl MovementLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a draft and run the projection step while still holding the
    /// log's write lock.
    ///
    /// Holding the lock across both steps is what makes append + project one
    /// atomic unit: no reader of the log can observe the new event before
    /// `project` has folded it into the matching position.
    pub(crate) fn append_and<R>(
        &self,
        draft: MovementDraft,
        project: impl FnOnce(&StockEvent) -> R,
    ) -> LedgerResult<(StockEvent, R)> {
        let mut events = self
            .events
            .write()
            .map_err(|_| LedgerError::persistence("movement log lock poisoned"))?;

        // Append time is monotonically non-decreasing in insertion order even
        // if the wall clock steps backwards.
        let now = Utc::now();
        let created_at = match events.last() {
            Some(last) if last.created_at > now => last.created_at,
            _ => now,
        };

        let event = StockEvent {
            id: EventId::new(),
            sequence: events.len() as u64 + 1,
            product_id: draft.product_id,
            kind: draft.kind,
            quantity_delta: draft.quantity_delta,
            unit_cost: draft.unit_cost,
            location: draft.location,
            reference: draft.reference,
            performed_by: draft.performed_by,
            performed_at: draft.performed_at,
            created_at,
        };

        events.push(event.clone());
        let projected = project(&event);
        Ok((event, projected))
    }

    /// All movements for one product, in insertion order.
    pub fn list_by_product(&self, product_id: ProductId) -> LedgerResult<Vec<StockEvent>> {
        self.list(&MovementFilter {
            product_id: Some(product_id),
            ..MovementFilter::default()
        })
    }

    /// All movements matching the filter, in insertion order.
    pub fn list(&self, filter: &MovementFilter) -> LedgerResult<Vec<StockEvent>> {
        let events = self
            .events
            .read()
            .map_err(|_| LedgerError::persistence("movement log lock poisoned"))?;
        Ok(events.iter().filter(|e| filter.matches(e)).cloned().collect())
    }

    /// Look a stored event up by id (idempotent replay support).
    pub fn find(&self, id: EventId) -> LedgerResult<Option<StockEvent>> {
        let events = self
            .events
            .read()
            .map_err(|_| LedgerError::persistence("movement log lock poisoned"))?;
        Ok(events.iter().find(|e| e.id == id).cloned())
    }

    /// Number of stored events.
    pub fn len(&self) -> usize {
        self.events.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
