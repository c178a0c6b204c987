use std::collections::HashMap;
use std::sync::RwLock;

use tracing::{info, warn};

use stockledger_catalog::CatalogReader;
use stockledger_core::{EventId, LedgerError, LedgerResult, LocationId, ProductId};
use stockledger_ledger::{MovementDraft, StockEvent, StockPosition};

use crate::policy::LedgerPolicy;
use crate::positions::{PositionKey, PositionMap};
use crate::reports::{self, LowStockRow, SummaryRow};
use crate::store::{MovementFilter, MovementLog};

/// The inventory ledger facade: the single write path into the event log,
/// the reservation API, and the read-side views.
///
/// Writers append movements; the matching stock position is folded in the
/// same atomic step, so availability is always consistent with the log.
/// Reports read only the projection, never replaying the log per query.
pub struct InventoryLedger<C> {
    log: MovementLog,
    positions: PositionMap,
    catalog: C,
    policy: LedgerPolicy,
    /// Caller-supplied idempotency keys already applied, mapped to the event
    /// they produced.
    applied_keys: RwLock<HashMap<String, EventId>>,
}

impl<C> InventoryLedger<C>
where
    C: CatalogReader,
{
    pub fn new(catalog: C) -> Self {
        Self::with_policy(catalog, LedgerPolicy::default())
    }

    pub fn with_policy(catalog: C, policy: LedgerPolicy) -> Self {
        Self {
            log: MovementLog::new(),
            positions: PositionMap::new(),
            catalog,
            policy,
            applied_keys: RwLock::new(HashMap::new()),
        }
    }

    pub fn policy(&self) -> LedgerPolicy {
        self.policy
    }

    /// Record one stock movement: the only write path into the event log.
    ///
    /// Validates the draft, appends it and folds it into the matching
    /// position as one atomic unit under that position's key lock. Returns
    /// the stored event. When the draft carries an idempotency key that was
    /// already applied, the original event is returned and nothing is
    /// appended again.
    pub fn record_movement(&self, draft: MovementDraft) -> LedgerResult<StockEvent> {
        if self.policy.enforce_kind_sign {
            draft.check_sign()?;
        }
        if self.policy.require_known_product && self.catalog.product(draft.product_id).is_none() {
            return Err(LedgerError::not_found(format!(
                "product {} is not in the catalog",
                draft.product_id
            )));
        }

        let key = PositionKey {
            product_id: draft.product_id,
            location: draft.location.clone(),
        };
        let cell = self.positions.cell(&key)?;
        let mut position = cell
            .lock()
            .map_err(|_| LedgerError::persistence("position lock poisoned"))?;

        // Dedupe check happens under the key lock: retries of the same
        // movement target the same pair, so they are serialized here.
        if let Some(idem_key) = &draft.idempotency_key {
            if let Some(event_id) = self.applied_key(idem_key)? {
                return self.log.find(event_id)?.ok_or_else(|| {
                    LedgerError::persistence("deduplicated event missing from log")
                });
            }
        }

        if !self.policy.allow_negative_on_hand {
            let resulting = position.quantity_on_hand + draft.quantity_delta;
            if resulting < 0 {
                warn!(
                    product_id = %key.product_id,
                    location = %key.location,
                    quantity_delta = draft.quantity_delta,
                    on_hand = position.quantity_on_hand,
                    "movement refused: would drive on-hand negative"
                );
                return Err(LedgerError::InsufficientStock {
                    requested: -draft.quantity_delta,
                    available: position.quantity_on_hand,
                });
            }
        }

        let idem_key = draft.idempotency_key.clone();
        let (event, ()) = self.log.append_and(draft, |event| position.apply(event))?;

        if let Some(idem_key) = idem_key {
            let mut applied = self
                .applied_keys
                .write()
                .map_err(|_| LedgerError::persistence("idempotency map lock poisoned"))?;
            applied.insert(idem_key, event.id);
        }

        info!(
            event_id = %event.id,
            sequence = event.sequence,
            product_id = %event.product_id,
            location = %event.location,
            kind = %event.kind,
            quantity_delta = event.quantity_delta,
            on_hand = position.quantity_on_hand,
            "stock movement applied"
        );
        Ok(event)
    }

    /// Commit available stock to an outbound obligation.
    ///
    /// Fails fast with `InsufficientStock` when `qty` exceeds what is
    /// available right now; this is a capacity check, not a queue.
    pub fn reserve_stock(
        &self,
        product_id: ProductId,
        location: Option<LocationId>,
        qty: i64,
    ) -> LedgerResult<StockPosition> {
        let key = PositionKey {
            product_id,
            location: location.unwrap_or_default(),
        };

        let Some(cell) = self.positions.existing_cell(&key)? else {
            warn!(
                product_id = %key.product_id,
                location = %key.location,
                requested = qty,
                "reservation refused: no stock position"
            );
            return Err(LedgerError::InsufficientStock {
                requested: qty,
                available: 0,
            });
        };

        let mut position = cell
            .lock()
            .map_err(|_| LedgerError::persistence("position lock poisoned"))?;
        match position.reserve(qty) {
            Ok(()) => {
                info!(
                    product_id = %key.product_id,
                    location = %key.location,
                    reserved = position.quantity_reserved,
                    available = position.available(),
                    "stock reserved"
                );
                Ok(position.clone())
            }
            Err(err) => {
                warn!(
                    product_id = %key.product_id,
                    location = %key.location,
                    requested = qty,
                    available = position.available(),
                    "reservation refused"
                );
                Err(err)
            }
        }
    }

    /// Give back previously reserved stock.
    ///
    /// Releasing more than is outstanding is a caller bug and fails with
    /// `InvalidState`.
    pub fn release_reservation(
        &self,
        product_id: ProductId,
        location: Option<LocationId>,
        qty: i64,
    ) -> LedgerResult<StockPosition> {
        let key = PositionKey {
            product_id,
            location: location.unwrap_or_default(),
        };

        let Some(cell) = self.positions.existing_cell(&key)? else {
            return Err(LedgerError::invalid_state(format!(
                "no reservation outstanding for product {} at {}",
                key.product_id, key.location
            )));
        };

        let mut position = cell
            .lock()
            .map_err(|_| LedgerError::persistence("position lock poisoned"))?;
        match position.release(qty) {
            Ok(()) => {
                info!(
                    product_id = %key.product_id,
                    location = %key.location,
                    reserved = position.quantity_reserved,
                    "reservation released"
                );
                Ok(position.clone())
            }
            Err(err) => {
                warn!(
                    product_id = %key.product_id,
                    location = %key.location,
                    requested = qty,
                    reserved = position.quantity_reserved,
                    "release refused"
                );
                Err(err)
            }
        }
    }

    /// Current position for a pair; zero-valued if no event ever touched it.
    /// Does not create the position row.
    pub fn get_position(
        &self,
        product_id: ProductId,
        location: Option<LocationId>,
    ) -> LedgerResult<StockPosition> {
        let key = PositionKey {
            product_id,
            location: location.unwrap_or_default(),
        };
        Ok(self
            .positions
            .get(&key)?
            .unwrap_or_else(|| StockPosition::zero(key.product_id, key.location)))
    }

    /// Full movement history for one product, in insertion order.
    pub fn movements_for_product(&self, product_id: ProductId) -> LedgerResult<Vec<StockEvent>> {
        self.log.list_by_product(product_id)
    }

    /// Movement history matching a filter, in insertion order.
    pub fn movements(&self, filter: &MovementFilter) -> LedgerResult<Vec<StockEvent>> {
        self.log.list(filter)
    }

    /// Active products at or below their reorder point, lowest availability
    /// first. A never-stocked active product appears with availability 0.
    pub fn low_stock(&self) -> LedgerResult<Vec<LowStockRow>> {
        let positions = self.positions.snapshot()?;
        Ok(reports::low_stock(&self.catalog, &positions))
    }

    /// One row per active product and stocked location, joined with catalog
    /// master data and valued at the selling price. Sorted by product name.
    pub fn inventory_summary(&self) -> LedgerResult<Vec<SummaryRow>> {
        let positions = self.positions.snapshot()?;
        Ok(reports::inventory_summary(&self.catalog, &positions))
    }

    fn applied_key(&self, idem_key: &str) -> LedgerResult<Option<EventId>> {
        let applied = self
            .applied_keys
            .read()
            .map_err(|_| LedgerError::persistence("idempotency map lock poisoned"))?;
        Ok(applied.get(idem_key).copied())
    }
}
