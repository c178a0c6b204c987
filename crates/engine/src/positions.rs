use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use stockledger_core::{LedgerError, LedgerResult, LocationId, ProductId};
use stockledger_ledger::StockPosition;

/// Key of one stock position: the lock/transaction granularity of the engine.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PositionKey {
    pub product_id: ProductId,
    pub location: LocationId,
}

type PositionCell = Arc<Mutex<StockPosition>>;

/// Keyed store of stock positions with per-key serialization.
///
/// Each `(product, location)` pair gets its own mutex, so concurrent updates
/// to the same pair never race on the read-modify-write while updates to
/// different pairs proceed fully in parallel. The outer map lock is held only
/// long enough to fetch or insert a cell, never across a fold.
#[derive(Debug, Default)]
pub(crate) struct PositionMap {
    inner: RwLock<HashMap<PositionKey, PositionCell>>,
}

impl PositionMap {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Fetch the cell for a key, creating a zeroed position on first use.
    pub(crate) fn cell(&self, key: &PositionKey) -> LedgerResult<PositionCell> {
        {
            let map = self
                .inner
                .read()
                .map_err(|_| LedgerError::persistence("position map lock poisoned"))?;
            if let Some(cell) = map.get(key) {
                return Ok(Arc::clone(cell));
            }
        }

        let mut map = self
            .inner
            .write()
            .map_err(|_| LedgerError::persistence("position map lock poisoned"))?;
        let cell = map.entry(key.clone()).or_insert_with(|| {
            Arc::new(Mutex::new(StockPosition::zero(
                key.product_id,
                key.location.clone(),
            )))
        });
        Ok(Arc::clone(cell))
    }

    /// Fetch the cell for a key only if the pair has been touched before.
    pub(crate) fn existing_cell(&self, key: &PositionKey) -> LedgerResult<Option<PositionCell>> {
        let map = self
            .inner
            .read()
            .map_err(|_| LedgerError::persistence("position map lock poisoned"))?;
        Ok(map.get(key).map(Arc::clone))
    }

    /// Committed snapshot of one position, if the pair has been touched.
    pub(crate) fn get(&self, key: &PositionKey) -> LedgerResult<Option<StockPosition>> {
        let Some(cell) = self.existing_cell(key)? else {
            return Ok(None);
        };
        let position = cell
            .lock()
            .map_err(|_| LedgerError::persistence("position lock poisoned"))?;
        Ok(Some(position.clone()))
    }

    /// Committed snapshots of every position.
    ///
    /// Cells are collected under a short map read lock and cloned one by one,
    /// so the snapshot is read-committed per position rather than a global
    /// point-in-time view.
    pub(crate) fn snapshot(&self) -> LedgerResult<Vec<StockPosition>> {
        let cells: Vec<PositionCell> = {
            let map = self
                .inner
                .read()
                .map_err(|_| LedgerError::persistence("position map lock poisoned"))?;
            map.values().map(Arc::clone).collect()
        };

        let mut positions = Vec::with_capacity(cells.len());
        for cell in cells {
            let position = cell
                .lock()
                .map_err(|_| LedgerError::persistence("position lock poisoned"))?;
            positions.push(position.clone());
        }
        Ok(positions)
    }
}
