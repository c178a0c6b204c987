//! Inventory ledger & aggregation engine.
//!
//! Wires the pure domain rules from `stockledger-ledger` into a concurrent
//! engine: an append-only movement log (event store), a keyed position map
//! with per-(product, location) locking (the aggregate projection), and the
//! read-side reports. The [`InventoryLedger`] facade is the interface
//! collaborating subsystems talk to.
//!
//! Durability is an embedding concern: the log and position map here are
//! in-memory, and a durable backend slots in behind the same append/fold
//! discipline.

pub mod ledger;
pub mod policy;
pub mod positions;
pub mod reports;
pub mod store;

#[cfg(test)]
mod integration_tests;

pub use ledger::InventoryLedger;
pub use policy::LedgerPolicy;
pub use positions::PositionKey;
pub use reports::{LowStockRow, SummaryRow};
pub use store::{MovementFilter, MovementLog};
