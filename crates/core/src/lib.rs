//! `stockledger-core` — domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns):
//! strongly-typed identifiers and the shared error model used by the ledger,
//! catalog and engine crates.

pub mod error;
pub mod id;
pub mod location;

pub use error::{LedgerError, LedgerResult};
pub use id::{CategoryId, EventId, ProductId, SupplierId};
pub use location::LocationId;
