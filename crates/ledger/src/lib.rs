//! Stock ledger domain module.
//!
//! This crate contains the business rules of the inventory ledger, implemented
//! purely as deterministic domain logic (no IO, no locking, no storage):
//! movement kinds and their sign policy, the uncommitted/stored event split,
//! and the stock position fold with its reservation rules.

pub mod movement;
pub mod position;

pub use movement::{MovementDraft, MovementKind, SignPolicy, StockEvent};
pub use position::StockPosition;
