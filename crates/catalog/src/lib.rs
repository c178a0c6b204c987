//! Product catalog collaborator.
//!
//! The ledger never owns catalog data: products, categories and suppliers are
//! plain reference data looked up read-only through the [`CatalogReader`]
//! seam. This crate provides the record types, the trait, and an in-memory
//! implementation for tests and embedding.

pub mod category;
pub mod product;
pub mod store;
pub mod supplier;

pub use category::{Category, category_path};
pub use product::ProductRecord;
pub use store::{CatalogReader, InMemoryCatalog};
pub use supplier::Supplier;
