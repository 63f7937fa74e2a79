//! Existence store + movement ledger.
//!
//! Authoritative quantity per (article, location) and the append-only audit
//! trail derived from every quantity-affecting change. The two are written
//! together through [`StockStore::commit`]; no other quantity mutation path
//! exists, so an Existence change without its ledger entry is
//! unrepresentable by construction.

pub mod entry;
pub mod existence;
pub mod ledger;
pub mod query;
pub mod store;

pub use entry::{MovementDirection, MovementEntry, MovementKind, MovementSource, SourceKind};
pub use existence::Existence;
pub use ledger::StockLedger;
pub use query::{MovementFilter, MovementPage, MovementSort, PageRequest, SortColumn, SortDirection};
pub use store::{InMemoryStockStore, StockStore};
