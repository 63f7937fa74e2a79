//! Storekeep: inventory ledger and order lifecycle engine.
//!
//! The existence store holds per-article, per-location quantities; every
//! change to a quantity is committed together with its movement ledger
//! entry. Purchasing brings stock in, service orders take it out, loans
//! reserve it without moving it, and identified items track single units
//! through review, retirement and reinstatement.
//!
//! [`Storekeep`] wires every engine over shared in-memory stores; the
//! component crates accept any store implementing their traits.

pub mod items;
pub mod observability;
pub mod services;

pub use items::ItemDesk;
pub use services::Storekeep;

pub use storekeep_catalog as catalog;
pub use storekeep_core as core;
pub use storekeep_ledger as ledger;
pub use storekeep_loans as loans;
pub use storekeep_purchasing as purchasing;
pub use storekeep_service as service;
