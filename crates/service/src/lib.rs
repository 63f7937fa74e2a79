//! Service-order workflow + leftover subsystem.
//!
//! Service orders consume stock (bulk lines, identified units, leftovers).
//! Closing an order turns each line's unused quantity into a tracked
//! leftover, available for reuse by a later order; the leftover subsystem
//! keeps the provenance chain independent of the existence store.

pub mod engine;
pub mod leftover;
pub mod order;

pub use engine::{ItemHistory, ItemHistoryEntry, LeftoverAllocation, ServiceEngine};
pub use leftover::{Leftover, LeftoverBook, LeftoverUsage};
pub use order::{
    ArticleLine, ArticleLineStatus, AssignmentState, ItemAssignment, LeftoverUse, ServiceOrder,
    ServiceOrderStatus, ServiceTarget,
};
