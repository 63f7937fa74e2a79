//! Purchase workflow (orders that bring stock in).
//!
//! Receipt is partial/total over time: each receive settles the line's
//! pending remainder and restocks the existence store through the coupled
//! ledger write.

pub mod engine;
pub mod order;

pub use engine::{NewPurchaseLine, PurchaseEngine};
pub use order::{PurchaseLine, PurchaseOrder, PurchaseOrderStatus};
