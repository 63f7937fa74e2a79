//! `storekeep-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns)
//! shared by every workflow crate: strongly-typed identifiers, the domain
//! error model, and the entity/repository seams.

pub mod entity;
pub mod error;
pub mod id;
pub mod repo;

pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::{
    ArticleId, ArticleLineId, BrandId, CategoryId, EntryId, IdentifiedItemId, ItemAssignmentId,
    LeftoverId, LeftoverUsageId, LoanId, LoanLineId, LocationId, ProviderId, PurchaseLineId,
    PurchaseOrderId, ServiceOrderId, TenderId, UnitId, VehicleId,
};
pub use repo::{InMemoryRepository, Repository};
