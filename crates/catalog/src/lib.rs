//! Catalog domain module (articles and identified items).
//!
//! This crate contains business rules for the goods catalog, implemented
//! purely as deterministic domain logic (no IO, no HTTP, no storage).

pub mod article;
pub mod identified;

pub use article::{Article, ArticleKind, AttachmentRef};
pub use identified::{IdentifiedItem, ItemState};
