//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic business failures (validation, stock
/// shortages, state-machine guards). Each of these is recovered at the
/// operation boundary; the rejecting operation must leave all state exactly
/// as it was before the call. `Storage` is the exception: it signals a fault
/// in the storage layer itself and is propagated unchanged, never swallowed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A required field was missing or malformed.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Requested quantity exceeds what is available.
    #[error("insufficient stock: {0}")]
    InsufficientStock(String),

    /// A delivered/returned/received amount would exceed its ceiling.
    #[error("over-delivery: {0}")]
    OverDelivery(String),

    /// A state-machine guard was violated.
    #[error("invalid transition: {0}")]
    InvalidTransition(String),

    /// A referenced entity does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// A receive/return was requested with zero remaining.
    #[error("nothing pending: {0}")]
    NothingPending(String),

    /// Storage-layer failure. Fatal for the operation; indicates a defect,
    /// not a business condition.
    #[error("storage failure: {0}")]
    Storage(String),
}

impl DomainError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn insufficient_stock(msg: impl Into<String>) -> Self {
        Self::InsufficientStock(msg.into())
    }

    pub fn over_delivery(msg: impl Into<String>) -> Self {
        Self::OverDelivery(msg.into())
    }

    pub fn invalid_transition(msg: impl Into<String>) -> Self {
        Self::InvalidTransition(msg.into())
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn nothing_pending(msg: impl Into<String>) -> Self {
        Self::NothingPending(msg.into())
    }

    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }
}
