use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use storekeep_core::{
    ArticleId, DomainError, DomainResult, Entity, EntryId, IdentifiedItemId, LoanId,
    PurchaseOrderId, ServiceOrderId,
};

/// Movement classification on the audit surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MovementKind {
    In,
    Out,
    Adjust,
}

/// Which way a movement pushed the quantity.
///
/// `In` is always `Inbound` and `Out` always `Outbound`; the field earns its
/// keep on `Adjust`, whose contract-mandated positive `quantity` would
/// otherwise lose the correction's sign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MovementDirection {
    Inbound,
    Outbound,
}

/// The workflow a movement originates from, with the originating entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "source_kind", content = "source_id", rename_all = "snake_case")]
pub enum MovementSource {
    PurchaseOrder(PurchaseOrderId),
    ServiceOrder(ServiceOrderId),
    Loan(LoanId),
    IdentifiedItem(IdentifiedItemId),
}

/// Source classification alone, for filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    PurchaseOrder,
    ServiceOrder,
    Loan,
    IdentifiedItem,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::PurchaseOrder => "purchase_order",
            SourceKind::ServiceOrder => "service_order",
            SourceKind::Loan => "loan",
            SourceKind::IdentifiedItem => "identified_item",
        }
    }
}

impl MovementSource {
    pub fn kind(&self) -> SourceKind {
        match self {
            MovementSource::PurchaseOrder(_) => SourceKind::PurchaseOrder,
            MovementSource::ServiceOrder(_) => SourceKind::ServiceOrder,
            MovementSource::Loan(_) => SourceKind::Loan,
            MovementSource::IdentifiedItem(_) => SourceKind::IdentifiedItem,
        }
    }
}

/// One immutable record on the movement ledger.
///
/// Entries are append-only: corrections are represented as new compensating
/// entries, never edits. Article name and code are denormalized at append
/// time so the audit surface can match text without a catalog join.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovementEntry {
    id: EntryId,
    pub article_id: ArticleId,
    pub article_name: String,
    pub article_code: String,
    pub kind: MovementKind,
    pub direction: MovementDirection,
    /// Strictly positive; the sign lives in `direction`.
    pub quantity: i64,
    pub occurred_at: DateTime<Utc>,
    pub source: MovementSource,
    pub note: Option<String>,
}

impl MovementEntry {
    pub fn new(
        article_id: ArticleId,
        article_name: impl Into<String>,
        article_code: impl Into<String>,
        kind: MovementKind,
        direction: MovementDirection,
        quantity: i64,
        occurred_at: DateTime<Utc>,
        source: MovementSource,
        note: Option<String>,
    ) -> DomainResult<Self> {
        if quantity <= 0 {
            return Err(DomainError::invalid_input(
                "movement quantity must be positive",
            ));
        }
        match (kind, direction) {
            (MovementKind::In, MovementDirection::Outbound)
            | (MovementKind::Out, MovementDirection::Inbound) => {
                return Err(DomainError::invalid_input(
                    "movement kind contradicts its direction",
                ));
            }
            _ => {}
        }
        Ok(Self {
            id: EntryId::new(),
            article_id,
            article_name: article_name.into(),
            article_code: article_code.into(),
            kind,
            direction,
            quantity,
            occurred_at,
            source,
            note,
        })
    }

    pub fn id_typed(&self) -> EntryId {
        self.id
    }

    /// Conservation term: `In` counts positive, `Out` negative, `Adjust`
    /// signed by its direction.
    pub fn signed_quantity(&self) -> i64 {
        match self.direction {
            MovementDirection::Inbound => self.quantity,
            MovementDirection::Outbound => -self.quantity,
        }
    }
}

impl Entity for MovementEntry {
    type Id = EntryId;

    fn id(&self) -> &EntryId {
        &self.id
    }
}
