use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use storekeep_core::{
    ArticleId, DomainError, DomainResult, Entity, LocationId, ProviderId, PurchaseLineId,
    PurchaseOrderId,
};

/// Purchase order status lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PurchaseOrderStatus {
    Open,
    Done,
}

/// One line of a purchase order. Invariant: `0 <= received <= ordered`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseLine {
    id: PurchaseLineId,
    pub article_id: ArticleId,
    /// Destination existence row when the line is received.
    pub location: Option<LocationId>,
    ordered: i64,
    received: i64,
}

impl PurchaseLine {
    pub(crate) fn new(
        article_id: ArticleId,
        location: Option<LocationId>,
        ordered: i64,
        received: i64,
    ) -> DomainResult<Self> {
        if ordered <= 0 {
            return Err(DomainError::invalid_input("ordered quantity must be positive"));
        }
        if received < 0 || received > ordered {
            return Err(DomainError::invalid_input(
                "received quantity must lie within [0, ordered]",
            ));
        }
        Ok(Self {
            id: PurchaseLineId::new(),
            article_id,
            location,
            ordered,
            received,
        })
    }

    pub fn id_typed(&self) -> PurchaseLineId {
        self.id
    }

    pub fn ordered(&self) -> i64 {
        self.ordered
    }

    pub fn received(&self) -> i64 {
        self.received
    }

    /// Quantity still owed by the provider.
    pub fn pending(&self) -> i64 {
        self.ordered - self.received
    }

    /// Record a receipt. `qty` must be positive and must not exceed the
    /// pending remainder.
    pub fn receive(&mut self, qty: i64) -> DomainResult<()> {
        if qty <= 0 {
            return Err(DomainError::invalid_input("receive quantity must be positive"));
        }
        if qty > self.pending() {
            return Err(DomainError::over_delivery(format!(
                "receive of {qty} exceeds pending {} on line {}",
                self.pending(),
                self.id
            )));
        }
        self.received += qty;
        Ok(())
    }
}

/// An order that brings stock in from a provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseOrder {
    id: PurchaseOrderId,
    pub provider: ProviderId,
    pub reference: String,
    pub ordered_at: DateTime<Utc>,
    status: PurchaseOrderStatus,
    lines: Vec<PurchaseLine>,
}

impl PurchaseOrder {
    pub(crate) fn new(
        id: PurchaseOrderId,
        provider: ProviderId,
        reference: impl Into<String>,
        ordered_at: DateTime<Utc>,
        lines: Vec<PurchaseLine>,
    ) -> DomainResult<Self> {
        let reference = reference.into();
        if reference.trim().is_empty() {
            return Err(DomainError::invalid_input("order reference cannot be empty"));
        }
        if lines.is_empty() {
            return Err(DomainError::invalid_input("purchase order must have lines"));
        }
        let mut order = Self {
            id,
            provider,
            reference,
            ordered_at,
            status: PurchaseOrderStatus::Open,
            lines,
        };
        order.refresh_status();
        Ok(order)
    }

    pub fn id_typed(&self) -> PurchaseOrderId {
        self.id
    }

    pub fn status(&self) -> PurchaseOrderStatus {
        self.status
    }

    pub fn lines(&self) -> &[PurchaseLine] {
        &self.lines
    }

    pub fn line(&self, line_id: PurchaseLineId) -> DomainResult<&PurchaseLine> {
        self.lines
            .iter()
            .find(|l| l.id == line_id)
            .ok_or_else(|| DomainError::not_found(format!("purchase line {line_id}")))
    }

    pub(crate) fn line_mut(&mut self, line_id: PurchaseLineId) -> DomainResult<&mut PurchaseLine> {
        self.lines
            .iter_mut()
            .find(|l| l.id == line_id)
            .ok_or_else(|| DomainError::not_found(format!("purchase line {line_id}")))
    }

    /// Flip to `Done` once every line is fully received.
    pub(crate) fn refresh_status(&mut self) {
        if self.lines.iter().all(|l| l.pending() == 0) {
            self.status = PurchaseOrderStatus::Done;
        }
    }
}

impl Entity for PurchaseOrder {
    type Id = PurchaseOrderId;

    fn id(&self) -> &PurchaseOrderId {
        &self.id
    }
}
