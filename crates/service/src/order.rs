use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use storekeep_core::{
    ArticleId, ArticleLineId, DomainError, DomainResult, Entity, IdentifiedItemId,
    ItemAssignmentId, LeftoverId, LocationId, ServiceOrderId, VehicleId,
};

/// Where a service order delivers its work: a building/department or a vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "target_kind", content = "target_id", rename_all = "snake_case")]
pub enum ServiceTarget {
    Location(LocationId),
    Vehicle(VehicleId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceOrderStatus {
    Active,
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArticleLineStatus {
    Active,
    Done,
}

/// Bulk article line. Invariant: `0 <= delivered <= assigned`.
///
/// Assignment and reservation are the same event: the assigned quantity was
/// consumed from the existence store the moment the line was created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleLine {
    id: ArticleLineId,
    pub article_id: ArticleId,
    /// Existence row the assignment consumed from.
    pub source_location: Option<LocationId>,
    assigned: i64,
    delivered: i64,
    status: ArticleLineStatus,
}

impl ArticleLine {
    pub(crate) fn new(
        article_id: ArticleId,
        source_location: Option<LocationId>,
        assigned: i64,
        delivered: i64,
    ) -> DomainResult<Self> {
        if assigned <= 0 {
            return Err(DomainError::invalid_input("assigned quantity must be positive"));
        }
        if delivered < 0 {
            return Err(DomainError::invalid_input("delivered quantity cannot be negative"));
        }
        if delivered > assigned {
            return Err(DomainError::over_delivery(format!(
                "delivered {delivered} exceeds assigned {assigned}"
            )));
        }
        Ok(Self {
            id: ArticleLineId::new(),
            article_id,
            source_location,
            assigned,
            delivered,
            status: ArticleLineStatus::Active,
        })
    }

    pub fn id_typed(&self) -> ArticleLineId {
        self.id
    }

    pub fn assigned(&self) -> i64 {
        self.assigned
    }

    pub fn delivered(&self) -> i64 {
        self.delivered
    }

    pub fn status(&self) -> ArticleLineStatus {
        self.status
    }

    /// Quantity assigned but never delivered; becomes a leftover at closure.
    pub fn unused(&self) -> i64 {
        self.assigned - self.delivered
    }

    /// Move `delivered` by a signed delta, staying within `[0, assigned]`.
    pub fn adjust_delivered(&mut self, delta: i64) -> DomainResult<()> {
        if delta == 0 {
            return Err(DomainError::invalid_input("delivery delta cannot be zero"));
        }
        let delivered = self.delivered + delta;
        if delivered > self.assigned {
            return Err(DomainError::over_delivery(format!(
                "delivered would reach {delivered}, assigned is {}",
                self.assigned
            )));
        }
        if delivered < 0 {
            return Err(DomainError::invalid_input(
                "delivered quantity cannot go below zero",
            ));
        }
        self.delivered = delivered;
        Ok(())
    }

    pub(crate) fn mark_done(&mut self) {
        self.status = ArticleLineStatus::Done;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssignmentState {
    Assigned,
    Delivered,
}

/// Reference to one identified item attached to the order.
///
/// Identified items are tracked by unit, not counted in existence rows, so
/// an assignment moves no quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemAssignment {
    id: ItemAssignmentId,
    pub item_id: IdentifiedItemId,
    state: AssignmentState,
    pub assigned_at: DateTime<Utc>,
}

impl ItemAssignment {
    pub(crate) fn new(item_id: IdentifiedItemId, assigned_at: DateTime<Utc>) -> Self {
        Self {
            id: ItemAssignmentId::new(),
            item_id,
            state: AssignmentState::Assigned,
            assigned_at,
        }
    }

    pub fn id_typed(&self) -> ItemAssignmentId {
        self.id
    }

    pub fn state(&self) -> AssignmentState {
        self.state
    }

    pub fn mark_delivered(&mut self) -> DomainResult<()> {
        if self.state != AssignmentState::Assigned {
            return Err(DomainError::invalid_transition(format!(
                "assignment {} is already delivered",
                self.id
            )));
        }
        self.state = AssignmentState::Delivered;
        Ok(())
    }
}

/// In-order record of a leftover consumed by this order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeftoverUse {
    pub leftover_id: LeftoverId,
    pub quantity: i64,
    pub used_at: DateTime<Utc>,
}

/// A unit of work that consumes articles, identified items and leftovers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceOrder {
    id: ServiceOrderId,
    pub target: ServiceTarget,
    pub description: String,
    pub opened_at: DateTime<Utc>,
    status: ServiceOrderStatus,
    article_lines: Vec<ArticleLine>,
    item_assignments: Vec<ItemAssignment>,
    leftover_uses: Vec<LeftoverUse>,
}

impl ServiceOrder {
    pub(crate) fn new(
        id: ServiceOrderId,
        target: ServiceTarget,
        description: impl Into<String>,
        opened_at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let description = description.into();
        if description.trim().is_empty() {
            return Err(DomainError::invalid_input("order description cannot be empty"));
        }
        Ok(Self {
            id,
            target,
            description,
            opened_at,
            status: ServiceOrderStatus::Active,
            article_lines: Vec::new(),
            item_assignments: Vec::new(),
            leftover_uses: Vec::new(),
        })
    }

    pub fn id_typed(&self) -> ServiceOrderId {
        self.id
    }

    pub fn status(&self) -> ServiceOrderStatus {
        self.status
    }

    pub fn article_lines(&self) -> &[ArticleLine] {
        &self.article_lines
    }

    pub fn item_assignments(&self) -> &[ItemAssignment] {
        &self.item_assignments
    }

    pub fn leftover_uses(&self) -> &[LeftoverUse] {
        &self.leftover_uses
    }

    pub(crate) fn ensure_active(&self) -> DomainResult<()> {
        if self.status != ServiceOrderStatus::Active {
            return Err(DomainError::invalid_transition(format!(
                "service order {} is closed",
                self.id
            )));
        }
        Ok(())
    }

    pub fn line(&self, line_id: ArticleLineId) -> DomainResult<&ArticleLine> {
        self.article_lines
            .iter()
            .find(|l| l.id == line_id)
            .ok_or_else(|| DomainError::not_found(format!("article line {line_id}")))
    }

    pub(crate) fn line_mut(&mut self, line_id: ArticleLineId) -> DomainResult<&mut ArticleLine> {
        self.article_lines
            .iter_mut()
            .find(|l| l.id == line_id)
            .ok_or_else(|| DomainError::not_found(format!("article line {line_id}")))
    }

    pub fn assignment(&self, assignment_id: ItemAssignmentId) -> DomainResult<&ItemAssignment> {
        self.item_assignments
            .iter()
            .find(|a| a.id == assignment_id)
            .ok_or_else(|| DomainError::not_found(format!("item assignment {assignment_id}")))
    }

    pub(crate) fn assignment_mut(
        &mut self,
        assignment_id: ItemAssignmentId,
    ) -> DomainResult<&mut ItemAssignment> {
        self.item_assignments
            .iter_mut()
            .find(|a| a.id == assignment_id)
            .ok_or_else(|| DomainError::not_found(format!("item assignment {assignment_id}")))
    }

    pub(crate) fn push_line(&mut self, line: ArticleLine) {
        self.article_lines.push(line);
    }

    pub(crate) fn push_assignment(&mut self, assignment: ItemAssignment) {
        self.item_assignments.push(assignment);
    }

    pub(crate) fn push_leftover_use(&mut self, usage: LeftoverUse) {
        self.leftover_uses.push(usage);
    }

    /// Does the order reference this item in any assignment?
    pub fn references_item(&self, item_id: IdentifiedItemId) -> bool {
        self.item_assignments.iter().any(|a| a.item_id == item_id)
    }

    /// Closing precondition: every identified assignment must have been
    /// delivered before the order can be closed.
    pub(crate) fn ensure_closable(&self) -> DomainResult<()> {
        self.ensure_active()?;
        if let Some(pending) = self
            .item_assignments
            .iter()
            .find(|a| a.state == AssignmentState::Assigned)
        {
            return Err(DomainError::invalid_transition(format!(
                "identified item {} is assigned but not delivered",
                pending.item_id
            )));
        }
        Ok(())
    }

    /// Mark the order and every article line done. Guards must have been
    /// checked via `ensure_closable` first.
    pub(crate) fn mark_closed(&mut self) {
        for line in &mut self.article_lines {
            line.mark_done();
        }
        self.status = ServiceOrderStatus::Done;
    }

    /// `Done -> Active`. Leftovers already generated by the closure remain;
    /// line statuses are not rewound.
    pub(crate) fn reopen(&mut self) -> DomainResult<()> {
        if self.status != ServiceOrderStatus::Done {
            return Err(DomainError::invalid_transition(format!(
                "service order {} is not closed",
                self.id
            )));
        }
        self.status = ServiceOrderStatus::Active;
        Ok(())
    }
}

impl Entity for ServiceOrder {
    type Id = ServiceOrderId;

    fn id(&self) -> &ServiceOrderId {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_order() -> ServiceOrder {
        ServiceOrder::new(
            ServiceOrderId::new(),
            ServiceTarget::Location(LocationId::new()),
            "replace hallway lighting",
            Utc::now(),
        )
        .unwrap()
    }

    #[test]
    fn line_bounds_are_enforced() {
        assert!(ArticleLine::new(ArticleId::new(), None, 0, 0).is_err());
        let err = ArticleLine::new(ArticleId::new(), None, 4, 5).unwrap_err();
        assert!(matches!(err, DomainError::OverDelivery(_)));
    }

    #[test]
    fn adjust_delivered_stays_within_the_assigned_window() {
        let mut line = ArticleLine::new(ArticleId::new(), None, 4, 1).unwrap();
        line.adjust_delivered(3).unwrap();
        assert_eq!(line.delivered(), 4);
        assert_eq!(line.unused(), 0);

        let err = line.adjust_delivered(1).unwrap_err();
        assert!(matches!(err, DomainError::OverDelivery(_)));

        let err = line.adjust_delivered(-5).unwrap_err();
        assert!(matches!(err, DomainError::InvalidInput(_)));
        assert_eq!(line.delivered(), 4);
    }

    #[test]
    fn closing_is_blocked_while_an_assignment_is_undelivered() {
        let mut order = test_order();
        order.push_assignment(ItemAssignment::new(IdentifiedItemId::new(), Utc::now()));

        let err = order.ensure_closable().unwrap_err();
        assert!(matches!(err, DomainError::InvalidTransition(_)));

        let assignment_id = order.item_assignments()[0].id_typed();
        order.assignment_mut(assignment_id).unwrap().mark_delivered().unwrap();
        order.ensure_closable().unwrap();
    }

    #[test]
    fn reopen_requires_a_closed_order() {
        let mut order = test_order();
        let err = order.reopen().unwrap_err();
        assert!(matches!(err, DomainError::InvalidTransition(_)));

        order.mark_closed();
        assert_eq!(order.status(), ServiceOrderStatus::Done);
        order.reopen().unwrap();
        assert_eq!(order.status(), ServiceOrderStatus::Active);
    }
}
