use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use storekeep_catalog::{Article, IdentifiedItem, ItemState};
use storekeep_core::{
    ArticleId, ArticleLineId, DomainError, DomainResult, IdentifiedItemId, ItemAssignmentId,
    LeftoverId, LocationId, Repository, ServiceOrderId,
};
use storekeep_ledger::{MovementSource, StockLedger, StockStore};

use crate::leftover::{Leftover, LeftoverBook, LeftoverUsage};
use crate::order::{
    AssignmentState, ItemAssignment, LeftoverUse, ServiceOrder, ServiceOrderStatus, ServiceTarget,
};

/// Caller-chosen destination for one line's unused quantity at closure.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LeftoverAllocation {
    pub line_id: ArticleLineId,
    pub qty: i64,
    /// `None` leaves the leftover unattributed ("unassigned").
    pub location: Option<LocationId>,
}

/// One stop in an identified item's service history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemHistoryEntry {
    pub order_id: ServiceOrderId,
    pub target: ServiceTarget,
    pub assigned_at: DateTime<Utc>,
    pub state: AssignmentState,
}

/// Provenance view of one identified item: where it currently sits and every
/// service order it has been attached to, oldest first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemHistory {
    pub item: IdentifiedItem,
    /// Target of the latest order that took delivery of the unit.
    pub current_target: Option<ServiceTarget>,
    pub orders: Vec<ItemHistoryEntry>,
}

/// Service-order workflow engine.
pub struct ServiceEngine<S, A, O, L, U, I>
where
    S: StockStore,
    A: Repository<Article>,
    O: Repository<ServiceOrder>,
    L: Repository<Leftover>,
    U: Repository<LeftoverUsage>,
    I: Repository<IdentifiedItem>,
{
    stock: Arc<StockLedger<S, A>>,
    orders: O,
    leftovers: LeftoverBook<L, U>,
    items: I,
}

impl<S, A, O, L, U, I> ServiceEngine<S, A, O, L, U, I>
where
    S: StockStore,
    A: Repository<Article>,
    O: Repository<ServiceOrder>,
    L: Repository<Leftover>,
    U: Repository<LeftoverUsage>,
    I: Repository<IdentifiedItem>,
{
    pub fn new(
        stock: Arc<StockLedger<S, A>>,
        orders: O,
        leftovers: LeftoverBook<L, U>,
        items: I,
    ) -> Self {
        Self {
            stock,
            orders,
            leftovers,
            items,
        }
    }

    fn order(&self, order_id: ServiceOrderId) -> DomainResult<ServiceOrder> {
        self.orders
            .get(&order_id)
            .ok_or_else(|| DomainError::not_found(format!("service order {order_id}")))
    }

    pub fn open_order(
        &self,
        target: ServiceTarget,
        description: impl Into<String>,
        now: DateTime<Utc>,
    ) -> DomainResult<ServiceOrder> {
        let order = ServiceOrder::new(ServiceOrderId::new(), target, description, now)?;
        self.orders.insert(order.clone())?;
        tracing::info!(order = %order.id_typed(), "service order opened");
        Ok(order)
    }

    /// Assign a bulk article to the order. Assignment and reservation are the
    /// same event: the assigned quantity is consumed from the existence row
    /// immediately, with its ledger Out entry.
    pub fn assign_article(
        &self,
        order_id: ServiceOrderId,
        article_id: ArticleId,
        source_location: Option<LocationId>,
        assigned: i64,
        delivered: i64,
        now: DateTime<Utc>,
    ) -> DomainResult<ServiceOrder> {
        let mut order = self.order(order_id)?;
        order.ensure_active()?;
        let line = crate::order::ArticleLine::new(article_id, source_location, assigned, delivered)?;

        // Fallible consume first; a shortage leaves the order untouched.
        self.stock.consume(
            article_id,
            source_location,
            assigned,
            MovementSource::ServiceOrder(order_id),
            Some(format!("assigned to service order {order_id}")),
            now,
        )?;

        order.push_line(line);
        self.orders.update(order.clone())?;
        tracing::info!(order = %order_id, article = %article_id, assigned, delivered, "article assigned");
        Ok(order)
    }

    /// Move a line's delivered count by a signed delta within `[0, assigned]`.
    /// No stock moves: the quantity left the existence store at assignment.
    pub fn adjust_delivered(
        &self,
        order_id: ServiceOrderId,
        line_id: ArticleLineId,
        delta: i64,
    ) -> DomainResult<ServiceOrder> {
        let mut order = self.order(order_id)?;
        order.ensure_active()?;
        order.line_mut(line_id)?.adjust_delivered(delta)?;
        self.orders.update(order.clone())?;
        Ok(order)
    }

    /// Attach an identified item. The unit must be `Active` and not already
    /// attached to another open order; no quantity moves.
    pub fn assign_identified_item(
        &self,
        order_id: ServiceOrderId,
        item_id: IdentifiedItemId,
        now: DateTime<Utc>,
    ) -> DomainResult<ServiceOrder> {
        let mut order = self.order(order_id)?;
        order.ensure_active()?;

        let item = self
            .items
            .get(&item_id)
            .ok_or_else(|| DomainError::not_found(format!("identified item {item_id}")))?;
        if item.state() != ItemState::Active {
            return Err(DomainError::invalid_transition(format!(
                "item {} is {:?}, only active items can be assigned",
                item.code(),
                item.state()
            )));
        }
        let already_out = self
            .orders
            .list()
            .iter()
            .any(|o| o.status() == ServiceOrderStatus::Active && o.references_item(item_id));
        if already_out {
            return Err(DomainError::invalid_transition(format!(
                "item {} is already assigned to an open order",
                item.code()
            )));
        }

        order.push_assignment(ItemAssignment::new(item_id, now));
        self.orders.update(order.clone())?;
        tracing::info!(order = %order_id, item = %item_id, "identified item assigned");
        Ok(order)
    }

    /// `Assigned -> Delivered` for one item assignment.
    pub fn mark_identified_delivered(
        &self,
        order_id: ServiceOrderId,
        assignment_id: ItemAssignmentId,
    ) -> DomainResult<ServiceOrder> {
        let mut order = self.order(order_id)?;
        order.ensure_active()?;
        order.assignment_mut(assignment_id)?.mark_delivered()?;
        self.orders.update(order.clone())?;
        Ok(order)
    }

    /// Reuse part of an existing leftover for this order. Decrements the
    /// leftover and appends a provenance record; the existence store is not
    /// involved (the stock was consumed by the leftover's origin order).
    pub fn assign_leftover(
        &self,
        order_id: ServiceOrderId,
        leftover_id: LeftoverId,
        qty: i64,
        now: DateTime<Utc>,
    ) -> DomainResult<ServiceOrder> {
        let mut order = self.order(order_id)?;
        order.ensure_active()?;

        let (_, usage) = self.leftovers.consume(leftover_id, order_id, qty, now)?;
        order.push_leftover_use(LeftoverUse {
            leftover_id,
            quantity: usage.quantity,
            used_at: usage.used_at,
        });
        self.orders.update(order.clone())?;
        tracing::info!(order = %order_id, leftover = %leftover_id, qty, "leftover reused");
        Ok(order)
    }

    /// Close the order: every article line's unused quantity becomes a new
    /// leftover at the caller-chosen location, lines and order flip to done.
    ///
    /// Blocked while any identified assignment is still `Assigned`. An
    /// allocation must match its line's unused quantity exactly; a missing
    /// allocation leaves that leftover unattributed to a location.
    pub fn close_order(
        &self,
        order_id: ServiceOrderId,
        allocations: &[LeftoverAllocation],
        now: DateTime<Utc>,
    ) -> DomainResult<(ServiceOrder, Vec<Leftover>)> {
        let mut order = self.order(order_id)?;
        order.ensure_closable()?;

        // Validate every allocation before any leftover is written.
        let mut seen: Vec<ArticleLineId> = Vec::new();
        for alloc in allocations {
            if seen.contains(&alloc.line_id) {
                return Err(DomainError::invalid_input(format!(
                    "duplicate allocation for line {}",
                    alloc.line_id
                )));
            }
            seen.push(alloc.line_id);

            let line = order.line(alloc.line_id)?;
            if alloc.qty == 0 {
                continue;
            }
            if alloc.qty != line.unused() {
                return Err(DomainError::invalid_input(format!(
                    "allocation of {} does not match unused {} on line {}",
                    alloc.qty,
                    line.unused(),
                    alloc.line_id
                )));
            }
        }

        let mut created = Vec::new();
        for line in order.article_lines() {
            let unused = line.unused();
            if unused == 0 {
                continue;
            }
            // A zero-qty allocation was skipped by validation; skip its
            // location too, as if it were never supplied.
            let location = allocations
                .iter()
                .find(|a| a.line_id == line.id_typed() && a.qty != 0)
                .and_then(|a| a.location);
            created.push(self.leftovers.create(
                line.article_id,
                unused,
                order_id,
                location,
                now,
            )?);
        }

        order.mark_closed();
        self.orders.update(order.clone())?;
        tracing::info!(order = %order_id, leftovers = created.len(), "service order closed");
        Ok((order, created))
    }

    /// `Done -> Active`. Leftovers generated at closure are not reversed.
    pub fn reopen_order(&self, order_id: ServiceOrderId) -> DomainResult<ServiceOrder> {
        let mut order = self.order(order_id)?;
        order.reopen()?;
        self.orders.update(order.clone())?;
        tracing::info!(order = %order_id, "service order reopened");
        Ok(order)
    }

    pub fn get(&self, order_id: ServiceOrderId) -> DomainResult<ServiceOrder> {
        self.order(order_id)
    }

    pub fn leftover_book(&self) -> &LeftoverBook<L, U> {
        &self.leftovers
    }

    /// Identified items, optionally filtered by state.
    pub fn items_by_state(&self, state: Option<ItemState>) -> Vec<IdentifiedItem> {
        let mut items: Vec<IdentifiedItem> = self
            .items
            .list()
            .into_iter()
            .filter(|item| state.is_none_or(|s| item.state() == s))
            .collect();
        items.sort_by(|a, b| a.code().cmp(b.code()));
        items
    }

    /// Chronological service history of one identified item, plus its
    /// current location attribution (target of the latest delivering order).
    pub fn item_history(&self, item_id: IdentifiedItemId) -> DomainResult<ItemHistory> {
        let item = self
            .items
            .get(&item_id)
            .ok_or_else(|| DomainError::not_found(format!("identified item {item_id}")))?;

        let mut entries: Vec<ItemHistoryEntry> = Vec::new();
        for order in self.orders.list() {
            for assignment in order.item_assignments() {
                if assignment.item_id == item_id {
                    entries.push(ItemHistoryEntry {
                        order_id: order.id_typed(),
                        target: order.target,
                        assigned_at: assignment.assigned_at,
                        state: assignment.state(),
                    });
                }
            }
        }
        entries.sort_by_key(|e| e.assigned_at);

        let current_target = entries
            .iter()
            .rev()
            .find(|e| e.state == AssignmentState::Delivered)
            .map(|e| e.target);

        Ok(ItemHistory {
            item,
            current_target,
            orders: entries,
        })
    }
}
