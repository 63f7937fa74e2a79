use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use storekeep_catalog::Article;
use storekeep_core::{
    ArticleId, DomainError, DomainResult, LocationId, ProviderId, PurchaseLineId, PurchaseOrderId,
    Repository,
};
use storekeep_ledger::{MovementSource, StockLedger, StockStore};

use crate::order::{PurchaseLine, PurchaseOrder};

/// Request shape for one line of a new purchase order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPurchaseLine {
    pub article_id: ArticleId,
    pub location: Option<LocationId>,
    pub ordered: i64,
    /// Quantity already in hand when the order is registered.
    pub received_now: i64,
}

/// Purchase workflow engine.
///
/// Multi-line creation is validate-then-apply: every line is checked before
/// the first write, so a failure partway through is never observable.
pub struct PurchaseEngine<S, A, R>
where
    S: StockStore,
    A: Repository<Article>,
    R: Repository<PurchaseOrder>,
{
    stock: Arc<StockLedger<S, A>>,
    orders: R,
}

impl<S, A, R> PurchaseEngine<S, A, R>
where
    S: StockStore,
    A: Repository<Article>,
    R: Repository<PurchaseOrder>,
{
    pub fn new(stock: Arc<StockLedger<S, A>>, orders: R) -> Self {
        Self { stock, orders }
    }

    fn order(&self, order_id: PurchaseOrderId) -> DomainResult<PurchaseOrder> {
        self.orders
            .get(&order_id)
            .ok_or_else(|| DomainError::not_found(format!("purchase order {order_id}")))
    }

    /// Register an order. Lines received on the spot restock the existence
    /// store immediately; the remainder of every line raises the
    /// pending-to-deliver counter.
    pub fn create_order(
        &self,
        provider: ProviderId,
        reference: impl Into<String>,
        lines: Vec<NewPurchaseLine>,
        now: DateTime<Utc>,
    ) -> DomainResult<PurchaseOrder> {
        // Validate everything before the first write.
        let mut built = Vec::with_capacity(lines.len());
        for request in &lines {
            self.stock.resolve_article(request.article_id)?;
            built.push(PurchaseLine::new(
                request.article_id,
                request.location,
                request.ordered,
                request.received_now,
            )?);
        }
        let order = PurchaseOrder::new(PurchaseOrderId::new(), provider, reference, now, built)?;

        let source = MovementSource::PurchaseOrder(order.id_typed());
        for line in order.lines() {
            let pending = line.pending();
            if line.received() > 0 {
                self.stock.restock(
                    line.article_id,
                    line.location,
                    line.received(),
                    pending,
                    source,
                    Some(format!("order {} registered", order.reference)),
                    now,
                )?;
            } else {
                self.stock.add_pending(line.article_id, line.location, pending)?;
            }
        }

        self.orders.insert(order.clone())?;
        tracing::info!(
            order = %order.id_typed(),
            reference = %order.reference,
            lines = order.lines().len(),
            "purchase order created"
        );
        Ok(order)
    }

    /// Receive part of a line's pending remainder: increments `received`,
    /// restocks the existence row and settles pending, all-or-nothing.
    pub fn receive_partial(
        &self,
        order_id: PurchaseOrderId,
        line_id: PurchaseLineId,
        qty: i64,
        now: DateTime<Utc>,
    ) -> DomainResult<PurchaseOrder> {
        let mut order = self.order(order_id)?;
        let source = MovementSource::PurchaseOrder(order_id);
        let reference = order.reference.clone();

        let line = order.line_mut(line_id)?;
        line.receive(qty)?;
        let (article_id, location) = (line.article_id, line.location);

        // Coupled restock before the order is persisted; a ledger rejection
        // leaves the stored order untouched.
        self.stock.restock(
            article_id,
            location,
            qty,
            -qty,
            source,
            Some(format!("receipt against order {reference}")),
            now,
        )?;

        order.refresh_status();
        self.orders.update(order.clone())?;
        tracing::info!(order = %order_id, line = %line_id, qty, "purchase line received");
        Ok(order)
    }

    /// Receive the full remaining pending amount of a line.
    pub fn receive_all(
        &self,
        order_id: PurchaseOrderId,
        line_id: PurchaseLineId,
        now: DateTime<Utc>,
    ) -> DomainResult<PurchaseOrder> {
        let order = self.order(order_id)?;
        let pending = order.line(line_id)?.pending();
        if pending == 0 {
            return Err(DomainError::nothing_pending(format!(
                "purchase line {line_id} has no pending quantity"
            )));
        }
        self.receive_partial(order_id, line_id, pending, now)
    }

    pub fn get(&self, order_id: PurchaseOrderId) -> DomainResult<PurchaseOrder> {
        self.order(order_id)
    }

    pub fn list(&self) -> Vec<PurchaseOrder> {
        self.orders.list()
    }
}
