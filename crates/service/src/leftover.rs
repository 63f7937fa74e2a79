use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use storekeep_core::{
    ArticleId, DomainError, DomainResult, Entity, LeftoverId, LeftoverUsageId, LocationId,
    Repository, ServiceOrderId,
};

/// Unused quantity returned when a service order closed, available for reuse.
///
/// `location == None` means the closure left the leftover unattributed to a
/// location ("unassigned").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Leftover {
    id: LeftoverId,
    pub article_id: ArticleId,
    quantity: i64,
    pub created_at: DateTime<Utc>,
    pub origin_order: ServiceOrderId,
    pub location: Option<LocationId>,
}

impl Leftover {
    pub(crate) fn new(
        article_id: ArticleId,
        quantity: i64,
        created_at: DateTime<Utc>,
        origin_order: ServiceOrderId,
        location: Option<LocationId>,
    ) -> DomainResult<Self> {
        if quantity <= 0 {
            return Err(DomainError::invalid_input("leftover quantity must be positive"));
        }
        Ok(Self {
            id: LeftoverId::new(),
            article_id,
            quantity,
            created_at,
            origin_order,
            location,
        })
    }

    pub fn id_typed(&self) -> LeftoverId {
        self.id
    }

    /// Remaining reusable quantity.
    pub fn quantity(&self) -> i64 {
        self.quantity
    }

    fn consume(&mut self, qty: i64) -> DomainResult<()> {
        if qty <= 0 {
            return Err(DomainError::invalid_input("usage quantity must be positive"));
        }
        if qty > self.quantity {
            return Err(DomainError::insufficient_stock(format!(
                "leftover {}: requested {qty}, remaining {}",
                self.id, self.quantity
            )));
        }
        self.quantity -= qty;
        Ok(())
    }
}

impl Entity for Leftover {
    type Id = LeftoverId;

    fn id(&self) -> &LeftoverId {
        &self.id
    }
}

/// Provenance record: which order reused how much of which leftover, when.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeftoverUsage {
    id: LeftoverUsageId,
    pub leftover_id: LeftoverId,
    pub order_id: ServiceOrderId,
    pub quantity: i64,
    pub used_at: DateTime<Utc>,
}

impl LeftoverUsage {
    pub fn id_typed(&self) -> LeftoverUsageId {
        self.id
    }
}

impl Entity for LeftoverUsage {
    type Id = LeftoverUsageId;

    fn id(&self) -> &LeftoverUsageId {
        &self.id
    }
}

/// Leftover subsystem: creation at closure, consumption at reassignment,
/// provenance chain in between. Independent of the existence store: the
/// stock a leftover represents was already consumed by its origin order.
pub struct LeftoverBook<L, U>
where
    L: Repository<Leftover>,
    U: Repository<LeftoverUsage>,
{
    leftovers: L,
    usages: U,
}

impl<L, U> LeftoverBook<L, U>
where
    L: Repository<Leftover>,
    U: Repository<LeftoverUsage>,
{
    pub fn new(leftovers: L, usages: U) -> Self {
        Self { leftovers, usages }
    }

    pub(crate) fn create(
        &self,
        article_id: ArticleId,
        quantity: i64,
        origin_order: ServiceOrderId,
        location: Option<LocationId>,
        now: DateTime<Utc>,
    ) -> DomainResult<Leftover> {
        let leftover = Leftover::new(article_id, quantity, now, origin_order, location)?;
        self.leftovers.insert(leftover.clone())?;
        Ok(leftover)
    }

    /// Decrement a leftover and record the usage, together.
    pub(crate) fn consume(
        &self,
        leftover_id: LeftoverId,
        order_id: ServiceOrderId,
        qty: i64,
        now: DateTime<Utc>,
    ) -> DomainResult<(Leftover, LeftoverUsage)> {
        let mut leftover = self
            .leftovers
            .get(&leftover_id)
            .ok_or_else(|| DomainError::not_found(format!("leftover {leftover_id}")))?;
        leftover.consume(qty)?;

        let usage = LeftoverUsage {
            id: LeftoverUsageId::new(),
            leftover_id,
            order_id,
            quantity: qty,
            used_at: now,
        };
        self.leftovers.update(leftover.clone())?;
        self.usages.insert(usage.clone())?;
        Ok((leftover, usage))
    }

    pub fn get(&self, leftover_id: LeftoverId) -> DomainResult<Leftover> {
        self.leftovers
            .get(&leftover_id)
            .ok_or_else(|| DomainError::not_found(format!("leftover {leftover_id}")))
    }

    pub fn list(&self) -> Vec<Leftover> {
        self.leftovers.list()
    }

    /// Provenance chain of one leftover, oldest use first.
    pub fn usages_for(&self, leftover_id: LeftoverId) -> Vec<LeftoverUsage> {
        let mut usages: Vec<LeftoverUsage> = self
            .usages
            .list()
            .into_iter()
            .filter(|u| u.leftover_id == leftover_id)
            .collect();
        usages.sort_by_key(|u| u.used_at);
        usages
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storekeep_core::InMemoryRepository;

    fn test_book() -> LeftoverBook<InMemoryRepository<Leftover>, InMemoryRepository<LeftoverUsage>> {
        LeftoverBook::new(InMemoryRepository::new(), InMemoryRepository::new())
    }

    #[test]
    fn zero_quantity_leftovers_cannot_exist() {
        let book = test_book();
        let err = book
            .create(ArticleId::new(), 0, ServiceOrderId::new(), None, Utc::now())
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidInput(_)));
    }

    #[test]
    fn consumption_decrements_and_records_provenance() {
        let book = test_book();
        let leftover = book
            .create(ArticleId::new(), 5, ServiceOrderId::new(), None, Utc::now())
            .unwrap();

        let consumer = ServiceOrderId::new();
        let (leftover, usage) = book
            .consume(leftover.id_typed(), consumer, 3, Utc::now())
            .unwrap();
        assert_eq!(leftover.quantity(), 2);
        assert_eq!(usage.quantity, 3);
        assert_eq!(usage.order_id, consumer);

        let chain = book.usages_for(leftover.id_typed());
        assert_eq!(chain.len(), 1);
    }

    #[test]
    fn over_consumption_is_rejected_without_a_usage_record() {
        let book = test_book();
        let leftover = book
            .create(ArticleId::new(), 2, ServiceOrderId::new(), None, Utc::now())
            .unwrap();

        let err = book
            .consume(leftover.id_typed(), ServiceOrderId::new(), 3, Utc::now())
            .unwrap_err();
        assert!(matches!(err, DomainError::InsufficientStock(_)));
        assert_eq!(book.get(leftover.id_typed()).unwrap().quantity(), 2);
        assert!(book.usages_for(leftover.id_typed()).is_empty());
    }
}
