//! Identified-item lifecycle, coupled to the existence store.
//!
//! Each unit counts as one piece of its article's stock while active.
//! Retiring a unit is a real consumption (quantity 1 leaves the existence
//! row with an Out entry); reinstating it is a restock of 1.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use storekeep_catalog::{Article, IdentifiedItem};
use storekeep_core::{
    ArticleId, DomainError, DomainResult, IdentifiedItemId, LocationId, Repository,
};
use storekeep_ledger::{MovementSource, StockLedger, StockStore};

pub struct ItemDesk<S, A, I>
where
    S: StockStore,
    A: Repository<Article>,
    I: Repository<IdentifiedItem>,
{
    stock: Arc<StockLedger<S, A>>,
    items: I,
}

impl<S, A, I> ItemDesk<S, A, I>
where
    S: StockStore,
    A: Repository<Article>,
    I: Repository<IdentifiedItem>,
{
    pub fn new(stock: Arc<StockLedger<S, A>>, items: I) -> Self {
        Self { stock, items }
    }

    fn item(&self, item_id: IdentifiedItemId) -> DomainResult<IdentifiedItem> {
        self.items
            .get(&item_id)
            .ok_or_else(|| DomainError::not_found(format!("identified item {item_id}")))
    }

    /// Catalog a new unit of an identifiable article. Its quantity enters
    /// the existence store through purchase receiving, not here.
    pub fn register(
        &self,
        article_id: ArticleId,
        code: impl Into<String>,
    ) -> DomainResult<IdentifiedItem> {
        let article = self.stock.resolve_article(article_id)?;
        if !article.identifiable() {
            return Err(DomainError::invalid_input(format!(
                "article {} is not tracked per unit",
                article.code()
            )));
        }
        let item = IdentifiedItem::new(IdentifiedItemId::new(), article_id, code)?;
        self.items.insert(item.clone())?;
        tracing::info!(item = %item.id_typed(), code = item.code(), "identified item registered");
        Ok(item)
    }

    /// `Active -> UnderReview`. A cause is mandatory; no stock moves.
    pub fn begin_review(
        &self,
        item_id: IdentifiedItemId,
        cause: &str,
    ) -> DomainResult<IdentifiedItem> {
        let mut item = self.item(item_id)?;
        item.begin_review(cause)?;
        self.items.update(item.clone())?;
        Ok(item)
    }

    /// `UnderReview -> Retired`. The unit leaves the existence row at
    /// `location` as a consumption of 1, with its Out entry.
    pub fn retire(
        &self,
        item_id: IdentifiedItemId,
        cause: Option<&str>,
        location: Option<LocationId>,
        now: DateTime<Utc>,
    ) -> DomainResult<IdentifiedItem> {
        let mut item = self.item(item_id)?;
        item.retire(cause, now)?;

        // Fallible consume before the item update; a missing unit of stock
        // leaves the item under review.
        self.stock.consume(
            item.article_id(),
            location,
            1,
            MovementSource::IdentifiedItem(item_id),
            Some(format!("retired unit {}", item.code())),
            now,
        )?;
        self.items.update(item.clone())?;
        tracing::info!(item = %item_id, "identified item retired");
        Ok(item)
    }

    /// `Retired -> Active`. The unit re-enters the existence row at
    /// `location` as a restock of 1.
    pub fn reinstate(
        &self,
        item_id: IdentifiedItemId,
        location: Option<LocationId>,
        now: DateTime<Utc>,
    ) -> DomainResult<IdentifiedItem> {
        let mut item = self.item(item_id)?;
        item.reinstate()?;

        self.stock.restock(
            item.article_id(),
            location,
            1,
            0,
            MovementSource::IdentifiedItem(item_id),
            Some(format!("reinstated unit {}", item.code())),
            now,
        )?;
        self.items.update(item.clone())?;
        tracing::info!(item = %item_id, "identified item reinstated");
        Ok(item)
    }

    pub fn get(&self, item_id: IdentifiedItemId) -> DomainResult<IdentifiedItem> {
        self.item(item_id)
    }

    pub fn list(&self) -> Vec<IdentifiedItem> {
        self.items.list()
    }
}
