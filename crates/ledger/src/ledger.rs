use chrono::{DateTime, Utc};

use storekeep_catalog::Article;
use storekeep_core::{ArticleId, DomainError, DomainResult, LocationId, Repository};

use crate::entry::{MovementDirection, MovementEntry, MovementKind, MovementSource};
use crate::existence::Existence;
use crate::query::{MovementFilter, MovementPage, MovementSort, PageRequest};
use crate::store::StockStore;

/// The existence store component.
///
/// Every mutator here performs the coupled write: one existence row and
/// exactly one movement entry committed together. All preconditions are
/// checked before the commit, so a rejected call leaves both untouched
/// (fail closed, not clamp). Articles are resolved through the injected
/// repository so entries carry the name/code the audit surface searches on.
pub struct StockLedger<S, A>
where
    S: StockStore,
    A: Repository<Article>,
{
    store: S,
    articles: A,
}

impl<S, A> StockLedger<S, A>
where
    S: StockStore,
    A: Repository<Article>,
{
    pub fn new(store: S, articles: A) -> Self {
        Self { store, articles }
    }

    /// Look up an article through the injected repository.
    ///
    /// Workflow engines use this to pre-validate references before their
    /// first write.
    pub fn resolve_article(&self, id: ArticleId) -> DomainResult<Article> {
        self.articles
            .get(&id)
            .ok_or_else(|| DomainError::not_found(format!("article {id}")))
    }

    fn row(&self, article: ArticleId, location: Option<LocationId>) -> Existence {
        self.store
            .existence(article, location)
            .unwrap_or_else(|| Existence::new(article, location))
    }

    /// Remove quantity (the `reserveAndConsume` of the workflows: assignment
    /// and reservation are the same event). Appends an `Out` entry.
    pub fn consume(
        &self,
        article_id: ArticleId,
        location: Option<LocationId>,
        qty: i64,
        source: MovementSource,
        note: Option<String>,
        occurred_at: DateTime<Utc>,
    ) -> DomainResult<Existence> {
        if qty <= 0 {
            return Err(DomainError::invalid_input("consume quantity must be positive"));
        }
        let article = self.resolve_article(article_id)?;
        let mut row = self.row(article_id, location);
        if qty > row.quantity {
            return Err(DomainError::insufficient_stock(format!(
                "article {}: requested {qty}, available {}",
                article.code(),
                row.quantity
            )));
        }
        row.quantity -= qty;
        let entry = MovementEntry::new(
            article_id,
            article.name(),
            article.code(),
            MovementKind::Out,
            MovementDirection::Outbound,
            qty,
            occurred_at,
            source,
            note,
        )?;
        self.store.commit(row.clone(), entry)?;
        tracing::info!(article = %article.code(), qty, quantity = row.quantity, "stock consumed");
        Ok(row)
    }

    /// Add quantity, settling `pending_delta` against the pending-to-deliver
    /// counter in the same write. Appends an `In` entry.
    pub fn restock(
        &self,
        article_id: ArticleId,
        location: Option<LocationId>,
        qty: i64,
        pending_delta: i64,
        source: MovementSource,
        note: Option<String>,
        occurred_at: DateTime<Utc>,
    ) -> DomainResult<Existence> {
        if qty <= 0 {
            return Err(DomainError::invalid_input("restock quantity must be positive"));
        }
        let article = self.resolve_article(article_id)?;
        let mut row = self.row(article_id, location);
        let pending = row.pending_to_deliver + pending_delta;
        if pending < 0 {
            return Err(DomainError::invalid_input(
                "pending-to-deliver cannot go negative",
            ));
        }
        row.quantity += qty;
        row.pending_to_deliver = pending;
        let entry = MovementEntry::new(
            article_id,
            article.name(),
            article.code(),
            MovementKind::In,
            MovementDirection::Inbound,
            qty,
            occurred_at,
            source,
            note,
        )?;
        self.store.commit(row.clone(), entry)?;
        tracing::info!(article = %article.code(), qty, quantity = row.quantity, "stock restocked");
        Ok(row)
    }

    /// Signed correction. The resulting quantity must stay non-negative.
    /// Appends an `Adjust` entry whose direction carries the sign.
    pub fn adjust(
        &self,
        article_id: ArticleId,
        location: Option<LocationId>,
        delta: i64,
        source: MovementSource,
        note: Option<String>,
        occurred_at: DateTime<Utc>,
    ) -> DomainResult<Existence> {
        if delta == 0 {
            return Err(DomainError::invalid_input("adjustment delta cannot be zero"));
        }
        let article = self.resolve_article(article_id)?;
        let mut row = self.row(article_id, location);
        let quantity = row.quantity + delta;
        if quantity < 0 {
            return Err(DomainError::insufficient_stock(format!(
                "article {}: adjustment of {delta} would drive quantity below zero (current {})",
                article.code(),
                row.quantity
            )));
        }
        row.quantity = quantity;
        let direction = if delta > 0 {
            MovementDirection::Inbound
        } else {
            MovementDirection::Outbound
        };
        let entry = MovementEntry::new(
            article_id,
            article.name(),
            article.code(),
            MovementKind::Adjust,
            direction,
            delta.abs(),
            occurred_at,
            source,
            note,
        )?;
        self.store.commit(row.clone(), entry)?;
        tracing::info!(article = %article.code(), delta, quantity = row.quantity, "stock adjusted");
        Ok(row)
    }

    /// Record owed-but-not-held stock at purchase-order creation. Pending is
    /// an obligation counter, not held stock: no movement entry is produced.
    pub fn add_pending(
        &self,
        article_id: ArticleId,
        location: Option<LocationId>,
        qty: i64,
    ) -> DomainResult<Existence> {
        if qty <= 0 {
            return Err(DomainError::invalid_input("pending quantity must be positive"));
        }
        self.resolve_article(article_id)?;
        let mut row = self.row(article_id, location);
        row.pending_to_deliver += qty;
        self.store.put_pending(row.clone())?;
        Ok(row)
    }

    pub fn existence(
        &self,
        article: ArticleId,
        location: Option<LocationId>,
    ) -> Option<Existence> {
        self.store.existence(article, location)
    }

    pub fn rows_for_article(&self, article: ArticleId) -> Vec<Existence> {
        self.store.rows_for_article(article)
    }

    /// Total quantity of an article across all locations.
    pub fn total_quantity(&self, article: ArticleId) -> i64 {
        self.store
            .rows_for_article(article)
            .iter()
            .map(|row| row.quantity)
            .sum()
    }

    /// Audit/reporting surface over the movement ledger.
    pub fn query(
        &self,
        filter: &MovementFilter,
        sort: MovementSort,
        page: PageRequest,
    ) -> MovementPage {
        MovementPage::build(self.store.entries(), filter, sort, page)
    }

    /// Full entry snapshot, in append order.
    pub fn entries(&self) -> Vec<MovementEntry> {
        self.store.entries()
    }
}
