//! Coupled-write stock store abstraction + in-memory implementation.

use std::collections::HashMap;
use std::sync::RwLock;

use storekeep_core::{ArticleId, DomainError, DomainResult, LocationId};

use crate::entry::MovementEntry;
use crate::existence::Existence;

/// Storage seam for existence rows and ledger entries.
///
/// The contract replaces the original system's trigger-derived ledger:
/// `commit` is the **only** way to change a quantity, and it takes the
/// ledger entry along with the row, writing both or neither. Pending-only
/// bookkeeping goes through `put_pending`, which must not alter quantity
/// (owed stock is not held stock and produces no movement).
pub trait StockStore: Send + Sync {
    fn existence(&self, article: ArticleId, location: Option<LocationId>) -> Option<Existence>;

    fn rows_for_article(&self, article: ArticleId) -> Vec<Existence>;

    /// Upsert one existence row and append its movement entry, atomically.
    fn commit(&self, row: Existence, entry: MovementEntry) -> DomainResult<()>;

    /// Upsert a row whose quantity is unchanged (pending-to-deliver only).
    fn put_pending(&self, row: Existence) -> DomainResult<()>;

    /// Snapshot of all ledger entries, in append order.
    fn entries(&self) -> Vec<MovementEntry>;
}

#[derive(Debug, Default)]
struct Inner {
    rows: HashMap<(ArticleId, Option<LocationId>), Existence>,
    entries: Vec<MovementEntry>,
}

/// In-memory stock store for tests/dev and the default engine wiring.
///
/// A single `RwLock` over rows + entries makes the coupled write trivially
/// atomic under a single logical writer.
#[derive(Debug, Default)]
pub struct InMemoryStockStore {
    inner: RwLock<Inner>,
}

impl InMemoryStockStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StockStore for InMemoryStockStore {
    fn existence(&self, article: ArticleId, location: Option<LocationId>) -> Option<Existence> {
        let inner = self.inner.read().ok()?;
        inner.rows.get(&(article, location)).cloned()
    }

    fn rows_for_article(&self, article: ArticleId) -> Vec<Existence> {
        match self.inner.read() {
            Ok(inner) => inner
                .rows
                .values()
                .filter(|row| row.article_id == article)
                .cloned()
                .collect(),
            Err(_) => Vec::new(),
        }
    }

    fn commit(&self, row: Existence, entry: MovementEntry) -> DomainResult<()> {
        let mut inner = self
            .inner
            .write()
            .map_err(|_| DomainError::storage("stock store lock poisoned"))?;
        if row.article_id != entry.article_id {
            return Err(DomainError::storage(
                "commit row and entry reference different articles",
            ));
        }
        inner.rows.insert(row.key(), row);
        inner.entries.push(entry);
        Ok(())
    }

    fn put_pending(&self, row: Existence) -> DomainResult<()> {
        let mut inner = self
            .inner
            .write()
            .map_err(|_| DomainError::storage("stock store lock poisoned"))?;
        let prior_quantity = inner
            .rows
            .get(&row.key())
            .map(|existing| existing.quantity)
            .unwrap_or(0);
        if row.quantity != prior_quantity {
            return Err(DomainError::storage(
                "pending-only write attempted to change quantity",
            ));
        }
        inner.rows.insert(row.key(), row);
        Ok(())
    }

    fn entries(&self) -> Vec<MovementEntry> {
        match self.inner.read() {
            Ok(inner) => inner.entries.clone(),
            Err(_) => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::{MovementDirection, MovementKind, MovementSource};
    use chrono::Utc;
    use storekeep_core::PurchaseOrderId;

    fn test_entry(article: ArticleId, qty: i64) -> MovementEntry {
        MovementEntry::new(
            article,
            "Sand",
            "SND-1",
            MovementKind::In,
            MovementDirection::Inbound,
            qty,
            Utc::now(),
            MovementSource::PurchaseOrder(PurchaseOrderId::new()),
            None,
        )
        .unwrap()
    }

    #[test]
    fn commit_writes_row_and_entry_together() {
        let store = InMemoryStockStore::new();
        let article = ArticleId::new();
        let mut row = Existence::new(article, None);
        row.quantity = 5;

        store.commit(row.clone(), test_entry(article, 5)).unwrap();

        assert_eq!(store.existence(article, None), Some(row));
        assert_eq!(store.entries().len(), 1);
    }

    #[test]
    fn commit_rejects_mismatched_article() {
        let store = InMemoryStockStore::new();
        let row = Existence::new(ArticleId::new(), None);
        let entry = test_entry(ArticleId::new(), 1);

        let err = store.commit(row, entry).unwrap_err();
        assert!(matches!(err, DomainError::Storage(_)));
        assert!(store.entries().is_empty());
    }

    #[test]
    fn put_pending_cannot_smuggle_a_quantity_change() {
        let store = InMemoryStockStore::new();
        let article = ArticleId::new();
        let mut row = Existence::new(article, None);
        row.quantity = 3;
        store.commit(row.clone(), test_entry(article, 3)).unwrap();

        row.quantity = 9;
        row.pending_to_deliver = 2;
        let err = store.put_pending(row.clone()).unwrap_err();
        assert!(matches!(err, DomainError::Storage(_)));

        row.quantity = 3;
        store.put_pending(row.clone()).unwrap();
        assert_eq!(store.existence(article, None), Some(row));
    }
}
