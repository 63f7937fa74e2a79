use serde::{Deserialize, Serialize};

use storekeep_core::{ArticleId, LocationId};

/// Authoritative stock row: quantity of an article held at a location, plus
/// the quantity still owed by open purchase orders.
///
/// One row may exist per `(article, location)` pair; rows are created lazily
/// on the first stock-affecting event for that pair. `location == None` is
/// the "unassigned" bucket.
///
/// Both counters are invariantly non-negative. [`crate::StockLedger`] rejects
/// any operation that would drive either below zero before the write happens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Existence {
    pub article_id: ArticleId,
    pub location: Option<LocationId>,
    pub quantity: i64,
    pub pending_to_deliver: i64,
}

impl Existence {
    /// Fresh row for a pair with no prior stock events.
    pub fn new(article_id: ArticleId, location: Option<LocationId>) -> Self {
        Self {
            article_id,
            location,
            quantity: 0,
            pending_to_deliver: 0,
        }
    }

    pub fn key(&self) -> (ArticleId, Option<LocationId>) {
        (self.article_id, self.location)
    }
}
