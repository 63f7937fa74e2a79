//! Fully wired engine over in-memory stores.

use std::sync::Arc;

use storekeep_catalog::{Article, ArticleKind, IdentifiedItem};
use storekeep_core::{ArticleId, DomainResult, InMemoryRepository, Repository};
use storekeep_ledger::{InMemoryStockStore, StockLedger};
use storekeep_loans::{Loan, LoanEngine};
use storekeep_purchasing::{PurchaseEngine, PurchaseOrder};
use storekeep_service::{Leftover, LeftoverBook, LeftoverUsage, ServiceEngine, ServiceOrder};

use crate::items::ItemDesk;

type Articles = Arc<InMemoryRepository<Article>>;
type Items = Arc<InMemoryRepository<IdentifiedItem>>;
type Ledger = StockLedger<InMemoryStockStore, Articles>;

/// All engines wired over shared in-memory stores. One instance is one
/// warehouse: the article catalog, the existence store and the movement
/// ledger are shared by every workflow.
pub struct Storekeep {
    articles: Articles,
    stock: Arc<Ledger>,
    purchasing: PurchaseEngine<InMemoryStockStore, Articles, Arc<InMemoryRepository<PurchaseOrder>>>,
    service: ServiceEngine<
        InMemoryStockStore,
        Articles,
        Arc<InMemoryRepository<ServiceOrder>>,
        Arc<InMemoryRepository<Leftover>>,
        Arc<InMemoryRepository<LeftoverUsage>>,
        Items,
    >,
    loans: LoanEngine<InMemoryStockStore, Articles, Arc<InMemoryRepository<Loan>>>,
    items: ItemDesk<InMemoryStockStore, Articles, Items>,
}

impl Storekeep {
    pub fn new() -> Self {
        let articles: Articles = Arc::new(InMemoryRepository::new());
        let items: Items = Arc::new(InMemoryRepository::new());
        let stock = Arc::new(StockLedger::new(InMemoryStockStore::new(), articles.clone()));

        Self {
            purchasing: PurchaseEngine::new(stock.clone(), Arc::new(InMemoryRepository::new())),
            service: ServiceEngine::new(
                stock.clone(),
                Arc::new(InMemoryRepository::new()),
                LeftoverBook::new(
                    Arc::new(InMemoryRepository::new()),
                    Arc::new(InMemoryRepository::new()),
                ),
                items.clone(),
            ),
            loans: LoanEngine::new(stock.clone(), Arc::new(InMemoryRepository::new())),
            items: ItemDesk::new(stock.clone(), items),
            articles,
            stock,
        }
    }

    /// Add an article to the catalog.
    pub fn create_article(
        &self,
        name: impl Into<String>,
        code: impl Into<String>,
        price_cents: i64,
        kind: ArticleKind,
        identifiable: bool,
    ) -> DomainResult<Article> {
        let article = Article::new(ArticleId::new(), name, code, price_cents, kind, identifiable)?;
        self.articles.insert(article.clone())?;
        tracing::info!(article = %article.id_typed(), code = article.code(), "article created");
        Ok(article)
    }

    pub fn articles(&self) -> Vec<Article> {
        self.articles.list()
    }

    pub fn stock(&self) -> &Ledger {
        &self.stock
    }

    pub fn purchasing(
        &self,
    ) -> &PurchaseEngine<InMemoryStockStore, Articles, Arc<InMemoryRepository<PurchaseOrder>>> {
        &self.purchasing
    }

    pub fn service(
        &self,
    ) -> &ServiceEngine<
        InMemoryStockStore,
        Articles,
        Arc<InMemoryRepository<ServiceOrder>>,
        Arc<InMemoryRepository<Leftover>>,
        Arc<InMemoryRepository<LeftoverUsage>>,
        Items,
    > {
        &self.service
    }

    pub fn loans(&self) -> &LoanEngine<InMemoryStockStore, Articles, Arc<InMemoryRepository<Loan>>> {
        &self.loans
    }

    pub fn items(&self) -> &ItemDesk<InMemoryStockStore, Articles, Items> {
        &self.items
    }
}

impl Default for Storekeep {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn created_articles_are_listed_and_resolvable() {
        let keep = Storekeep::new();
        let article = keep
            .create_article("Copper wire", "CU-2.5", 85, ArticleKind::Stock, false)
            .unwrap();

        let listed = keep.articles();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].code(), "CU-2.5");
        assert_eq!(
            keep.stock().resolve_article(article.id_typed()).unwrap().code(),
            "CU-2.5"
        );
    }
}
