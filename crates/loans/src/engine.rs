use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use storekeep_catalog::Article;
use storekeep_core::{
    ArticleId, DomainError, DomainResult, LoanId, LoanLineId, LocationId, Repository,
};
use storekeep_ledger::{StockLedger, StockStore};

use crate::loan::{Loan, LoanLine, LoanStatus};

/// Request shape for one line of a new loan.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct NewLoanLine {
    pub article_id: ArticleId,
    pub lent: i64,
}

/// Loan workflow engine.
///
/// Loans hold stock aside without moving it: availability is computed as the
/// on-hand total minus everything outstanding across open loans, and no
/// existence row or ledger entry changes when a loan opens or returns.
pub struct LoanEngine<S, A, R>
where
    S: StockStore,
    A: Repository<Article>,
    R: Repository<Loan>,
{
    stock: Arc<StockLedger<S, A>>,
    loans: R,
}

impl<S, A, R> LoanEngine<S, A, R>
where
    S: StockStore,
    A: Repository<Article>,
    R: Repository<Loan>,
{
    pub fn new(stock: Arc<StockLedger<S, A>>, loans: R) -> Self {
        Self { stock, loans }
    }

    fn loan(&self, loan_id: LoanId) -> DomainResult<Loan> {
        self.loans
            .get(&loan_id)
            .ok_or_else(|| DomainError::not_found(format!("loan {loan_id}")))
    }

    /// On-hand total minus quantities outstanding on open loans.
    pub fn available_for_loan(&self, article_id: ArticleId) -> i64 {
        let outstanding: i64 = self
            .loans
            .list()
            .iter()
            .filter(|l| l.status() == LoanStatus::Active)
            .map(|l| l.outstanding_for(article_id))
            .sum();
        self.stock.total_quantity(article_id) - outstanding
    }

    /// Open a loan. Every line is validated against availability before
    /// anything is written; one short line rejects the whole loan.
    pub fn create_loan(
        &self,
        authorizer: impl Into<String>,
        location: Option<LocationId>,
        lines: Vec<NewLoanLine>,
        now: DateTime<Utc>,
    ) -> DomainResult<Loan> {
        let mut built = Vec::with_capacity(lines.len());
        let mut requested: Vec<(ArticleId, i64)> = Vec::new();
        for line in &lines {
            self.stock.resolve_article(line.article_id)?;
            built.push(LoanLine::new(line.article_id, line.lent)?);
            match requested.iter_mut().find(|(a, _)| *a == line.article_id) {
                Some((_, total)) => *total += line.lent,
                None => requested.push((line.article_id, line.lent)),
            }
        }
        for (article_id, total) in requested {
            let available = self.available_for_loan(article_id);
            if total > available {
                return Err(DomainError::insufficient_stock(format!(
                    "article {article_id}: requested {total} on loan, {available} available"
                )));
            }
        }

        let loan = Loan::new(LoanId::new(), authorizer, location, built, now)?;
        self.loans.insert(loan.clone())?;
        tracing::info!(loan = %loan.id_typed(), lines = loan.lines().len(), "loan opened");
        Ok(loan)
    }

    /// Record a partial return on one line. The loan auto-closes when every
    /// line is returned in full.
    pub fn return_partial(
        &self,
        loan_id: LoanId,
        line_id: LoanLineId,
        qty: i64,
    ) -> DomainResult<Loan> {
        let mut loan = self.loan(loan_id)?;
        loan.ensure_active()?;
        loan.line_mut(line_id)?.accept_return(qty)?;
        loan.refresh_status();
        self.loans.update(loan.clone())?;
        tracing::info!(loan = %loan_id, line = %line_id, qty, "loan return recorded");
        Ok(loan)
    }

    /// Return everything still outstanding on one line.
    pub fn return_all(&self, loan_id: LoanId, line_id: LoanLineId) -> DomainResult<Loan> {
        let loan = self.loan(loan_id)?;
        let outstanding = loan.line(line_id)?.outstanding();
        if outstanding == 0 {
            return Err(DomainError::nothing_pending(format!(
                "loan line {line_id} has nothing outstanding"
            )));
        }
        self.return_partial(loan_id, line_id, outstanding)
    }

    pub fn get(&self, loan_id: LoanId) -> DomainResult<Loan> {
        self.loan(loan_id)
    }

    pub fn list(&self) -> Vec<Loan> {
        self.loans.list()
    }
}
