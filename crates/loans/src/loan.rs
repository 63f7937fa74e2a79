use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use storekeep_core::{
    ArticleId, DomainError, DomainResult, Entity, LoanId, LoanLineId, LocationId,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoanStatus {
    Active,
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoanLineStatus {
    Lent,
    Returned,
}

/// One article lent out. Invariant: `0 <= returned <= lent`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanLine {
    id: LoanLineId,
    pub article_id: ArticleId,
    lent: i64,
    returned: i64,
    status: LoanLineStatus,
}

impl LoanLine {
    pub(crate) fn new(article_id: ArticleId, lent: i64) -> DomainResult<Self> {
        if lent <= 0 {
            return Err(DomainError::invalid_input("lent quantity must be positive"));
        }
        Ok(Self {
            id: LoanLineId::new(),
            article_id,
            lent,
            returned: 0,
            status: LoanLineStatus::Lent,
        })
    }

    pub fn id_typed(&self) -> LoanLineId {
        self.id
    }

    pub fn lent(&self) -> i64 {
        self.lent
    }

    pub fn returned(&self) -> i64 {
        self.returned
    }

    pub fn status(&self) -> LoanLineStatus {
        self.status
    }

    /// Quantity still out on loan.
    pub fn outstanding(&self) -> i64 {
        self.lent - self.returned
    }

    /// Accept a partial return. Flips to `Returned` when nothing is left out.
    pub fn accept_return(&mut self, qty: i64) -> DomainResult<()> {
        if qty <= 0 {
            return Err(DomainError::invalid_input("returned quantity must be positive"));
        }
        let outstanding = self.outstanding();
        if qty > outstanding {
            return Err(DomainError::over_delivery(format!(
                "returning {qty}, only {outstanding} outstanding"
            )));
        }
        self.returned += qty;
        if self.outstanding() == 0 {
            self.status = LoanLineStatus::Returned;
        }
        Ok(())
    }
}

/// An authorized temporary removal of stock. Loans reserve availability but
/// never touch existence rows or the movement ledger; the quantity is
/// expected back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Loan {
    id: LoanId,
    /// Person who signed the goods out.
    pub authorizer: String,
    pub location: Option<LocationId>,
    pub opened_at: DateTime<Utc>,
    status: LoanStatus,
    lines: Vec<LoanLine>,
}

impl Loan {
    pub(crate) fn new(
        id: LoanId,
        authorizer: impl Into<String>,
        location: Option<LocationId>,
        lines: Vec<LoanLine>,
        opened_at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let authorizer = authorizer.into();
        if authorizer.trim().is_empty() {
            return Err(DomainError::invalid_input("loan authorizer cannot be empty"));
        }
        if lines.is_empty() {
            return Err(DomainError::invalid_input("a loan needs at least one line"));
        }
        Ok(Self {
            id,
            authorizer,
            location,
            opened_at,
            status: LoanStatus::Active,
            lines,
        })
    }

    pub fn id_typed(&self) -> LoanId {
        self.id
    }

    pub fn status(&self) -> LoanStatus {
        self.status
    }

    pub fn lines(&self) -> &[LoanLine] {
        &self.lines
    }

    pub fn line(&self, line_id: LoanLineId) -> DomainResult<&LoanLine> {
        self.lines
            .iter()
            .find(|l| l.id == line_id)
            .ok_or_else(|| DomainError::not_found(format!("loan line {line_id}")))
    }

    pub(crate) fn line_mut(&mut self, line_id: LoanLineId) -> DomainResult<&mut LoanLine> {
        self.lines
            .iter_mut()
            .find(|l| l.id == line_id)
            .ok_or_else(|| DomainError::not_found(format!("loan line {line_id}")))
    }

    pub(crate) fn ensure_active(&self) -> DomainResult<()> {
        if self.status != LoanStatus::Active {
            return Err(DomainError::invalid_transition(format!(
                "loan {} is already returned in full",
                self.id
            )));
        }
        Ok(())
    }

    /// Auto-close: a loan is done when every line has been returned in full.
    pub(crate) fn refresh_status(&mut self) {
        if self.lines.iter().all(|l| l.status == LoanLineStatus::Returned) {
            self.status = LoanStatus::Done;
        }
    }

    /// Quantity of one article still out on this loan.
    pub fn outstanding_for(&self, article_id: ArticleId) -> i64 {
        self.lines
            .iter()
            .filter(|l| l.article_id == article_id)
            .map(LoanLine::outstanding)
            .sum()
    }
}

impl Entity for Loan {
    type Id = LoanId;

    fn id(&self) -> &LoanId {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn returns_stay_within_the_lent_window() {
        let mut line = LoanLine::new(ArticleId::new(), 3).unwrap();
        line.accept_return(2).unwrap();
        assert_eq!(line.outstanding(), 1);
        assert_eq!(line.status(), LoanLineStatus::Lent);

        let err = line.accept_return(2).unwrap_err();
        assert!(matches!(err, DomainError::OverDelivery(_)));

        line.accept_return(1).unwrap();
        assert_eq!(line.status(), LoanLineStatus::Returned);
    }

    #[test]
    fn loan_closes_only_when_every_line_is_returned() {
        let article = ArticleId::new();
        let lines = vec![
            LoanLine::new(article, 3).unwrap(),
            LoanLine::new(article, 5).unwrap(),
        ];
        let ids: Vec<LoanLineId> = lines.iter().map(LoanLine::id_typed).collect();
        let mut loan =
            Loan::new(LoanId::new(), "R. Ayala", None, lines, Utc::now()).unwrap();

        loan.line_mut(ids[0]).unwrap().accept_return(3).unwrap();
        loan.refresh_status();
        assert_eq!(loan.status(), LoanStatus::Active);

        loan.line_mut(ids[1]).unwrap().accept_return(5).unwrap();
        loan.refresh_status();
        assert_eq!(loan.status(), LoanStatus::Done);
    }

    #[test]
    fn empty_authorizer_and_empty_lines_are_rejected() {
        let line = LoanLine::new(ArticleId::new(), 1).unwrap();
        assert!(Loan::new(LoanId::new(), "  ", None, vec![line], Utc::now()).is_err());
        assert!(Loan::new(LoanId::new(), "R. Ayala", None, vec![], Utc::now()).is_err());
    }
}
