use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use storekeep_core::{ArticleId, DomainError, DomainResult, Entity, IdentifiedItemId};

/// Lifecycle state of one traceable physical unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemState {
    Active,
    UnderReview,
    Retired,
}

/// One unique physical instance of an identifiable article.
///
/// Invariant: `state == Retired` implies `cause` is non-empty and
/// `retired_at` is set. Enforced here, in the state machine, so rejections
/// happen before any write attempt and messages stay precise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentifiedItem {
    id: IdentifiedItemId,
    article_id: ArticleId,
    code: String,
    state: ItemState,
    cause: Option<String>,
    retired_at: Option<DateTime<Utc>>,
}

impl IdentifiedItem {
    pub fn new(
        id: IdentifiedItemId,
        article_id: ArticleId,
        code: impl Into<String>,
    ) -> DomainResult<Self> {
        let code = code.into();
        if code.trim().is_empty() {
            return Err(DomainError::invalid_input("item code cannot be empty"));
        }
        Ok(Self {
            id,
            article_id,
            code,
            state: ItemState::Active,
            cause: None,
            retired_at: None,
        })
    }

    pub fn id_typed(&self) -> IdentifiedItemId {
        self.id
    }

    pub fn article_id(&self) -> ArticleId {
        self.article_id
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn state(&self) -> ItemState {
        self.state
    }

    pub fn cause(&self) -> Option<&str> {
        self.cause.as_deref()
    }

    pub fn retired_at(&self) -> Option<DateTime<Utc>> {
        self.retired_at
    }

    /// `Active -> UnderReview`. Requires a non-empty cause; allowed at any
    /// time while the unit is active.
    pub fn begin_review(&mut self, cause: &str) -> DomainResult<()> {
        if self.state != ItemState::Active {
            return Err(DomainError::invalid_transition(format!(
                "cannot put item {} under review from {:?}",
                self.code, self.state
            )));
        }
        if cause.trim().is_empty() {
            return Err(DomainError::invalid_input("review cause cannot be empty"));
        }
        self.state = ItemState::UnderReview;
        self.cause = Some(cause.trim().to_string());
        Ok(())
    }

    /// `UnderReview -> Retired`. The direct `Active -> Retired` shortcut is
    /// rejected: retirement always passes through review.
    ///
    /// The retirement cause may replace the review cause or, when `None`,
    /// reuse it. Absent both, the call is rejected.
    pub fn retire(&mut self, cause: Option<&str>, now: DateTime<Utc>) -> DomainResult<()> {
        match self.state {
            ItemState::UnderReview => {}
            ItemState::Active => {
                return Err(DomainError::invalid_transition(format!(
                    "item {} must be under review before retirement",
                    self.code
                )));
            }
            ItemState::Retired => {
                return Err(DomainError::invalid_transition(format!(
                    "item {} is already retired",
                    self.code
                )));
            }
        }

        let effective = match cause {
            Some(c) if !c.trim().is_empty() => Some(c.trim().to_string()),
            Some(_) => None,
            None => self.cause.clone().filter(|c| !c.trim().is_empty()),
        };
        let Some(effective) = effective else {
            return Err(DomainError::invalid_input(
                "retirement cause cannot be empty",
            ));
        };

        self.state = ItemState::Retired;
        self.cause = Some(effective);
        self.retired_at = Some(now);
        Ok(())
    }

    /// `Retired -> Active`: explicit reinstatement. Not a reversal of
    /// history; the retirement's ledger entry stays, and the caller appends a
    /// compensating IN entry for the unit.
    pub fn reinstate(&mut self) -> DomainResult<()> {
        if self.state != ItemState::Retired {
            return Err(DomainError::invalid_transition(format!(
                "cannot reinstate item {} from {:?}",
                self.code, self.state
            )));
        }
        self.state = ItemState::Active;
        self.cause = None;
        self.retired_at = None;
        Ok(())
    }
}

impl Entity for IdentifiedItem {
    type Id = IdentifiedItemId;

    fn id(&self) -> &IdentifiedItemId {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_item() -> IdentifiedItem {
        IdentifiedItem::new(IdentifiedItemId::new(), ArticleId::new(), "DRILL-0042").unwrap()
    }

    #[test]
    fn new_items_start_active() {
        let item = test_item();
        assert_eq!(item.state(), ItemState::Active);
        assert!(item.cause().is_none());
        assert!(item.retired_at().is_none());
    }

    #[test]
    fn review_requires_cause() {
        let mut item = test_item();
        let err = item.begin_review("  ").unwrap_err();
        assert!(matches!(err, DomainError::InvalidInput(_)));
        assert_eq!(item.state(), ItemState::Active);

        item.begin_review("bent chuck").unwrap();
        assert_eq!(item.state(), ItemState::UnderReview);
        assert_eq!(item.cause(), Some("bent chuck"));
    }

    #[test]
    fn direct_retirement_from_active_is_rejected() {
        let mut item = test_item();
        let err = item.retire(Some("broken"), Utc::now()).unwrap_err();
        assert!(matches!(err, DomainError::InvalidTransition(_)));
        assert_eq!(item.state(), ItemState::Active);
    }

    #[test]
    fn retirement_reuses_review_cause_when_none_given() {
        let mut item = test_item();
        item.begin_review("bent chuck").unwrap();
        item.retire(None, Utc::now()).unwrap();
        assert_eq!(item.state(), ItemState::Retired);
        assert_eq!(item.cause(), Some("bent chuck"));
        assert!(item.retired_at().is_some());
    }

    #[test]
    fn retirement_with_empty_cause_is_rejected() {
        let mut item = test_item();
        item.begin_review("bent chuck").unwrap();
        // Explicit empty cause does not fall back to the review cause.
        let err = item.retire(Some(""), Utc::now()).unwrap_err();
        assert!(matches!(err, DomainError::InvalidInput(_)));
        assert_eq!(item.state(), ItemState::UnderReview);
    }

    #[test]
    fn replacement_cause_overrides_review_cause() {
        let mut item = test_item();
        item.begin_review("bent chuck").unwrap();
        item.retire(Some("motor burned out"), Utc::now()).unwrap();
        assert_eq!(item.cause(), Some("motor burned out"));
    }

    #[test]
    fn reinstatement_returns_to_active_and_clears_retirement() {
        let mut item = test_item();
        item.begin_review("x").unwrap();
        item.retire(None, Utc::now()).unwrap();

        item.reinstate().unwrap();
        assert_eq!(item.state(), ItemState::Active);
        assert!(item.cause().is_none());
        assert!(item.retired_at().is_none());

        let err = item.reinstate().unwrap_err();
        assert!(matches!(err, DomainError::InvalidTransition(_)));
    }
}
