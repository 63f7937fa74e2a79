use serde::{Deserialize, Serialize};

use storekeep_core::{
    ArticleId, BrandId, CategoryId, DomainError, DomainResult, Entity, TenderId, UnitId,
};

/// How an article is tracked and consumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArticleKind {
    Stock,
    Use,
    Consumable,
    Tool,
}

/// Opaque reference into the external attachment store.
///
/// The engine stores the reference (and whatever payload the store handed
/// back) untouched; transcoding and retrieval live outside this core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentRef {
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<serde_json::Value>,
}

/// Catalog entry for a kind of good, bulk-tracked or individually identified.
///
/// Immutable once created except administrative edits; never deleted while
/// referenced by order lines, loans, leftovers or ledger entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    id: ArticleId,
    name: String,
    code: String,
    /// Price in smallest currency unit (e.g. cents).
    price_cents: i64,
    kind: ArticleKind,
    /// When true, each physical unit is tracked as an [`super::IdentifiedItem`].
    identifiable: bool,
    pub category: Option<CategoryId>,
    pub brand: Option<BrandId>,
    pub unit: Option<UnitId>,
    pub tender: Option<TenderId>,
    pub photo: Option<AttachmentRef>,
}

impl Article {
    pub fn new(
        id: ArticleId,
        name: impl Into<String>,
        code: impl Into<String>,
        price_cents: i64,
        kind: ArticleKind,
        identifiable: bool,
    ) -> DomainResult<Self> {
        let name = name.into();
        let code = code.into();
        if name.trim().is_empty() {
            return Err(DomainError::invalid_input("article name cannot be empty"));
        }
        if code.trim().is_empty() {
            return Err(DomainError::invalid_input("article code cannot be empty"));
        }
        if price_cents < 0 {
            return Err(DomainError::invalid_input("article price cannot be negative"));
        }
        Ok(Self {
            id,
            name,
            code,
            price_cents,
            kind,
            identifiable,
            category: None,
            brand: None,
            unit: None,
            tender: None,
            photo: None,
        })
    }

    pub fn id_typed(&self) -> ArticleId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn price_cents(&self) -> i64 {
        self.price_cents
    }

    pub fn kind(&self) -> ArticleKind {
        self.kind
    }

    pub fn identifiable(&self) -> bool {
        self.identifiable
    }

    /// Administrative edit of name/price. Code and kind are fixed at creation.
    pub fn rename(&mut self, name: impl Into<String>, price_cents: i64) -> DomainResult<()> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::invalid_input("article name cannot be empty"));
        }
        if price_cents < 0 {
            return Err(DomainError::invalid_input("article price cannot be negative"));
        }
        self.name = name;
        self.price_cents = price_cents;
        Ok(())
    }
}

impl Entity for Article {
    type Id = ArticleId;

    fn id(&self) -> &ArticleId {
        &self.id
    }
}
