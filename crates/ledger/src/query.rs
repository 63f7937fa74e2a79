//! Query surface of the movement ledger.
//!
//! Read-only audit/reporting interface: text, kind, source-kind and
//! date-range filters, sort by any column, page-based pagination.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entry::{MovementEntry, MovementKind, SourceKind};

/// Filter criteria for ledger queries. Empty filter matches everything.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MovementFilter {
    /// Case-insensitive substring match against article name or code.
    pub text_search: Option<String>,
    pub kind: Option<MovementKind>,
    pub source_kind: Option<SourceKind>,
    pub date_from: Option<DateTime<Utc>>,
    pub date_to: Option<DateTime<Utc>>,
}

impl MovementFilter {
    pub fn matches(&self, entry: &MovementEntry) -> bool {
        if let Some(text) = &self.text_search {
            let needle = text.to_lowercase();
            let hit = entry.article_name.to_lowercase().contains(&needle)
                || entry.article_code.to_lowercase().contains(&needle);
            if !hit {
                return false;
            }
        }
        if let Some(kind) = self.kind {
            if entry.kind != kind {
                return false;
            }
        }
        if let Some(source_kind) = self.source_kind {
            if entry.source.kind() != source_kind {
                return false;
            }
        }
        if let Some(from) = self.date_from {
            if entry.occurred_at < from {
                return false;
            }
        }
        if let Some(to) = self.date_to {
            if entry.occurred_at > to {
                return false;
            }
        }
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortColumn {
    OccurredAt,
    ArticleName,
    Kind,
    Quantity,
    SourceKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

/// Sort order for ledger queries. Defaults to newest first.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MovementSort {
    pub column: SortColumn,
    pub direction: SortDirection,
}

impl Default for MovementSort {
    fn default() -> Self {
        Self {
            column: SortColumn::OccurredAt,
            direction: SortDirection::Desc,
        }
    }
}

impl MovementSort {
    pub fn apply(&self, rows: &mut [MovementEntry]) {
        match self.column {
            SortColumn::OccurredAt => rows.sort_by_key(|e| e.occurred_at),
            SortColumn::ArticleName => {
                rows.sort_by(|a, b| a.article_name.cmp(&b.article_name));
            }
            SortColumn::Kind => rows.sort_by_key(|e| e.kind),
            SortColumn::Quantity => rows.sort_by_key(|e| e.quantity),
            SortColumn::SourceKind => rows.sort_by_key(|e| e.source.kind()),
        }
        if self.direction == SortDirection::Desc {
            rows.reverse();
        }
    }
}

/// Page-based pagination parameters (1-based page number).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PageRequest {
    pub page: u32,
    pub per_page: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: 50,
        }
    }
}

impl PageRequest {
    pub fn new(page: Option<u32>, per_page: Option<u32>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            per_page: per_page.unwrap_or(50).clamp(1, 500),
        }
    }
}

/// One page of ledger query results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovementPage {
    pub rows: Vec<MovementEntry>,
    pub total: u64,
    pub total_pages: u32,
}

impl MovementPage {
    /// Filter, sort and slice a full entry snapshot into one page.
    pub fn build(
        entries: Vec<MovementEntry>,
        filter: &MovementFilter,
        sort: MovementSort,
        page: PageRequest,
    ) -> Self {
        let mut rows: Vec<MovementEntry> =
            entries.into_iter().filter(|e| filter.matches(e)).collect();
        sort.apply(&mut rows);

        let total = rows.len() as u64;
        let per_page = page.per_page.max(1) as u64;
        let total_pages = total.div_ceil(per_page) as u32;

        let start = ((page.page.max(1) - 1) as u64 * per_page) as usize;
        let rows = if start >= rows.len() {
            Vec::new()
        } else {
            rows.into_iter().skip(start).take(per_page as usize).collect()
        };

        Self {
            rows,
            total,
            total_pages,
        }
    }
}
