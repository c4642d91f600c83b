//! Paged list results.
//!
//! A list call takes a [`PageRequest`] and answers with a [`Page`]. `total` counts every
//! matching row before the window is applied:
//!
//! - `has_next = offset + limit < total`
//! - `has_previous = offset > 0`

use crate::error::{LibError, LibResult};
use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_LIMIT: u64 = 10;

/// Window and optional free-text search for a list call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageRequest {
    pub offset: u64,
    pub limit: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: DEFAULT_PAGE_LIMIT,
            search: None,
        }
    }
}

impl PageRequest {
    pub fn new(offset: u64, limit: u64) -> Self {
        Self {
            offset,
            limit,
            search: None,
        }
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    /// The search term, if present and non-blank, trimmed.
    pub fn search_term(&self) -> Option<&str> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    pub fn validate(&self) -> LibResult<()> {
        if self.limit == 0 {
            return Err(LibError::InvalidPage("limit must be positive".into()));
        }
        Ok(())
    }

    /// The following window, same limit and search.
    pub fn next(&self) -> Self {
        Self {
            offset: self.offset.saturating_add(self.limit),
            ..self.clone()
        }
    }

    /// The preceding window, clamped at offset 0.
    pub fn previous(&self) -> Self {
        Self {
            offset: self.offset.saturating_sub(self.limit),
            ..self.clone()
        }
    }
}

/// Position of a page within the full result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub offset: u64,
    pub limit: u64,
    pub total: u64,
    pub has_next: bool,
    pub has_previous: bool,
}

impl Pagination {
    pub fn new(offset: u64, limit: u64, total: u64) -> Self {
        Self {
            offset,
            limit,
            total,
            has_next: offset.saturating_add(limit) < total,
            has_previous: offset > 0,
        }
    }
}

/// One window of items plus its pagination metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub pagination: Pagination,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, req: &PageRequest, total: u64) -> Self {
        Self {
            items,
            pagination: Pagination::new(req.offset, req.limit, total),
        }
    }

    /// Slice an already-filtered in-memory collection.
    pub fn from_slice(all: &[T], req: &PageRequest) -> Self
    where
        T: Clone,
    {
        let total = all.len() as u64;
        let start = usize::try_from(req.offset).unwrap_or(usize::MAX).min(all.len());
        let len = usize::try_from(req.limit).unwrap_or(usize::MAX);
        let end = start.saturating_add(len).min(all.len());
        Self::new(all[start..end].to_vec(), req, total)
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            pagination: self.pagination,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
