//! Backend windows and result pages.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A slice of the ordered result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    /// Number of records to skip.
    pub offset: usize,
    /// Maximum number of records to return.
    pub size: usize,
}

impl Window {
    /// Creates the window for a 1-based page of the given size.
    pub fn for_page(page: usize, limit: usize) -> Self {
        Self {
            offset: page.saturating_sub(1).saturating_mul(limit),
            size: limit,
        }
    }

    /// Index one past the last record of the window.
    pub fn end(&self) -> usize {
        self.offset.saturating_add(self.size)
    }
}

/// How a match count relates to the true number of matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CountRelation {
    /// The count is exact.
    #[default]
    Exact,
    /// At least this many records match.
    LowerBound,
}

/// Total number of records matching a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MatchCount {
    pub value: u64,
    pub relation: CountRelation,
}

impl MatchCount {
    /// An exact count.
    pub fn exact(value: u64) -> Self {
        Self {
            value,
            relation: CountRelation::Exact,
        }
    }

    /// A count that is only a lower bound.
    pub fn lower_bound(value: u64) -> Self {
        Self {
            value,
            relation: CountRelation::LowerBound,
        }
    }
}

/// Raw records for one window plus the total match count.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultPage {
    pub items: Vec<Value>,
    pub matched: MatchCount,
}

impl ResultPage {
    /// Creates a page.
    pub fn new(items: Vec<Value>, matched: MatchCount) -> Self {
        Self { items, matched }
    }

    /// A page with nothing in it.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Number of records in the page.
    pub fn returned(&self) -> usize {
        self.items.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_for_page() {
        assert_eq!(Window::for_page(1, 10), Window { offset: 0, size: 10 });
        assert_eq!(Window::for_page(3, 2), Window { offset: 4, size: 2 });
        assert_eq!(Window::for_page(3, 2).end(), 6);
    }

    #[test]
    fn test_empty_page() {
        let page = ResultPage::empty();
        assert_eq!(page.returned(), 0);
        assert_eq!(page.matched, MatchCount::exact(0));
    }
}
