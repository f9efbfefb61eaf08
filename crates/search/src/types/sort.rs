//! Compiled sort specifications.

use crate::fields::FieldPath;

use super::request::Direction;

/// One resolved sort key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortField {
    pub field: FieldPath,
    pub direction: Direction,
}

impl SortField {
    /// Creates a sort key.
    pub fn new(field: FieldPath, direction: Direction) -> Self {
        Self { field, direction }
    }
}

/// An ordered list of sort keys whose last key is always the item id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    keys: Vec<SortField>,
}

impl SortSpec {
    /// Builds a spec, appending `id asc` unless `id` is already the last key.
    pub fn new(mut keys: Vec<SortField>) -> Self {
        if !keys.last().is_some_and(|k| k.field.is_id()) {
            keys.push(SortField::new(FieldPath::id(), Direction::Asc));
        }
        Self { keys }
    }

    /// Newest first, then by id.
    pub fn default_order() -> Self {
        Self::new(vec![SortField::new(
            FieldPath::property("datetime"),
            Direction::Desc,
        )])
    }

    /// The keys in priority order.
    pub fn keys(&self) -> &[SortField] {
        &self.keys
    }
}

impl Default for SortSpec {
    fn default() -> Self {
        Self::default_order()
    }
}
