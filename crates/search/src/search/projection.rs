//! Field projection.
//!
//! Include and exclude paths are parsed into segment trees once per request
//! and every record is walked against them. The rules, in priority order:
//!
//! 1. Mandatory top-level fields survive unless excluded by name.
//! 2. A non-empty `include` keeps only included paths (plus mandatory
//!    fields); `exclude` then removes the same path or any descendant.
//! 3. An empty `include` keeps everything not excluded.
//! 4. Without `fields` the record is returned untouched.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::types::FieldsSpec;

/// Top-level fields every feature keeps unless explicitly excluded.
pub const MANDATORY_FIELDS: &[&str] = &[
    "id",
    "type",
    "collection",
    "geometry",
    "bbox",
    "links",
    "assets",
];

#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct PathTree {
    children: BTreeMap<String, PathTree>,
    /// The path ending here was named; the whole subtree is selected.
    terminal: bool,
}

impl PathTree {
    fn from_paths<'a>(paths: impl IntoIterator<Item = &'a String>) -> Self {
        let mut root = PathTree::default();
        for path in paths {
            let mut node = &mut root;
            for segment in path.split('.').map(str::trim) {
                node = node.children.entry(segment.to_string()).or_default();
            }
            node.terminal = true;
        }
        root
    }

    fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

/// A compiled include/exclude projection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Projection {
    include: PathTree,
    exclude: PathTree,
}

impl Projection {
    /// Compiles a projection. Returns `None` when there is nothing to apply.
    pub fn compile(fields: Option<&FieldsSpec>) -> Option<Self> {
        let fields = fields?;
        if fields.is_empty() {
            return None;
        }
        Some(Self {
            include: PathTree::from_paths(&fields.include),
            exclude: PathTree::from_paths(&fields.exclude),
        })
    }

    /// Applies the projection to one record.
    pub fn apply(&self, record: Value) -> Value {
        let Value::Object(map) = record else {
            return record;
        };

        let mut out = Map::new();
        for (key, value) in map {
            let excluded = self.exclude.children.get(&key);
            if excluded.is_some_and(|node| node.terminal) {
                continue;
            }

            let kept = if self.include.is_empty() || MANDATORY_FIELDS.contains(&key.as_str()) {
                Some(value)
            } else {
                match self.include.children.get(&key) {
                    None => None,
                    Some(node) if node.terminal => Some(value),
                    Some(node) => select(value, node),
                }
            };

            if let Some(mut value) = kept {
                if let Some(node) = excluded {
                    prune(&mut value, node);
                }
                out.insert(key, value);
            }
        }
        Value::Object(out)
    }
}

/// Applies an optional projection; `None` returns the record as-is.
pub fn project(record: Value, projection: Option<&Projection>) -> Value {
    match projection {
        Some(projection) => projection.apply(record),
        None => record,
    }
}

/// Keeps only the descendants of `value` named by `node`.
fn select(value: Value, node: &PathTree) -> Option<Value> {
    match value {
        Value::Object(mut map) => {
            let mut out = Map::new();
            for (name, child) in &node.children {
                let Some(inner) = map.remove(name) else {
                    continue;
                };
                let selected = if child.terminal {
                    Some(inner)
                } else {
                    select(inner, child)
                };
                if let Some(selected) = selected {
                    out.insert(name.clone(), selected);
                }
            }
            (!out.is_empty()).then_some(Value::Object(out))
        }
        Value::Array(items) => {
            let items: Vec<Value> = items
                .into_iter()
                .filter_map(|item| select(item, node))
                .collect();
            (!items.is_empty()).then_some(Value::Array(items))
        }
        _ => None,
    }
}

/// Removes the descendants of `value` named by `node`.
fn prune(value: &mut Value, node: &PathTree) {
    match value {
        Value::Object(map) => {
            for (name, child) in &node.children {
                if child.terminal {
                    map.remove(name);
                } else if let Some(inner) = map.get_mut(name) {
                    prune(inner, child);
                }
            }
        }
        Value::Array(items) => {
            for item in items {
                prune(item, node);
            }
        }
        _ => {}
    }
}
