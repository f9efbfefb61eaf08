//! The compiled filter expression tree.
//!
//! A [`CompiledQuery`] is backend-neutral: each backend walks the [`Clause`]
//! tree and translates it into its own query language. Dimensions combine
//! with [`Clause::And`]; value lists within a dimension use [`Clause::Terms`]
//! or [`Clause::Or`].

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::core::BackendCapability;
use crate::fields::FieldPath;

/// Property predicate operators accepted in `query`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Eq,
    Neq,
    Lt,
    Lte,
    Gt,
    Gte,
    In,
    StartsWith,
    EndsWith,
    Contains,
}

impl Operator {
    /// All operators, in the order they are documented.
    pub const ALL: [Operator; 10] = [
        Operator::Eq,
        Operator::Neq,
        Operator::Lt,
        Operator::Lte,
        Operator::Gt,
        Operator::Gte,
        Operator::In,
        Operator::StartsWith,
        Operator::EndsWith,
        Operator::Contains,
    ];

    /// The wire name of the operator.
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Eq => "eq",
            Operator::Neq => "neq",
            Operator::Lt => "lt",
            Operator::Lte => "lte",
            Operator::Gt => "gt",
            Operator::Gte => "gte",
            Operator::In => "in",
            Operator::StartsWith => "startsWith",
            Operator::EndsWith => "endsWith",
            Operator::Contains => "contains",
        }
    }
}

impl FromStr for Operator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Operator::ALL
            .into_iter()
            .find(|op| op.as_str() == s)
            .ok_or_else(|| format!("unknown operator '{}'", s))
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Bounds of a range clause. At least one bound is set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RangeBounds {
    pub gt: Option<Value>,
    pub gte: Option<Value>,
    pub lt: Option<Value>,
    pub lte: Option<Value>,
}

/// An axis-aligned envelope that does not cross the antimeridian.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Envelope {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
}

impl Envelope {
    /// Returns `true` if the two envelopes share at least one point.
    pub fn intersects(&self, other: &Envelope) -> bool {
        self.west <= other.east
            && other.west <= self.east
            && self.south <= other.north
            && other.south <= self.north
    }
}

/// A node of the filter expression tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Clause {
    /// All children must match.
    And(Vec<Clause>),
    /// At least one child must match.
    Or(Vec<Clause>),
    /// The child must not match.
    Not(Box<Clause>),
    /// Field equals the value.
    Term { field: FieldPath, value: Value },
    /// Field equals one of the values.
    Terms { field: FieldPath, values: Vec<Value> },
    /// Field lies within the bounds.
    Range { field: FieldPath, bounds: RangeBounds },
    /// String field starts with the value.
    Prefix { field: FieldPath, value: String },
    /// String field ends with the value.
    Suffix { field: FieldPath, value: String },
    /// String field contains the value.
    Contains { field: FieldPath, value: String },
    /// Item footprint intersects the envelope.
    Envelope(Envelope),
    /// Item footprint intersects the geometry.
    GeometryIntersects(geojson::Geometry),
    /// Item datetime equals the instant, or its start/end range contains it.
    TemporalInstant(DateTime<Utc>),
    /// Item temporal extent overlaps the interval; `None` is unbounded.
    TemporalOverlap {
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    },
    /// Matches nothing.
    MatchNone,
}

impl Clause {
    /// Collects the backend capabilities needed to evaluate this clause.
    pub fn required_capabilities(&self, out: &mut Vec<BackendCapability>) {
        let capability = match self {
            Clause::And(children) | Clause::Or(children) => {
                for child in children {
                    child.required_capabilities(out);
                }
                return;
            }
            Clause::Not(child) => {
                child.required_capabilities(out);
                return;
            }
            Clause::Term { .. } | Clause::Terms { .. } => BackendCapability::TermFilter,
            Clause::Range { .. } => BackendCapability::RangeFilter,
            Clause::Prefix { .. } | Clause::Suffix { .. } | Clause::Contains { .. } => {
                BackendCapability::StringMatch
            }
            Clause::Envelope(_) => BackendCapability::EnvelopeFilter,
            Clause::GeometryIntersects(_) => BackendCapability::GeometryFilter,
            Clause::TemporalInstant(_) | Clause::TemporalOverlap { .. } => {
                BackendCapability::TemporalFilter
            }
            Clause::MatchNone => return,
        };
        if !out.contains(&capability) {
            out.push(capability);
        }
    }
}

/// A compiled filter. An absent root matches every item.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompiledQuery {
    root: Option<Clause>,
}

impl CompiledQuery {
    /// A query that matches every item.
    pub fn match_all() -> Self {
        Self { root: None }
    }

    /// A query that matches nothing.
    pub fn match_none() -> Self {
        Self {
            root: Some(Clause::MatchNone),
        }
    }

    /// Combines dimension clauses with AND.
    pub fn from_clauses(mut clauses: Vec<Clause>) -> Self {
        let root = match clauses.len() {
            0 => None,
            1 => clauses.pop(),
            _ => Some(Clause::And(clauses)),
        };
        Self { root }
    }

    /// Returns the root clause.
    pub fn root(&self) -> Option<&Clause> {
        self.root.as_ref()
    }

    /// Returns `true` if the query can be answered without asking the backend.
    pub fn is_unsatisfiable(&self) -> bool {
        matches!(self.root, Some(Clause::MatchNone))
    }

    /// Backend capabilities needed to evaluate the query.
    pub fn required_capabilities(&self) -> Vec<BackendCapability> {
        let mut caps = Vec::new();
        if let Some(root) = &self.root {
            root.required_capabilities(&mut caps);
        }
        caps
    }
}
