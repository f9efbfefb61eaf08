//! Filter compilation.
//!
//! Each filter dimension present on the request contributes exactly one
//! clause; dimensions combine with AND. Absent dimensions contribute nothing,
//! so an unfiltered search compiles to a query without a root clause.

use serde_json::Value;
use tracing::trace;

use crate::error::ValidationError;
use crate::fields::FieldPath;
use crate::types::request::json_type_name;
use crate::types::{
    Bbox, Clause, CompiledQuery, Datetime, Envelope, Operator, RangeBounds, SearchRequest,
};

/// Compiles the request's filter dimensions into a backend query.
pub fn compile_filter(request: &SearchRequest) -> Result<CompiledQuery, ValidationError> {
    if request.is_unsatisfiable() {
        return Ok(CompiledQuery::match_none());
    }

    let mut clauses = Vec::new();

    if let Some(collections) = &request.collections {
        clauses.push(membership(FieldPath::collection(), collections));
    }

    if let Some(ids) = &request.ids {
        clauses.push(membership(FieldPath::id(), ids));
    }

    if let Some(geometry) = &request.intersects {
        clauses.push(Clause::GeometryIntersects(geometry.clone()));
    } else if let Some(bbox) = &request.bbox {
        clauses.push(envelope_clause(bbox));
    }

    if let Some(datetime) = &request.datetime {
        clauses.push(temporal_clause(&datetime.value)?);
    }

    for (path, predicates) in &request.query {
        let field = FieldPath::parse(path)
            .map_err(|e| ValidationError::new("query", format!("{}: {}", path, e)))?;
        if predicates.is_empty() {
            return Err(ValidationError::new(
                "query",
                format!("no operators given for '{}'", path),
            ));
        }
        for (name, operand) in predicates {
            let op = name
                .parse::<Operator>()
                .map_err(|e| ValidationError::new("query", format!("{}: {}", path, e)))?;
            let clause = compile_predicate(&field, op, operand)
                .map_err(|e| ValidationError::new("query", format!("{}.{}: {}", path, op, e)))?;
            clauses.push(clause);
        }
    }

    trace!(clauses = clauses.len(), "Compiled search filter");
    Ok(CompiledQuery::from_clauses(clauses))
}

fn membership(field: FieldPath, values: &[String]) -> Clause {
    Clause::Terms {
        field,
        values: values.iter().cloned().map(Value::String).collect(),
    }
}

/// Boxes crossing the antimeridian become two envelopes OR'd together.
fn envelope_clause(bbox: &Bbox) -> Clause {
    if bbox.crosses_antimeridian() {
        Clause::Or(vec![
            Clause::Envelope(Envelope {
                west: bbox.west,
                south: bbox.south,
                east: 180.0,
                north: bbox.north,
            }),
            Clause::Envelope(Envelope {
                west: -180.0,
                south: bbox.south,
                east: bbox.east,
                north: bbox.north,
            }),
        ])
    } else {
        Clause::Envelope(Envelope {
            west: bbox.west,
            south: bbox.south,
            east: bbox.east,
            north: bbox.north,
        })
    }
}

fn temporal_clause(datetime: &Datetime) -> Result<Clause, ValidationError> {
    match *datetime {
        Datetime::Instant(instant) => Ok(Clause::TemporalInstant(instant)),
        Datetime::Interval {
            start: None,
            end: None,
        } => Err(ValidationError::new(
            "datetime",
            "interval must be bounded on at least one side",
        )),
        Datetime::Interval {
            start: Some(start),
            end: Some(end),
        } if start > end => Err(ValidationError::new(
            "datetime",
            "interval start is after its end",
        )),
        Datetime::Interval { start, end } => Ok(Clause::TemporalOverlap { start, end }),
    }
}

fn is_scalar(value: &Value) -> bool {
    matches!(value, Value::String(_) | Value::Number(_) | Value::Bool(_))
}

fn compile_predicate(field: &FieldPath, op: Operator, operand: &Value) -> Result<Clause, String> {
    let field = field.clone();
    match op {
        Operator::Eq | Operator::Neq => {
            if !is_scalar(operand) {
                return Err(format!(
                    "expected a string, number or boolean, got {}",
                    json_type_name(operand)
                ));
            }
            let term = Clause::Term {
                field,
                value: operand.clone(),
            };
            Ok(if op == Operator::Eq {
                term
            } else {
                Clause::Not(Box::new(term))
            })
        }
        Operator::Lt | Operator::Lte | Operator::Gt | Operator::Gte => {
            if !matches!(operand, Value::String(_) | Value::Number(_)) {
                return Err(format!(
                    "expected a string or number, got {}",
                    json_type_name(operand)
                ));
            }
            let value = Some(operand.clone());
            let bounds = match op {
                Operator::Lt => RangeBounds {
                    lt: value,
                    ..Default::default()
                },
                Operator::Lte => RangeBounds {
                    lte: value,
                    ..Default::default()
                },
                Operator::Gt => RangeBounds {
                    gt: value,
                    ..Default::default()
                },
                _ => RangeBounds {
                    gte: value,
                    ..Default::default()
                },
            };
            Ok(Clause::Range { field, bounds })
        }
        Operator::In => {
            let Value::Array(values) = operand else {
                return Err(format!("expected an array, got {}", json_type_name(operand)));
            };
            if values.is_empty() {
                return Err("expected at least one value".to_string());
            }
            if let Some(bad) = values.iter().find(|v| !is_scalar(v)) {
                return Err(format!(
                    "values must be strings, numbers or booleans, found {}",
                    json_type_name(bad)
                ));
            }
            Ok(Clause::Terms {
                field,
                values: values.clone(),
            })
        }
        Operator::StartsWith | Operator::EndsWith | Operator::Contains => {
            let Value::String(value) = operand else {
                return Err(format!("expected a string, got {}", json_type_name(operand)));
            };
            let value = value.clone();
            Ok(match op {
                Operator::StartsWith => Clause::Prefix { field, value },
                Operator::EndsWith => Clause::Suffix { field, value },
                _ => Clause::Contains { field, value },
            })
        }
    }
}
