//! Clause evaluation and ordering over item JSON.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use geo::Intersects;
use serde_json::Value;

use crate::fields::FieldPath;
use crate::types::{Clause, Direction, Envelope, RangeBounds, SortSpec};

/// Returns `true` if the item satisfies the clause.
pub(super) fn matches(clause: &Clause, item: &Value) -> bool {
    match clause {
        Clause::And(children) => children.iter().all(|c| matches(c, item)),
        Clause::Or(children) => children.iter().any(|c| matches(c, item)),
        Clause::Not(child) => !matches(child, item),
        Clause::Term { field, value } => values_at(item, field)
            .iter()
            .any(|v| loosely_equal(v, value)),
        Clause::Terms { field, values } => values_at(item, field)
            .iter()
            .any(|v| values.iter().any(|t| loosely_equal(v, t))),
        Clause::Range { field, bounds } => values_at(item, field)
            .iter()
            .any(|v| in_range(v, bounds)),
        Clause::Prefix { field, value } => strings_at(item, field).any(|s| s.starts_with(value)),
        Clause::Suffix { field, value } => strings_at(item, field).any(|s| s.ends_with(value)),
        Clause::Contains { field, value } => {
            strings_at(item, field).any(|s| s.contains(value.as_str()))
        }
        Clause::Envelope(envelope) => item_envelope(item).is_some_and(|e| e.intersects(envelope)),
        Clause::GeometryIntersects(geometry) => {
            match (to_geo(geometry.clone()), item_footprint(item)) {
                (Some(query), Some(footprint)) => query.intersects(&footprint),
                _ => false,
            }
        }
        Clause::TemporalInstant(instant) => match temporal_extent(item) {
            Some((start, end)) => start <= *instant && *instant <= end,
            None => false,
        },
        Clause::TemporalOverlap { start, end } => match temporal_extent(item) {
            Some((item_start, item_end)) => {
                !end.is_some_and(|end| end < item_start)
                    && !start.is_some_and(|start| item_end < start)
            }
            None => false,
        },
        Clause::MatchNone => false,
    }
}

/// Orders two items by the sort keys; missing values sort last.
pub(super) fn compare_items(a: &Value, b: &Value, sort: &SortSpec) -> Ordering {
    for key in sort.keys() {
        let ordering = match (lookup(a, &key.field), lookup(b, &key.field)) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Greater,
            (Some(_), None) => Ordering::Less,
            (Some(x), Some(y)) => {
                let ordering = sort_order(x, y);
                match key.direction {
                    Direction::Asc => ordering,
                    Direction::Desc => ordering.reverse(),
                }
            }
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

fn lookup<'a>(item: &'a Value, field: &FieldPath) -> Option<&'a Value> {
    let mut current = item;
    for segment in field.segments() {
        current = current.get(segment)?;
    }
    (!current.is_null()).then_some(current)
}

/// Values at a path, flattening one level of arrays.
fn values_at<'a>(item: &'a Value, field: &FieldPath) -> Vec<&'a Value> {
    match lookup(item, field) {
        Some(Value::Array(values)) => values.iter().collect(),
        Some(value) => vec![value],
        None => Vec::new(),
    }
}

fn strings_at<'a>(item: &'a Value, field: &FieldPath) -> impl Iterator<Item = &'a str> {
    values_at(item, field).into_iter().filter_map(Value::as_str)
}

fn loosely_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        (Value::String(s), Value::Number(n)) | (Value::Number(n), Value::String(s)) => {
            s.trim().parse::<f64>().ok() == n.as_f64()
        }
        _ => a == b,
    }
}

fn compare(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
        (Value::String(x), Value::String(y)) => Some(compare_strings(x, y)),
        (Value::String(s), Value::Number(n)) => s.trim().parse::<f64>().ok()?.partial_cmp(&n.as_f64()?),
        (Value::Number(n), Value::String(s)) => n.as_f64()?.partial_cmp(&s.trim().parse::<f64>().ok()?),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

/// A total order over JSON values for sorting.
///
/// Values rank by type first (bool, number, string, array, object). Strings
/// that parse as datetimes sort before other strings and compare as
/// instants, with the raw text breaking ties.
fn sort_order(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => {
            let x = x.as_f64().unwrap_or(f64::NAN);
            let y = y.as_f64().unwrap_or(f64::NAN);
            x.total_cmp(&y)
        }
        (Value::String(x), Value::String(y)) => {
            let key = |s: &str| {
                let instant = parse_datetime(s);
                (instant.is_none(), instant)
            };
            key(x.as_str()).cmp(&key(y.as_str())).then_with(|| x.cmp(y))
        }
        (Value::Array(x), Value::Array(y)) => x
            .iter()
            .zip(y)
            .map(|(x, y)| sort_order(x, y))
            .find(|ordering| ordering.is_ne())
            .unwrap_or_else(|| x.len().cmp(&y.len())),
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}

fn type_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

/// Datetimes compare as instants, everything else lexicographically.
fn compare_strings(a: &str, b: &str) -> Ordering {
    match (parse_datetime(a), parse_datetime(b)) {
        (Some(x), Some(y)) => x.cmp(&y),
        _ => a.cmp(b),
    }
}

fn in_range(value: &Value, bounds: &RangeBounds) -> bool {
    let check = |bound: &Option<Value>, accept: fn(Ordering) -> bool| match bound {
        Some(bound) => compare(value, bound).is_some_and(accept),
        None => true,
    };
    check(&bounds.gt, Ordering::is_gt)
        && check(&bounds.gte, Ordering::is_ge)
        && check(&bounds.lt, Ordering::is_lt)
        && check(&bounds.lte, Ordering::is_le)
}

fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// `start_datetime`/`end_datetime` when present, otherwise `datetime` for both.
fn temporal_extent(item: &Value) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let properties = item.get("properties")?;
    let get = |name: &str| {
        properties
            .get(name)
            .and_then(Value::as_str)
            .and_then(parse_datetime)
    };
    let datetime = get("datetime");
    let start = get("start_datetime").or(datetime)?;
    let end = get("end_datetime").or(datetime)?;
    Some((start, end))
}

/// The item's `bbox`, or the envelope of its geometry.
fn item_envelope(item: &Value) -> Option<Envelope> {
    if let Some(envelope) = item_bbox(item) {
        return Some(envelope);
    }
    let geometry = item.get("geometry")?;
    let mut envelope = None;
    json_positions(geometry.get("coordinates")?, &mut envelope);
    envelope
}

fn item_bbox(item: &Value) -> Option<Envelope> {
    let bbox = item.get("bbox")?.as_array()?;
    let values: Vec<f64> = bbox.iter().filter_map(Value::as_f64).collect();
    match values.as_slice() {
        [west, south, east, north] | [west, south, _, east, north, _] => Some(Envelope {
            west: *west,
            south: *south,
            east: *east,
            north: *north,
        }),
        _ => None,
    }
}

/// The item's geometry, or its `bbox` as a rectangle when it has none.
fn item_footprint(item: &Value) -> Option<geo::Geometry<f64>> {
    item.get("geometry")
        .filter(|geometry| !geometry.is_null())
        .and_then(|geometry| serde_json::from_value::<geojson::Geometry>(geometry.clone()).ok())
        .and_then(to_geo)
        .or_else(|| {
            let bbox = item_bbox(item)?;
            Some(geo::Geometry::Rect(geo::Rect::new(
                geo::coord! { x: bbox.west, y: bbox.south },
                geo::coord! { x: bbox.east, y: bbox.north },
            )))
        })
}

fn to_geo(geometry: geojson::Geometry) -> Option<geo::Geometry<f64>> {
    geo::Geometry::<f64>::try_from(geometry).ok()
}

fn extend(envelope: &mut Option<Envelope>, x: f64, y: f64) {
    let e = envelope.get_or_insert(Envelope {
        west: x,
        south: y,
        east: x,
        north: y,
    });
    e.west = e.west.min(x);
    e.south = e.south.min(y);
    e.east = e.east.max(x);
    e.north = e.north.max(y);
}

fn json_positions(coordinates: &Value, envelope: &mut Option<Envelope>) {
    let Some(items) = coordinates.as_array() else {
        return;
    };
    match (items.first().and_then(Value::as_f64), items.get(1).and_then(Value::as_f64)) {
        (Some(x), Some(y)) => extend(envelope, x, y),
        _ => {
            for item in items {
                json_positions(item, envelope);
            }
        }
    }
}
