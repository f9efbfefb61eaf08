//! Request normalization.
//!
//! Both transports carry the same logical fields, but GET values are always
//! strings and clients routinely send structured values (`intersects`,
//! `sort`, `fields`, `query`) as JSON text, sometimes percent-encoded a
//! second time. This module folds all of those shapes into one
//! [`SearchRequest`]; nothing downstream looks at the transport encoding.

use std::collections::BTreeMap;

use serde_json::Value;
use tracing::debug;

use crate::config::SearchConfig;
use crate::error::ValidationError;
use crate::types::request::json_type_name;
use crate::types::{
    Bbox, DatetimeFilter, Direction, FieldsSpec, RawSearchRequest, SearchRequest, SortBy,
    Transport,
};

/// Normalizes a raw request.
///
/// `scope` is the collection id from a `/collections/{id}/items` path. It is
/// intersected with any `collections` the request names; a mismatch leaves
/// the effective collection set empty rather than failing.
pub fn normalize(
    raw: &RawSearchRequest,
    scope: Option<&str>,
    config: &SearchConfig,
) -> Result<SearchRequest, ValidationError> {
    let transport = raw.transport;

    let requested_collections = param(raw, "collections")
        .map(|v| string_list("collections", v, transport))
        .transpose()?
        .filter(|c| !c.is_empty());

    let collections = match (scope, &requested_collections) {
        (Some(scope), Some(requested)) => Some(
            requested
                .iter()
                .filter(|c| c.as_str() == scope)
                .cloned()
                .collect(),
        ),
        (Some(scope), None) => Some(vec![scope.to_string()]),
        (None, requested) => requested.clone(),
    };

    let ids = param(raw, "ids")
        .map(|v| string_list("ids", v, transport))
        .transpose()?
        .filter(|ids| !ids.is_empty());

    let intersects = param(raw, "intersects").map(parse_intersects).transpose()?;
    let mut bbox = param(raw, "bbox").map(parse_bbox).transpose()?;
    if intersects.is_some() && bbox.is_some() {
        debug!("both bbox and intersects given; intersects takes precedence");
        bbox = None;
    }

    let datetime = param(raw, "datetime")
        .map(|v| match v {
            Value::String(s) => DatetimeFilter::parse(s),
            other => Err(format!("expected a string, got {}", json_type_name(other))),
        })
        .transpose()
        .map_err(|e| ValidationError::new("datetime", e))?;

    let query = param(raw, "query")
        .map(parse_query)
        .transpose()?
        .unwrap_or_default();

    let sort = match (param(raw, "sort"), param(raw, "sortby")) {
        (Some(v), _) => Some(parse_sort("sort", v)?),
        (None, Some(v)) => Some(parse_sort("sortby", v)?),
        (None, None) => None,
    }
    .filter(|keys| !keys.is_empty());

    let fields = param(raw, "fields").map(parse_fields).transpose()?;

    let max_limit = config.max_limit.max(1);
    let limit = match param(raw, "limit") {
        Some(v) => to_usize(positive_integer("limit", v)?).min(max_limit),
        None => config.default_limit.clamp(1, max_limit),
    };
    let page = match param(raw, "page") {
        Some(v) => to_usize(positive_integer("page", v)?),
        None => 1,
    };

    debug!(
        transport = %transport,
        scope = scope.unwrap_or(""),
        limit,
        page,
        "Normalized search request"
    );

    Ok(SearchRequest {
        transport,
        scope: scope.map(str::to_string),
        collections,
        requested_collections,
        ids,
        bbox,
        intersects,
        datetime,
        query,
        sort,
        fields,
        limit,
        page,
    })
}

/// Looks up a parameter, treating `null` and blank strings as absent.
fn param<'a>(raw: &'a RawSearchRequest, name: &str) -> Option<&'a Value> {
    match raw.get(name) {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) if s.trim().is_empty() => None,
        Some(value) => Some(value),
    }
}

fn looks_like_json(text: &str) -> bool {
    text.starts_with('[') || text.starts_with('{') || text.starts_with('%')
}

/// Decodes a value that may have been sent as JSON text.
fn decode_json(field: &str, value: &Value) -> Result<Value, ValidationError> {
    let Value::String(text) = value else {
        return Ok(value.clone());
    };

    let text = text.trim();
    let text = if text.starts_with('%') {
        urlencoding::decode(text)
            .map_err(|e| ValidationError::new(field, format!("invalid percent-encoding: {}", e)))?
            .into_owned()
    } else {
        text.to_string()
    };

    serde_json::from_str(&text)
        .map_err(|e| ValidationError::new(field, format!("invalid JSON: {}", e)))
}

fn push_unique(out: &mut Vec<String>, value: &str) {
    let value = value.trim();
    if !value.is_empty() && !out.iter().any(|v| v == value) {
        out.push(value.to_string());
    }
}

/// Accepts a native list, a comma-separated string or repeated GET keys.
fn string_list(
    field: &str,
    value: &Value,
    transport: Transport,
) -> Result<Vec<String>, ValidationError> {
    let mut out = Vec::new();
    match value {
        Value::String(s) => {
            for part in s.split(',') {
                push_unique(&mut out, part);
            }
        }
        Value::Array(items) => {
            for item in items {
                match item {
                    Value::String(s) if transport == Transport::Get => {
                        for part in s.split(',') {
                            push_unique(&mut out, part);
                        }
                    }
                    Value::String(s) => push_unique(&mut out, s),
                    Value::Number(n) => push_unique(&mut out, &n.to_string()),
                    other => {
                        return Err(ValidationError::new(
                            field,
                            format!("expected a list of strings, found {}", json_type_name(other)),
                        ));
                    }
                }
            }
        }
        other => {
            return Err(ValidationError::new(
                field,
                format!(
                    "expected a list or comma-separated string, got {}",
                    json_type_name(other)
                ),
            ));
        }
    }
    Ok(out)
}

fn parse_number(field: &str, value: &Value) -> Result<f64, ValidationError> {
    match value {
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| ValidationError::new(field, format!("'{}' is not a number", n))),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| ValidationError::new(field, format!("'{}' is not a number", s.trim()))),
        other => Err(ValidationError::new(
            field,
            format!("expected a number, got {}", json_type_name(other)),
        )),
    }
}

fn parse_bbox(value: &Value) -> Result<Bbox, ValidationError> {
    let values = match value {
        Value::String(s) => {
            let s = s.trim();
            let s = s
                .strip_prefix('[')
                .and_then(|s| s.strip_suffix(']'))
                .unwrap_or(s);
            s.split(',')
                .map(|part| parse_number("bbox", &Value::String(part.to_string())))
                .collect::<Result<Vec<_>, _>>()?
        }
        Value::Array(items) => items
            .iter()
            .map(|item| parse_number("bbox", item))
            .collect::<Result<Vec<_>, _>>()?,
        other => {
            return Err(ValidationError::new(
                "bbox",
                format!("expected an array of numbers, got {}", json_type_name(other)),
            ));
        }
    };

    Bbox::from_values(&values).map_err(|e| ValidationError::new("bbox", e))
}

fn parse_intersects(value: &Value) -> Result<geojson::Geometry, ValidationError> {
    let decoded = match decode_json("intersects", value)? {
        Value::Object(mut map) if map.get("type").and_then(Value::as_str) == Some("Feature") => {
            map.remove("geometry").unwrap_or(Value::Null)
        }
        other => other,
    };

    serde_json::from_value::<geojson::Geometry>(decoded)
        .map_err(|e| ValidationError::new("intersects", format!("invalid GeoJSON geometry: {}", e)))
}

fn parse_query(value: &Value) -> Result<BTreeMap<String, BTreeMap<String, Value>>, ValidationError> {
    let Value::Object(properties) = decode_json("query", value)? else {
        return Err(ValidationError::new(
            "query",
            "expected an object mapping property names to predicates",
        ));
    };

    let mut query = BTreeMap::new();
    for (path, predicates) in properties {
        let Value::Object(predicates) = predicates else {
            return Err(ValidationError::new(
                "query",
                format!("predicates for '{}' must be an object of operator to value", path),
            ));
        };
        query.insert(path, predicates.into_iter().collect());
    }
    Ok(query)
}

/// Parses `-field,+field,field` shorthand.
fn parse_sort_shorthand(text: &str) -> Vec<SortBy> {
    text.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| match s.strip_prefix('-') {
            Some(field) => SortBy::new(field.trim(), Direction::Desc),
            None => SortBy::new(s.trim_start_matches('+').trim(), Direction::Asc),
        })
        .collect()
}

fn parse_sort(field: &str, value: &Value) -> Result<Vec<SortBy>, ValidationError> {
    match value {
        Value::String(s) if !looks_like_json(s.trim()) => return Ok(parse_sort_shorthand(s)),
        Value::Array(items) if items.iter().all(Value::is_string) => {
            return Ok(items
                .iter()
                .filter_map(Value::as_str)
                .flat_map(parse_sort_shorthand)
                .collect());
        }
        _ => {}
    }

    let entries = match decode_json(field, value)? {
        Value::Array(entries) => entries,
        entry @ Value::Object(_) => vec![entry],
        other => {
            return Err(ValidationError::new(
                field,
                format!("expected an array of sort keys, got {}", json_type_name(&other)),
            ));
        }
    };

    entries
        .into_iter()
        .map(|entry| {
            let Value::Object(entry) = entry else {
                return Err(ValidationError::new(
                    field,
                    "each sort key must be an object with 'field' and 'direction'",
                ));
            };
            let name = entry
                .get("field")
                .and_then(Value::as_str)
                .ok_or_else(|| ValidationError::new(field, "sort key is missing 'field'"))?;
            let direction = match entry.get("direction") {
                None | Some(Value::Null) => Direction::Asc,
                Some(Value::String(d)) => d
                    .parse::<Direction>()
                    .map_err(|e| ValidationError::new(field, e))?,
                Some(other) => {
                    return Err(ValidationError::new(
                        field,
                        format!("direction must be a string, got {}", json_type_name(other)),
                    ));
                }
            };
            Ok(SortBy::new(name, direction))
        })
        .collect()
}

/// Parses `field,-excluded` shorthand.
fn parse_fields_shorthand<'a>(parts: impl Iterator<Item = &'a str>) -> FieldsSpec {
    let mut spec = FieldsSpec::default();
    for part in parts.flat_map(|p| p.split(',')).map(str::trim) {
        if let Some(path) = part.strip_prefix('-') {
            push_unique(&mut spec.exclude, path);
        } else {
            push_unique(&mut spec.include, part.trim_start_matches('+'));
        }
    }
    spec
}

fn parse_fields(value: &Value) -> Result<FieldsSpec, ValidationError> {
    let spec = match value {
        Value::String(s) if !looks_like_json(s.trim()) => {
            parse_fields_shorthand(std::iter::once(s.as_str()))
        }
        Value::Array(items) if items.iter().all(Value::is_string) => {
            parse_fields_shorthand(items.iter().filter_map(Value::as_str))
        }
        _ => {
            let Value::Object(map) = decode_json("fields", value)? else {
                return Err(ValidationError::new(
                    "fields",
                    "expected an object with 'include' and/or 'exclude'",
                ));
            };
            let list = |key: &str| -> Result<Vec<String>, ValidationError> {
                match map.get(key) {
                    None | Some(Value::Null) => Ok(Vec::new()),
                    Some(v) => string_list("fields", v, Transport::Post),
                }
            };
            FieldsSpec {
                include: list("include")?,
                exclude: list("exclude")?,
            }
        }
    };

    for path in spec.include.iter().chain(&spec.exclude) {
        if path.split('.').any(|segment| segment.trim().is_empty()) {
            return Err(ValidationError::new(
                "fields",
                format!("'{}' is not a valid field path", path),
            ));
        }
    }
    Ok(spec)
}

fn positive_integer(field: &str, value: &Value) -> Result<u64, ValidationError> {
    let parsed: Option<i128> = match value {
        Value::Number(n) => n
            .as_u64()
            .map(i128::from)
            .or_else(|| n.as_i64().map(i128::from))
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i128)),
        Value::String(s) => s.trim().parse::<i128>().ok(),
        _ => None,
    };

    match parsed {
        Some(n) if n > 0 => Ok(u64::try_from(n).unwrap_or(u64::MAX)),
        Some(_) => Err(ValidationError::new(field, "must be greater than 0")),
        None => Err(ValidationError::new(field, "must be a positive integer")),
    }
}

fn to_usize(n: u64) -> usize {
    usize::try_from(n).unwrap_or(usize::MAX)
}
