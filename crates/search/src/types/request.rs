//! Raw and canonical search requests.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ValidationError;

/// The transport encoding a request arrived in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Transport {
    /// Query-string parameters; every value is a string.
    Get,
    /// A JSON body; values keep their native JSON types.
    Post,
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transport::Get => write!(f, "GET"),
            Transport::Post => write!(f, "POST"),
        }
    }
}

/// A search request exactly as received, before normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct RawSearchRequest {
    /// Which encoding the parameters use.
    pub transport: Transport,
    /// Parameters by name. GET values are strings, or arrays of strings for
    /// repeated keys.
    pub params: Map<String, Value>,
    /// The untouched query string for GET requests.
    pub raw_query: Option<String>,
}

impl RawSearchRequest {
    /// Parses a URL query string (without the leading `?`).
    pub fn from_query_string(query: &str) -> Self {
        let mut params = Map::new();
        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            let value = Value::String(value.into_owned());
            match params.get_mut(key.as_ref()) {
                Some(Value::Array(values)) => values.push(value),
                Some(existing) => {
                    let first = existing.take();
                    *existing = Value::Array(vec![first, value]);
                }
                None => {
                    params.insert(key.into_owned(), value);
                }
            }
        }

        Self {
            transport: Transport::Get,
            params,
            raw_query: Some(query.to_string()).filter(|q| !q.is_empty()),
        }
    }

    /// Wraps a JSON request body. A `null` body is treated as an empty search.
    pub fn from_json_body(body: Value) -> Result<Self, ValidationError> {
        let params = match body {
            Value::Object(map) => map,
            Value::Null => Map::new(),
            other => {
                return Err(ValidationError::new(
                    "body",
                    format!("expected a JSON object, got {}", json_type_name(&other)),
                ));
            }
        };

        Ok(Self {
            transport: Transport::Post,
            params,
            raw_query: None,
        })
    }

    /// Builds a request from already-decoded parameters.
    pub fn from_params(transport: Transport, params: Map<String, Value>) -> Self {
        Self {
            transport,
            params,
            raw_query: None,
        }
    }

    /// Returns a parameter by name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.params.get(name)
    }

    /// Returns the parameters as a JSON object.
    pub fn to_json(&self) -> Value {
        Value::Object(self.params.clone())
    }
}

/// The canonical search request every downstream stage works on.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    /// Transport the client used; paging links are re-encoded in it.
    pub transport: Transport,
    /// Collection from the resource path, if the request was scoped.
    pub scope: Option<String>,
    /// Effective collection set after merging the scope. `Some(empty)` means
    /// nothing can match.
    pub collections: Option<Vec<String>>,
    /// Collections exactly as the client named them.
    pub requested_collections: Option<Vec<String>>,
    /// Item identifiers.
    pub ids: Option<Vec<String>>,
    /// Envelope filter.
    pub bbox: Option<Bbox>,
    /// Geometry filter.
    pub intersects: Option<geojson::Geometry>,
    /// Temporal filter.
    pub datetime: Option<DatetimeFilter>,
    /// Property predicates: path → operator → operand.
    pub query: BTreeMap<String, BTreeMap<String, Value>>,
    /// Requested sort keys.
    pub sort: Option<Vec<SortBy>>,
    /// Requested projection.
    pub fields: Option<FieldsSpec>,
    /// Page size.
    pub limit: usize,
    /// 1-based page number.
    pub page: usize,
}

impl Default for SearchRequest {
    fn default() -> Self {
        Self {
            transport: Transport::Post,
            scope: None,
            collections: None,
            requested_collections: None,
            ids: None,
            bbox: None,
            intersects: None,
            datetime: None,
            query: BTreeMap::new(),
            sort: None,
            fields: None,
            limit: 10,
            page: 1,
        }
    }
}

impl SearchRequest {
    /// Index of the first record of the requested page.
    pub fn offset(&self) -> usize {
        (self.page - 1).saturating_mul(self.limit)
    }

    /// Returns `true` if the effective collection set is empty.
    pub fn is_unsatisfiable(&self) -> bool {
        self.collections.as_ref().is_some_and(|c| c.is_empty())
    }
}

/// A bounding box in `[west, south, east, north]` order, with optional
/// elevation bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bbox {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
    /// `(min, max)` elevation for 6-value boxes.
    pub elevation: Option<(f64, f64)>,
}

impl Bbox {
    /// Builds a box from 4 (`w,s,e,n`) or 6 (`w,s,zmin,e,n,zmax`) values.
    pub fn from_values(values: &[f64]) -> Result<Self, String> {
        let bbox = match values {
            [west, south, east, north] => Bbox {
                west: *west,
                south: *south,
                east: *east,
                north: *north,
                elevation: None,
            },
            [west, south, min_z, east, north, max_z] => Bbox {
                west: *west,
                south: *south,
                east: *east,
                north: *north,
                elevation: Some((*min_z, *max_z)),
            },
            other => {
                return Err(format!("expected 4 or 6 values, got {}", other.len()));
            }
        };

        if values.iter().any(|v| !v.is_finite()) {
            return Err("values must be finite numbers".into());
        }
        if !(-180.0..=180.0).contains(&bbox.west) || !(-180.0..=180.0).contains(&bbox.east) {
            return Err("longitudes must be between -180 and 180".into());
        }
        if !(-90.0..=90.0).contains(&bbox.south) || !(-90.0..=90.0).contains(&bbox.north) {
            return Err("latitudes must be between -90 and 90".into());
        }
        if bbox.south > bbox.north {
            return Err("south must be less than or equal to north".into());
        }

        Ok(bbox)
    }

    /// A box whose western edge is east of its eastern edge wraps the antimeridian.
    pub fn crosses_antimeridian(&self) -> bool {
        self.west > self.east
    }

    /// Returns the values in the order they are written on the wire.
    pub fn to_vec(&self) -> Vec<f64> {
        match self.elevation {
            Some((min_z, max_z)) => vec![
                self.west, self.south, min_z, self.east, self.north, max_z,
            ],
            None => vec![self.west, self.south, self.east, self.north],
        }
    }
}

/// A parsed temporal filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Datetime {
    /// A single moment.
    Instant(DateTime<Utc>),
    /// A closed or half-open interval; `None` marks an open side.
    Interval {
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    },
}

/// A temporal filter together with the text the client sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatetimeFilter {
    /// Original text, echoed verbatim into paging links.
    pub raw: String,
    /// Parsed value.
    pub value: Datetime,
}

impl DatetimeFilter {
    /// Parses the STAC datetime forms:
    /// - `2015-02-19T15:04:05Z` (instant)
    /// - `2015-02-19` (the whole day)
    /// - `start/end`, where either side may be `..` or empty for open
    pub fn parse(raw: &str) -> Result<Self, String> {
        let s = raw.trim();
        if s.is_empty() {
            return Err("datetime is empty".into());
        }

        let value = if s.contains('/') {
            let parts: Vec<&str> = s.split('/').collect();
            if parts.len() != 2 {
                return Err("interval must have exactly 2 parts separated by '/'".into());
            }
            Datetime::Interval {
                start: parse_bound(parts[0], Bound::Start)?,
                end: parse_bound(parts[1], Bound::End)?,
            }
        } else if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            Datetime::Instant(dt.with_timezone(&Utc))
        } else {
            let date = parse_date(s)?;
            Datetime::Interval {
                start: Some(start_of_day(date)?),
                end: Some(end_of_day(date)?),
            }
        };

        Ok(Self {
            raw: s.to_string(),
            value,
        })
    }
}

#[derive(Clone, Copy)]
enum Bound {
    Start,
    End,
}

fn parse_bound(s: &str, bound: Bound) -> Result<Option<DateTime<Utc>>, String> {
    let s = s.trim();
    if s.is_empty() || s == ".." {
        return Ok(None);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(Some(dt.with_timezone(&Utc)));
    }
    let date = parse_date(s)?;
    match bound {
        Bound::Start => start_of_day(date).map(Some),
        Bound::End => end_of_day(date).map(Some),
    }
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| format!("invalid datetime '{}'", s))
}

fn start_of_day(date: NaiveDate) -> Result<DateTime<Utc>, String> {
    date.and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc())
        .ok_or_else(|| format!("invalid date '{}'", date))
}

fn end_of_day(date: NaiveDate) -> Result<DateTime<Utc>, String> {
    date.and_hms_milli_opt(23, 59, 59, 999)
        .map(|dt| dt.and_utc())
        .ok_or_else(|| format!("invalid date '{}'", date))
}

/// Include/exclude field selection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldsSpec {
    #[serde(default)]
    pub include: Vec<String>,
    #[serde(default)]
    pub exclude: Vec<String>,
}

impl FieldsSpec {
    /// Returns `true` if neither list names a path.
    pub fn is_empty(&self) -> bool {
        self.include.is_empty() && self.exclude.is_empty()
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(Direction::Asc),
            "desc" | "descending" => Ok(Direction::Desc),
            other => Err(format!("unknown sort direction '{}'", other)),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Asc => write!(f, "asc"),
            Direction::Desc => write!(f, "desc"),
        }
    }
}

/// A requested sort key, before path resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortBy {
    pub field: String,
    #[serde(default)]
    pub direction: Direction,
}

impl SortBy {
    /// Creates a sort key.
    pub fn new(field: impl Into<String>, direction: Direction) -> Self {
        Self {
            field: field.into(),
            direction,
        }
    }
}

pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
