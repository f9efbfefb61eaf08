//! Elasticsearch Query DSL builder.
//!
//! Translates compiled [`Clause`] trees, sort specs and windows into a search
//! request body.

use serde_json::{Map, Value, json};

use crate::types::{Clause, CompiledQuery, Direction, Envelope, RangeBounds, SortSpec, Window};

/// Builds the complete `_search` body.
pub fn build_search_body(
    query: &CompiledQuery,
    sort: &SortSpec,
    window: Window,
    track_total_hits: u32,
) -> Value {
    let query = match query.root() {
        Some(clause) => json!({ "bool": { "filter": [build_clause(clause)] } }),
        None => json!({ "match_all": {} }),
    };

    json!({
        "query": query,
        "sort": build_sort(sort),
        "from": window.offset,
        "size": window.size,
        "track_total_hits": track_total_hits,
    })
}

/// Translates one clause.
pub fn build_clause(clause: &Clause) -> Value {
    match clause {
        Clause::And(children) => json!({
            "bool": { "filter": children.iter().map(build_clause).collect::<Vec<_>>() }
        }),
        Clause::Or(children) => json!({
            "bool": {
                "should": children.iter().map(build_clause).collect::<Vec<_>>(),
                "minimum_should_match": 1
            }
        }),
        Clause::Not(child) => json!({ "bool": { "must_not": [build_clause(child)] } }),
        Clause::Term { field, value } => json!({ "term": { field.as_str(): value } }),
        Clause::Terms { field, values } => json!({ "terms": { field.as_str(): values } }),
        Clause::Range { field, bounds } => {
            json!({ "range": { field.as_str(): range_bounds(bounds) } })
        }
        Clause::Prefix { field, value } => json!({ "prefix": { field.as_str(): value } }),
        Clause::Suffix { field, value } => json!({
            "wildcard": { field.as_str(): { "value": format!("*{}", escape_wildcard(value)) } }
        }),
        Clause::Contains { field, value } => json!({
            "wildcard": { field.as_str(): { "value": format!("*{}*", escape_wildcard(value)) } }
        }),
        Clause::Envelope(envelope) => geo_shape(envelope_shape(envelope)),
        Clause::GeometryIntersects(geometry) => geo_shape(json!(geometry)),
        Clause::TemporalInstant(instant) => {
            let t = instant.to_rfc3339();
            json!({
                "bool": {
                    "should": [
                        { "term": { "properties.datetime": t } },
                        { "bool": { "filter": [
                            { "range": { "properties.start_datetime": { "lte": t } } },
                            { "range": { "properties.end_datetime": { "gte": t } } }
                        ] } }
                    ],
                    "minimum_should_match": 1
                }
            })
        }
        Clause::TemporalOverlap { start, end } => {
            let start = start.map(|s| s.to_rfc3339());
            let end = end.map(|e| e.to_rfc3339());

            let mut datetime = Map::new();
            let mut range_filters = Vec::new();
            if let Some(start) = &start {
                datetime.insert("gte".to_string(), json!(start));
                range_filters.push(json!({ "range": { "properties.end_datetime": { "gte": start } } }));
            }
            if let Some(end) = &end {
                datetime.insert("lte".to_string(), json!(end));
                range_filters.push(json!({ "range": { "properties.start_datetime": { "lte": end } } }));
            }
            json!({
                "bool": {
                    "should": [
                        { "range": { "properties.datetime": datetime } },
                        { "bool": { "filter": range_filters } }
                    ],
                    "minimum_should_match": 1
                }
            })
        }
        Clause::MatchNone => json!({ "bool": { "must_not": [{ "match_all": {} }] } }),
    }
}

/// Sort clauses; missing values sort last in either direction.
pub fn build_sort(sort: &SortSpec) -> Value {
    sort.keys()
        .iter()
        .map(|key| {
            let order = match key.direction {
                Direction::Asc => "asc",
                Direction::Desc => "desc",
            };
            json!({
                key.field.as_str(): {
                    "order": order,
                    "missing": "_last",
                    "unmapped_type": "keyword"
                }
            })
        })
        .collect()
}

fn range_bounds(bounds: &RangeBounds) -> Value {
    let mut out = Map::new();
    for (name, bound) in [
        ("gt", &bounds.gt),
        ("gte", &bounds.gte),
        ("lt", &bounds.lt),
        ("lte", &bounds.lte),
    ] {
        if let Some(value) = bound {
            out.insert(name.to_string(), value.clone());
        }
    }
    Value::Object(out)
}

fn envelope_shape(envelope: &Envelope) -> Value {
    json!({
        "type": "envelope",
        "coordinates": [[envelope.west, envelope.north], [envelope.east, envelope.south]]
    })
}

fn geo_shape(shape: Value) -> Value {
    json!({
        "geo_shape": {
            "geometry": {
                "shape": shape,
                "relation": "intersects"
            }
        }
    })
}

fn escape_wildcard(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '*' | '?' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::FieldPath;
    use crate::types::SortField;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_match_all_body() {
        let body = build_search_body(
            &CompiledQuery::match_all(),
            &SortSpec::default_order(),
            Window::for_page(3, 10),
            10000,
        );
        assert_eq!(body["query"], json!({ "match_all": {} }));
        assert_eq!(body["from"], 20);
        assert_eq!(body["size"], 10);
        assert_eq!(body["track_total_hits"], 10000);
        assert_eq!(body["sort"][0]["properties.datetime"]["order"], "desc");
        assert_eq!(body["sort"][1]["id"]["order"], "asc");
    }

    #[test]
    fn test_terms_and_not() {
        let clause = Clause::And(vec![
            Clause::Terms {
                field: FieldPath::collection(),
                values: vec![json!("landsat-8-l1")],
            },
            Clause::Not(Box::new(Clause::Term {
                field: FieldPath::property("platform"),
                value: json!("landsat-7"),
            })),
        ]);
        let dsl = build_clause(&clause);
        assert_eq!(
            dsl["bool"]["filter"][0],
            json!({ "terms": { "collection": ["landsat-8-l1"] } })
        );
        assert_eq!(
            dsl["bool"]["filter"][1]["bool"]["must_not"][0],
            json!({ "term": { "properties.platform": "landsat-7" } })
        );
    }

    #[test]
    fn test_range_only_sets_given_bounds() {
        let clause = Clause::Range {
            field: FieldPath::property("eo:cloud_cover"),
            bounds: RangeBounds {
                lt: Some(json!(10)),
                ..Default::default()
            },
        };
        assert_eq!(
            build_clause(&clause),
            json!({ "range": { "properties.eo:cloud_cover": { "lt": 10 } } })
        );
    }

    #[test]
    fn test_wildcards_are_escaped() {
        let clause = Clause::Contains {
            field: FieldPath::id(),
            value: "a*b".to_string(),
        };
        assert_eq!(
            build_clause(&clause),
            json!({ "wildcard": { "id": { "value": "*a\\*b*" } } })
        );
    }

    #[test]
    fn test_envelope_shape() {
        let clause = Clause::Envelope(Envelope {
            west: -10.0,
            south: -5.0,
            east: 10.0,
            north: 5.0,
        });
        let dsl = build_clause(&clause);
        assert_eq!(
            dsl["geo_shape"]["geometry"]["shape"]["coordinates"],
            json!([[-10.0, 5.0], [10.0, -5.0]])
        );
        assert_eq!(dsl["geo_shape"]["geometry"]["relation"], "intersects");
    }

    #[test]
    fn test_open_interval() {
        let start = Utc.with_ymd_and_hms(2015, 1, 1, 0, 0, 0).unwrap();
        let dsl = build_clause(&Clause::TemporalOverlap {
            start: Some(start),
            end: None,
        });
        let should = &dsl["bool"]["should"];
        assert_eq!(
            should[0]["range"]["properties.datetime"],
            json!({ "gte": "2015-01-01T00:00:00+00:00" })
        );
        assert_eq!(should[1]["bool"]["filter"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_sort_missing_last() {
        let sort = SortSpec::new(vec![SortField::new(
            FieldPath::property("eo:cloud_cover"),
            Direction::Asc,
        )]);
        let sort = build_sort(&sort);
        assert_eq!(sort[0]["properties.eo:cloud_cover"]["missing"], "_last");
        assert_eq!(sort.as_array().unwrap().len(), 2);
    }
}
