//! Property path resolution.
//!
//! Items are indexed with a small set of top-level fields (`id`, `collection`)
//! and everything else nested under `properties`. Clients may address a
//! property with or without the `properties.` prefix; both spellings resolve
//! to the same [`FieldPath`].

use std::fmt;

/// Top-level item fields that can be filtered and sorted on directly.
pub const TOP_LEVEL_FIELDS: &[&str] = &["id", "collection"];

/// Top-level item fields that are structural and cannot be queried or sorted.
pub const STRUCTURAL_FIELDS: &[&str] = &[
    "type",
    "geometry",
    "bbox",
    "links",
    "assets",
    "stac_version",
    "stac_extensions",
];

const PROPERTIES: &str = "properties";

/// A canonical, backend-addressable item field.
///
/// The string form uses `.` as the segment separator, e.g. `id` or
/// `properties.eo:cloud_cover`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldPath(String);

impl FieldPath {
    /// Resolves a client-supplied path.
    ///
    /// Returns a human-readable reason when the path is empty, malformed or
    /// names a structural field.
    pub fn parse(path: &str) -> Result<Self, String> {
        let path = path.trim();
        if path.is_empty() {
            return Err("field path is empty".to_string());
        }

        let segments: Vec<&str> = path.split('.').collect();
        if segments.iter().any(|s| s.trim().is_empty()) {
            return Err(format!("field path '{}' has an empty segment", path));
        }

        let head = segments[0];
        if head == PROPERTIES {
            if segments.len() == 1 {
                return Err("'properties' is not a queryable field".to_string());
            }
            return Ok(FieldPath(path.to_string()));
        }

        if TOP_LEVEL_FIELDS.contains(&head) {
            if segments.len() > 1 {
                return Err(format!("'{}' has no nested fields", head));
            }
            return Ok(FieldPath(head.to_string()));
        }

        if STRUCTURAL_FIELDS.contains(&head) {
            return Err(format!("'{}' is not a queryable field", head));
        }

        Ok(FieldPath(format!("{}.{}", PROPERTIES, path)))
    }

    /// The identifier field.
    pub fn id() -> Self {
        FieldPath("id".to_string())
    }

    /// The collection field.
    pub fn collection() -> Self {
        FieldPath("collection".to_string())
    }

    /// A property under `properties`.
    pub fn property(name: &str) -> Self {
        FieldPath(format!("{}.{}", PROPERTIES, name))
    }

    /// Returns the dotted path.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Iterates over the path's segments.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('.')
    }

    /// Returns `true` for the item identifier.
    pub fn is_id(&self) -> bool {
        self.0 == "id"
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_is_optional() {
        let bare = FieldPath::parse("eo:cloud_cover").unwrap();
        let prefixed = FieldPath::parse("properties.eo:cloud_cover").unwrap();
        assert_eq!(bare, prefixed);
        assert_eq!(bare.as_str(), "properties.eo:cloud_cover");
    }

    #[test]
    fn test_top_level_fields() {
        assert_eq!(FieldPath::parse("id").unwrap(), FieldPath::id());
        assert_eq!(FieldPath::parse(" collection ").unwrap(), FieldPath::collection());
        assert!(FieldPath::parse("id.value").is_err());
    }

    #[test]
    fn test_structural_fields_rejected() {
        for field in ["geometry", "bbox", "links", "assets", "type"] {
            assert!(FieldPath::parse(field).is_err(), "{field} should be rejected");
        }
        assert!(FieldPath::parse("properties").is_err());
    }

    #[test]
    fn test_malformed_paths() {
        assert!(FieldPath::parse("").is_err());
        assert!(FieldPath::parse("properties..datetime").is_err());
        assert!(FieldPath::parse("proj:centroid.").is_err());
    }

    #[test]
    fn test_nested_property() {
        let path = FieldPath::parse("proj:centroid.lat").unwrap();
        assert_eq!(
            path.segments().collect::<Vec<_>>(),
            vec!["properties", "proj:centroid", "lat"]
        );
    }
}
