//! The `FeatureCollection` envelope and navigation links.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Media type of GeoJSON documents.
pub const GEOJSON: &str = "application/geo+json";

/// Media type of plain JSON documents.
pub const JSON: &str = "application/json";

/// A navigation link.
///
/// `method`, `body` and `merge` are only set on links that must be followed
/// with a POST request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub rel: String,
    pub href: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merge: Option<bool>,
}

impl Link {
    /// Creates a plain link.
    pub fn new(rel: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            rel: rel.into(),
            href: href.into(),
            media_type: None,
            title: None,
            method: None,
            body: None,
            merge: None,
        }
    }

    /// Sets the media type.
    pub fn with_type(mut self, media_type: impl Into<String>) -> Self {
        self.media_type = Some(media_type.into());
        self
    }

    /// Sets the title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Sets the HTTP method used to follow the link.
    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    /// Marks the link as a POST request carrying `body`.
    pub fn with_post_body(mut self, body: Value) -> Self {
        self.method = Some("POST".to_string());
        self.body = Some(body);
        self.merge = Some(false);
        self
    }

    /// Converts the link to JSON.
    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// Paging metadata of a response page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Context {
    pub page: usize,
    pub limit: usize,
    pub matched: u64,
    pub returned: usize,
}

/// One page of search results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponsePage {
    #[serde(rename = "type")]
    pub kind: String,
    pub features: Vec<Value>,
    pub links: Vec<Link>,
    pub context: Context,
}

impl ResponsePage {
    /// Returns the first link with the given relation.
    pub fn link(&self, rel: &str) -> Option<&Link> {
        self.links.iter().find(|l| l.rel == rel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_plain_link_omits_optional_members() {
        let link = Link::new("root", "http://localhost/").with_type(JSON);
        assert_eq!(
            link.to_json(),
            json!({"rel": "root", "href": "http://localhost/", "type": "application/json"})
        );
    }

    #[test]
    fn test_post_link() {
        let link = Link::new("next", "http://localhost/search").with_post_body(json!({"page": 2}));
        let value = link.to_json();
        assert_eq!(value["method"], "POST");
        assert_eq!(value["body"]["page"], 2);
        assert_eq!(value["merge"], false);
    }
}
