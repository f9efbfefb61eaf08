//! POST search body extractor.

use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
};
use satapi_search::RawSearchRequest;
use serde_json::Value;

use crate::error::RestError;

/// A search request read from a JSON body.
///
/// An empty body is an empty search. Anything that is not a JSON object is
/// rejected with `400 Bad Request` naming the `body` field.
#[derive(Debug)]
pub struct SearchBody(pub RawSearchRequest);

impl SearchBody {
    /// Parses raw body bytes.
    pub fn parse(bytes: &[u8]) -> Result<Self, RestError> {
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return RawSearchRequest::from_json_body(Value::Null)
                .map(SearchBody)
                .map_err(RestError::from);
        }

        let value: Value = serde_json::from_slice(bytes).map_err(|e| RestError::BadRequest {
            field: "body".to_string(),
            message: format!("Invalid JSON: {}", e),
        })?;

        Ok(SearchBody(RawSearchRequest::from_json_body(value)?))
    }

    /// Consumes the extractor and returns the request.
    pub fn into_inner(self) -> RawSearchRequest {
        self.0
    }
}

impl<S> FromRequest<S> for SearchBody
where
    S: Send + Sync,
{
    type Rejection = RestError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| RestError::BadRequest {
                field: "body".to_string(),
                message: e.body_text(),
            })?;

        Self::parse(&bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use satapi_search::Transport;

    #[test]
    fn test_empty_body_is_empty_search() {
        let body = SearchBody::parse(b"  ").unwrap().into_inner();
        assert_eq!(body.transport, Transport::Post);
        assert!(body.params.is_empty());
    }

    #[test]
    fn test_object_body() {
        let body = SearchBody::parse(br#"{"limit": 2, "ids": ["a"]}"#)
            .unwrap()
            .into_inner();
        assert_eq!(body.get("limit"), Some(&serde_json::json!(2)));
    }

    #[test]
    fn test_invalid_json() {
        let err = SearchBody::parse(b"{limit: 2").unwrap_err();
        assert!(matches!(err, RestError::BadRequest { ref field, .. } if field == "body"));
    }

    #[test]
    fn test_array_body_rejected() {
        let err = SearchBody::parse(b"[1, 2]").unwrap_err();
        assert!(matches!(err, RestError::BadRequest { ref field, .. } if field == "body"));
    }
}
