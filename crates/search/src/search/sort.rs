//! Sort compilation.

use crate::error::ValidationError;
use crate::fields::FieldPath;
use crate::types::{SearchRequest, SortField, SortSpec};

/// Resolves the requested sort keys, or the default order when none are given.
///
/// The resulting spec always ends with `id`, so paging never reorders ties.
pub fn compile_sort(request: &SearchRequest) -> Result<SortSpec, ValidationError> {
    let Some(keys) = request.sort.as_ref().filter(|k| !k.is_empty()) else {
        return Ok(SortSpec::default_order());
    };

    let fields = keys
        .iter()
        .map(|key| {
            FieldPath::parse(&key.field)
                .map(|field| SortField::new(field, key.direction))
                .map_err(|e| ValidationError::new("sort", e))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(SortSpec::new(fields))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Direction, SortBy};

    fn request(keys: Vec<SortBy>) -> SearchRequest {
        SearchRequest {
            sort: Some(keys),
            ..Default::default()
        }
    }

    #[test]
    fn test_default_order() {
        let spec = compile_sort(&SearchRequest::default()).unwrap();
        assert_eq!(
            spec.keys(),
            &[
                SortField::new(FieldPath::property("datetime"), Direction::Desc),
                SortField::new(FieldPath::id(), Direction::Asc),
            ]
        );
    }

    #[test]
    fn test_tie_break_appended() {
        let spec = compile_sort(&request(vec![SortBy::new("eo:cloud_cover", Direction::Desc)]))
            .unwrap();
        assert_eq!(spec.keys().len(), 2);
        assert_eq!(spec.keys()[0].field.as_str(), "properties.eo:cloud_cover");
        assert!(spec.keys()[1].field.is_id());
    }

    #[test]
    fn test_tie_break_not_duplicated_when_last() {
        let spec = compile_sort(&request(vec![
            SortBy::new("datetime", Direction::Asc),
            SortBy::new("id", Direction::Desc),
        ]))
        .unwrap();
        assert_eq!(spec.keys().len(), 2);
        assert_eq!(spec.keys()[1].direction, Direction::Desc);
    }

    #[test]
    fn test_tie_break_appended_when_id_not_last() {
        let spec = compile_sort(&request(vec![
            SortBy::new("id", Direction::Desc),
            SortBy::new("datetime", Direction::Asc),
        ]))
        .unwrap();
        assert_eq!(spec.keys().len(), 3);
        assert!(spec.keys()[2].field.is_id());
    }

    #[test]
    fn test_unsortable_fields() {
        for field in ["geometry", "assets", "links", "bbox", "", "properties..x"] {
            let err = compile_sort(&request(vec![SortBy::new(field, Direction::Asc)])).unwrap_err();
            assert_eq!(err.field, "sort");
        }
    }
}
