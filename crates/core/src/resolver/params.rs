//! Normalization of data source params before they reach a fetch action.

use serde_json::Value;

use crate::sections::definition::{ACTION_BY_CATEGORY, ACTION_BY_TAG};
use crate::types::JsonMap;

/// Canonical params for `action`.
///
/// `byTag` and `byCategory` accept a `slugs` array or the older single
/// `slug` string and emit `{"tags": [...]}` / `{"categories": [...]}`.
/// Params for any other action pass through unchanged.
pub fn build_params(action: &str, params: &JsonMap) -> JsonMap {
    let key = match action {
        ACTION_BY_TAG => "tags",
        ACTION_BY_CATEGORY => "categories",
        _ => return params.clone(),
    };

    let mut out = JsonMap::new();
    out.insert(key.to_string(), Value::from(slug_list(params)));
    out
}

/// `slugs` wins when present as an array; otherwise a non-empty `slug`.
fn slug_list(params: &JsonMap) -> Vec<String> {
    if let Some(Value::Array(items)) = params.get("slugs") {
        return items
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
    }

    match params.get("slug").and_then(Value::as_str).map(str::trim) {
        Some(slug) if !slug.is_empty() => vec![slug.to_string()],
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(value: Value) -> JsonMap {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn by_tag_accepts_slug_array() {
        let params = map(json!({"slugs": ["vegan", "quick"]}));
        assert_eq!(
            Value::Object(build_params("byTag", &params)),
            json!({"tags": ["vegan", "quick"]})
        );
    }

    #[test]
    fn by_category_accepts_legacy_slug() {
        let params = map(json!({"slug": "recipes"}));
        assert_eq!(
            Value::Object(build_params("byCategory", &params)),
            json!({"categories": ["recipes"]})
        );
    }

    #[test]
    fn slugs_take_precedence_over_slug() {
        let params = map(json!({"slug": "old", "slugs": ["new"]}));
        assert_eq!(
            Value::Object(build_params("byTag", &params)),
            json!({"tags": ["new"]})
        );
    }

    #[test]
    fn missing_slugs_give_empty_list() {
        assert_eq!(
            Value::Object(build_params("byCategory", &JsonMap::new())),
            json!({"categories": []})
        );
        let blank = map(json!({"slug": "  "}));
        assert_eq!(
            Value::Object(build_params("byTag", &blank)),
            json!({"tags": []})
        );
    }

    #[test]
    fn other_actions_pass_through() {
        let params = map(json!({"slug": "x", "window": "7d"}));
        assert_eq!(build_params("trending", &params), params);
        assert_eq!(build_params("recent", &JsonMap::new()), JsonMap::new());
    }
}
