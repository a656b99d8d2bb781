//! Page layout rows.

use frontpage_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `page_layouts` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PageLayoutRow {
    pub page_key: String,
    pub config_json: serde_json::Value,
    pub version: i64,
    pub settings_group: String,
    pub updated_at: Timestamp,
    pub updated_by: Option<DbId>,
}

/// Input for [`crate::repositories::PageLayoutRepo::upsert`].
#[derive(Debug, Clone)]
pub struct UpsertPageLayout {
    pub page_key: String,
    pub config_json: serde_json::Value,
    pub version: i64,
    pub settings_group: String,
    pub updated_by: Option<DbId>,
}

impl UpsertPageLayout {
    /// Build the row input from a stored layout document, copying its
    /// `version` and `updatedBy` into their own columns.
    pub fn from_document(page_key: &str, document: serde_json::Value, settings_group: &str) -> Self {
        let version = document
            .get("version")
            .and_then(serde_json::Value::as_i64)
            .unwrap_or(0);
        let updated_by = document
            .get("updatedBy")
            .and_then(serde_json::Value::as_i64);
        Self {
            page_key: page_key.to_string(),
            config_json: document,
            version,
            settings_group: settings_group.to_string(),
            updated_by,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn document_fields_are_lifted_into_columns() {
        let input = UpsertPageLayout::from_document(
            "homepage",
            json!({"sections": [], "version": 3, "updatedBy": 9}),
            "layouts",
        );
        assert_eq!(input.version, 3);
        assert_eq!(input.updated_by, Some(9));
        assert_eq!(input.settings_group, "layouts");
    }

    #[test]
    fn missing_audit_fields_default() {
        let input = UpsertPageLayout::from_document("p", json!({"sections": []}), "layouts");
        assert_eq!(input.version, 0);
        assert_eq!(input.updated_by, None);
    }
}
