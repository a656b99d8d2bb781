//! Section category restriction rows.

use frontpage_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `section_category_restrictions` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SectionRestrictionRow {
    pub section_type: String,
    pub category_id: DbId,
    pub created_at: Timestamp,
}
