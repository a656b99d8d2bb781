//! Postgres implementations of the core persistence interfaces.

use async_trait::async_trait;
use frontpage_core::error::{CoreError, CoreResult};
use frontpage_core::layout::LayoutPersistence;
use frontpage_core::restrictions::RestrictionStore;
use frontpage_core::types::DbId;
use serde_json::Value;

use crate::models::page_layout::UpsertPageLayout;
use crate::repositories::{PageLayoutRepo, SectionRestrictionRepo};
use crate::DbPool;

fn storage_error(err: sqlx::Error) -> CoreError {
    tracing::error!(error = %err, "Database error");
    CoreError::Storage(err.to_string())
}

/// Layout documents stored in `page_layouts`.
#[derive(Debug, Clone)]
pub struct PgLayoutPersistence {
    pool: DbPool,
}

impl PgLayoutPersistence {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LayoutPersistence for PgLayoutPersistence {
    async fn get(&self, key: &str) -> CoreResult<Option<Value>> {
        let row = PageLayoutRepo::find_by_key(&self.pool, key)
            .await
            .map_err(storage_error)?;
        Ok(row.map(|r| r.config_json))
    }

    async fn set(&self, key: &str, value: Value, group: &str) -> CoreResult<()> {
        let input = UpsertPageLayout::from_document(key, value, group);
        PageLayoutRepo::upsert(&self.pool, &input)
            .await
            .map_err(storage_error)?;
        Ok(())
    }
}

/// Restriction rows stored in `section_category_restrictions`.
#[derive(Debug, Clone)]
pub struct PgRestrictionStore {
    pool: DbPool,
}

impl PgRestrictionStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RestrictionStore for PgRestrictionStore {
    async fn load_all(&self) -> CoreResult<Vec<(String, DbId)>> {
        let rows = SectionRestrictionRepo::list_all(&self.pool)
            .await
            .map_err(storage_error)?;
        Ok(rows
            .into_iter()
            .map(|row| (row.section_type, row.category_id))
            .collect())
    }

    async fn replace(&self, section_type: &str, category_ids: &[DbId]) -> CoreResult<()> {
        SectionRestrictionRepo::replace_for_type(&self.pool, section_type, category_ids)
            .await
            .map_err(storage_error)
    }
}
