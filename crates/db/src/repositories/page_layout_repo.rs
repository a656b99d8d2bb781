//! Repository for the `page_layouts` table.

use sqlx::PgPool;

use crate::models::page_layout::{PageLayoutRow, UpsertPageLayout};

/// Column list for `page_layouts` queries.
const COLUMNS: &str = "page_key, config_json, version, settings_group, updated_at, updated_by";

/// Provides data access for stored page layouts.
pub struct PageLayoutRepo;

impl PageLayoutRepo {
    /// Find the layout stored under `page_key`.
    pub async fn find_by_key(
        pool: &PgPool,
        page_key: &str,
    ) -> Result<Option<PageLayoutRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM page_layouts WHERE page_key = $1");
        sqlx::query_as::<_, PageLayoutRow>(&query)
            .bind(page_key)
            .fetch_optional(pool)
            .await
    }

    /// List layouts in a settings group, ordered by key.
    pub async fn list_by_group(
        pool: &PgPool,
        settings_group: &str,
    ) -> Result<Vec<PageLayoutRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM page_layouts WHERE settings_group = $1 ORDER BY page_key"
        );
        sqlx::query_as::<_, PageLayoutRow>(&query)
            .bind(settings_group)
            .fetch_all(pool)
            .await
    }

    /// Insert or replace the layout for `input.page_key`.
    pub async fn upsert(
        pool: &PgPool,
        input: &UpsertPageLayout,
    ) -> Result<PageLayoutRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO page_layouts (page_key, config_json, version, settings_group, updated_by) \
             VALUES ($1, $2, $3, $4, $5) \
             ON CONFLICT (page_key) DO UPDATE SET \
                 config_json = EXCLUDED.config_json, \
                 version = EXCLUDED.version, \
                 settings_group = EXCLUDED.settings_group, \
                 updated_by = EXCLUDED.updated_by, \
                 updated_at = NOW() \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PageLayoutRow>(&query)
            .bind(&input.page_key)
            .bind(&input.config_json)
            .bind(input.version)
            .bind(&input.settings_group)
            .bind(input.updated_by)
            .fetch_one(pool)
            .await
    }

    /// Delete the layout for `page_key`.
    ///
    /// Returns `true` if a row was deleted.
    pub async fn delete(pool: &PgPool, page_key: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM page_layouts WHERE page_key = $1")
            .bind(page_key)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
