//! Repository for the `section_category_restrictions` table.

use frontpage_core::types::DbId;
use sqlx::PgPool;

use crate::models::section_restriction::SectionRestrictionRow;

/// Column list for `section_category_restrictions` queries.
const COLUMNS: &str = "section_type, category_id, created_at";

/// Provides data access for section category allow-lists.
pub struct SectionRestrictionRepo;

impl SectionRestrictionRepo {
    /// Every restriction row, grouped by type then category.
    pub async fn list_all(pool: &PgPool) -> Result<Vec<SectionRestrictionRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM section_category_restrictions \
             ORDER BY section_type, category_id"
        );
        sqlx::query_as::<_, SectionRestrictionRow>(&query)
            .fetch_all(pool)
            .await
    }

    /// Allowed category ids for one section type.
    pub async fn list_for_type(
        pool: &PgPool,
        section_type: &str,
    ) -> Result<Vec<DbId>, sqlx::Error> {
        let rows: Vec<(DbId,)> = sqlx::query_as(
            "SELECT category_id FROM section_category_restrictions \
             WHERE section_type = $1 ORDER BY category_id",
        )
        .bind(section_type)
        .fetch_all(pool)
        .await?;
        Ok(rows.into_iter().map(|(id,)| id).collect())
    }

    /// Replace the allow-list for `section_type` in one transaction.
    ///
    /// An empty `category_ids` removes every row for the type.
    pub async fn replace_for_type(
        pool: &PgPool,
        section_type: &str,
        category_ids: &[DbId],
    ) -> Result<(), sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query("DELETE FROM section_category_restrictions WHERE section_type = $1")
            .bind(section_type)
            .execute(&mut *tx)
            .await?;

        for &category_id in category_ids {
            sqlx::query(
                "INSERT INTO section_category_restrictions (section_type, category_id) \
                 VALUES ($1, $2) ON CONFLICT DO NOTHING",
            )
            .bind(section_type)
            .bind(category_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }
}
