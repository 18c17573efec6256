use anyhow::Context;
use axum::async_trait;
use sqlx::PgPool;

use super::repo_types::{NewEntry, ProductionEntry, COMPANY_NAME, PRODUCT_LABEL};

/// Entry store. Reads and deletes are global; `user_id` is recorded only.
#[async_trait]
pub trait EntryRepo: Send + Sync {
    async fn insert(&self, entry: NewEntry) -> anyhow::Result<ProductionEntry>;
    /// Newest first by creation time, ties broken by newest id.
    async fn list_newest_first(&self) -> anyhow::Result<Vec<ProductionEntry>>;
    /// Ascending id.
    async fn list_all(&self) -> anyhow::Result<Vec<ProductionEntry>>;
    /// `true` when a row was removed.
    async fn delete(&self, id: i64) -> anyhow::Result<bool>;
    /// Adds `batch_quantity` to tables created before the column existed.
    async fn ensure_batch_quantity_column(&self) -> anyhow::Result<()>;
}

#[derive(Clone)]
pub struct PgEntryRepo {
    db: PgPool,
}

impl PgEntryRepo {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl EntryRepo for PgEntryRepo {
    async fn insert(&self, entry: NewEntry) -> anyhow::Result<ProductionEntry> {
        let row = sqlx::query_as::<_, ProductionEntry>(
            r#"
            INSERT INTO production_entries (
                user_id, company_name, authorised_person, employee_id,
                final_batch_number, sf_batch_number, batch_quantity,
                urea_percentage, density, photo_path, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING id, user_id, company_name, authorised_person, employee_id,
                      final_batch_number, sf_batch_number, batch_quantity,
                      urea_percentage, density, photo_path, created_at
            "#,
        )
        .bind(entry.user_id)
        .bind(COMPANY_NAME)
        .bind(entry.authorised_person)
        .bind(entry.employee_id)
        .bind(entry.final_batch_number)
        .bind(PRODUCT_LABEL)
        .bind(entry.batch_quantity)
        .bind(entry.urea_percentage)
        .bind(entry.density)
        .bind(entry.photo_path)
        .bind(entry.created_at)
        .fetch_one(&self.db)
        .await
        .context("insert production entry")?;
        Ok(row)
    }

    async fn list_newest_first(&self) -> anyhow::Result<Vec<ProductionEntry>> {
        let rows = sqlx::query_as::<_, ProductionEntry>(
            r#"
            SELECT id, user_id, company_name, authorised_person, employee_id,
                   final_batch_number, sf_batch_number, batch_quantity,
                   urea_percentage, density, photo_path, created_at
            FROM production_entries
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .fetch_all(&self.db)
        .await
        .context("list production entries")?;
        Ok(rows)
    }

    async fn list_all(&self) -> anyhow::Result<Vec<ProductionEntry>> {
        let rows = sqlx::query_as::<_, ProductionEntry>(
            r#"
            SELECT id, user_id, company_name, authorised_person, employee_id,
                   final_batch_number, sf_batch_number, batch_quantity,
                   urea_percentage, density, photo_path, created_at
            FROM production_entries
            ORDER BY id
            "#,
        )
        .fetch_all(&self.db)
        .await
        .context("list production entries for export")?;
        Ok(rows)
    }

    async fn delete(&self, id: i64) -> anyhow::Result<bool> {
        let done = sqlx::query("DELETE FROM production_entries WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await
            .context("delete production entry")?;
        Ok(done.rows_affected() > 0)
    }

    async fn ensure_batch_quantity_column(&self) -> anyhow::Result<()> {
        sqlx::query(
            "ALTER TABLE production_entries ADD COLUMN IF NOT EXISTS batch_quantity VARCHAR(50)",
        )
        .execute(&self.db)
        .await
        .context("add batch_quantity column")?;
        Ok(())
    }
}
