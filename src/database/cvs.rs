// src/database/cvs.rs
use chrono::Utc;
use sqlx::SqlitePool;
use tracing::info;

use crate::error::DataStoreError;
use crate::types::CvRecord;

pub struct CvRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> CvRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn insert(
        &self,
        user_id: &str,
        file_url: &str,
        file_path: &str,
        title: &str,
    ) -> Result<CvRecord, DataStoreError> {
        let record = CvRecord {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            file_url: file_url.to_string(),
            file_path: file_path.to_string(),
            title: title.to_string(),
            created_at: Utc::now(),
        };

        sqlx::query(
            r#"
            INSERT INTO cvs (id, user_id, file_url, file_path, title, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&record.id)
        .bind(&record.user_id)
        .bind(&record.file_url)
        .bind(&record.file_path)
        .bind(&record.title)
        .bind(record.created_at)
        .execute(self.pool)
        .await
        .map_err(|e| DataStoreError::from_constraint(e, "cv"))?;

        info!("Recorded CV {} for user {}", record.file_path, user_id);
        Ok(record)
    }

    pub async fn find(&self, id: &str) -> Result<Option<CvRecord>, DataStoreError> {
        let record = sqlx::query_as::<_, CvRecord>(
            "SELECT id, user_id, file_url, file_path, title, created_at FROM cvs WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(record)
    }

    /// A user's CVs, newest first.
    pub async fn list_for_user(&self, user_id: &str) -> Result<Vec<CvRecord>, DataStoreError> {
        let records = sqlx::query_as::<_, CvRecord>(
            r#"
            SELECT id, user_id, file_url, file_path, title, created_at
            FROM cvs
            WHERE user_id = ?
            ORDER BY created_at DESC, rowid DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(records)
    }

    pub async fn delete(&self, id: &str, user_id: &str) -> Result<bool, DataStoreError> {
        let result = sqlx::query("DELETE FROM cvs WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
