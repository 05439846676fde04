// src/database/applications.rs
use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::DataStoreError;
use crate::types::{Application, ApplicationStats, ApplicationStatus, ApplicationSummary};

pub struct ApplicationRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> ApplicationRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Record a pending application. Returns `false` when the seeker had
    /// already applied to this offer.
    pub async fn record(&self, job_offer_id: &str, seeker_id: &str) -> Result<bool, DataStoreError> {
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO applications (id, job_offer_id, seeker_id, status, created_at, updated_at)
            VALUES (?, ?, ?, 'pending', ?, ?)
            ON CONFLICT (job_offer_id, seeker_id) DO NOTHING
            "#,
        )
        .bind(uuid::Uuid::new_v4().to_string())
        .bind(job_offer_id)
        .bind(seeker_id)
        .bind(now)
        .bind(now)
        .execute(self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() => {
                DataStoreError::NotFound(format!("job offer {}", job_offer_id))
            }
            _ => DataStoreError::Database(e),
        })?;

        let inserted = result.rows_affected() > 0;
        if inserted {
            info!("Seeker {} applied to offer {}", seeker_id, job_offer_id);
        } else {
            debug!(
                "Seeker {} already applied to offer {}, ignoring",
                seeker_id, job_offer_id
            );
        }
        Ok(inserted)
    }

    pub async fn find(&self, id: &str) -> Result<Option<Application>, DataStoreError> {
        let application = sqlx::query_as::<_, Application>(
            r#"
            SELECT id, job_offer_id, seeker_id, status, created_at, updated_at
            FROM applications WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(application)
    }

    /// Recruiter who owns the offer an application targets.
    pub async fn offer_owner(&self, id: &str) -> Result<Option<String>, DataStoreError> {
        let owner: Option<(String,)> = sqlx::query_as(
            r#"
            SELECT o.recruiter_id FROM applications a
            JOIN job_offers o ON o.id = a.job_offer_id
            WHERE a.id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(owner.map(|(recruiter_id,)| recruiter_id))
    }

    pub async fn update_status(
        &self,
        id: &str,
        status: ApplicationStatus,
    ) -> Result<Application, DataStoreError> {
        let result = sqlx::query("UPDATE applications SET status = ?, updated_at = ? WHERE id = ?")
            .bind(status)
            .bind(Utc::now())
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DataStoreError::NotFound(format!("application {}", id)));
        }

        info!("Application {} is now {:?}", id, status);
        self.find(id)
            .await?
            .ok_or_else(|| DataStoreError::NotFound(format!("application {}", id)))
    }

    /// Most recent applications of a seeker with the offer they target.
    pub async fn recent_for_seeker(
        &self,
        seeker_id: &str,
        limit: i64,
    ) -> Result<Vec<ApplicationSummary>, DataStoreError> {
        let summaries = sqlx::query_as::<_, ApplicationSummary>(
            r#"
            SELECT a.id, a.job_offer_id, o.title AS job_title, o.company, a.status, a.created_at
            FROM applications a
            JOIN job_offers o ON o.id = a.job_offer_id
            WHERE a.seeker_id = ?
            ORDER BY a.created_at DESC, a.rowid DESC
            LIMIT ?
            "#,
        )
        .bind(seeker_id)
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        Ok(summaries)
    }

    pub async fn stats_for_seeker(&self, seeker_id: &str) -> Result<ApplicationStats, DataStoreError> {
        let stats = sqlx::query_as::<_, ApplicationStats>(
            r#"
            SELECT COUNT(*) AS total,
                   COALESCE(SUM(CASE WHEN status = 'pending' THEN 1 ELSE 0 END), 0) AS pending,
                   COALESCE(SUM(CASE WHEN status = 'accepted' THEN 1 ELSE 0 END), 0) AS accepted,
                   COALESCE(SUM(CASE WHEN status = 'rejected' THEN 1 ELSE 0 END), 0) AS rejected
            FROM applications
            WHERE seeker_id = ?
            "#,
        )
        .bind(seeker_id)
        .fetch_one(self.pool)
        .await?;

        Ok(stats)
    }

    /// Applications received on all offers of a recruiter.
    pub async fn stats_for_recruiter(
        &self,
        recruiter_id: &str,
    ) -> Result<ApplicationStats, DataStoreError> {
        let stats = sqlx::query_as::<_, ApplicationStats>(
            r#"
            SELECT COUNT(a.id) AS total,
                   COALESCE(SUM(CASE WHEN a.status = 'pending' THEN 1 ELSE 0 END), 0) AS pending,
                   COALESCE(SUM(CASE WHEN a.status = 'accepted' THEN 1 ELSE 0 END), 0) AS accepted,
                   COALESCE(SUM(CASE WHEN a.status = 'rejected' THEN 1 ELSE 0 END), 0) AS rejected
            FROM applications a
            JOIN job_offers o ON o.id = a.job_offer_id
            WHERE o.recruiter_id = ?
            "#,
        )
        .bind(recruiter_id)
        .fetch_one(self.pool)
        .await?;

        Ok(stats)
    }
}
