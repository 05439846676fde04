// src/core/database.rs
//! SQLite connection management and schema migrations.

use anyhow::{Context, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use std::str::FromStr;
use tracing::info;

use crate::core::FsOps;

#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Create new database connection with automatic setup
    pub async fn new(database_path: &Path) -> Result<Self> {
        if let Some(parent) = database_path.parent() {
            FsOps::ensure_dir_exists(parent).await?;
        }

        let database_url = format!("sqlite:{}?mode=rwc", database_path.display());
        let options = SqliteConnectOptions::from_str(&database_url)
            .with_context(|| format!("Invalid database path: {}", database_path.display()))?
            .foreign_keys(true);

        let pool = SqlitePool::connect_with(options).await.with_context(|| {
            format!("Failed to connect to database: {}", database_path.display())
        })?;

        info!("Database connection established: {}", database_path.display());

        let db = Self { pool };
        db.migrate().await?;
        Ok(db)
    }

    /// Single-connection in-memory database, used by tests and dry runs.
    pub async fn in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .context("Invalid in-memory database URL")?
            .foreign_keys(true);

        // Every connection to :memory: is a separate database.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .context("Failed to open in-memory database")?;

        let db = Self { pool };
        db.migrate().await?;
        Ok(db)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn migrate(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS user_roles (
                user_id TEXT PRIMARY KEY,
                email TEXT,
                role TEXT NOT NULL CHECK (role IN ('job-seeker', 'recruiter', 'admin')),
                created_at TEXT NOT NULL DEFAULT (datetime('now'))
            );
            "#,
        )
        .execute(&self.pool)
        .await
        .context("Failed to create user_roles table")?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS job_offers (
                id TEXT PRIMARY KEY,
                recruiter_id TEXT NOT NULL,
                title TEXT NOT NULL,
                description TEXT NOT NULL,
                company TEXT NOT NULL,
                location TEXT NOT NULL,
                contract_type TEXT NOT NULL,
                salary_range TEXT,
                requirements TEXT,
                status TEXT NOT NULL DEFAULT 'active' CHECK (status IN ('active', 'closed')),
                created_at TEXT NOT NULL DEFAULT (datetime('now')),
                updated_at TEXT NOT NULL DEFAULT (datetime('now'))
            );
            "#,
        )
        .execute(&self.pool)
        .await
        .context("Failed to create job_offers table")?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS applications (
                id TEXT PRIMARY KEY,
                job_offer_id TEXT NOT NULL REFERENCES job_offers(id) ON DELETE CASCADE,
                seeker_id TEXT NOT NULL,
                status TEXT NOT NULL DEFAULT 'pending'
                    CHECK (status IN ('pending', 'accepted', 'rejected')),
                created_at TEXT NOT NULL DEFAULT (datetime('now')),
                updated_at TEXT NOT NULL DEFAULT (datetime('now')),
                UNIQUE (job_offer_id, seeker_id)
            );
            "#,
        )
        .execute(&self.pool)
        .await
        .context("Failed to create applications table")?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS cvs (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                file_url TEXT NOT NULL,
                file_path TEXT NOT NULL UNIQUE,
                title TEXT NOT NULL,
                created_at TEXT NOT NULL DEFAULT (datetime('now'))
            );
            "#,
        )
        .execute(&self.pool)
        .await
        .context("Failed to create cvs table")?;

        for index in [
            "CREATE INDEX IF NOT EXISTS idx_job_offers_recruiter ON job_offers(recruiter_id);",
            "CREATE INDEX IF NOT EXISTS idx_job_offers_status ON job_offers(status);",
            "CREATE INDEX IF NOT EXISTS idx_applications_seeker ON applications(seeker_id);",
            "CREATE INDEX IF NOT EXISTS idx_cvs_user ON cvs(user_id);",
        ] {
            sqlx::query(index).execute(&self.pool).await?;
        }

        info!("Database migrations completed");
        Ok(())
    }

    pub async fn health_check(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .context("Database health check failed")?;
        Ok(())
    }
}
