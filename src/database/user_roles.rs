// src/database/user_roles.rs
use chrono::Utc;
use sqlx::SqlitePool;
use tracing::info;

use crate::error::DataStoreError;
use crate::types::{Role, UserRole};

pub struct UserRoleRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> UserRoleRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn find(&self, user_id: &str) -> Result<Option<UserRole>, DataStoreError> {
        let role = sqlx::query_as::<_, UserRole>(
            "SELECT user_id, email, role, created_at FROM user_roles WHERE user_id = ?",
        )
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(role)
    }

    /// Register a user's role once. Asking again for the same role is a
    /// no-op; asking for a different one is a conflict.
    pub async fn register(
        &self,
        user_id: &str,
        email: Option<&str>,
        role: Role,
    ) -> Result<UserRole, DataStoreError> {
        if let Some(existing) = self.find(user_id).await? {
            if existing.role == role {
                return Ok(existing);
            }
            return Err(DataStoreError::Conflict(format!(
                "user {} already registered as {}",
                user_id, existing.role
            )));
        }

        let created = UserRole {
            user_id: user_id.to_string(),
            email: email.map(str::to_string),
            role,
            created_at: Utc::now(),
        };

        sqlx::query(
            "INSERT INTO user_roles (user_id, email, role, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(&created.user_id)
        .bind(&created.email)
        .bind(created.role)
        .bind(created.created_at)
        .execute(self.pool)
        .await
        .map_err(|e| DataStoreError::from_constraint(e, "user role"))?;

        info!("Registered user {} as {}", user_id, role);
        Ok(created)
    }

    /// Operator override: set the role whatever it was before.
    pub async fn assign(
        &self,
        user_id: &str,
        email: Option<&str>,
        role: Role,
    ) -> Result<UserRole, DataStoreError> {
        sqlx::query(
            r#"
            INSERT INTO user_roles (user_id, email, role, created_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT (user_id) DO UPDATE SET
                role = excluded.role,
                email = COALESCE(excluded.email, user_roles.email)
            "#,
        )
        .bind(user_id)
        .bind(email)
        .bind(role)
        .bind(Utc::now())
        .execute(self.pool)
        .await?;

        info!("Assigned role {} to user {}", role, user_id);
        self.find(user_id)
            .await?
            .ok_or_else(|| DataStoreError::NotFound(format!("user {}", user_id)))
    }

    pub async fn list(&self) -> Result<Vec<UserRole>, DataStoreError> {
        let roles = sqlx::query_as::<_, UserRole>(
            "SELECT user_id, email, role, created_at FROM user_roles ORDER BY created_at ASC, rowid ASC",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(roles)
    }

    pub async fn count(&self) -> Result<i64, DataStoreError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM user_roles")
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }

    pub async fn count_by_role(&self, role: Role) -> Result<i64, DataStoreError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM user_roles WHERE role = ?")
            .bind(role)
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }
}
