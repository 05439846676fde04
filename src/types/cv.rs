// src/types/cv.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Metadata row for an uploaded CV. The bytes live in the blob store.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct CvRecord {
    pub id: String,
    pub user_id: String,
    pub file_url: String,
    pub file_path: String,
    pub title: String,
    pub created_at: DateTime<Utc>,
}
