// src/database/job_offers.rs
use chrono::Utc;
use sqlx::SqlitePool;
use tracing::info;

use crate::error::DataStoreError;
use crate::types::{JobOffer, JobOfferPatch, JobStatus, NewJobOffer};

const OFFER_COLUMNS: &str = "id, recruiter_id, title, description, company, location, \
     contract_type, salary_range, requirements, status, created_at, updated_at";

pub struct JobOfferRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> JobOfferRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Publish a new offer for `recruiter_id`. Offers start out `active`.
    pub async fn create(
        &self,
        recruiter_id: &str,
        offer: &NewJobOffer,
    ) -> Result<JobOffer, DataStoreError> {
        let missing = offer.missing_fields();
        if !missing.is_empty() {
            return Err(DataStoreError::Invalid(format!(
                "missing required fields: {}",
                missing.join(", ")
            )));
        }

        let now = Utc::now();
        let created = JobOffer {
            id: uuid::Uuid::new_v4().to_string(),
            recruiter_id: recruiter_id.to_string(),
            title: offer.title.trim().to_string(),
            description: offer.description.trim().to_string(),
            company: offer.company.trim().to_string(),
            location: offer.location.trim().to_string(),
            contract_type: offer.contract_type.trim().to_string(),
            salary_range: non_blank(offer.salary_range.as_deref()),
            requirements: non_blank(offer.requirements.as_deref()),
            status: JobStatus::Active,
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            r#"
            INSERT INTO job_offers (id, recruiter_id, title, description, company, location,
                contract_type, salary_range, requirements, status, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&created.id)
        .bind(&created.recruiter_id)
        .bind(&created.title)
        .bind(&created.description)
        .bind(&created.company)
        .bind(&created.location)
        .bind(&created.contract_type)
        .bind(&created.salary_range)
        .bind(&created.requirements)
        .bind(created.status)
        .bind(created.created_at)
        .bind(created.updated_at)
        .execute(self.pool)
        .await
        .map_err(|e| DataStoreError::from_constraint(e, "job offer"))?;

        info!("Created job offer {} for recruiter {}", created.id, recruiter_id);
        Ok(created)
    }

    pub async fn find(&self, id: &str) -> Result<Option<JobOffer>, DataStoreError> {
        let offer = sqlx::query_as::<_, JobOffer>(&format!(
            "SELECT {} FROM job_offers WHERE id = ?",
            OFFER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(offer)
    }

    pub async fn get(&self, id: &str) -> Result<JobOffer, DataStoreError> {
        self.find(id)
            .await?
            .ok_or_else(|| DataStoreError::NotFound(format!("job offer {}", id)))
    }

    /// Every offer, newest first.
    pub async fn list_all(&self) -> Result<Vec<JobOffer>, DataStoreError> {
        let offers = sqlx::query_as::<_, JobOffer>(&format!(
            "SELECT {} FROM job_offers ORDER BY created_at DESC, rowid DESC",
            OFFER_COLUMNS
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(offers)
    }

    pub async fn list_active(&self) -> Result<Vec<JobOffer>, DataStoreError> {
        let offers = sqlx::query_as::<_, JobOffer>(&format!(
            "SELECT {} FROM job_offers WHERE status = 'active' \
             ORDER BY created_at DESC, rowid DESC",
            OFFER_COLUMNS
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(offers)
    }

    pub async fn list_for_recruiter(
        &self,
        recruiter_id: &str,
    ) -> Result<Vec<JobOffer>, DataStoreError> {
        let offers = sqlx::query_as::<_, JobOffer>(&format!(
            "SELECT {} FROM job_offers WHERE recruiter_id = ? \
             ORDER BY created_at DESC, rowid DESC",
            OFFER_COLUMNS
        ))
        .bind(recruiter_id)
        .fetch_all(self.pool)
        .await?;

        Ok(offers)
    }

    /// Active offers the seeker has not applied to yet, newest first.
    pub async fn swipe_queue_for(&self, seeker_id: &str) -> Result<Vec<JobOffer>, DataStoreError> {
        let offers = sqlx::query_as::<_, JobOffer>(&format!(
            r#"
            SELECT {} FROM job_offers o
            WHERE o.status = 'active'
              AND NOT EXISTS (
                  SELECT 1 FROM applications a
                  WHERE a.job_offer_id = o.id AND a.seeker_id = ?
              )
            ORDER BY o.created_at DESC, o.rowid DESC
            "#,
            OFFER_COLUMNS
        ))
        .bind(seeker_id)
        .fetch_all(self.pool)
        .await?;

        Ok(offers)
    }

    /// Apply a partial update to an offer owned by `recruiter_id`.
    /// An empty string clears an optional column.
    pub async fn update(
        &self,
        id: &str,
        recruiter_id: &str,
        patch: &JobOfferPatch,
    ) -> Result<JobOffer, DataStoreError> {
        let blanked = patch.blanked_fields();
        if !blanked.is_empty() {
            return Err(DataStoreError::Invalid(format!(
                "required fields cannot be blank: {}",
                blanked.join(", ")
            )));
        }

        let mut offer = self.get(id).await?;
        if offer.recruiter_id != recruiter_id {
            return Err(DataStoreError::NotFound(format!("job offer {}", id)));
        }
        if patch.is_empty() {
            return Ok(offer);
        }

        let apply = |target: &mut String, value: &Option<String>| {
            if let Some(v) = value {
                *target = v.trim().to_string();
            }
        };
        apply(&mut offer.title, &patch.title);
        apply(&mut offer.description, &patch.description);
        apply(&mut offer.company, &patch.company);
        apply(&mut offer.location, &patch.location);
        apply(&mut offer.contract_type, &patch.contract_type);
        if let Some(salary) = &patch.salary_range {
            offer.salary_range = non_blank(Some(salary));
        }
        if let Some(requirements) = &patch.requirements {
            offer.requirements = non_blank(Some(requirements));
        }
        if let Some(status) = patch.status {
            offer.status = status;
        }
        offer.updated_at = Utc::now();

        sqlx::query(
            r#"
            UPDATE job_offers
            SET title = ?, description = ?, company = ?, location = ?, contract_type = ?,
                salary_range = ?, requirements = ?, status = ?, updated_at = ?
            WHERE id = ? AND recruiter_id = ?
            "#,
        )
        .bind(&offer.title)
        .bind(&offer.description)
        .bind(&offer.company)
        .bind(&offer.location)
        .bind(&offer.contract_type)
        .bind(&offer.salary_range)
        .bind(&offer.requirements)
        .bind(offer.status)
        .bind(offer.updated_at)
        .bind(id)
        .bind(recruiter_id)
        .execute(self.pool)
        .await
        .map_err(|e| DataStoreError::from_constraint(e, "job offer"))?;

        info!("Updated job offer {}", id);
        Ok(offer)
    }

    /// Delete an offer owned by `recruiter_id`. Its applications go with it.
    pub async fn delete(&self, id: &str, recruiter_id: &str) -> Result<bool, DataStoreError> {
        let result = sqlx::query("DELETE FROM job_offers WHERE id = ? AND recruiter_id = ?")
            .bind(id)
            .bind(recruiter_id)
            .execute(self.pool)
            .await?;

        let deleted = result.rows_affected() > 0;
        if deleted {
            info!("Deleted job offer {}", id);
        }
        Ok(deleted)
    }

    pub async fn count(&self) -> Result<i64, DataStoreError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM job_offers")
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }

    pub async fn count_active(&self) -> Result<i64, DataStoreError> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM job_offers WHERE status = 'active'")
                .fetch_one(self.pool)
                .await?;
        Ok(count)
    }

    pub async fn count_active_for_recruiter(
        &self,
        recruiter_id: &str,
    ) -> Result<i64, DataStoreError> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM job_offers WHERE status = 'active' AND recruiter_id = ?",
        )
        .bind(recruiter_id)
        .fetch_one(self.pool)
        .await?;
        Ok(count)
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::core::Database;

    pub(crate) fn new_offer(title: &str) -> NewJobOffer {
        NewJobOffer {
            title: title.to_string(),
            description: "Rejoindre une équipe produit".to_string(),
            company: "Tech Solutions".to_string(),
            location: "Paris, France".to_string(),
            contract_type: "CDI".to_string(),
            salary_range: Some("45-60k€/an".to_string()),
            requirements: Some("Rust, SQL".to_string()),
        }
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let db = Database::in_memory().await.unwrap();
        let repo = JobOfferRepository::new(db.pool());

        let created = repo.create("rec-1", &new_offer("Backend")).await.unwrap();
        assert_eq!(created.status, JobStatus::Active);

        let fetched = repo.get(&created.id).await.unwrap();
        assert_eq!(fetched.title, "Backend");
        assert_eq!(fetched.salary_range.as_deref(), Some("45-60k€/an"));
        assert!(matches!(
            repo.get("missing").await,
            Err(DataStoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_create_rejects_blank_required_fields() {
        let db = Database::in_memory().await.unwrap();
        let repo = JobOfferRepository::new(db.pool());

        let mut offer = new_offer("Backend");
        offer.contract_type = "  ".to_string();
        let err = repo.create("rec-1", &offer).await.unwrap_err();
        assert!(matches!(err, DataStoreError::Invalid(ref m) if m.contains("contract_type")));
        assert_eq!(repo.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_lists_are_newest_first() {
        let db = Database::in_memory().await.unwrap();
        let repo = JobOfferRepository::new(db.pool());

        let first = repo.create("rec-1", &new_offer("First")).await.unwrap();
        let second = repo.create("rec-2", &new_offer("Second")).await.unwrap();

        let ids: Vec<String> = repo.list_all().await.unwrap().into_iter().map(|o| o.id).collect();
        assert_eq!(ids, vec![second.id.clone(), first.id.clone()]);

        let mine = repo.list_for_recruiter("rec-1").await.unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].id, first.id);
    }

    #[tokio::test]
    async fn test_update_is_owner_only_and_partial() {
        let db = Database::in_memory().await.unwrap();
        let repo = JobOfferRepository::new(db.pool());
        let offer = repo.create("rec-1", &new_offer("Backend")).await.unwrap();

        let patch = JobOfferPatch {
            title: Some("Backend Senior".to_string()),
            salary_range: Some(String::new()),
            status: Some(JobStatus::Closed),
            ..Default::default()
        };

        assert!(matches!(
            repo.update(&offer.id, "rec-2", &patch).await,
            Err(DataStoreError::NotFound(_))
        ));

        let updated = repo.update(&offer.id, "rec-1", &patch).await.unwrap();
        assert_eq!(updated.title, "Backend Senior");
        assert_eq!(updated.company, "Tech Solutions");
        assert!(updated.salary_range.is_none());
        assert_eq!(updated.status, JobStatus::Closed);

        let stored = repo.get(&offer.id).await.unwrap();
        assert_eq!(stored.title, "Backend Senior");
        assert_eq!(repo.count_active().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_delete_is_owner_only() {
        let db = Database::in_memory().await.unwrap();
        let repo = JobOfferRepository::new(db.pool());
        let offer = repo.create("rec-1", &new_offer("Backend")).await.unwrap();

        assert!(!repo.delete(&offer.id, "rec-2").await.unwrap());
        assert!(repo.delete(&offer.id, "rec-1").await.unwrap());
        assert_eq!(repo.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_swipe_queue_skips_closed_and_applied() {
        let db = Database::in_memory().await.unwrap();
        let repo = JobOfferRepository::new(db.pool());

        let a = repo.create("rec-1", &new_offer("A")).await.unwrap();
        let b = repo.create("rec-1", &new_offer("B")).await.unwrap();
        let c = repo.create("rec-1", &new_offer("C")).await.unwrap();
        let closed = JobOfferPatch {
            status: Some(JobStatus::Closed),
            ..Default::default()
        };
        repo.update(&b.id, "rec-1", &closed).await.unwrap();

        crate::database::ApplicationRepository::new(db.pool())
            .record(&c.id, "seeker-1")
            .await
            .unwrap();

        let queue: Vec<String> = repo
            .swipe_queue_for("seeker-1")
            .await
            .unwrap()
            .into_iter()
            .map(|o| o.id)
            .collect();
        assert_eq!(queue, vec![a.id.clone()]);

        let other: Vec<String> = repo
            .swipe_queue_for("seeker-2")
            .await
            .unwrap()
            .into_iter()
            .map(|o| o.id)
            .collect();
        assert_eq!(other, vec![c.id, a.id]);
    }
}
