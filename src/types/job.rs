// src/types/job.rs
//! Job offers as stored, and the card projection shown to seekers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::swipe::Candidate;
use crate::utils::split_skills;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum JobStatus {
    Active,
    Closed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Active => "active",
            JobStatus::Closed => "closed",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct JobOffer {
    pub id: String,
    pub recruiter_id: String,
    pub title: String,
    pub description: String,
    pub company: String,
    pub location: String,
    pub contract_type: String,
    pub salary_range: Option<String>,
    pub requirements: Option<String>,
    pub status: JobStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Form fields a recruiter fills in to publish an offer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewJobOffer {
    pub title: String,
    pub description: String,
    pub company: String,
    pub location: String,
    pub contract_type: String,
    #[serde(default)]
    pub salary_range: Option<String>,
    #[serde(default)]
    pub requirements: Option<String>,
}

impl NewJobOffer {
    /// Names of required fields left blank.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("title", &self.title),
            ("description", &self.description),
            ("company", &self.company),
            ("location", &self.location),
            ("contract_type", &self.contract_type),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect()
    }
}

/// Partial update; `None` leaves the column untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobOfferPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub contract_type: Option<String>,
    pub salary_range: Option<String>,
    pub requirements: Option<String>,
    pub status: Option<JobStatus>,
}

impl JobOfferPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.company.is_none()
            && self.location.is_none()
            && self.contract_type.is_none()
            && self.salary_range.is_none()
            && self.requirements.is_none()
            && self.status.is_none()
    }

    /// A patch may not blank out a required field.
    pub fn blanked_fields(&self) -> Vec<&'static str> {
        [
            ("title", &self.title),
            ("description", &self.description),
            ("company", &self.company),
            ("location", &self.location),
            ("contract_type", &self.contract_type),
        ]
        .into_iter()
        .filter(|(_, value)| value.as_deref().is_some_and(|v| v.trim().is_empty()))
        .map(|(name, _)| name)
        .collect()
    }
}

/// What a seeker sees on a swipe card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobCard {
    pub id: String,
    pub title: String,
    pub company: String,
    pub location: String,
    pub salary: String,
    pub description: String,
    pub skills: Vec<String>,
}

impl From<&JobOffer> for JobCard {
    fn from(offer: &JobOffer) -> Self {
        Self {
            id: offer.id.clone(),
            title: offer.title.clone(),
            company: offer.company.clone(),
            location: offer.location.clone(),
            salary: offer.salary_range.clone().unwrap_or_default(),
            description: offer.description.clone(),
            skills: offer
                .requirements
                .as_deref()
                .map(split_skills)
                .unwrap_or_default(),
        }
    }
}

impl Candidate for JobCard {
    fn candidate_id(&self) -> &str {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offer() -> JobOffer {
        let now = Utc::now();
        JobOffer {
            id: "offer-1".to_string(),
            recruiter_id: "rec-1".to_string(),
            title: "Développeur Frontend React".to_string(),
            description: "Rejoindre notre équipe".to_string(),
            company: "Tech Solutions".to_string(),
            location: "Paris, France".to_string(),
            contract_type: "CDI".to_string(),
            salary_range: Some("45-60k€/an".to_string()),
            requirements: Some("React, TypeScript, , CSS,Git".to_string()),
            status: JobStatus::Active,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_card_projection() {
        let card = JobCard::from(&offer());
        assert_eq!(card.id, "offer-1");
        assert_eq!(card.salary, "45-60k€/an");
        assert_eq!(card.skills, vec!["React", "TypeScript", "CSS", "Git"]);
        assert_eq!(card.candidate_id(), "offer-1");
    }

    #[test]
    fn test_card_without_optional_fields() {
        let mut o = offer();
        o.salary_range = None;
        o.requirements = None;
        let card = JobCard::from(&o);
        assert_eq!(card.salary, "");
        assert!(card.skills.is_empty());
    }

    #[test]
    fn test_missing_fields() {
        let new = NewJobOffer {
            title: "  ".to_string(),
            description: "desc".to_string(),
            company: String::new(),
            location: "Lyon".to_string(),
            contract_type: "CDD".to_string(),
            salary_range: None,
            requirements: None,
        };
        assert_eq!(new.missing_fields(), vec!["title", "company"]);
    }

    #[test]
    fn test_patch_checks() {
        assert!(JobOfferPatch::default().is_empty());
        let patch = JobOfferPatch {
            location: Some(String::new()),
            salary_range: Some(String::new()),
            ..Default::default()
        };
        assert!(!patch.is_empty());
        assert_eq!(patch.blanked_fields(), vec!["location"]);
    }
}
