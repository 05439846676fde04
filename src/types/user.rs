// src/types/user.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "kebab-case")]
#[sqlx(rename_all = "kebab-case")]
pub enum Role {
    JobSeeker,
    Recruiter,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::JobSeeker => "job-seeker",
            Role::Recruiter => "recruiter",
            Role::Admin => "admin",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "job-seeker" | "job_seeker" | "seeker" => Ok(Role::JobSeeker),
            "recruiter" => Ok(Role::Recruiter),
            "admin" => Ok(Role::Admin),
            other => Err(format!(
                "Unknown role: {}. Use job-seeker, recruiter or admin",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserRole {
    pub user_id: String,
    pub email: Option<String>,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

/// Identity carried by a verified access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: String,
    pub email: Option<String>,
}

/// A signed-in user as seen by the session hub.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user: SessionUser,
    pub role: Option<Role>,
    /// Token expiry, seconds since the epoch.
    pub expires_at: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parsing() {
        assert_eq!("job-seeker".parse::<Role>(), Ok(Role::JobSeeker));
        assert_eq!(" Recruiter ".parse::<Role>(), Ok(Role::Recruiter));
        assert_eq!("admin".parse::<Role>(), Ok(Role::Admin));
        assert!("owner".parse::<Role>().is_err());
    }

    #[test]
    fn test_role_json_matches_column_value() {
        let json = serde_json::to_string(&Role::JobSeeker).unwrap();
        assert_eq!(json, "\"job-seeker\"");
        assert_eq!(Role::JobSeeker.to_string(), "job-seeker");
    }
}
