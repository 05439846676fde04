// src/web/types.rs

use rocket::form::FromForm;
use rocket::fs::TempFile;
use rocket::http::Status;
use rocket::response::{self, status, Responder};
use rocket::serde::json::Json;
use rocket::serde::{Deserialize, Serialize};
use rocket::Request;
use tracing::error;

use crate::auth::AuthError;
use crate::error::{DataStoreError, InvocationError, StorageError};
use crate::swipe::{Decision, SwipeError, SwipeOutcome};
use crate::types::{
    ApplicationStats, ApplicationStatus, ApplicationSummary, JobCard, JobOffer, Role,
};

/// Settings the handlers need beyond the collaborators themselves.
#[derive(Debug, Clone, Copy)]
pub struct ServerConfig {
    pub swipe_threshold: f64,
    pub max_cv_bytes: u64,
}

// Standard response envelopes

#[derive(Serialize)]
#[serde(crate = "rocket::serde", rename_all = "lowercase")]
pub enum ResponseType {
    Text,
    Data,
    Action,
    Error,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct TextResponse {
    #[serde(rename = "type")]
    pub response_type: ResponseType,
    pub success: bool,
    pub message: String,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct DataResponse<T> {
    #[serde(rename = "type")]
    pub response_type: ResponseType,
    pub success: bool,
    pub message: String,
    pub data: T,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct ActionResponse {
    #[serde(rename = "type")]
    pub response_type: ResponseType,
    pub success: bool,
    pub message: String,
    pub action: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_actions: Option<Vec<String>>,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct StandardErrorResponse {
    #[serde(rename = "type")]
    pub response_type: ResponseType,
    pub success: bool,
    pub error: String,
    pub error_code: String,
    pub suggestions: Vec<String>,
}

impl TextResponse {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            response_type: ResponseType::Text,
            success: true,
            message: message.into(),
        }
    }
}

impl<T> DataResponse<T> {
    pub fn success(message: impl Into<String>, data: T) -> Self {
        Self {
            response_type: ResponseType::Data,
            success: true,
            message: message.into(),
            data,
        }
    }
}

impl ActionResponse {
    pub fn success(message: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            response_type: ResponseType::Action,
            success: true,
            message: message.into(),
            action: action.into(),
            next_actions: None,
        }
    }

    pub fn with_next_actions(mut self, next_actions: Vec<String>) -> Self {
        self.next_actions = Some(next_actions);
        self
    }
}

impl StandardErrorResponse {
    pub fn new(error: String, error_code: String, suggestions: Vec<String>) -> Self {
        Self {
            response_type: ResponseType::Error,
            success: false,
            error,
            error_code,
            suggestions,
        }
    }
}

// Errors

/// A `StandardErrorResponse` with the HTTP status it is sent with.
#[derive(Debug)]
pub struct ApiError {
    pub status: Status,
    pub error: String,
    pub error_code: &'static str,
    pub suggestions: Vec<String>,
}

pub type ApiResult<T> = Result<Json<T>, ApiError>;

impl ApiError {
    pub fn new(status: Status, error: impl Into<String>, error_code: &'static str) -> Self {
        Self {
            status,
            error: error.into(),
            error_code,
            suggestions: Vec::new(),
        }
    }

    pub fn with_suggestions(mut self, suggestions: &[&str]) -> Self {
        self.suggestions = suggestions.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn bad_request(error: impl Into<String>) -> Self {
        Self::new(Status::BadRequest, error, "VALIDATION_ERROR")
    }

    pub fn not_found(error: impl Into<String>) -> Self {
        Self::new(Status::NotFound, error, "NOT_FOUND")
    }

    pub fn forbidden(error: impl Into<String>) -> Self {
        Self::new(Status::Forbidden, error, "FORBIDDEN")
    }

    pub fn body(&self) -> StandardErrorResponse {
        StandardErrorResponse::new(
            self.error.clone(),
            self.error_code.to_string(),
            self.suggestions.clone(),
        )
    }
}

impl<'r> Responder<'r, 'static> for ApiError {
    fn respond_to(self, req: &'r Request<'_>) -> response::Result<'static> {
        status::Custom(self.status, Json(self.body())).respond_to(req)
    }
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        ApiError::new(e.status(), e.message(), e.error_code())
    }
}

impl From<DataStoreError> for ApiError {
    fn from(e: DataStoreError) -> Self {
        match e {
            DataStoreError::NotFound(_) => ApiError::not_found(e.to_string()),
            DataStoreError::Conflict(_) => ApiError::new(Status::Conflict, e.to_string(), "CONFLICT"),
            DataStoreError::Invalid(_) => ApiError::bad_request(e.to_string())
                .with_suggestions(&["Fill in every required field with a non-blank value"]),
            DataStoreError::Database(_) => {
                error!("Data store failure: {}", e);
                ApiError::new(Status::InternalServerError, "Database error occurred", "DATABASE_ERROR")
                    .with_suggestions(&["Try again in a few moments"])
            }
        }
    }
}

impl From<StorageError> for ApiError {
    fn from(e: StorageError) -> Self {
        match e {
            StorageError::AlreadyExists(_) => {
                ApiError::new(Status::Conflict, e.to_string(), "FILE_EXISTS")
                    .with_suggestions(&["Rename the file before uploading it again"])
            }
            StorageError::InvalidPath(_) => ApiError::new(Status::BadRequest, e.to_string(), "INVALID_PATH"),
            StorageError::NotFound(_) => ApiError::not_found(e.to_string()),
            StorageError::Io { .. } => {
                error!("Storage failure: {}", e);
                ApiError::new(Status::InternalServerError, "File storage failed", "STORAGE_ERROR")
            }
        }
    }
}

impl From<InvocationError> for ApiError {
    fn from(e: InvocationError) -> Self {
        error!("Analysis service failure: {}", e);
        ApiError::new(Status::BadGateway, e.to_string(), "ANALYSIS_FAILED")
            .with_suggestions(&["Try again later", "Check that the CV is a readable PDF"])
    }
}

impl From<SwipeError> for ApiError {
    fn from(e: SwipeError) -> Self {
        ApiError::new(Status::Conflict, e.to_string(), "INVALID_STATE")
            .with_suggestions(&["Start a new swipe session to load more offers"])
    }
}

// Requests

#[derive(Deserialize)]
#[serde(crate = "rocket::serde")]
pub struct RoleRequest {
    pub role: Role,
}

#[derive(Deserialize)]
#[serde(crate = "rocket::serde")]
pub struct GestureEndRequest {
    pub offset: f64,
}

#[derive(Deserialize)]
#[serde(crate = "rocket::serde")]
pub struct DecideRequest {
    pub decision: Decision,
}

#[derive(Deserialize)]
#[serde(crate = "rocket::serde")]
pub struct ApplicationStatusRequest {
    pub status: ApplicationStatus,
}

#[derive(FromForm)]
pub struct CvUploadForm<'f> {
    pub cv_file: TempFile<'f>,
}

// Response payloads

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct UserInfo {
    pub id: String,
    pub email: Option<String>,
    pub role: Option<Role>,
}

/// Where a seeker stands in their swipe queue.
#[derive(Debug, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct SwipeState {
    pub card: Option<JobCard>,
    pub cursor: usize,
    pub total: usize,
    pub remaining: usize,
    pub exhausted: bool,
}

#[derive(Debug, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct SwipeStep {
    /// `None` when the gesture was cancelled.
    pub outcome: Option<SwipeOutcomeInfo>,
    pub state: SwipeState,
}

#[derive(Debug, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct SwipeOutcomeInfo {
    pub job_offer_id: String,
    pub decision: Decision,
}

impl From<SwipeOutcome> for SwipeOutcomeInfo {
    fn from(outcome: SwipeOutcome) -> Self {
        Self {
            job_offer_id: outcome.item_id,
            decision: outcome.decision,
        }
    }
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct AdminDashboard {
    pub total_users: i64,
    pub recruiters: i64,
    pub job_seekers: i64,
    pub total_job_offers: i64,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct RecruiterDashboard {
    pub active_offers: i64,
    pub total_candidates: i64,
    pub shortlisted: i64,
    pub pending: i64,
    pub offers: Vec<JobOffer>,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct SeekerDashboard {
    pub stats: ApplicationStats,
    pub recent_applications: Vec<ApplicationSummary>,
}
