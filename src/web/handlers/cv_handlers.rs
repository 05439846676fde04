// src/web/handlers/cv_handlers.rs

use crate::auth::AuthenticatedUser;
use crate::core::{BlobStore, Database, ServiceClient};
use crate::database::CvRepository;
use crate::types::{CvAnalysis, CvRecord};
use crate::utils::cv_object_path;
use crate::web::types::*;

use rocket::form::Form;
use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::State;
use tracing::{error, info, warn};

const DEFAULT_CV_NAME: &str = "cv.pdf";

/// Store an uploaded PDF and record it. The blob is written first; if the
/// metadata insert then fails the error is reported and the blob stays.
pub async fn upload_cv_handler(
    mut upload: Form<CvUploadForm<'_>>,
    auth: AuthenticatedUser,
    db: &State<Database>,
    store: &State<BlobStore>,
    config: &State<ServerConfig>,
) -> ApiResult<DataResponse<CvRecord>> {
    info!("User {} uploading a CV", auth.id());

    let content_type = upload.cv_file.content_type();
    if !content_type.is_some_and(|ct| ct.is_pdf()) {
        let received = content_type
            .map(|ct| ct.to_string())
            .unwrap_or_else(|| "unknown".to_string());
        return Err(ApiError::new(
            Status::BadRequest,
            format!("Only PDF files are supported. Received: {}", received),
            "INVALID_FORMAT",
        )
        .with_suggestions(&["Upload a PDF file (.pdf)"]));
    }

    if upload.cv_file.len() > config.max_cv_bytes {
        return Err(ApiError::new(
            Status::PayloadTooLarge,
            format!(
                "File size exceeds {}MB limit",
                config.max_cv_bytes / (1024 * 1024)
            ),
            "FILE_TOO_LARGE",
        )
        .with_suggestions(&["Compress your CV file"]));
    }

    let title = upload
        .cv_file
        .raw_name()
        .map(|n| n.dangerous_unsafe_unsanitized_raw().as_str().to_string())
        .filter(|n| !n.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_CV_NAME.to_string());
    let file_name = if title.to_lowercase().ends_with(".pdf") {
        title.clone()
    } else {
        format!("{}.pdf", title)
    };
    let object_path = cv_object_path(auth.id(), &file_name);

    let temp_path = std::env::temp_dir().join(format!("cv_upload_{}", uuid::Uuid::new_v4()));
    if let Err(e) = upload.cv_file.persist_to(&temp_path).await {
        error!("Failed to save uploaded file: {}", e);
        return Err(ApiError::new(
            Status::InternalServerError,
            "Failed to process uploaded file",
            "FILE_SAVE_ERROR",
        )
        .with_suggestions(&["Try uploading the file again"]));
    }
    let bytes = tokio::fs::read(&temp_path).await;
    let _ = tokio::fs::remove_file(&temp_path).await;
    let bytes = bytes.map_err(|e| {
        error!("Failed to read uploaded file: {}", e);
        ApiError::new(
            Status::InternalServerError,
            "Failed to process uploaded file",
            "FILE_SAVE_ERROR",
        )
    })?;

    store.upload(&object_path, &bytes).await?;
    let file_url = store.public_url(&object_path);

    let record = CvRepository::new(db.pool())
        .insert(auth.id(), &file_url, &object_path, &title)
        .await?;

    info!("CV {} uploaded ({} bytes)", object_path, bytes.len());
    Ok(Json(DataResponse::success("CV uploaded", record)))
}

pub async fn list_cvs_handler(
    auth: AuthenticatedUser,
    db: &State<Database>,
) -> ApiResult<DataResponse<Vec<CvRecord>>> {
    let records = CvRepository::new(db.pool())
        .list_for_user(auth.id())
        .await?;
    Ok(Json(DataResponse::success(
        format!("{} CVs", records.len()),
        records,
    )))
}

async fn owned_cv(db: &Database, id: &str, auth: &AuthenticatedUser) -> Result<CvRecord, ApiError> {
    match CvRepository::new(db.pool()).find(id).await? {
        Some(record) if record.user_id == auth.id() => Ok(record),
        Some(_) => {
            warn!("User {} asked for CV {} of another user", auth.id(), id);
            Err(ApiError::not_found(format!("cv {} not found", id)))
        }
        None => Err(ApiError::not_found(format!("cv {} not found", id))),
    }
}

pub async fn analyze_cv_handler(
    id: &str,
    auth: AuthenticatedUser,
    db: &State<Database>,
    client: &State<ServiceClient>,
) -> ApiResult<DataResponse<CvAnalysis>> {
    let record = owned_cv(db, id, &auth).await?;

    let analysis = client.analyze_cv(&record.file_url).await?;
    let message = if analysis.is_empty() {
        "Analysis returned no recognised sections"
    } else {
        "CV analysed"
    };

    Ok(Json(DataResponse::success(message, analysis)))
}

pub async fn delete_cv_handler(
    id: &str,
    auth: AuthenticatedUser,
    db: &State<Database>,
    store: &State<BlobStore>,
) -> ApiResult<ActionResponse> {
    let record = owned_cv(db, id, &auth).await?;

    CvRepository::new(db.pool()).delete(id, auth.id()).await?;
    if !store.remove(&record.file_path).await? {
        warn!("CV {} had no stored file at {}", id, record.file_path);
    }

    Ok(Json(ActionResponse::success("CV deleted", "delete_cv")))
}
