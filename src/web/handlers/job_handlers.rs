// src/web/handlers/job_handlers.rs
use crate::auth::AuthenticatedUser;
use crate::core::Database;
use crate::database::{ApplicationRepository, JobOfferRepository};
use crate::types::{Application, JobOffer, JobOfferPatch, NewJobOffer, Role};
use crate::web::types::*;

use rocket::serde::json::Json;
use rocket::State;
use tracing::{info, warn};

pub async fn list_jobs_handler(
    _auth: AuthenticatedUser,
    db: &State<Database>,
) -> ApiResult<DataResponse<Vec<JobOffer>>> {
    let offers = JobOfferRepository::new(db.pool()).list_all().await?;
    Ok(Json(DataResponse::success(
        format!("{} job offers", offers.len()),
        offers,
    )))
}

pub async fn list_active_jobs_handler(
    _auth: AuthenticatedUser,
    db: &State<Database>,
) -> ApiResult<DataResponse<Vec<JobOffer>>> {
    let offers = JobOfferRepository::new(db.pool()).list_active().await?;
    Ok(Json(DataResponse::success(
        format!("{} active job offers", offers.len()),
        offers,
    )))
}

pub async fn get_job_handler(
    id: &str,
    _auth: AuthenticatedUser,
    db: &State<Database>,
) -> ApiResult<DataResponse<JobOffer>> {
    let offer = JobOfferRepository::new(db.pool()).get(id).await?;
    Ok(Json(DataResponse::success("Job offer", offer)))
}

pub async fn create_job_handler(
    request: Json<NewJobOffer>,
    auth: AuthenticatedUser,
    db: &State<Database>,
) -> ApiResult<DataResponse<JobOffer>> {
    auth.require_role(Role::Recruiter)?;

    let offer = JobOfferRepository::new(db.pool())
        .create(auth.id(), &request)
        .await?;

    Ok(Json(DataResponse::success(
        format!("Job offer '{}' published", offer.title),
        offer,
    )))
}

/// Offers can only be changed by the recruiter who posted them.
async fn owned_offer(db: &Database, id: &str, auth: &AuthenticatedUser) -> Result<JobOffer, ApiError> {
    auth.require_role(Role::Recruiter)?;
    let offer = JobOfferRepository::new(db.pool()).get(id).await?;
    if offer.recruiter_id != auth.id() {
        warn!("User {} tried to modify offer {} of {}", auth.id(), id, offer.recruiter_id);
        return Err(ApiError::forbidden("This job offer belongs to another recruiter"));
    }
    Ok(offer)
}

pub async fn update_job_handler(
    id: &str,
    request: Json<JobOfferPatch>,
    auth: AuthenticatedUser,
    db: &State<Database>,
) -> ApiResult<DataResponse<JobOffer>> {
    owned_offer(db, id, &auth).await?;

    let offer = JobOfferRepository::new(db.pool())
        .update(id, auth.id(), &request)
        .await?;

    Ok(Json(DataResponse::success("Job offer updated", offer)))
}

pub async fn delete_job_handler(
    id: &str,
    auth: AuthenticatedUser,
    db: &State<Database>,
) -> ApiResult<ActionResponse> {
    owned_offer(db, id, &auth).await?;

    if !JobOfferRepository::new(db.pool()).delete(id, auth.id()).await? {
        return Err(ApiError::not_found(format!("job offer {} not found", id)));
    }

    info!("Recruiter {} deleted offer {}", auth.id(), id);
    Ok(Json(ActionResponse::success("Job offer deleted", "delete_job_offer")))
}

pub async fn update_application_status_handler(
    id: &str,
    request: Json<ApplicationStatusRequest>,
    auth: AuthenticatedUser,
    db: &State<Database>,
) -> ApiResult<DataResponse<Application>> {
    auth.require_role(Role::Recruiter)?;

    let repo = ApplicationRepository::new(db.pool());
    match repo.offer_owner(id).await? {
        Some(owner) if owner == auth.id() => {}
        Some(_) => {
            return Err(ApiError::forbidden(
                "This application targets another recruiter's offer",
            ))
        }
        None => return Err(ApiError::not_found(format!("application {} not found", id))),
    }

    let application = repo.update_status(id, request.status).await?;
    Ok(Json(DataResponse::success(
        "Application status updated",
        application,
    )))
}
