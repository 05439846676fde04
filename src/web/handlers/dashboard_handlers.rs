// src/web/handlers/dashboard_handlers.rs
use crate::auth::AuthenticatedUser;
use crate::core::Database;
use crate::database::{ApplicationRepository, JobOfferRepository, UserRoleRepository};
use crate::types::Role;
use crate::web::types::*;

use rocket::serde::json::Json;
use rocket::State;

const RECENT_APPLICATIONS: i64 = 5;

pub async fn admin_dashboard_handler(
    auth: AuthenticatedUser,
    db: &State<Database>,
) -> ApiResult<DataResponse<AdminDashboard>> {
    auth.require_role(Role::Admin)?;

    let roles = UserRoleRepository::new(db.pool());
    let dashboard = AdminDashboard {
        total_users: roles.count().await?,
        recruiters: roles.count_by_role(Role::Recruiter).await?,
        job_seekers: roles.count_by_role(Role::JobSeeker).await?,
        total_job_offers: JobOfferRepository::new(db.pool()).count().await?,
    };

    Ok(Json(DataResponse::success("Platform overview", dashboard)))
}

pub async fn recruiter_dashboard_handler(
    auth: AuthenticatedUser,
    db: &State<Database>,
) -> ApiResult<DataResponse<RecruiterDashboard>> {
    auth.require_role(Role::Recruiter)?;

    let offers = JobOfferRepository::new(db.pool());
    let stats = ApplicationRepository::new(db.pool())
        .stats_for_recruiter(auth.id())
        .await?;

    let dashboard = RecruiterDashboard {
        active_offers: offers.count_active_for_recruiter(auth.id()).await?,
        total_candidates: stats.total,
        shortlisted: stats.accepted,
        pending: stats.pending,
        offers: offers.list_for_recruiter(auth.id()).await?,
    };

    Ok(Json(DataResponse::success("Recruiter overview", dashboard)))
}

pub async fn seeker_dashboard_handler(
    auth: AuthenticatedUser,
    db: &State<Database>,
) -> ApiResult<DataResponse<SeekerDashboard>> {
    auth.require_role(Role::JobSeeker)?;

    let applications = ApplicationRepository::new(db.pool());
    let dashboard = SeekerDashboard {
        stats: applications.stats_for_seeker(auth.id()).await?,
        recent_applications: applications
            .recent_for_seeker(auth.id(), RECENT_APPLICATIONS)
            .await?,
    };

    Ok(Json(DataResponse::success("Your applications", dashboard)))
}
