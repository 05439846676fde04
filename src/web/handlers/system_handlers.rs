// src/web/handlers/system_handlers.rs
use crate::auth::AuthenticatedUser;
use crate::core::Database;
use crate::database::UserRoleRepository;
use crate::session::SessionHub;
use crate::types::Role;
use crate::web::types::*;

use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::State;
use tracing::{error, info};

pub async fn health_handler(db: &State<Database>) -> ApiResult<TextResponse> {
    db.health_check().await.map_err(|e| {
        error!("Health check failed: {}", e);
        ApiError::new(Status::ServiceUnavailable, "Database unavailable", "UNHEALTHY")
    })?;
    Ok(Json(TextResponse::success("OK")))
}

pub async fn get_current_user_handler(auth: AuthenticatedUser) -> Json<DataResponse<UserInfo>> {
    let message = match auth.role() {
        Some(role) => format!("Signed in as {}", role),
        None => "Signed in, no role chosen yet".to_string(),
    };

    Json(DataResponse::success(
        message,
        UserInfo {
            id: auth.user.id.clone(),
            email: auth.user.email.clone(),
            role: auth.role(),
        },
    ))
}

/// Record the role a user picked at signup.
pub async fn register_role_handler(
    request: Json<RoleRequest>,
    auth: AuthenticatedUser,
    db: &State<Database>,
    hub: &State<SessionHub>,
) -> ApiResult<DataResponse<UserInfo>> {
    let role = request.role;
    if role == Role::Admin {
        return Err(ApiError::forbidden("The admin role cannot be self-assigned")
            .with_suggestions(&["Ask an administrator to grant it"]));
    }

    let registered = UserRoleRepository::new(db.pool())
        .register(auth.id(), auth.email(), role)
        .await?;

    if let Some(mut session) = hub.current_session(auth.id()).await {
        session.role = Some(registered.role);
        hub.sign_in(session).await;
    }

    info!("User {} registered as {}", auth.id(), registered.role);
    Ok(Json(DataResponse::success(
        format!("Role {} registered", registered.role),
        UserInfo {
            id: registered.user_id,
            email: registered.email,
            role: Some(registered.role),
        },
    )))
}

pub async fn logout_handler(
    auth: AuthenticatedUser,
    hub: &State<SessionHub>,
) -> Json<ActionResponse> {
    hub.sign_out(auth.id()).await;
    Json(
        ActionResponse::success("Signed out", "logout")
            .with_next_actions(vec!["sign_in".to_string()]),
    )
}
