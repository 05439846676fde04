// src/web/handlers/swipe_handlers.rs
//! Seeker-facing swipe endpoints. Each seeker has at most one live queue;
//! cards are decided in order and never come back.

use crate::auth::AuthenticatedUser;
use crate::core::Database;
use crate::database::JobOfferRepository;
use crate::swipe::{SwipeError, SwipeSession};
use crate::types::{JobCard, Role};
use crate::web::services::{state_of, SwipeSessions};
use crate::web::types::*;

use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::State;
use std::sync::Arc;
use tracing::{debug, info};

fn no_session() -> ApiError {
    ApiError::new(Status::NotFound, "No swipe session in progress", "NO_SWIPE_SESSION")
        .with_suggestions(&["Start a swipe session first"])
}

pub async fn start_swipe_handler(
    auth: AuthenticatedUser,
    db: &State<Database>,
    sessions: &State<SwipeSessions>,
    config: &State<ServerConfig>,
) -> ApiResult<DataResponse<SwipeState>> {
    auth.require_role(Role::JobSeeker)?;

    let recorder = sessions.recorder(db.inner().clone(), auth.id()).await;
    let in_flight = recorder.in_flight();
    let cards: Vec<JobCard> = JobOfferRepository::new(db.pool())
        .swipe_queue_for(auth.id())
        .await?
        .iter()
        .filter(|offer| !in_flight.contains(&offer.id))
        .map(JobCard::from)
        .collect();

    let notifier = Arc::new(recorder);
    let session = SwipeSession::new(cards, config.swipe_threshold, notifier);
    let state = sessions.start(auth.id(), session).await;

    info!("Seeker {} started swiping {} offers", auth.id(), state.total);
    Ok(Json(DataResponse::success(
        format!("{} job offers to review", state.total),
        state,
    )))
}

pub async fn current_card_handler(
    auth: AuthenticatedUser,
    sessions: &State<SwipeSessions>,
) -> ApiResult<DataResponse<SwipeState>> {
    auth.require_role(Role::JobSeeker)?;

    let state = sessions
        .with_session(auth.id(), |s| state_of(s))
        .await
        .ok_or_else(no_session)?;

    let message = if state.exhausted {
        "No more job offers"
    } else {
        "Current job offer"
    };
    Ok(Json(DataResponse::success(message, state)))
}

pub async fn begin_gesture_handler(
    auth: AuthenticatedUser,
    sessions: &State<SwipeSessions>,
) -> ApiResult<ActionResponse> {
    auth.require_role(Role::JobSeeker)?;

    sessions
        .with_session(auth.id(), |s| s.begin_gesture())
        .await
        .ok_or_else(no_session)?;

    Ok(Json(ActionResponse::success("Gesture started", "begin_gesture")))
}

pub async fn end_gesture_handler(
    request: Json<GestureEndRequest>,
    auth: AuthenticatedUser,
    sessions: &State<SwipeSessions>,
) -> ApiResult<DataResponse<SwipeStep>> {
    auth.require_role(Role::JobSeeker)?;

    let offset = request.offset;
    let (outcome, state) = sessions
        .with_session(auth.id(), |s| {
            s.end_gesture(offset).map(|outcome| (outcome, state_of(s)))
        })
        .await
        .ok_or_else(no_session)?
        .map_err(ApiError::from)?;

    let message = match &outcome {
        Some(o) => format!("Job offer {}ed", o.decision),
        None => {
            debug!("Gesture of {} cancelled at offset {}", auth.id(), offset);
            "Gesture cancelled".to_string()
        }
    };

    Ok(Json(DataResponse::success(
        message,
        SwipeStep {
            outcome: outcome.map(Into::into),
            state,
        },
    )))
}

pub async fn decide_handler(
    request: Json<DecideRequest>,
    auth: AuthenticatedUser,
    sessions: &State<SwipeSessions>,
) -> ApiResult<DataResponse<SwipeStep>> {
    auth.require_role(Role::JobSeeker)?;

    let decision = request.decision;
    let result: Result<_, SwipeError> = sessions
        .with_session(auth.id(), |s| {
            s.decide(decision).map(|outcome| (outcome, state_of(s)))
        })
        .await
        .ok_or_else(no_session)?;
    let (outcome, state) = result?;

    Ok(Json(DataResponse::success(
        format!("Job offer {}ed", outcome.decision),
        SwipeStep {
            outcome: Some(outcome.into()),
            state,
        },
    )))
}
