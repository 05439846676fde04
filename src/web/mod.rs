// src/web/mod.rs

pub mod file_handlers;
pub mod handlers;
pub mod services;
pub mod types;

pub use handlers::*;
pub use services::{ApplicationRecorder, SwipeSessions};
pub use types::*;

use crate::auth::{AuthConfig, AuthError, AuthenticatedUser};
use crate::core::{BlobStore, ConfigManager, Database, ServiceClient};
use crate::session::SessionHub;
use crate::types::{Application, CvAnalysis, CvRecord, JobOffer, JobOfferPatch, NewJobOffer};
use anyhow::Result;
use rocket::data::{Limits, ToByteUnit};
use rocket::fairing::{Fairing, Info, Kind};
use rocket::figment::Figment;
use rocket::form::Form;
use rocket::http::{ContentType, Header, Status};
use rocket::serde::json::Json;
use rocket::{
    catchers, delete, get, options, patch, post, routes, Build, Request, Response, Rocket, State,
};
use std::path::PathBuf;
use tracing::info;

const MAX_CV_BYTES: u64 = 10 * 1024 * 1024;

// CORS Fairing
pub struct Cors;

#[rocket::async_trait]
impl Fairing for Cors {
    fn info(&self) -> Info {
        Info {
            name: "Add CORS headers to responses",
            kind: Kind::Response,
        }
    }

    async fn on_response<'r>(&self, _request: &'r Request<'_>, response: &mut Response<'r>) {
        response.set_header(Header::new("Access-Control-Allow-Origin", "*"));
        response.set_header(Header::new(
            "Access-Control-Allow-Methods",
            "POST, GET, PATCH, DELETE, OPTIONS",
        ));
        response.set_header(Header::new("Access-Control-Allow-Headers", "*"));
        response.set_header(Header::new("Access-Control-Allow-Credentials", "true"));
    }
}

// Session & profile

#[get("/health")]
pub async fn health(db: &State<Database>) -> ApiResult<TextResponse> {
    handlers::health_handler(db).await
}

#[get("/me")]
pub async fn get_current_user(auth: AuthenticatedUser) -> Json<DataResponse<UserInfo>> {
    handlers::get_current_user_handler(auth).await
}

#[post("/auth/role", data = "<request>")]
pub async fn register_role(
    request: Json<RoleRequest>,
    auth: AuthenticatedUser,
    db: &State<Database>,
    hub: &State<SessionHub>,
) -> ApiResult<DataResponse<UserInfo>> {
    handlers::register_role_handler(request, auth, db, hub).await
}

#[post("/auth/logout")]
pub async fn logout(auth: AuthenticatedUser, hub: &State<SessionHub>) -> Json<ActionResponse> {
    handlers::logout_handler(auth, hub).await
}

// Job offers

#[get("/jobs")]
pub async fn list_jobs(
    auth: AuthenticatedUser,
    db: &State<Database>,
) -> ApiResult<DataResponse<Vec<JobOffer>>> {
    handlers::list_jobs_handler(auth, db).await
}

#[get("/jobs/active")]
pub async fn list_active_jobs(
    auth: AuthenticatedUser,
    db: &State<Database>,
) -> ApiResult<DataResponse<Vec<JobOffer>>> {
    handlers::list_active_jobs_handler(auth, db).await
}

#[get("/jobs/<id>")]
pub async fn get_job(
    id: &str,
    auth: AuthenticatedUser,
    db: &State<Database>,
) -> ApiResult<DataResponse<JobOffer>> {
    handlers::get_job_handler(id, auth, db).await
}

#[post("/jobs", data = "<request>")]
pub async fn create_job(
    request: Json<NewJobOffer>,
    auth: AuthenticatedUser,
    db: &State<Database>,
) -> ApiResult<DataResponse<JobOffer>> {
    handlers::create_job_handler(request, auth, db).await
}

#[patch("/jobs/<id>", data = "<request>")]
pub async fn update_job(
    id: &str,
    request: Json<JobOfferPatch>,
    auth: AuthenticatedUser,
    db: &State<Database>,
) -> ApiResult<DataResponse<JobOffer>> {
    handlers::update_job_handler(id, request, auth, db).await
}

#[delete("/jobs/<id>")]
pub async fn delete_job(
    id: &str,
    auth: AuthenticatedUser,
    db: &State<Database>,
) -> ApiResult<ActionResponse> {
    handlers::delete_job_handler(id, auth, db).await
}

#[patch("/applications/<id>", data = "<request>")]
pub async fn update_application_status(
    id: &str,
    request: Json<ApplicationStatusRequest>,
    auth: AuthenticatedUser,
    db: &State<Database>,
) -> ApiResult<DataResponse<Application>> {
    handlers::update_application_status_handler(id, request, auth, db).await
}

// Swipe

#[post("/swipe/start")]
pub async fn start_swipe(
    auth: AuthenticatedUser,
    db: &State<Database>,
    sessions: &State<SwipeSessions>,
    config: &State<ServerConfig>,
) -> ApiResult<DataResponse<SwipeState>> {
    handlers::start_swipe_handler(auth, db, sessions, config).await
}

#[get("/swipe/current")]
pub async fn current_card(
    auth: AuthenticatedUser,
    sessions: &State<SwipeSessions>,
) -> ApiResult<DataResponse<SwipeState>> {
    handlers::current_card_handler(auth, sessions).await
}

#[post("/swipe/gesture/begin")]
pub async fn begin_gesture(
    auth: AuthenticatedUser,
    sessions: &State<SwipeSessions>,
) -> ApiResult<ActionResponse> {
    handlers::begin_gesture_handler(auth, sessions).await
}

#[post("/swipe/gesture/end", data = "<request>")]
pub async fn end_gesture(
    request: Json<GestureEndRequest>,
    auth: AuthenticatedUser,
    sessions: &State<SwipeSessions>,
) -> ApiResult<DataResponse<SwipeStep>> {
    handlers::end_gesture_handler(request, auth, sessions).await
}

#[post("/swipe/decide", data = "<request>")]
pub async fn decide(
    request: Json<DecideRequest>,
    auth: AuthenticatedUser,
    sessions: &State<SwipeSessions>,
) -> ApiResult<DataResponse<SwipeStep>> {
    handlers::decide_handler(request, auth, sessions).await
}

// CVs & files

#[post("/cv/upload", data = "<upload>")]
pub async fn upload_cv(
    upload: Form<CvUploadForm<'_>>,
    auth: AuthenticatedUser,
    db: &State<Database>,
    store: &State<BlobStore>,
    config: &State<ServerConfig>,
) -> ApiResult<DataResponse<CvRecord>> {
    handlers::upload_cv_handler(upload, auth, db, store, config).await
}

#[get("/cv")]
pub async fn list_cvs(
    auth: AuthenticatedUser,
    db: &State<Database>,
) -> ApiResult<DataResponse<Vec<CvRecord>>> {
    handlers::list_cvs_handler(auth, db).await
}

#[post("/cv/<id>/analyze")]
pub async fn analyze_cv(
    id: &str,
    auth: AuthenticatedUser,
    db: &State<Database>,
    client: &State<ServiceClient>,
) -> ApiResult<DataResponse<CvAnalysis>> {
    handlers::analyze_cv_handler(id, auth, db, client).await
}

#[delete("/cv/<id>")]
pub async fn delete_cv(
    id: &str,
    auth: AuthenticatedUser,
    db: &State<Database>,
    store: &State<BlobStore>,
) -> ApiResult<ActionResponse> {
    handlers::delete_cv_handler(id, auth, db, store).await
}

#[get("/files/<path..>")]
pub async fn get_file(
    path: PathBuf,
    store: &State<BlobStore>,
) -> Result<(ContentType, Vec<u8>), ApiError> {
    file_handlers::get_file_handler(path, store).await
}

// Dashboards

#[get("/dashboard/admin")]
pub async fn admin_dashboard(
    auth: AuthenticatedUser,
    db: &State<Database>,
) -> ApiResult<DataResponse<AdminDashboard>> {
    handlers::admin_dashboard_handler(auth, db).await
}

#[get("/dashboard/recruiter")]
pub async fn recruiter_dashboard(
    auth: AuthenticatedUser,
    db: &State<Database>,
) -> ApiResult<DataResponse<RecruiterDashboard>> {
    handlers::recruiter_dashboard_handler(auth, db).await
}

#[get("/dashboard/seeker")]
pub async fn seeker_dashboard(
    auth: AuthenticatedUser,
    db: &State<Database>,
) -> ApiResult<DataResponse<SeekerDashboard>> {
    handlers::seeker_dashboard_handler(auth, db).await
}

#[options("/<_..>")]
pub async fn options() -> Status {
    Status::Ok
}

// Error catchers

#[rocket::catch(400)]
pub fn bad_request() -> ApiError {
    ApiError::new(Status::BadRequest, "Invalid request format", "BAD_REQUEST").with_suggestions(&[
        "Check your request JSON format",
        "Verify all required fields are present",
    ])
}

#[rocket::catch(401)]
pub fn unauthorized(req: &Request) -> ApiError {
    let reason = req
        .local_cache(|| None::<AuthError>)
        .unwrap_or(AuthError::MissingToken);
    ApiError::from(reason).with_suggestions(&["Sign in and send the access token as a Bearer token"])
}

#[rocket::catch(403)]
pub fn forbidden() -> ApiError {
    ApiError::from(AuthError::Forbidden)
}

#[rocket::catch(404)]
pub fn not_found(req: &Request) -> ApiError {
    ApiError::not_found(format!("No route for {}", req.uri().path()))
}

#[rocket::catch(413)]
pub fn payload_too_large() -> ApiError {
    ApiError::new(Status::PayloadTooLarge, "Request body too large", "FILE_TOO_LARGE")
        .with_suggestions(&["Use a smaller file size (max 10MB)"])
}

#[rocket::catch(422)]
pub fn unprocessable() -> ApiError {
    ApiError::new(
        Status::UnprocessableEntity,
        "Request body does not match the expected fields",
        "VALIDATION_ERROR",
    )
}

#[rocket::catch(500)]
pub fn internal_error() -> ApiError {
    ApiError::new(Status::InternalServerError, "Internal server error", "INTERNAL_ERROR")
        .with_suggestions(&[
            "Try again in a few moments",
            "Contact support if the problem persists",
        ])
}

/// Collaborators the server is built from.
pub struct AppState {
    pub db: Database,
    pub store: BlobStore,
    pub client: ServiceClient,
    pub auth: AuthConfig,
    pub server: ServerConfig,
}

/// Assemble the rocket. Must be called from within a tokio runtime: the
/// sign-out listener is spawned here.
pub fn build_rocket(state: AppState, figment: Figment) -> Rocket<Build> {
    let hub = SessionHub::new();
    let sessions = SwipeSessions::new();
    sessions.follow_sign_outs(hub.on_session_change());

    let limits = Limits::default()
        .limit("file", (MAX_CV_BYTES + 1024 * 1024).bytes())
        .limit("data-form", (MAX_CV_BYTES + 2 * 1024 * 1024).bytes());

    rocket::custom(figment.merge(("limits", limits)))
        .attach(Cors)
        .manage(state.db)
        .manage(state.store)
        .manage(state.client)
        .manage(state.auth)
        .manage(state.server)
        .manage(hub)
        .manage(sessions)
        .register(
            "/api",
            catchers![
                bad_request,
                unauthorized,
                forbidden,
                not_found,
                payload_too_large,
                unprocessable,
                internal_error
            ],
        )
        .mount(
            "/api",
            routes![
                health,
                get_current_user,
                register_role,
                logout,
                list_jobs,
                list_active_jobs,
                get_job,
                create_job,
                update_job,
                delete_job,
                update_application_status,
                start_swipe,
                current_card,
                begin_gesture,
                end_gesture,
                decide,
                upload_cv,
                list_cvs,
                analyze_cv,
                delete_cv,
                get_file,
                admin_dashboard,
                recruiter_dashboard,
                seeker_dashboard,
                options,
            ],
        )
}

// Main server start function
pub async fn start_web_server(config: ConfigManager, port: u16, jwt_secret: String) -> Result<()> {
    let env = config.environment;

    let db = Database::new(&env.database_path).await?;
    let store = BlobStore::new(env.storage_path.clone(), env.public_base_url.clone());
    let client = ServiceClient::new(env.analysis.url.clone(), env.analysis.timeout_seconds)?;
    let auth = AuthConfig::new(jwt_secret, env.auth.audience.clone(), env.auth.issuer.clone());

    info!("Starting Jobster API server");
    info!("Database: {}", env.database_path.display());
    info!("Storage: {}", env.storage_path.display());
    info!("Analysis service: {}", env.analysis.url);
    info!("Swipe threshold: {}", env.swipe.threshold);

    let state = AppState {
        db,
        store,
        client,
        auth,
        server: ServerConfig {
            swipe_threshold: env.swipe.threshold,
            max_cv_bytes: MAX_CV_BYTES,
        },
    };

    let figment = rocket::Config::figment()
        .merge(("address", "0.0.0.0"))
        .merge(("port", port));

    build_rocket(state, figment)
        .launch()
        .await
        .map_err(|e| anyhow::anyhow!("Server failed: {}", e))?;

    Ok(())
}

#[cfg(test)]
mod tests;
