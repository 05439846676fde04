// src/web/tests.rs
use super::*;
use crate::auth::tests::{token_for, TEST_SECRET};
use crate::database::UserRoleRepository;
use crate::types::Role;
use rocket::http::Header;
use rocket::local::asynchronous::{Client, LocalResponse};
use serde_json::{json, Value};
use std::time::Duration;

const BOUNDARY: &str = "jobster-test-boundary";

struct TestApp {
    client: Client,
    db: Database,
    storage: PathBuf,
}

impl TestApp {
    async fn new() -> Self {
        let db = Database::in_memory().await.unwrap();
        let storage = std::env::temp_dir().join(format!("jobster_web_{}", uuid::Uuid::new_v4()));

        let state = AppState {
            db: db.clone(),
            store: BlobStore::new(storage.clone(), "http://localhost:8000/api/files"),
            // Nothing listens here; analysis calls fail fast.
            client: ServiceClient::new("http://127.0.0.1:9", 2).unwrap(),
            auth: AuthConfig::new(TEST_SECRET, "authenticated", None),
            server: ServerConfig {
                swipe_threshold: 100.0,
                max_cv_bytes: MAX_CV_BYTES,
            },
        };

        let client = Client::tracked(build_rocket(state, rocket::Config::figment()))
            .await
            .unwrap();

        Self {
            client,
            db,
            storage,
        }
    }

    /// Token for a user, registering the role first when given.
    async fn user(&self, id: &str, role: Option<Role>) -> String {
        if let Some(role) = role {
            UserRoleRepository::new(self.db.pool())
                .assign(id, Some(&format!("{}@example.com", id)), role)
                .await
                .unwrap();
        }
        token_for(id, Some(&format!("{}@example.com", id)), 3600)
    }

    async fn get(&self, uri: &str, token: &str) -> LocalResponse<'_> {
        self.client.get(uri.to_string()).header(bearer(token)).dispatch().await
    }

    async fn post(&self, uri: &str, token: &str, body: Value) -> LocalResponse<'_> {
        self.client
            .post(uri.to_string())
            .header(bearer(token))
            .json(&body)
            .dispatch()
            .await
    }

    async fn patch(&self, uri: &str, token: &str, body: Value) -> LocalResponse<'_> {
        self.client
            .patch(uri.to_string())
            .header(bearer(token))
            .json(&body)
            .dispatch()
            .await
    }

    async fn upload(&self, token: &str, file_name: &str, content_type: &str, bytes: &str) -> LocalResponse<'_> {
        let body = format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"cv_file\"; filename=\"{f}\"\r\nContent-Type: {ct}\r\n\r\n{bytes}\r\n--{b}--\r\n",
            b = BOUNDARY,
            f = file_name,
            ct = content_type,
            bytes = bytes
        );
        self.client
            .post("/api/cv/upload")
            .header(bearer(token))
            .header(Header::new(
                "Content-Type",
                format!("multipart/form-data; boundary={}", BOUNDARY),
            ))
            .body(body)
            .dispatch()
            .await
    }

    async fn create_offer(&self, token: &str, title: &str) -> String {
        let response = self
            .post(
                "/api/jobs",
                token,
                json!({
                    "title": title,
                    "description": "Rejoindre notre équipe",
                    "company": "Tech Solutions",
                    "location": "Paris, France",
                    "contract_type": "CDI",
                    "salary_range": "45-60k€/an",
                    "requirements": "React, TypeScript"
                }),
            )
            .await;
        assert_eq!(response.status(), Status::Ok);
        let body = json_of(response).await;
        body["data"]["id"].as_str().unwrap().to_string()
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.storage);
    }
}

fn bearer(token: &str) -> Header<'static> {
    Header::new("Authorization", format!("Bearer {}", token))
}

async fn json_of(response: LocalResponse<'_>) -> Value {
    response.into_json::<Value>().await.unwrap()
}

#[rocket::async_test]
async fn test_health_is_public() {
    let app = TestApp::new().await;
    let response = app.client.get("/api/health").dispatch().await;
    assert_eq!(response.status(), Status::Ok);
    assert_eq!(json_of(response).await["message"], "OK");
}

#[rocket::async_test]
async fn test_missing_and_bad_tokens_are_unauthorized() {
    let app = TestApp::new().await;

    let response = app.client.get("/api/me").dispatch().await;
    assert_eq!(response.status(), Status::Unauthorized);
    let body = json_of(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error_code"], "AUTHENTICATION_REQUIRED");

    let response = app.get("/api/me", "not-a-jwt").await;
    assert_eq!(response.status(), Status::Unauthorized);
    assert_eq!(json_of(response).await["error_code"], "INVALID_TOKEN");

    let expired = token_for("u1", None, -3600);
    let response = app.get("/api/me", &expired).await;
    assert_eq!(response.status(), Status::Unauthorized);
}

#[rocket::async_test]
async fn test_role_registration() {
    let app = TestApp::new().await;
    let token = app.user("u1", None).await;

    let body = json_of(app.get("/api/me", &token).await).await;
    assert_eq!(body["data"]["id"], "u1");
    assert!(body["data"]["role"].is_null());

    let response = app.post("/api/auth/role", &token, json!({"role": "admin"})).await;
    assert_eq!(response.status(), Status::Forbidden);

    let response = app
        .post("/api/auth/role", &token, json!({"role": "job-seeker"}))
        .await;
    assert_eq!(response.status(), Status::Ok);
    let response = app
        .post("/api/auth/role", &token, json!({"role": "job-seeker"}))
        .await;
    assert_eq!(response.status(), Status::Ok);
    let response = app
        .post("/api/auth/role", &token, json!({"role": "recruiter"}))
        .await;
    assert_eq!(response.status(), Status::Conflict);

    let body = json_of(app.get("/api/me", &token).await).await;
    assert_eq!(body["data"]["role"], "job-seeker");
}

#[rocket::async_test]
async fn test_job_offer_permissions() {
    let app = TestApp::new().await;
    let recruiter = app.user("rec-1", Some(Role::Recruiter)).await;
    let other = app.user("rec-2", Some(Role::Recruiter)).await;
    let seeker = app.user("seeker-1", Some(Role::JobSeeker)).await;

    let response = app
        .post("/api/jobs", &seeker, json!({"title": "x", "description": "x", "company": "x", "location": "x", "contract_type": "x"}))
        .await;
    assert_eq!(response.status(), Status::Forbidden);

    let response = app
        .post("/api/jobs", &recruiter, json!({"title": "Dev", "description": "d", "company": "c", "location": "l", "contract_type": " "}))
        .await;
    assert_eq!(response.status(), Status::BadRequest);
    let body = json_of(response).await;
    assert_eq!(body["error_code"], "VALIDATION_ERROR");
    assert!(body["error"].as_str().unwrap().contains("contract_type"));

    let id = app.create_offer(&recruiter, "Frontend").await;

    let uri = format!("/api/jobs/{}", id);
    let response = app.patch(&uri, &other, json!({"title": "Hijacked"})).await;
    assert_eq!(response.status(), Status::Forbidden);

    let response = app
        .patch(&uri, &recruiter, json!({"title": "Frontend Senior", "status": "closed"}))
        .await;
    assert_eq!(response.status(), Status::Ok);
    let body = json_of(response).await;
    assert_eq!(body["data"]["title"], "Frontend Senior");
    assert_eq!(body["data"]["status"], "closed");

    let body = json_of(app.get("/api/jobs/active", &seeker).await).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 0);

    let response = app
        .client
        .delete(uri.clone())
        .header(bearer(&recruiter))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);
    assert_eq!(app.get(&uri, &seeker).await.status(), Status::NotFound);
}

#[rocket::async_test]
async fn test_swipe_walkthrough_records_applications() {
    let app = TestApp::new().await;
    let recruiter = app.user("rec-1", Some(Role::Recruiter)).await;
    let seeker = app.user("seeker-1", Some(Role::JobSeeker)).await;

    let a = app.create_offer(&recruiter, "A").await;
    let b = app.create_offer(&recruiter, "B").await;
    let c = app.create_offer(&recruiter, "C").await;

    let response = app.get("/api/swipe/current", &seeker).await;
    assert_eq!(response.status(), Status::NotFound);
    assert_eq!(json_of(response).await["error_code"], "NO_SWIPE_SESSION");

    let body = json_of(app.post("/api/swipe/start", &seeker, json!({})).await).await;
    assert_eq!(body["data"]["total"], 3);
    assert_eq!(body["data"]["card"]["id"], c.as_str());
    assert_eq!(body["data"]["card"]["skills"], json!(["React", "TypeScript"]));

    app.post("/api/swipe/gesture/begin", &seeker, json!({})).await;
    let body = json_of(
        app.post("/api/swipe/gesture/end", &seeker, json!({"offset": 150.0}))
            .await,
    )
    .await;
    assert_eq!(body["data"]["outcome"]["decision"], "accept");
    assert_eq!(body["data"]["outcome"]["job_offer_id"], c.as_str());
    assert_eq!(body["data"]["state"]["cursor"], 1);
    assert_eq!(body["data"]["state"]["card"]["id"], b.as_str());

    let body = json_of(
        app.post("/api/swipe/gesture/end", &seeker, json!({"offset": -120.0}))
            .await,
    )
    .await;
    assert_eq!(body["data"]["outcome"]["decision"], "reject");
    assert_eq!(body["data"]["state"]["card"]["id"], a.as_str());

    let body = json_of(
        app.post("/api/swipe/gesture/end", &seeker, json!({"offset": 100.0}))
            .await,
    )
    .await;
    assert!(body["data"]["outcome"].is_null());
    assert_eq!(body["data"]["state"]["cursor"], 2);

    let body = json_of(
        app.post("/api/swipe/decide", &seeker, json!({"decision": "accept"}))
            .await,
    )
    .await;
    assert_eq!(body["data"]["state"]["exhausted"], true);
    assert!(body["data"]["state"]["card"].is_null());

    let response = app
        .post("/api/swipe/decide", &seeker, json!({"decision": "reject"}))
        .await;
    assert_eq!(response.status(), Status::Conflict);
    assert_eq!(json_of(response).await["error_code"], "INVALID_STATE");

    // Applications are written in the background.
    let mut total = 0;
    for _ in 0..50 {
        let body = json_of(app.get("/api/dashboard/seeker", &seeker).await).await;
        total = body["data"]["stats"]["total"].as_i64().unwrap();
        if total == 2 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert_eq!(total, 2);

    let body = json_of(app.get("/api/dashboard/recruiter", &recruiter).await).await;
    assert_eq!(body["data"]["active_offers"], 3);
    assert_eq!(body["data"]["total_candidates"], 2);
    assert_eq!(body["data"]["pending"], 2);

    // Only the rejected offer comes back.
    let body = json_of(app.post("/api/swipe/start", &seeker, json!({})).await).await;
    assert_eq!(body["data"]["total"], 1);
    assert_eq!(body["data"]["card"]["id"], b.as_str());
}

#[rocket::async_test]
async fn test_swipe_is_for_job_seekers() {
    let app = TestApp::new().await;
    let recruiter = app.user("rec-1", Some(Role::Recruiter)).await;
    let newcomer = app.user("new-1", None).await;

    let response = app.post("/api/swipe/start", &recruiter, json!({})).await;
    assert_eq!(response.status(), Status::Forbidden);
    assert_eq!(json_of(response).await["error_code"], "FORBIDDEN");

    let response = app.post("/api/swipe/start", &newcomer, json!({})).await;
    assert_eq!(response.status(), Status::Forbidden);
    assert_eq!(json_of(response).await["error_code"], "ROLE_REQUIRED");
}

#[rocket::async_test]
async fn test_logout_discards_swipe_queue() {
    let app = TestApp::new().await;
    let seeker = app.user("seeker-1", Some(Role::JobSeeker)).await;

    app.post("/api/swipe/start", &seeker, json!({})).await;
    assert_eq!(app.get("/api/swipe/current", &seeker).await.status(), Status::Ok);

    let response = app.post("/api/auth/logout", &seeker, json!({})).await;
    assert_eq!(response.status(), Status::Ok);

    let mut status = Status::Ok;
    for _ in 0..50 {
        status = app.get("/api/swipe/current", &seeker).await.status();
        if status == Status::NotFound {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert_eq!(status, Status::NotFound);
}

#[rocket::async_test]
async fn test_cv_upload_list_and_serve() {
    let app = TestApp::new().await;
    let seeker = app.user("seeker-1", Some(Role::JobSeeker)).await;

    let response = app.upload(&seeker, "notes.txt", "text/plain", "hello").await;
    assert_eq!(response.status(), Status::BadRequest);
    assert_eq!(json_of(response).await["error_code"], "INVALID_FORMAT");

    let response = app
        .upload(&seeker, "Mon CV.pdf", "application/pdf", "%PDF-1.4 test")
        .await;
    assert_eq!(response.status(), Status::Ok);
    let body = json_of(response).await;
    assert_eq!(body["data"]["file_path"], "seeker-1/mon_cv.pdf");
    assert_eq!(body["data"]["title"], "Mon CV.pdf");
    assert_eq!(
        body["data"]["file_url"],
        "http://localhost:8000/api/files/seeker-1/mon_cv.pdf"
    );
    let cv_id = body["data"]["id"].as_str().unwrap().to_string();

    let response = app
        .upload(&seeker, "Mon CV.pdf", "application/pdf", "%PDF-1.4 other")
        .await;
    assert_eq!(response.status(), Status::Conflict);
    assert_eq!(json_of(response).await["error_code"], "FILE_EXISTS");

    let body = json_of(app.get("/api/cv", &seeker).await).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let response = app.client.get("/api/files/seeker-1/mon_cv.pdf").dispatch().await;
    assert_eq!(response.status(), Status::Ok);
    assert_eq!(response.content_type(), Some(ContentType::PDF));
    assert_eq!(response.into_string().await.unwrap(), "%PDF-1.4 test");

    let other = app.user("seeker-2", Some(Role::JobSeeker)).await;
    let uri = format!("/api/cv/{}/analyze", cv_id);
    assert_eq!(app.post(&uri, &other, json!({})).await.status(), Status::NotFound);

    let response = app.post(&uri, &seeker, json!({})).await;
    assert_eq!(response.status(), Status::BadGateway);
    assert_eq!(json_of(response).await["error_code"], "ANALYSIS_FAILED");

    let response = app
        .client
        .delete(format!("/api/cv/{}", cv_id))
        .header(bearer(&seeker))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);
    assert_eq!(
        app.client.get("/api/files/seeker-1/mon_cv.pdf").dispatch().await.status(),
        Status::NotFound
    );
}

#[rocket::async_test]
async fn test_admin_dashboard_counts() {
    let app = TestApp::new().await;
    let admin = app.user("admin-1", Some(Role::Admin)).await;
    let recruiter = app.user("rec-1", Some(Role::Recruiter)).await;
    app.user("seeker-1", Some(Role::JobSeeker)).await;
    app.user("seeker-2", Some(Role::JobSeeker)).await;
    app.create_offer(&recruiter, "A").await;

    assert_eq!(
        app.get("/api/dashboard/admin", &recruiter).await.status(),
        Status::Forbidden
    );

    let body = json_of(app.get("/api/dashboard/admin", &admin).await).await;
    assert_eq!(
        body["data"],
        json!({
            "total_users": 4,
            "recruiters": 1,
            "job_seekers": 2,
            "total_job_offers": 1
        })
    );
}
