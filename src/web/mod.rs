// src/web/mod.rs

pub mod guards;
pub mod handlers;
pub mod types;

pub use guards::Configured;
pub use handlers::*;
pub use types::*;

use crate::core::local_tools::KeywordScore;
use crate::core::ToolInfo;
use crate::types::{InterviewPrep, JobEmailScan, ResumeAnalysis, TaskReply, TrackerUpdate, UserProfile};
use anyhow::Result;
use rocket::fairing::{Fairing, Info, Kind};
use rocket::http::{CookieJar, Header, Status};
use rocket::serde::json::Json;
use rocket::{catchers, get, options, post, put, routes, Build, Request, Response, Rocket, State};
use tracing::info;

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
            "POST, GET, PUT, OPTIONS",
        ));
        response.set_header(Header::new("Access-Control-Allow-Headers", "*"));
        response.set_header(Header::new("Access-Control-Allow-Credentials", "true"));
    }
}

#[get("/health")]
pub async fn health() -> Json<TextResponse> {
    handlers::health_handler().await
}

#[get("/status")]
pub async fn status(state: &State<AppState>) -> Json<DataResponse<StatusData>> {
    handlers::status_handler(state).await
}

#[get("/tools")]
pub async fn tools(state: &State<AppState>) -> Json<DataResponse<Vec<ToolInfo>>> {
    handlers::tools_handler(state).await
}

#[get("/profile")]
pub async fn get_profile(jar: &CookieJar<'_>) -> Json<DataResponse<UserProfile>> {
    handlers::get_profile_handler(jar).await
}

#[put("/profile", data = "<request>")]
pub async fn save_profile(
    request: Json<StandardRequest<UserProfile>>,
    jar: &CookieJar<'_>,
) -> Result<Json<DataResponse<UserProfile>>, Json<StandardErrorResponse>> {
    handlers::save_profile_handler(request, jar).await
}

#[post("/resume/analyze", data = "<request>")]
pub async fn analyze_resume(
    request: Json<StandardRequest<ResumeAnalyzeRequest>>,
    configured: Configured<'_>,
    jar: &CookieJar<'_>,
) -> Result<Json<DataResponse<ResumeAnalysis>>, Json<StandardErrorResponse>> {
    handlers::analyze_resume_handler(request, configured.0, jar).await
}

#[post("/resume/keyword-match", data = "<request>")]
pub async fn keyword_match(
    request: Json<StandardRequest<KeywordMatchRequest>>,
) -> Result<Json<DataResponse<KeywordScore>>, Json<StandardErrorResponse>> {
    handlers::keyword_match_handler(request).await
}

#[post("/interview/prepare", data = "<request>")]
pub async fn prepare_interview(
    request: Json<StandardRequest<InterviewPrepRequest>>,
    configured: Configured<'_>,
    jar: &CookieJar<'_>,
) -> Result<Json<DataResponse<InterviewPrep>>, Json<StandardErrorResponse>> {
    handlers::interview_prep_handler(request, configured.0, jar).await
}

#[post("/emails/scan")]
pub async fn scan_emails(
    configured: Configured<'_>,
) -> Result<Json<DataResponse<JobEmailScan>>, Json<StandardErrorResponse>> {
    handlers::email_scan_handler(configured.0).await
}

#[post("/tracker/rows", data = "<request>")]
pub async fn add_tracker_row(
    request: Json<StandardRequest<TrackerRowRequest>>,
    configured: Configured<'_>,
) -> Result<Json<DataResponse<TrackerUpdate>>, Json<StandardErrorResponse>> {
    handlers::tracker_row_handler(request, configured.0).await
}

#[post("/tracker/from-email", data = "<request>")]
pub async fn add_tracker_row_from_email(
    request: Json<StandardRequest<TrackerFromEmailRequest>>,
    configured: Configured<'_>,
) -> Result<Json<DataResponse<TrackerUpdate>>, Json<StandardErrorResponse>> {
    handlers::tracker_from_email_handler(request, configured.0).await
}

#[post("/task", data = "<request>")]
pub async fn run_task(
    request: Json<StandardRequest<TaskRequest>>,
    configured: Configured<'_>,
) -> Result<Json<DataResponse<TaskReply>>, Json<StandardErrorResponse>> {
    handlers::task_handler(request, configured.0).await
}

#[options("/<_..>")]
pub async fn options() -> Status {
    Status::Ok
}

// Error catchers
#[rocket::catch(400)]
pub fn bad_request() -> Json<StandardErrorResponse> {
    Json(StandardErrorResponse::new(
        "Invalid request format".to_string(),
        "BAD_REQUEST".to_string(),
        vec![
            "Check your request JSON format".to_string(),
            "Verify all required fields are present".to_string(),
        ],
        None,
    ))
}

#[rocket::catch(404)]
pub fn not_found() -> Json<StandardErrorResponse> {
    Json(StandardErrorResponse::new(
        "Endpoint not found".to_string(),
        "NOT_FOUND".to_string(),
        vec!["Check the request path".to_string()],
        None,
    ))
}

#[rocket::catch(422)]
pub fn unprocessable() -> Json<StandardErrorResponse> {
    Json(StandardErrorResponse::new(
        "Request body does not match the expected fields".to_string(),
        "BAD_REQUEST".to_string(),
        vec!["Verify all required fields are present".to_string()],
        None,
    ))
}

#[rocket::catch(500)]
pub fn internal_error() -> Json<StandardErrorResponse> {
    Json(StandardErrorResponse::new(
        "Internal server error".to_string(),
        "INTERNAL_ERROR".to_string(),
        vec![
            "Try again in a few moments".to_string(),
            "Check the server logs".to_string(),
        ],
        None,
    ))
}

#[rocket::catch(503)]
pub fn config_missing() -> Json<StandardErrorResponse> {
    Json(StandardErrorResponse::new(
        "Configuration missing: no LLM provider API key found".to_string(),
        "CONFIG_MISSING".to_string(),
        vec![
            "Set OPENAI_API_KEY or GOOGLE_API_KEY in the environment or .env".to_string(),
            "Restart the server after updating the keys".to_string(),
        ],
        None,
    ))
}

pub fn build_rocket(state: AppState) -> Rocket<Build> {
    rocket::build()
        .attach(Cors)
        .manage(state)
        .register(
            "/api",
            catchers![bad_request, not_found, unprocessable, internal_error, config_missing],
        )
        .mount(
            "/api",
            routes![
                health,
                status,
                tools,
                get_profile,
                save_profile,
                analyze_resume,
                keyword_match,
                prepare_interview,
                scan_emails,
                add_tracker_row,
                add_tracker_row_from_email,
                run_task,
                options,
            ],
        )
}

/// Start the API. `port` overrides `ROCKET_PORT` / Rocket's default.
pub async fn start_web_server(state: AppState, port: Option<u16>) -> Result<()> {
    let summary = state.orchestrator.config().status_summary();
    info!("Starting Career Copilot API server");
    info!(
        "LLM provider: {} (fallback: {})",
        summary.llm_provider,
        summary.fallback_provider.as_deref().unwrap_or("none")
    );
    info!("Storage mode: {:?}", summary.storage_mode);

    let mut rocket = build_rocket(state);
    if let Some(port) = port {
        let figment = rocket.figment().clone().merge(("port", port));
        rocket = rocket.configure(figment);
    }

    let _rocket = rocket
        .launch()
        .await
        .map_err(|e| anyhow::anyhow!("Rocket server failed: {}", e))?;

    Ok(())
}
