// src/web/guards.rs
use crate::core::CareerOrchestrator;
use crate::web::types::AppState;

use rocket::http::Status;
use rocket::request::{FromRequest, Outcome};
use rocket::{Request, State};
use tracing::warn;

#[derive(Debug)]
pub struct ConfigMissing;

/// Request guard for capability routes: succeeds only when an LLM provider is configured.
/// Fails with 503, which the `CONFIG_MISSING` catcher renders.
pub struct Configured<'r>(pub &'r CareerOrchestrator);

#[rocket::async_trait]
impl<'r> FromRequest<'r> for Configured<'r> {
    type Error = ConfigMissing;

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let state = match req.guard::<&State<AppState>>().await {
            Outcome::Success(state) => state,
            Outcome::Error((status, _)) => return Outcome::Error((status, ConfigMissing)),
            Outcome::Forward(f) => return Outcome::Forward(f),
        };

        if state.orchestrator.is_configured() {
            Outcome::Success(Configured(&state.inner().orchestrator))
        } else {
            warn!("Rejecting {}: no LLM provider configured", req.uri());
            Outcome::Error((Status::ServiceUnavailable, ConfigMissing))
        }
    }
}
