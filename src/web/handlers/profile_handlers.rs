// src/web/handlers/profile_handlers.rs
//! The user profile lives in a private (encrypted) cookie for the session.

use crate::types::UserProfile;
use crate::web::types::{DataResponse, StandardErrorResponse, StandardRequest, WithConversationId};

use rocket::http::{Cookie, CookieJar};
use rocket::serde::json::Json;
use tracing::{info, warn};

pub const PROFILE_COOKIE: &str = "copilot_profile";

/// Profile stored for this session, if any. A cookie that no longer decodes is ignored.
pub fn profile_from_cookies(jar: &CookieJar<'_>) -> Option<UserProfile> {
    let cookie = jar.get_private(PROFILE_COOKIE)?;
    match serde_json::from_str(cookie.value()) {
        Ok(profile) => Some(profile),
        Err(e) => {
            warn!("Ignoring unreadable profile cookie: {}", e);
            None
        }
    }
}

pub async fn get_profile_handler(jar: &CookieJar<'_>) -> Json<DataResponse<UserProfile>> {
    let profile = profile_from_cookies(jar).unwrap_or_default();
    let message = if profile.is_empty() {
        "No profile saved".to_string()
    } else {
        format!("Profile for {}", profile.name)
    };
    Json(DataResponse::success(message, profile, None))
}

pub async fn save_profile_handler(
    request: Json<StandardRequest<UserProfile>>,
    jar: &CookieJar<'_>,
) -> Result<Json<DataResponse<UserProfile>>, Json<StandardErrorResponse>> {
    let conversation_id = request.conversation_id();
    let profile = request.into_inner().data;

    let value = serde_json::to_string(&profile).map_err(|e| {
        Json(StandardErrorResponse::new(
            format!("Failed to encode profile: {}", e),
            "PROFILE_ERROR".to_string(),
            vec!["Check the profile fields".to_string()],
            conversation_id.clone(),
        ))
    })?;

    jar.add_private(Cookie::new(PROFILE_COOKIE, value));
    info!("Profile saved for {}", profile.name);

    Ok(Json(DataResponse::success(
        "Profile saved successfully!".to_string(),
        profile,
        conversation_id,
    )))
}
