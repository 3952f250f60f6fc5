// src/web/types.rs
use rocket::serde::{Deserialize, Serialize};

use crate::config::StatusSummary;
use crate::core::orchestrator::MISSING_SHEET_ID;
use crate::core::{CareerOrchestrator, ToolAvailability};
use crate::types::{ErrorReport, JobEmail, JobTrackerRow, UserProfile};

/// Shared server state.
pub struct AppState {
    pub orchestrator: CareerOrchestrator,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct TextResponse {
    #[serde(rename = "type")]
    pub response_type: ResponseType,
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct DataResponse<T> {
    #[serde(rename = "type")]
    pub response_type: ResponseType,
    pub success: bool,
    pub message: String,
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_format: Option<DisplayFormat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct StandardErrorResponse {
    #[serde(rename = "type")]
    pub response_type: ResponseType,
    pub success: bool,
    pub error: String,
    pub error_code: String,
    pub suggestions: Vec<String>,
    /// Agent output that could not be used, for debugging.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde", rename_all = "lowercase")]
pub enum ResponseType {
    Text,
    Data,
    Error,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct DisplayFormat {
    #[serde(rename = "type")]
    pub format_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sections: Option<Vec<DisplaySection>>,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct DisplaySection {
    pub title: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub points: Option<Vec<String>>,
}

impl DisplaySection {
    pub fn text(title: &str, content: impl Into<String>) -> Self {
        Self {
            title: title.to_string(),
            content: content.into(),
            score: None,
            points: None,
        }
    }

    pub fn list(title: &str, points: Vec<String>) -> Self {
        Self {
            title: title.to_string(),
            content: format!("{} item(s)", points.len()),
            score: None,
            points: Some(points),
        }
    }
}

// Request types with conversation_id support
#[derive(Deserialize)]
#[serde(crate = "rocket::serde")]
pub struct StandardRequest<T> {
    #[serde(flatten)]
    pub data: T,
    pub conversation_id: Option<String>,
}

pub trait WithConversationId {
    fn conversation_id(&self) -> Option<String>;
}

impl<T> WithConversationId for StandardRequest<T> {
    fn conversation_id(&self) -> Option<String> {
        self.conversation_id.clone()
    }
}

#[derive(Deserialize)]
#[serde(crate = "rocket::serde")]
pub struct ResumeAnalyzeRequest {
    pub resume_text: String,
    pub job_description: String,
    /// Falls back to the profile stored in the session cookie.
    #[serde(default)]
    pub profile: Option<UserProfile>,
}

#[derive(Deserialize)]
#[serde(crate = "rocket::serde")]
pub struct KeywordMatchRequest {
    pub resume_text: String,
    pub job_description: String,
}

#[derive(Deserialize)]
#[serde(crate = "rocket::serde")]
pub struct InterviewPrepRequest {
    pub job_description: String,
    #[serde(default)]
    pub profile: Option<UserProfile>,
}

#[derive(Deserialize)]
#[serde(crate = "rocket::serde")]
pub struct TrackerRowRequest {
    pub row: JobTrackerRow,
    #[serde(default)]
    pub sheet_id: Option<String>,
    #[serde(default)]
    pub sheet_tab: Option<String>,
}

#[derive(Deserialize)]
#[serde(crate = "rocket::serde")]
pub struct TrackerFromEmailRequest {
    pub email: JobEmail,
    #[serde(default)]
    pub sheet_id: Option<String>,
    #[serde(default)]
    pub sheet_tab: Option<String>,
}

#[derive(Deserialize)]
#[serde(crate = "rocket::serde")]
pub struct TaskRequest {
    pub task: String,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct StatusData {
    pub config: StatusSummary,
    pub tools: ToolAvailability,
    pub tracker_enabled: bool,
}

impl TextResponse {
    pub fn success(message: String, conversation_id: Option<String>) -> Self {
        Self {
            response_type: ResponseType::Text,
            success: true,
            message,
            conversation_id,
        }
    }
}

impl<T> DataResponse<T> {
    pub fn success(message: String, data: T, conversation_id: Option<String>) -> Self {
        Self {
            response_type: ResponseType::Data,
            success: true,
            message,
            data,
            display_format: None,
            conversation_id,
        }
    }

    pub fn with_display_format(mut self, display_format: DisplayFormat) -> Self {
        self.display_format = Some(display_format);
        self
    }
}

impl StandardErrorResponse {
    pub fn new(
        error: String,
        error_code: String,
        suggestions: Vec<String>,
        conversation_id: Option<String>,
    ) -> Self {
        Self {
            response_type: ResponseType::Error,
            success: false,
            error,
            error_code,
            suggestions,
            raw: None,
            conversation_id,
        }
    }

    /// Error envelope for a capability that returned a failure report.
    pub fn from_report(report: ErrorReport, conversation_id: Option<String>) -> Self {
        let (error_code, suggestions) = if report.error == MISSING_SHEET_ID {
            (
                "SHEET_ID_MISSING",
                vec![
                    "Pass sheet_id in the request".to_string(),
                    "Or set SHEET_ID in the environment".to_string(),
                ],
            )
        } else if report.raw.is_some() {
            (
                "MALFORMED_AGENT_OUTPUT",
                vec!["Retry the request; the agent reply could not be parsed".to_string()],
            )
        } else {
            (
                "AGENT_ERROR",
                vec![
                    "Try again in a few moments".to_string(),
                    "Check provider keys and quota".to_string(),
                ],
            )
        };

        Self {
            raw: report.raw,
            ..Self::new(
                report.error,
                error_code.to_string(),
                suggestions,
                conversation_id,
            )
        }
    }
}
