// src/web/handlers/system_handlers.rs
use crate::core::ToolInfo;
use crate::web::types::*;

use rocket::serde::json::Json;
use rocket::State;
use tracing::info;

pub async fn health_handler() -> Json<TextResponse> {
    Json(TextResponse::success("OK".to_string(), None))
}

pub async fn status_handler(state: &State<AppState>) -> Json<DataResponse<StatusData>> {
    let orchestrator = &state.orchestrator;
    let config = orchestrator.config().status_summary();
    let tools = orchestrator.tool_availability().await;

    info!(
        "Status check: provider {}, gmail tools {}, sheets tools {}",
        config.llm_provider, tools.gmail, tools.sheets
    );

    let message = if config.has_llm_key {
        format!("Using {} LLM", config.llm_provider)
    } else {
        "No LLM provider configured".to_string()
    };

    Json(DataResponse::success(
        message,
        StatusData {
            config,
            tools,
            tracker_enabled: orchestrator.settings().tracker_enabled,
        },
        None,
    ))
}

pub async fn tools_handler(state: &State<AppState>) -> Json<DataResponse<Vec<ToolInfo>>> {
    let tools = state.orchestrator.get_available_tools().await;
    Json(DataResponse::success(
        format!("{} tools available", tools.len()),
        tools,
        None,
    ))
}
