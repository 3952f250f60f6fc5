// src/core/llm_client.rs
//! HTTP agents for the two supported LLM providers.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, trace};

use super::agent::{Agent, AgentError, AgentRunResult};
use crate::config::{ApiKey, LlmProvider, ProviderConfig};
use crate::environment::RuntimeSettings;

const OPENAI_CHAT_ENDPOINT: &str = "/v1/chat/completions";

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    content: Option<String>,
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<GeminiContent<'a>>,
}

#[derive(Debug, Serialize)]
struct GeminiContent<'a> {
    role: &'a str,
    parts: Vec<GeminiPart<'a>>,
}

#[derive(Debug, Serialize)]
struct GeminiPart<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

/// Error envelope shared (closely enough) by both providers.
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
    #[serde(default)]
    code: Option<serde_json::Value>,
    #[serde(default)]
    status: Option<String>,
}

/// Build an error from a non-success provider response.
/// 429 becomes `RateLimited`; the provider's error code is kept in the message.
pub(crate) fn error_from_status(provider: LlmProvider, status: u16, body: &str) -> AgentError {
    let message = match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => {
            let code = envelope
                .error
                .code
                .as_ref()
                .and_then(|c| c.as_str().map(str::to_string))
                .or(envelope.error.status);
            match code {
                Some(code) => format!("{} ({})", envelope.error.message, code),
                None => envelope.error.message,
            }
        }
        Err(_) => body.to_string(),
    };

    if status == 429 {
        AgentError::RateLimited { provider, message }
    } else {
        AgentError::Api {
            provider,
            status,
            message,
        }
    }
}

pub(crate) fn parse_chat_body(body: &str) -> Result<AgentRunResult, AgentError> {
    let response: ChatResponse =
        serde_json::from_str(body).map_err(|e| AgentError::InvalidResponse {
            provider: LlmProvider::OpenAi,
            message: e.to_string(),
        })?;

    response
        .choices
        .into_iter()
        .find_map(|choice| choice.message.content)
        .filter(|content| !content.trim().is_empty())
        .map(AgentRunResult::final_text)
        .ok_or(AgentError::EmptyContent(LlmProvider::OpenAi))
}

pub(crate) fn parse_generate_body(body: &str) -> Result<AgentRunResult, AgentError> {
    let response: GenerateResponse =
        serde_json::from_str(body).map_err(|e| AgentError::InvalidResponse {
            provider: LlmProvider::Google,
            message: e.to_string(),
        })?;

    let mut parts: Vec<String> = response
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .map(|content| content.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    match parts.len() {
        0 => Err(AgentError::EmptyContent(LlmProvider::Google)),
        1 => Ok(AgentRunResult::final_text(parts.remove(0))),
        _ => Ok(AgentRunResult::FinalOutput(Box::new(
            AgentRunResult::Fragments(parts),
        ))),
    }
}

fn http_client(settings: &RuntimeSettings) -> Result<Client> {
    Client::builder()
        .timeout(settings.request_timeout())
        .build()
        .context("Failed to create HTTP client")
}

pub struct OpenAiAgent {
    client: Client,
    api_key: ApiKey,
    base_url: String,
    model: String,
}

impl OpenAiAgent {
    pub fn new(api_key: ApiKey, settings: &RuntimeSettings) -> Result<Self> {
        Ok(Self {
            client: http_client(settings)?,
            api_key,
            base_url: settings.openai_base_url.trim_end_matches('/').to_string(),
            model: settings.openai_model.clone(),
        })
    }
}

#[async_trait]
impl Agent for OpenAiAgent {
    fn provider(&self) -> LlmProvider {
        LlmProvider::OpenAi
    }

    async fn run(&self, prompt: &str) -> Result<AgentRunResult, AgentError> {
        let url = format!("{}{}", self.base_url, OPENAI_CHAT_ENDPOINT);
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
        };

        debug!("Calling OpenAI chat completions (model: {})", self.model);

        let response = self
            .client
            .post(&url)
            .bearer_auth(self.api_key.expose())
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        trace!("OpenAI response status {}: {}", status, body);

        if !status.is_success() {
            return Err(error_from_status(LlmProvider::OpenAi, status.as_u16(), &body));
        }

        parse_chat_body(&body)
    }
}

pub struct GeminiAgent {
    client: Client,
    api_key: ApiKey,
    base_url: String,
    model: String,
}

impl GeminiAgent {
    pub fn new(api_key: ApiKey, settings: &RuntimeSettings) -> Result<Self> {
        Ok(Self {
            client: http_client(settings)?,
            api_key,
            base_url: settings.gemini_base_url.trim_end_matches('/').to_string(),
            model: settings.gemini_model.clone(),
        })
    }
}

#[async_trait]
impl Agent for GeminiAgent {
    fn provider(&self) -> LlmProvider {
        LlmProvider::Google
    }

    async fn run(&self, prompt: &str) -> Result<AgentRunResult, AgentError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );
        let request = GenerateRequest {
            contents: vec![GeminiContent {
                role: "user",
                parts: vec![GeminiPart { text: prompt }],
            }],
        };

        debug!("Calling Gemini generateContent (model: {})", self.model);

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", self.api_key.expose())
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        trace!("Gemini response status {}: {}", status, body);

        if !status.is_success() {
            return Err(error_from_status(LlmProvider::Google, status.as_u16(), &body));
        }

        parse_generate_body(&body)
    }
}

/// Construct the agent for `provider`, if its key is configured.
pub fn agent_for(
    provider: LlmProvider,
    config: &ProviderConfig,
    settings: &RuntimeSettings,
) -> Result<Option<Arc<dyn Agent>>> {
    let key = match config.api_key_for(provider) {
        Some(key) => key.clone(),
        None => return Ok(None),
    };

    let agent: Arc<dyn Agent> = match provider {
        LlmProvider::OpenAi => Arc::new(OpenAiAgent::new(key, settings)?),
        LlmProvider::Google => Arc::new(GeminiAgent::new(key, settings)?),
    };
    Ok(Some(agent))
}
