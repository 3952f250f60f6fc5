// src/config.rs
use serde::Serialize;
use std::fmt;

pub const DEFAULT_SHEET_TAB: &str = "Applications";

/// LLM backends the agent can be bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LlmProvider {
    OpenAi,
    Google,
}

impl LlmProvider {
    pub fn name(&self) -> &'static str {
        match self {
            LlmProvider::OpenAi => "OPENAI",
            LlmProvider::Google => "GOOGLE",
        }
    }
}

impl fmt::Display for LlmProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Where agent run state lives: the cloud service when its key is present,
/// process memory otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageMode {
    Cloud,
    Memory,
}

/// API key wrapper that keeps secrets out of `Debug` output and logs.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoogleOAuth {
    pub client_id: String,
    pub client_secret: ApiKey,
    pub redirect_uri: String,
}

/// Provider selection and external targets resolved from the process environment.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub llm_provider: Option<LlmProvider>,
    pub fallback_provider: Option<LlmProvider>,
    pub storage_mode: StorageMode,
    pub openai_api_key: Option<ApiKey>,
    pub google_api_key: Option<ApiKey>,
    pub portia_api_key: Option<ApiKey>,
    pub google_oauth: Option<GoogleOAuth>,
    pub sheet_id: Option<String>,
    pub sheet_tab: String,
    pub force_fallback: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusSummary {
    pub llm_provider: String,
    pub fallback_provider: Option<String>,
    pub storage_mode: StorageMode,
    pub has_llm_key: bool,
    pub has_portia_api_key: bool,
    pub google_oauth_ready: bool,
    pub sheet_target_ready: bool,
}

impl ProviderConfig {
    /// Resolve from the process environment, loading `.env` first if present.
    pub fn resolve() -> Self {
        dotenvy::dotenv().ok();
        Self::resolve_with(|key| std::env::var(key).ok())
    }

    /// Resolve from an arbitrary variable lookup. Blank values count as unset.
    pub fn resolve_with<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let openai_api_key = var("OPENAI_API_KEY").map(ApiKey::new);
        let google_api_key = var("GOOGLE_API_KEY").map(ApiKey::new);
        let portia_api_key = var("PORTIA_API_KEY").map(ApiKey::new);

        let force_fallback = var("FORCE_GEMINI")
            .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        let llm_provider = match (&openai_api_key, &google_api_key) {
            (None, None) => None,
            _ if force_fallback => Some(LlmProvider::Google),
            (Some(_), _) => Some(LlmProvider::OpenAi),
            (None, Some(_)) => Some(LlmProvider::Google),
        };

        let fallback_provider = match llm_provider {
            Some(LlmProvider::OpenAi) if google_api_key.is_some() => Some(LlmProvider::Google),
            _ => None,
        };

        let storage_mode = if portia_api_key.is_some() {
            StorageMode::Cloud
        } else {
            StorageMode::Memory
        };

        let google_oauth = match (
            var("GOOGLE_CLIENT_ID"),
            var("GOOGLE_CLIENT_SECRET"),
            var("GOOGLE_REDIRECT_URI"),
        ) {
            (Some(client_id), Some(secret), Some(redirect_uri)) => Some(GoogleOAuth {
                client_id,
                client_secret: ApiKey::new(secret),
                redirect_uri,
            }),
            _ => None,
        };

        Self {
            llm_provider,
            fallback_provider,
            storage_mode,
            openai_api_key,
            google_api_key,
            portia_api_key,
            google_oauth,
            sheet_id: var("SHEET_ID"),
            sheet_tab: var("SHEET_TAB").unwrap_or_else(|| DEFAULT_SHEET_TAB.to_string()),
            force_fallback,
        }
    }

    /// At least one LLM key is available.
    /// True when the selected provider has a key to call it with.
    pub fn is_configured(&self) -> bool {
        self.llm_provider
            .is_some_and(|provider| self.api_key_for(provider).is_some())
    }

    pub fn has_portia_cloud(&self) -> bool {
        self.portia_api_key.is_some()
    }

    pub fn google_oauth_ready(&self) -> bool {
        self.google_oauth.is_some()
    }

    pub fn sheet_target_ready(&self) -> bool {
        self.sheet_id.is_some()
    }

    pub fn api_key_for(&self, provider: LlmProvider) -> Option<&ApiKey> {
        match provider {
            LlmProvider::OpenAi => self.openai_api_key.as_ref(),
            LlmProvider::Google => self.google_api_key.as_ref(),
        }
    }

    pub fn status_summary(&self) -> StatusSummary {
        StatusSummary {
            llm_provider: self
                .llm_provider
                .map(|p| p.name().to_string())
                .unwrap_or_else(|| "unknown".to_string()),
            fallback_provider: self.fallback_provider.map(|p| p.name().to_string()),
            storage_mode: self.storage_mode,
            has_llm_key: self.is_configured(),
            has_portia_api_key: self.has_portia_cloud(),
            google_oauth_ready: self.google_oauth_ready(),
            sheet_target_ready: self.sheet_target_ready(),
        }
    }
}
