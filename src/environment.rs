// src/environment.rs
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

const DEFAULT_SETTINGS_FILE: &str = "copilot.yaml";

/// Runtime knobs that are not secrets: models, endpoints, timeouts, UI switches.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RuntimeSettings {
    pub openai_model: String,
    pub gemini_model: String,
    pub openai_base_url: String,
    pub gemini_base_url: String,
    pub portia_api_url: String,
    pub tools_path: String,
    pub request_timeout_secs: u64,
    pub tracker_enabled: bool,
}

impl Default for RuntimeSettings {
    fn default() -> Self {
        Self {
            openai_model: "gpt-4o-mini".to_string(),
            gemini_model: "gemini-1.5-flash".to_string(),
            openai_base_url: "https://api.openai.com".to_string(),
            gemini_base_url: "https://generativelanguage.googleapis.com".to_string(),
            portia_api_url: "https://api.portialabs.ai".to_string(),
            tools_path: "/api/v0/tools/".to_string(),
            request_timeout_secs: 120,
            tracker_enabled: false,
        }
    }
}

#[derive(Debug, Deserialize)]
struct SettingsFile {
    #[serde(default)]
    local: RuntimeSettings,
    #[serde(default)]
    production: RuntimeSettings,
}

impl RuntimeSettings {
    /// Load settings for the current environment. A missing file yields defaults.
    pub fn load() -> Result<Self> {
        let environment = Self::get_environment();
        let path = std::env::var("COPILOT_SETTINGS")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_SETTINGS_FILE));

        if !path.exists() {
            info!(
                "No settings file at {}, using defaults for environment: {}",
                path.display(),
                environment
            );
            return Ok(Self::default());
        }

        info!(
            "Loading settings from {} for environment: {}",
            path.display(),
            environment
        );
        Self::load_from_file(&path, &environment)
    }

    fn get_environment() -> String {
        std::env::var("COPILOT_ENV")
            .or_else(|_| std::env::var("ENVIRONMENT"))
            .unwrap_or_else(|_| "local".to_string())
    }

    fn load_from_file(path: &Path, environment: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_yaml(&content, environment)
            .with_context(|| format!("Failed to parse {}", path.display()))
    }

    pub fn from_yaml(content: &str, environment: &str) -> Result<Self> {
        let file: SettingsFile = serde_yaml::from_str(content)?;

        Ok(match environment {
            "production" => file.production,
            _ => file.local,
        })
    }

    pub fn request_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.request_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SETTINGS: &str = r#"
local:
  openai_model: gpt-4o
  tracker_enabled: true
production:
  gemini_model: gemini-1.5-pro
  request_timeout_secs: 30
"#;

    #[test]
    fn test_local_section_overrides_defaults() {
        let settings = RuntimeSettings::from_yaml(SETTINGS, "local").unwrap();
        assert_eq!(settings.openai_model, "gpt-4o");
        assert!(settings.tracker_enabled);
        assert_eq!(settings.gemini_model, "gemini-1.5-flash");
        assert_eq!(settings.request_timeout_secs, 120);
    }

    #[test]
    fn test_production_section() {
        let settings = RuntimeSettings::from_yaml(SETTINGS, "production").unwrap();
        assert_eq!(settings.gemini_model, "gemini-1.5-pro");
        assert_eq!(settings.request_timeout(), std::time::Duration::from_secs(30));
        assert!(!settings.tracker_enabled);
    }

    #[test]
    fn test_unknown_environment_uses_local() {
        let settings = RuntimeSettings::from_yaml(SETTINGS, "staging").unwrap();
        assert_eq!(settings.openai_model, "gpt-4o");
    }

    #[test]
    fn test_invalid_yaml_is_an_error() {
        assert!(RuntimeSettings::from_yaml("local: [unclosed", "local").is_err());
    }
}
