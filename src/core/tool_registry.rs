// src/core/tool_registry.rs
use anyhow::{Context, Result};
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use tracing::{error, info};

use crate::config::{ApiKey, ProviderConfig};
use crate::environment::RuntimeSettings;

const DESCRIPTION_LIMIT: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolInfo {
    pub id: String,
    pub name: String,
    pub description: String,
}

impl ToolInfo {
    pub fn new(id: &str, name: &str, description: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            description: truncate_description(description),
        }
    }

    fn mentions(&self, needle: &str) -> bool {
        self.id.to_lowercase().contains(needle) || self.name.to_lowercase().contains(needle)
    }
}

/// Gmail and Sheets availability derived from a tool listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ToolAvailability {
    pub gmail: bool,
    pub sheets: bool,
}

impl ToolAvailability {
    pub fn detect(tools: &[ToolInfo]) -> Self {
        Self {
            gmail: tools.iter().any(|t| t.id.to_lowercase().contains("gmail")),
            sheets: tools.iter().any(|t| t.mentions("sheet")),
        }
    }
}

pub(crate) fn truncate_description(description: &str) -> String {
    let description = description.trim();
    if description.is_empty() {
        return "No description".to_string();
    }
    if description.chars().count() > DESCRIPTION_LIMIT {
        let cut: String = description.chars().take(DESCRIPTION_LIMIT).collect();
        format!("{}...", cut)
    } else {
        description.to_string()
    }
}

fn str_field<'a>(entry: &'a Value, keys: &[&str]) -> Option<&'a str> {
    keys.iter()
        .filter_map(|key| entry.get(*key).and_then(Value::as_str))
        .find(|s| !s.is_empty())
}

fn tool_from_entry(key: Option<&str>, entry: &Value) -> ToolInfo {
    match entry {
        Value::String(s) => ToolInfo::new(s, s, ""),
        Value::Object(_) => {
            let name = str_field(entry, &["name", "tool_name", "id"]).or(key);
            let id = str_field(entry, &["id"]).or(key).or(name);
            let description = str_field(entry, &["description"]).unwrap_or("");
            let fallback = entry.to_string();
            ToolInfo::new(
                id.unwrap_or(&fallback),
                name.unwrap_or(&fallback),
                description,
            )
        }
        other => {
            let text = other.to_string();
            let id = key.unwrap_or(&text);
            ToolInfo::new(id, id, "")
        }
    }
}

/// Read a tool listing in any of the shapes registries hand back:
/// `{"tools": [...]}`, `{"tools": {id: {...}}}`, a bare list of objects or
/// strings, or a bare `{id: {...}}` map.
pub fn parse_tool_listing(listing: &Value) -> Vec<ToolInfo> {
    let inner = listing
        .get("tools")
        .or_else(|| listing.get("results"))
        .unwrap_or(listing);

    match inner {
        Value::Array(entries) => entries.iter().map(|e| tool_from_entry(None, e)).collect(),
        Value::Object(map) => map
            .iter()
            .map(|(key, entry)| tool_from_entry(Some(key), entry))
            .collect(),
        _ => Vec::new(),
    }
}

/// Cloud tool registry for the account behind `PORTIA_API_KEY`.
pub struct CloudToolRegistry {
    client: Client,
    url: String,
    api_key: ApiKey,
}

impl CloudToolRegistry {
    pub fn from_config(config: &ProviderConfig, settings: &RuntimeSettings) -> Result<Option<Self>> {
        let api_key = match &config.portia_api_key {
            Some(key) => key.clone(),
            None => return Ok(None),
        };

        let client = Client::builder()
            .timeout(settings.request_timeout())
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Some(Self {
            client,
            url: format!(
                "{}{}",
                settings.portia_api_url.trim_end_matches('/'),
                settings.tools_path
            ),
            api_key,
        }))
    }

    pub async fn list_tools(&self) -> Result<Vec<ToolInfo>> {
        let response = self
            .client
            .get(&self.url)
            .header("Authorization", format!("Api-Key {}", self.api_key.expose()))
            .send()
            .await
            .with_context(|| format!("Failed to GET from {}", self.url))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            error!("Tool registry error {}: {}", status, error_text);
            anyhow::bail!("Tool registry returned error {}: {}", status, error_text);
        }

        let listing: Value = response
            .json()
            .await
            .context("Failed to parse tool registry response")?;

        let tools = parse_tool_listing(&listing);
        info!("Found {} cloud tools", tools.len());
        Ok(tools)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_wrapped_list() {
        let tools = parse_tool_listing(&json!({
            "tools": [
                {"id": "portia:google:gmail:search_email", "name": "Gmail Search", "description": "Search Gmail"},
                {"name": "Sheets Append"}
            ]
        }));
        assert_eq!(tools.len(), 2);
        assert_eq!(tools[0].id, "portia:google:gmail:search_email");
        assert_eq!(tools[1].id, "Sheets Append");
        assert_eq!(tools[1].description, "No description");
    }

    #[test]
    fn test_parse_keyed_map_and_strings() {
        let tools = parse_tool_listing(&json!({"weather": {"description": "x"}}));
        assert_eq!(tools, vec![ToolInfo::new("weather", "weather", "x")]);

        let tools = parse_tool_listing(&json!(["calculator", "search"]));
        assert_eq!(tools[1], ToolInfo::new("search", "search", ""));

        assert!(parse_tool_listing(&json!(null)).is_empty());
    }

    #[test]
    fn test_description_is_truncated() {
        let long = "a".repeat(150);
        let tool = ToolInfo::new("t", "t", &long);
        assert_eq!(tool.description.len(), 103);
        assert!(tool.description.ends_with("..."));
    }

    #[test]
    fn test_detect_gmail_and_sheets() {
        let tools = vec![
            ToolInfo::new("portia:google:gmail:search_email", "Search", ""),
            ToolInfo::new("portia:google:drive", "Google Sheets Writer", ""),
        ];
        assert_eq!(
            ToolAvailability::detect(&tools),
            ToolAvailability {
                gmail: true,
                sheets: true
            }
        );
        assert_eq!(
            ToolAvailability::detect(&[]),
            ToolAvailability {
                gmail: false,
                sheets: false
            }
        );
    }

    #[test]
    fn test_registry_disabled_without_cloud_key() {
        let config = ProviderConfig::resolve_with(|_| None);
        let registry = CloudToolRegistry::from_config(&config, &RuntimeSettings::default()).unwrap();
        assert!(registry.is_none());
    }
}
