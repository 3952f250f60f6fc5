// src/core/normalizer.rs
//! Turns whatever an agent run produced into a JSON value, or an error that
//! keeps the offending text.
//!
//! The `{`...`}` scan is lenient: the slice runs from the first opening brace
//! to the last closing brace, so commentary around a single object is
//! tolerated, but braces inside that commentary can break the slice.

use serde_json::Value;

use super::agent::{value_to_text, AgentRunResult};

#[derive(Debug, Clone, PartialEq)]
pub enum Normalized {
    Parsed(Value),
    Malformed { message: String, raw: String },
}

pub fn normalize(raw: AgentRunResult) -> Normalized {
    match raw {
        AgentRunResult::FinalOutput(inner) => normalize(*inner),
        AgentRunResult::Value(inner) => normalize(*inner),
        AgentRunResult::Mapping(mut map) => match map.remove("value") {
            Some(member) => normalize(AgentRunResult::from(member)),
            None => Normalized::Parsed(Value::Object(map)),
        },
        AgentRunResult::Text(text) => normalize_text(&text),
        AgentRunResult::Fragments(parts) => normalize_text(&parts.concat()),
        AgentRunResult::Other(value) => normalize_text(&value_to_text(&value)),
    }
}

pub fn normalize_text(text: &str) -> Normalized {
    let cleaned = strip_code_fences(text);

    if cleaned.starts_with('[') && cleaned.ends_with(']') && cleaned.contains('{') {
        if let Ok(value) = serde_json::from_str::<Value>(cleaned) {
            return Normalized::Parsed(value);
        }
    }

    let (start, end) = match (cleaned.find('{'), cleaned.rfind('}')) {
        (Some(start), Some(end)) if start < end => (start, end),
        _ => {
            return Normalized::Malformed {
                message: "Agent response did not contain a JSON object".to_string(),
                raw: text.to_string(),
            }
        }
    };

    let candidate = &cleaned[start..=end];
    match serde_json::from_str::<Value>(candidate) {
        Ok(value) => Normalized::Parsed(value),
        Err(first) => {
            let unescaped = candidate.replace("\\\"", "\"");
            match serde_json::from_str::<Value>(&unescaped) {
                Ok(value) => Normalized::Parsed(value),
                Err(_) => Normalized::Malformed {
                    message: format!("Agent returned malformed JSON: {}", first),
                    raw: cleaned.to_string(),
                },
            }
        }
    }
}

/// Strip a leading ```` ``` ```` fence (with optional language tag) and a trailing one.
pub fn strip_code_fences(text: &str) -> &str {
    let mut body = text.trim();

    if let Some(rest) = body.strip_prefix("```") {
        let tag_len = rest
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_' || c == '-'))
            .unwrap_or(rest.len());
        body = rest[tag_len..].trim_start();
    }

    if let Some(rest) = body.strip_suffix("```") {
        body = rest.trim_end();
    }

    body
}
