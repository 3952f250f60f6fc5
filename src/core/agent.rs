// src/core/agent.rs
//! Agent boundary: one operation, `run(prompt)`, returning a tagged result.

use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::config::LlmProvider;

/// Shape of whatever an agent run produced, decided once at the adapter.
#[derive(Debug, Clone, PartialEq)]
pub enum AgentRunResult {
    /// The run's final output, itself any other shape.
    FinalOutput(Box<AgentRunResult>),
    /// A generic `value` wrapper around another shape.
    Value(Box<AgentRunResult>),
    Mapping(Map<String, Value>),
    Text(String),
    /// Text split across several parts, to be concatenated.
    Fragments(Vec<String>),
    Other(Value),
}

impl AgentRunResult {
    pub fn final_text(text: impl Into<String>) -> Self {
        AgentRunResult::FinalOutput(Box::new(AgentRunResult::Text(text.into())))
    }

    /// Best-effort plain text rendering, unwrapping the same layers the normalizer does.
    pub fn into_text(self) -> String {
        match self {
            AgentRunResult::FinalOutput(inner) | AgentRunResult::Value(inner) => inner.into_text(),
            AgentRunResult::Mapping(mut map) => match map.remove("value") {
                Some(inner) => AgentRunResult::from(inner).into_text(),
                None => Value::Object(map).to_string(),
            },
            AgentRunResult::Text(text) => text,
            AgentRunResult::Fragments(parts) => parts.concat(),
            AgentRunResult::Other(value) => value_to_text(&value),
        }
    }
}

impl From<Value> for AgentRunResult {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(map) => AgentRunResult::Mapping(map),
            Value::String(text) => AgentRunResult::Text(text),
            Value::Array(items) if !items.is_empty() && items.iter().all(Value::is_string) => {
                AgentRunResult::Fragments(
                    items
                        .into_iter()
                        .filter_map(|item| match item {
                            Value::String(s) => Some(s),
                            _ => None,
                        })
                        .collect(),
                )
            }
            other => AgentRunResult::Other(other),
        }
    }
}

pub(crate) fn value_to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{provider} API error (status {status}): {message}")]
    Api {
        provider: LlmProvider,
        status: u16,
        message: String,
    },

    #[error("{provider} rate limit (error code: 429): {message}")]
    RateLimited {
        provider: LlmProvider,
        message: String,
    },

    #[error("{0} returned empty content")]
    EmptyContent(LlmProvider),

    #[error("Failed to parse {provider} response: {message}")]
    InvalidResponse {
        provider: LlmProvider,
        message: String,
    },

    #[error("{0}")]
    Other(String),
}

/// An LLM-backed agent bound to one provider.
#[async_trait]
pub trait Agent: Send + Sync {
    fn provider(&self) -> LlmProvider;

    async fn run(&self, prompt: &str) -> Result<AgentRunResult, AgentError>;
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Agent that replays canned replies and records every prompt it saw.
    pub struct ScriptedAgent {
        provider: LlmProvider,
        replies: Mutex<VecDeque<Result<AgentRunResult, AgentError>>>,
        prompts: Mutex<Vec<String>>,
        calls: AtomicUsize,
    }

    impl ScriptedAgent {
        pub fn new(provider: LlmProvider) -> Self {
            Self {
                provider,
                replies: Mutex::new(VecDeque::new()),
                prompts: Mutex::new(Vec::new()),
                calls: AtomicUsize::new(0),
            }
        }

        pub fn reply(self, reply: Result<AgentRunResult, AgentError>) -> Self {
            self.replies.lock().unwrap().push_back(reply);
            self
        }

        pub fn reply_text(self, text: &str) -> Self {
            self.reply(Ok(AgentRunResult::final_text(text)))
        }

        pub fn fail(self, message: &str) -> Self {
            self.reply(Err(AgentError::Other(message.to_string())))
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        pub fn prompts(&self) -> Vec<String> {
            self.prompts.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Agent for ScriptedAgent {
        fn provider(&self) -> LlmProvider {
            self.provider
        }

        async fn run(&self, prompt: &str) -> Result<AgentRunResult, AgentError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(AgentError::Other("no scripted reply left".to_string())))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_value_picks_shape() {
        assert!(matches!(
            AgentRunResult::from(json!({"a": 1})),
            AgentRunResult::Mapping(_)
        ));
        assert_eq!(
            AgentRunResult::from(json!("hi")),
            AgentRunResult::Text("hi".to_string())
        );
        assert_eq!(
            AgentRunResult::from(json!(["a", "b"])),
            AgentRunResult::Fragments(vec!["a".to_string(), "b".to_string()])
        );
        assert_eq!(AgentRunResult::from(json!(7)), AgentRunResult::Other(json!(7)));
        assert_eq!(AgentRunResult::from(json!([])), AgentRunResult::Other(json!([])));
    }

    #[test]
    fn test_into_text_unwraps_layers() {
        let result = AgentRunResult::FinalOutput(Box::new(AgentRunResult::Mapping(
            json!({"value": "hello"}).as_object().cloned().unwrap(),
        )));
        assert_eq!(result.into_text(), "hello");

        let result = AgentRunResult::Fragments(vec!["a".to_string(), "b".to_string()]);
        assert_eq!(result.into_text(), "ab");
    }

    #[test]
    fn test_rate_limit_message_carries_signature() {
        let err = AgentError::RateLimited {
            provider: LlmProvider::OpenAi,
            message: "slow down".to_string(),
        };
        assert!(err.to_string().contains("error code: 429"));
    }
}
