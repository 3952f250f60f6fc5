// src/core/fallback.rs
//! One-shot provider fallback: a quota or rate-limit failure on the primary
//! agent re-issues the same prompt once against the secondary agent.

use std::sync::Arc;
use tracing::{info, warn};

use super::agent::{Agent, AgentError, AgentRunResult};
use crate::config::LlmProvider;

/// Lower-case substrings that mark a provider quota or rate-limit failure.
pub const QUOTA_SIGNATURES: [&str; 5] = [
    "rate limit",
    "insufficient_quota",
    "error code: 429",
    "you exceeded your current quota",
    "resource_exhausted",
];

pub fn is_quota_message(message: &str) -> bool {
    let message = message.to_lowercase();
    QUOTA_SIGNATURES.iter().any(|sig| message.contains(sig))
}

pub fn is_quota_error(err: &AgentError) -> bool {
    matches!(err, AgentError::RateLimited { .. }) || is_quota_message(&err.to_string())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackState {
    Primary,
    Fallback,
}

/// Successful run plus the state it finished in.
#[derive(Debug, Clone, PartialEq)]
pub struct RunOutcome {
    pub result: AgentRunResult,
    pub state: FallbackState,
    pub provider: LlmProvider,
}

/// Failure after the state machine gave up.
#[derive(Debug)]
pub struct RunFailure {
    pub error: AgentError,
    pub state: FallbackState,
}

impl std::fmt::Display for RunFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.state {
            FallbackState::Primary => write!(f, "{}", self.error),
            FallbackState::Fallback => write!(f, "Fallback provider failed: {}", self.error),
        }
    }
}

#[derive(Clone)]
pub struct FallbackController {
    primary: Arc<dyn Agent>,
    secondary: Option<Arc<dyn Agent>>,
}

impl FallbackController {
    pub fn new(primary: Arc<dyn Agent>, secondary: Option<Arc<dyn Agent>>) -> Self {
        Self { primary, secondary }
    }

    pub fn primary_provider(&self) -> LlmProvider {
        self.primary.provider()
    }

    pub fn secondary_provider(&self) -> Option<LlmProvider> {
        self.secondary.as_ref().map(|agent| agent.provider())
    }

    pub async fn run(&self, prompt: &str) -> Result<RunOutcome, RunFailure> {
        let err = match self.primary.run(prompt).await {
            Ok(result) => {
                return Ok(RunOutcome {
                    result,
                    state: FallbackState::Primary,
                    provider: self.primary.provider(),
                })
            }
            Err(err) => err,
        };

        if !is_quota_error(&err) {
            warn!("{} agent run failed: {}", self.primary.provider(), err);
            return Err(RunFailure {
                error: err,
                state: FallbackState::Primary,
            });
        }

        let secondary = match &self.secondary {
            Some(agent) => agent,
            None => {
                warn!(
                    "{} quota/rate limit hit and no fallback provider is configured",
                    self.primary.provider()
                );
                return Err(RunFailure {
                    error: err,
                    state: FallbackState::Primary,
                });
            }
        };

        info!(
            "{} quota/rate limit encountered ({}). Falling back to {} and retrying",
            self.primary.provider(),
            err,
            secondary.provider()
        );

        match secondary.run(prompt).await {
            Ok(result) => Ok(RunOutcome {
                result,
                state: FallbackState::Fallback,
                provider: secondary.provider(),
            }),
            Err(error) => {
                warn!("{} fallback run failed: {}", secondary.provider(), error);
                Err(RunFailure {
                    error,
                    state: FallbackState::Fallback,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::agent::test_support::ScriptedAgent;

    fn controller(
        primary: &Arc<ScriptedAgent>,
        secondary: Option<&Arc<ScriptedAgent>>,
    ) -> FallbackController {
        FallbackController::new(
            primary.clone(),
            secondary.map(|s| s.clone() as Arc<dyn Agent>),
        )
    }

    #[test]
    fn test_quota_signatures() {
        assert!(is_quota_message("Error code: 429 - insufficient_quota"));
        assert!(is_quota_message("Rate limit reached for gpt-4o-mini"));
        assert!(is_quota_message("You exceeded your current quota, please check your plan"));
        assert!(is_quota_message("RESOURCE_EXHAUSTED"));
        assert!(!is_quota_message("connection reset by peer"));
        assert!(!is_quota_message("validation error for Plan"));
    }

    #[tokio::test]
    async fn test_primary_success_never_touches_secondary() {
        let primary = Arc::new(ScriptedAgent::new(LlmProvider::OpenAi).reply_text("ok"));
        let secondary = Arc::new(ScriptedAgent::new(LlmProvider::Google));

        let outcome = controller(&primary, Some(&secondary)).run("p").await.unwrap();
        assert_eq!(outcome.state, FallbackState::Primary);
        assert_eq!(outcome.provider, LlmProvider::OpenAi);
        assert_eq!(secondary.calls(), 0);
    }

    #[tokio::test]
    async fn test_quota_error_falls_back_exactly_once() {
        let primary = Arc::new(
            ScriptedAgent::new(LlmProvider::OpenAi)
                .fail("Error code: 429 - {'error': {'code': 'insufficient_quota'}}"),
        );
        let secondary = Arc::new(ScriptedAgent::new(LlmProvider::Google).reply_text("from gemini"));

        let outcome = controller(&primary, Some(&secondary))
            .run("same prompt")
            .await
            .unwrap();

        assert_eq!(outcome.state, FallbackState::Fallback);
        assert_eq!(outcome.provider, LlmProvider::Google);
        assert_eq!(outcome.result, AgentRunResult::final_text("from gemini"));
        assert_eq!(primary.calls(), 1);
        assert_eq!(secondary.calls(), 1);
        assert_eq!(secondary.prompts(), vec!["same prompt".to_string()]);
    }

    #[tokio::test]
    async fn test_typed_rate_limit_triggers_fallback() {
        let primary = Arc::new(ScriptedAgent::new(LlmProvider::OpenAi).reply(Err(
            AgentError::RateLimited {
                provider: LlmProvider::OpenAi,
                message: "slow down".to_string(),
            },
        )));
        let secondary = Arc::new(ScriptedAgent::new(LlmProvider::Google).reply_text("ok"));

        let outcome = controller(&primary, Some(&secondary)).run("p").await.unwrap();
        assert_eq!(outcome.state, FallbackState::Fallback);
    }

    #[tokio::test]
    async fn test_other_errors_are_not_retried() {
        let primary = Arc::new(ScriptedAgent::new(LlmProvider::OpenAi).fail("invalid api key"));
        let secondary = Arc::new(ScriptedAgent::new(LlmProvider::Google).reply_text("unused"));

        let failure = controller(&primary, Some(&secondary)).run("p").await.unwrap_err();
        assert_eq!(failure.state, FallbackState::Primary);
        assert_eq!(failure.to_string(), "invalid api key");
        assert_eq!(secondary.calls(), 0);
    }

    #[tokio::test]
    async fn test_fallback_failure_is_terminal() {
        let primary = Arc::new(ScriptedAgent::new(LlmProvider::OpenAi).fail("rate limit"));
        let secondary = Arc::new(ScriptedAgent::new(LlmProvider::Google).fail("rate limit again"));

        let failure = controller(&primary, Some(&secondary)).run("p").await.unwrap_err();
        assert_eq!(failure.state, FallbackState::Fallback);
        assert!(failure.to_string().starts_with("Fallback provider failed"));
        assert_eq!(primary.calls(), 1);
        assert_eq!(secondary.calls(), 1);
    }

    #[tokio::test]
    async fn test_quota_without_secondary_is_wrapped() {
        let primary = Arc::new(ScriptedAgent::new(LlmProvider::Google).fail("RESOURCE_EXHAUSTED"));

        let failure = controller(&primary, None).run("p").await.unwrap_err();
        assert_eq!(failure.state, FallbackState::Primary);
        assert_eq!(primary.calls(), 1);
    }
}
