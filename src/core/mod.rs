// src/core/mod.rs
//! Agent plumbing and the capability operations built on it

pub mod agent;
pub mod fallback;
pub mod llm_client;
pub mod local_tools;
pub mod normalizer;
pub mod orchestrator;
pub mod prompts;
pub mod tool_registry;

pub use agent::{Agent, AgentError, AgentRunResult};
pub use fallback::{FallbackController, FallbackState};
pub use normalizer::{normalize, Normalized};
pub use orchestrator::CareerOrchestrator;
pub use tool_registry::{ToolAvailability, ToolInfo};
