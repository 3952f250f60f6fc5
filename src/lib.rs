// src/lib.rs
//! Career Copilot: resume analysis, interview prep, recruiter-mail scanning and
//! job tracking on top of an LLM agent with one-shot provider fallback.

pub mod cli;
pub mod config;
pub mod core;
pub mod environment;
pub mod types;
pub mod web;

pub use config::{LlmProvider, ProviderConfig};
pub use core::CareerOrchestrator;
pub use environment::RuntimeSettings;
pub use web::{build_rocket, start_web_server, AppState};
