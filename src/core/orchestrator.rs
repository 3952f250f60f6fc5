// src/core/orchestrator.rs
//! Capability operations: prompt, run with fallback, normalize, reshape.
//!
//! Every operation returns an [`Outcome`]; nothing here propagates an error to
//! the caller.

use anyhow::Result;
use regex::Regex;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::LazyLock;
use tracing::{debug, error, info, info_span, warn, Instrument};
use uuid::Uuid;

use super::agent::value_to_text;
use super::fallback::FallbackController;
use super::llm_client::agent_for;
use super::local_tools;
use super::normalizer::{normalize, Normalized};
use super::prompts;
use super::tool_registry::{CloudToolRegistry, ToolAvailability, ToolInfo};
use crate::config::ProviderConfig;
use crate::environment::RuntimeSettings;
use crate::types::results::string_list;
use crate::types::{
    GmailToSheetsReport, InterviewPrep, JobEmailScan, JobLead, JobTrackerRow, LeadScan, Outcome,
    QuestionItem, ResumeAnalysis, TaskReply, TrackerUpdate, UserProfile,
};

pub const MISSING_SHEET_ID: &str = "Missing SHEET_ID (env or argument).";
pub const NOT_CONFIGURED: &str =
    "No LLM provider configured. Set OPENAI_API_KEY or GOOGLE_API_KEY.";

static ATS_SCORE_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(\d{1,3})").ok());

/// First one-to-three digit run in `text`, capped at 100; 0 when there is none.
pub fn extract_ats_score(text: &str) -> u32 {
    ATS_SCORE_PATTERN
        .as_ref()
        .and_then(|re| re.captures(text))
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<u32>().ok())
        .map(|score| score.min(100))
        .unwrap_or(0)
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn reshape<T: DeserializeOwned>(value: Value, what: &str) -> Outcome<T> {
    let raw = value.to_string();
    match serde_json::from_value(value) {
        Ok(parsed) => Outcome::Success(parsed),
        Err(e) => {
            warn!("Agent {} did not match the expected shape: {}", what, e);
            Outcome::failure_with_raw(format!("Unexpected {} shape: {}", what, e), raw)
        }
    }
}

fn questions_from_list(list: Value) -> Outcome<InterviewPrep> {
    reshape::<Vec<QuestionItem>>(list, "interview list")
        .map(|interview_prep| InterviewPrep { interview_prep })
}

fn resume_from_value(value: &Value) -> ResumeAnalysis {
    let field = |key: &str| value.get(key).unwrap_or(&Value::Null);
    ResumeAnalysis {
        ats_score: extract_ats_score(&value_to_text(field("ats_score"))),
        resume_skills: string_list(field("resume_skills")),
        job_keywords: string_list(field("job_keywords")),
        improvements: string_list(field("improvements")),
        tailored_summary: value_to_text(field("tailored_summary")),
        skill_gaps: string_list(field("skill_gaps")),
        recommendations: string_list(field("recommendations")),
        raw: None,
    }
}

fn resume_from_text(raw: String) -> ResumeAnalysis {
    ResumeAnalysis {
        ats_score: extract_ats_score(&raw),
        raw: Some(raw),
        ..Default::default()
    }
}

pub struct CareerOrchestrator {
    controller: Option<FallbackController>,
    registry: Option<CloudToolRegistry>,
    config: ProviderConfig,
    settings: RuntimeSettings,
}

impl CareerOrchestrator {
    /// Build agents for the resolved providers. Missing keys leave the
    /// orchestrator unconfigured rather than failing.
    pub fn from_config(config: ProviderConfig, settings: RuntimeSettings) -> Result<Self> {
        let controller = match config.llm_provider {
            Some(primary) => {
                let secondary = match config.fallback_provider {
                    Some(fallback) => agent_for(fallback, &config, &settings)?,
                    None => None,
                };
                agent_for(primary, &config, &settings)?
                    .map(|agent| FallbackController::new(agent, secondary))
            }
            None => None,
        };

        match &controller {
            Some(c) => info!(
                "Orchestrator ready (primary: {}, fallback: {})",
                c.primary_provider(),
                c.secondary_provider()
                    .map(|p| p.name())
                    .unwrap_or("none")
            ),
            None => warn!("No LLM provider configured; capabilities are disabled"),
        }

        let registry = CloudToolRegistry::from_config(&config, &settings)?;

        Ok(Self {
            controller,
            registry,
            config,
            settings,
        })
    }

    pub fn new(
        controller: Option<FallbackController>,
        config: ProviderConfig,
        settings: RuntimeSettings,
    ) -> Self {
        Self {
            controller,
            registry: None,
            config,
            settings,
        }
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    pub fn settings(&self) -> &RuntimeSettings {
        &self.settings
    }

    pub fn is_configured(&self) -> bool {
        self.controller.is_some()
    }

    async fn run_normalized(&self, prompt: &str) -> std::result::Result<Normalized, String> {
        let controller = self
            .controller
            .as_ref()
            .ok_or_else(|| NOT_CONFIGURED.to_string())?;

        match controller.run(prompt).await {
            Ok(outcome) => {
                debug!(
                    "Agent run finished on {} ({:?})",
                    outcome.provider, outcome.state
                );
                Ok(normalize(outcome.result))
            }
            Err(failure) => {
                error!("Agent run failed: {}", failure);
                Err(failure.to_string())
            }
        }
    }

    pub async fn analyze_resume_and_job(
        &self,
        resume_text: &str,
        job_description: &str,
        profile: Option<&UserProfile>,
    ) -> Outcome<ResumeAnalysis> {
        let span = info_span!("analyze_resume", run_id = %Uuid::new_v4());
        async move {
            let prompt = match prompts::resume_analysis(resume_text, job_description, profile) {
                Ok(prompt) => prompt,
                Err(e) => return Outcome::failure(format!("{:#}", e)),
            };

            let analysis = match self.run_normalized(&prompt).await {
                Ok(Normalized::Parsed(value)) if value.is_object() => resume_from_value(&value),
                Ok(Normalized::Parsed(value)) => resume_from_text(value_to_text(&value)),
                Ok(Normalized::Malformed { message, raw }) => {
                    warn!("{}", message);
                    resume_from_text(raw)
                }
                Err(e) => return Outcome::failure(e),
            };

            info!("Resume analysis complete (ATS score {})", analysis.ats_score);
            Outcome::Success(analysis)
        }
        .instrument(span)
        .await
    }

    pub async fn generate_interview_questions(
        &self,
        job_description: &str,
        profile: Option<&UserProfile>,
    ) -> Outcome<InterviewPrep> {
        let span = info_span!("interview_prep", run_id = %Uuid::new_v4());
        async move {
            let prompt = match prompts::interview_prep(job_description, profile) {
                Ok(prompt) => prompt,
                Err(e) => return Outcome::failure(format!("{:#}", e)),
            };

            match self.run_normalized(&prompt).await {
                Ok(Normalized::Parsed(Value::Object(mut map))) => match map.remove("interview_prep") {
                    Some(list) if list.is_array() => questions_from_list(list),
                    Some(other) => Outcome::failure_with_raw(
                        "Agent response did not contain an interview_prep list",
                        value_to_text(&other),
                    ),
                    None => Outcome::failure_with_raw(
                        "Agent response did not contain an interview_prep list",
                        Value::Object(map).to_string(),
                    ),
                },
                Ok(Normalized::Parsed(list @ Value::Array(_))) => questions_from_list(list),
                Ok(Normalized::Parsed(other)) => Outcome::failure_with_raw(
                    "Agent response did not contain an interview_prep list",
                    value_to_text(&other),
                ),
                Ok(Normalized::Malformed { message, raw }) => Outcome::failure_with_raw(message, raw),
                Err(e) => Outcome::failure(e),
            }
        }
        .instrument(span)
        .await
    }

    pub async fn fetch_job_emails(&self) -> Outcome<JobEmailScan> {
        let span = info_span!("email_scan", run_id = %Uuid::new_v4());
        async move {
            match self.run_normalized(&prompts::email_scan()).await {
                Ok(Normalized::Parsed(value)) if value.is_object() => {
                    let scan = reshape::<JobEmailScan>(value, "email scan");
                    if let Some(scan) = scan.success() {
                        info!("Email scan found {} job emails", scan.job_emails.len());
                    }
                    scan
                }
                Ok(Normalized::Parsed(other)) => Outcome::failure_with_raw(
                    "Agent response did not contain a job_emails object",
                    value_to_text(&other),
                ),
                Ok(Normalized::Malformed { message, raw }) => Outcome::failure_with_raw(message, raw),
                Err(e) => Outcome::failure(e),
            }
        }
        .instrument(span)
        .await
    }

    /// Append one row to the tracker sheet. The sheet id comes from the
    /// argument or `SHEET_ID`; without one no agent call is made.
    pub async fn update_job_tracker(
        &self,
        row: &JobTrackerRow,
        sheet_id: Option<&str>,
        sheet_tab: Option<&str>,
    ) -> Outcome<TrackerUpdate> {
        let span = info_span!("tracker_update", run_id = %Uuid::new_v4());
        async move {
            let sheet_id = match non_empty(sheet_id).or(self.config.sheet_id.as_deref()) {
                Some(id) => id,
                None => return Outcome::failure(MISSING_SHEET_ID),
            };
            let sheet_tab = non_empty(sheet_tab).unwrap_or(&self.config.sheet_tab);

            let prompt = match prompts::tracker_update(row, sheet_id, sheet_tab) {
                Ok(prompt) => prompt,
                Err(e) => return Outcome::failure(format!("{:#}", e)),
            };

            self.run_sheet_update(&prompt).await
        }
        .instrument(span)
        .await
    }

    async fn run_sheet_update(&self, prompt: &str) -> Outcome<TrackerUpdate> {
        match self.run_normalized(prompt).await {
            Ok(Normalized::Parsed(value)) if value.is_object() => {
                reshape::<TrackerUpdate>(value, "sheet update")
            }
            Ok(Normalized::Parsed(other)) => Outcome::failure_with_raw(
                "Agent response did not contain a sheet update summary",
                value_to_text(&other),
            ),
            Ok(Normalized::Malformed { message, raw }) => Outcome::failure_with_raw(message, raw),
            Err(e) => Outcome::failure(e),
        }
    }

    async fn scan_leads(&self) -> Outcome<LeadScan> {
        match self.run_normalized(&prompts::lead_scan()).await {
            Ok(Normalized::Parsed(rows @ Value::Array(_))) => {
                reshape::<Vec<JobLead>>(rows, "lead rows").map(|rows| LeadScan {
                    rows,
                    total_scanned: None,
                })
            }
            Ok(Normalized::Parsed(value)) if value.is_object() => {
                reshape::<LeadScan>(value, "lead scan")
            }
            Ok(Normalized::Parsed(other)) => Outcome::failure_with_raw(
                "Agent response did not contain lead rows",
                value_to_text(&other),
            ),
            Ok(Normalized::Malformed { message, raw }) => Outcome::failure_with_raw(message, raw),
            Err(e) => Outcome::failure(e),
        }
    }

    /// Scan the mailbox for job leads, then upsert them into the sheet.
    /// Demo mode stops after the scan.
    pub async fn gmail_to_sheets(
        &self,
        sheet_id: &str,
        sheet_tab: &str,
        demo_mode: bool,
    ) -> GmailToSheetsReport {
        let span = info_span!("gmail_to_sheets", run_id = %Uuid::new_v4(), demo_mode);
        async move {
            let sheet_id = non_empty(Some(sheet_id)).or(self.config.sheet_id.as_deref());
            let sheet_tab = non_empty(Some(sheet_tab)).unwrap_or(&self.config.sheet_tab);

            let sheet_id = match (sheet_id, demo_mode) {
                (Some(id), _) => id,
                (None, true) => "",
                (None, false) => {
                    warn!("No sheet id available; skipping the mailbox scan");
                    return GmailToSheetsReport {
                        email_scan: Outcome::failure(MISSING_SHEET_ID),
                        sheet_update: Some(Outcome::failure(MISSING_SHEET_ID)),
                        demo_mode,
                    };
                }
            };

            info!("Step 1: scanning mailbox for job leads");
            let email_scan = self.scan_leads().await;

            let sheet_update = match (&email_scan, demo_mode) {
                (_, true) => {
                    info!("Demo mode: skipping sheet update");
                    None
                }
                (Outcome::Failure(_), false) => None,
                (Outcome::Success(scan), false) if scan.rows.is_empty() => {
                    Some(Outcome::Success(TrackerUpdate {
                        success: true,
                        row_count_appended: 0,
                        message: "No job leads found; nothing to write.".to_string(),
                        ..Default::default()
                    }))
                }
                (Outcome::Success(scan), false) => {
                    info!(
                        "Step 2: writing {} rows to sheet tab '{}'",
                        scan.rows.len(),
                        sheet_tab
                    );
                    Some(match prompts::sheet_write(&scan.rows, sheet_id, sheet_tab) {
                        Ok(prompt) => self.run_sheet_update(&prompt).await,
                        Err(e) => Outcome::failure(format!("{:#}", e)),
                    })
                }
            };

            GmailToSheetsReport {
                email_scan,
                sheet_update,
                demo_mode,
            }
        }
        .instrument(span)
        .await
    }

    /// Free-form request, prefixed with the capability preamble.
    pub async fn execute_task(&self, description: &str) -> Outcome<TaskReply> {
        let span = info_span!("execute_task", run_id = %Uuid::new_v4());
        async move {
            let controller = match &self.controller {
                Some(controller) => controller,
                None => return Outcome::failure(NOT_CONFIGURED),
            };

            match controller.run(&prompts::career_task(description)).await {
                Ok(outcome) => Outcome::Success(TaskReply {
                    reply: outcome.result.into_text(),
                }),
                Err(failure) => {
                    error!("Task failed: {}", failure);
                    Outcome::failure(failure.to_string())
                }
            }
        }
        .instrument(span)
        .await
    }

    /// Cloud tools (when a cloud key is set) followed by the local helpers.
    /// Registry errors are logged and leave only the local tools.
    pub async fn get_available_tools(&self) -> Vec<ToolInfo> {
        let mut tools = match &self.registry {
            Some(registry) => match registry.list_tools().await {
                Ok(tools) => tools,
                Err(e) => {
                    error!("Error listing tools: {:#}", e);
                    Vec::new()
                }
            },
            None => Vec::new(),
        };
        tools.extend(local_tools::local_tools());
        tools
    }

    pub async fn tool_availability(&self) -> ToolAvailability {
        ToolAvailability::detect(&self.get_available_tools().await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LlmProvider;
    use crate::core::agent::test_support::ScriptedAgent;
    use crate::core::agent::Agent;
    use serde_json::json;
    use std::sync::Arc;

    fn no_env() -> ProviderConfig {
        ProviderConfig::resolve_with(|_| None)
    }

    fn orchestrator_with(
        primary: &Arc<ScriptedAgent>,
        secondary: Option<&Arc<ScriptedAgent>>,
        config: ProviderConfig,
    ) -> CareerOrchestrator {
        let controller = FallbackController::new(
            primary.clone(),
            secondary.map(|s| s.clone() as Arc<dyn Agent>),
        );
        CareerOrchestrator::new(Some(controller), config, RuntimeSettings::default())
    }

    fn single(agent: &Arc<ScriptedAgent>) -> CareerOrchestrator {
        orchestrator_with(agent, None, no_env())
    }

    fn tracker_row() -> JobTrackerRow {
        JobTrackerRow {
            date_applied: "2025-08-24".to_string(),
            company: "Acme".to_string(),
            position: "Engineer".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_extract_ats_score() {
        assert_eq!(extract_ats_score("Score: 73/100"), 73);
        assert_eq!(extract_ats_score("N/A"), 0);
        assert_eq!(extract_ats_score("85%"), 85);
        assert_eq!(extract_ats_score("250"), 100);
        assert_eq!(extract_ats_score(""), 0);
    }

    #[tokio::test]
    async fn test_fenced_interview_json_is_unwrapped() {
        let agent = Arc::new(ScriptedAgent::new(LlmProvider::OpenAi).reply_text(
            "```json\n{\"interview_prep\": [{\"category\": \"technical\", \"question\": \"Explain ownership\", \"sample_answer\": \"...\", \"key_points\": [\"moves\"], \"interviewer_focus\": \"depth\"}]}\n```",
        ));

        let outcome = single(&agent)
            .generate_interview_questions("Rust engineer", None)
            .await;

        let prep = outcome.success().unwrap();
        assert_eq!(prep.interview_prep.len(), 1);
        assert_eq!(prep.interview_prep[0].question, "Explain ownership");
        assert_eq!(prep.interview_prep[0].key_points, vec!["moves"]);
    }

    #[tokio::test]
    async fn test_bare_interview_list_is_rewrapped() {
        let agent = Arc::new(
            ScriptedAgent::new(LlmProvider::OpenAi)
                .reply_text("[{\"category\": \"behavioral\", \"question\": \"Tell me about a conflict\"}]"),
        );

        let outcome = single(&agent).generate_interview_questions("jd", None).await;
        assert_eq!(
            serde_json::to_value(&outcome).unwrap()["interview_prep"][0]["question"],
            json!("Tell me about a conflict")
        );
    }

    #[tokio::test]
    async fn test_interview_without_list_keeps_raw() {
        let agent = Arc::new(ScriptedAgent::new(LlmProvider::OpenAi).reply_text("{\"questions\": []}"));

        let outcome = single(&agent).generate_interview_questions("jd", None).await;
        let report = outcome.error().unwrap();
        assert_eq!(report.raw.as_deref(), Some("{\"questions\":[]}"));
    }

    #[tokio::test]
    async fn test_missing_sheet_id_makes_no_agent_call() {
        let agent = Arc::new(ScriptedAgent::new(LlmProvider::OpenAi).reply_text("{}"));
        let orchestrator = single(&agent);

        let outcome = orchestrator
            .update_job_tracker(&tracker_row(), None, None)
            .await;
        assert_eq!(
            serde_json::to_value(&outcome).unwrap(),
            json!({"error": "Missing SHEET_ID (env or argument)."})
        );

        let outcome = orchestrator
            .update_job_tracker(&tracker_row(), Some("  "), Some("Leads"))
            .await;
        assert!(!outcome.is_success());
        assert_eq!(agent.calls(), 0);
    }

    #[tokio::test]
    async fn test_tracker_update_uses_env_sheet_and_default_tab() {
        let agent = Arc::new(ScriptedAgent::new(LlmProvider::OpenAi).reply_text(
            "{\"success\": true, \"row_count_appended\": 1, \"message\": \"Appended\"}",
        ));
        let config = ProviderConfig::resolve_with(|key| {
            (key == "SHEET_ID").then(|| "env-sheet".to_string())
        });

        let outcome = orchestrator_with(&agent, None, config)
            .update_job_tracker(&tracker_row(), None, None)
            .await;

        let update = outcome.success().unwrap();
        assert!(update.success);
        assert_eq!(update.row_count_appended, 1);
        assert!(agent.prompts()[0].contains("spreadsheet id 'env-sheet', tab 'Applications'"));
    }

    #[tokio::test]
    async fn test_resume_score_from_string_field() {
        let agent = Arc::new(ScriptedAgent::new(LlmProvider::OpenAi).reply_text(
            "Here you go:\n{\"ats_score\": \"78/100\", \"resume_skills\": [\"Rust\"], \"tailored_summary\": \"Builder\"}",
        ));

        let outcome = single(&agent)
            .analyze_resume_and_job("resume", "jd", Some(&UserProfile::default()))
            .await;

        let analysis = outcome.success().unwrap();
        assert_eq!(analysis.ats_score, 78);
        assert_eq!(analysis.resume_skills, vec!["Rust"]);
        assert_eq!(analysis.tailored_summary, "Builder");
        assert!(analysis.raw.is_none());
    }

    #[tokio::test]
    async fn test_resume_score_from_unparseable_text() {
        let agent = Arc::new(
            ScriptedAgent::new(LlmProvider::OpenAi)
                .reply_text("Score: 73/100")
                .reply_text("N/A"),
        );
        let orchestrator = single(&agent);

        let first = orchestrator.analyze_resume_and_job("r", "j", None).await;
        let first = first.success().unwrap();
        assert_eq!(first.ats_score, 73);
        assert_eq!(first.raw.as_deref(), Some("Score: 73/100"));

        let second = orchestrator.analyze_resume_and_job("r", "j", None).await;
        assert_eq!(second.success().unwrap().ats_score, 0);
    }

    #[tokio::test]
    async fn test_capability_falls_back_on_quota() {
        let primary = Arc::new(
            ScriptedAgent::new(LlmProvider::OpenAi).fail("Error code: 429 - insufficient_quota"),
        );
        let secondary = Arc::new(
            ScriptedAgent::new(LlmProvider::Google)
                .reply_text("{\"job_emails\": [{\"company\": \"Acme\", \"links\": \"https://a.io\"}]}"),
        );

        let outcome = orchestrator_with(&primary, Some(&secondary), no_env())
            .fetch_job_emails()
            .await;

        let scan = outcome.success().unwrap();
        assert_eq!(scan.job_emails[0].company, "Acme");
        assert_eq!(scan.job_emails[0].links, vec!["https://a.io"]);
        assert_eq!(primary.prompts(), secondary.prompts());
    }

    #[tokio::test]
    async fn test_agent_error_becomes_error_object() {
        let agent = Arc::new(ScriptedAgent::new(LlmProvider::OpenAi).fail("invalid api key"));

        let outcome = single(&agent).fetch_job_emails().await;
        assert_eq!(
            serde_json::to_value(&outcome).unwrap(),
            json!({"error": "invalid api key"})
        );
    }

    #[tokio::test]
    async fn test_unconfigured_orchestrator_fails_cleanly() {
        let orchestrator = CareerOrchestrator::new(None, no_env(), RuntimeSettings::default());
        assert!(!orchestrator.is_configured());

        let outcome = orchestrator.analyze_resume_and_job("r", "j", None).await;
        assert_eq!(outcome.error().unwrap().error, NOT_CONFIGURED);
        let outcome = orchestrator.execute_task("hello").await;
        assert_eq!(outcome.error().unwrap().error, NOT_CONFIGURED);
    }

    #[tokio::test]
    async fn test_gmail_to_sheets_demo_skips_write() {
        let agent = Arc::new(ScriptedAgent::new(LlmProvider::OpenAi).reply_text(
            "{\"rows\": [{\"date\": \"2025-08-20\", \"company\": \"Acme\", \"role\": \"SRE\", \"source\": \"LinkedIn\", \"url\": \"https://a.io\"}], \"total_scanned\": 12}",
        ));

        let report = single(&agent).gmail_to_sheets("sheet-1", "Applications", true).await;

        assert!(report.demo_mode);
        assert!(report.sheet_update.is_none());
        let scan = report.email_scan.success().unwrap();
        assert_eq!(scan.total_scanned, Some(12));
        assert_eq!(scan.rows[0].role, "SRE");
        assert_eq!(agent.calls(), 1);
    }

    #[tokio::test]
    async fn test_gmail_to_sheets_writes_scanned_rows() {
        let agent = Arc::new(
            ScriptedAgent::new(LlmProvider::OpenAi)
                .reply_text("[{\"date\": \"2025-08-20\", \"company\": \"Acme\", \"role\": \"SRE\"}]")
                .reply_text("{\"success\": true, \"row_count_appended\": 1, \"message\": \"ok\"}"),
        );

        let report = single(&agent).gmail_to_sheets("sheet-1", "Leads", false).await;

        let update = report.sheet_update.unwrap();
        assert_eq!(update.success().unwrap().row_count_appended, 1);
        let prompts = agent.prompts();
        assert_eq!(prompts.len(), 2);
        assert!(prompts[1].contains("spreadsheet id 'sheet-1', tab 'Leads'"));
        assert!(prompts[1].contains("\"company\":\"Acme\""));
    }

    #[tokio::test]
    async fn test_gmail_to_sheets_reports_scan_failure_alone() {
        let agent = Arc::new(ScriptedAgent::new(LlmProvider::OpenAi).reply_text("no mail access"));

        let report = single(&agent).gmail_to_sheets("sheet-1", "Leads", false).await;

        assert!(!report.email_scan.is_success());
        assert!(report.sheet_update.is_none());
        assert_eq!(agent.calls(), 1);
    }

    #[tokio::test]
    async fn test_null_email_fields_keep_the_scan() {
        let agent = Arc::new(ScriptedAgent::new(LlmProvider::OpenAi).reply_text(
            "{\"job_emails\": [{\"sender\": \"hr@acme.io\", \"company\": null, \"position\": null, \"priority\": \"high\"}, {\"company\": \"Globex\", \"position\": \"SRE\"}]}",
        ));

        let outcome = single(&agent).fetch_job_emails().await;

        let scan = outcome.success().unwrap();
        assert_eq!(scan.job_emails.len(), 2);
        assert_eq!(scan.job_emails[0].company, "");
        assert_eq!(scan.job_emails[0].sender, "hr@acme.io");
        assert_eq!(scan.job_emails[1].company, "Globex");
    }

    #[tokio::test]
    async fn test_null_interviewer_focus_keeps_questions() {
        let agent = Arc::new(ScriptedAgent::new(LlmProvider::OpenAi).reply_text(
            "{\"interview_prep\": [{\"category\": \"technical\", \"question\": \"Explain lifetimes\", \"interviewer_focus\": null}]}",
        ));

        let outcome = single(&agent).generate_interview_questions("jd", None).await;

        let prep = outcome.success().unwrap();
        assert_eq!(prep.interview_prep[0].question, "Explain lifetimes");
        assert_eq!(prep.interview_prep[0].interviewer_focus, "");
    }

    #[tokio::test]
    async fn test_gmail_to_sheets_without_sheet_id_makes_no_agent_call() {
        let agent = Arc::new(ScriptedAgent::new(LlmProvider::OpenAi).reply_text("[]"));

        let report = single(&agent).gmail_to_sheets("", "Applications", false).await;

        assert_eq!(report.email_scan.error().unwrap().error, MISSING_SHEET_ID);
        assert_eq!(
            serde_json::to_value(report.sheet_update.unwrap()).unwrap(),
            json!({"error": "Missing SHEET_ID (env or argument)."})
        );
        assert_eq!(agent.calls(), 0);
    }

    #[tokio::test]
    async fn test_gmail_to_sheets_uses_env_sheet_id() {
        let agent = Arc::new(
            ScriptedAgent::new(LlmProvider::OpenAi)
                .reply_text("[{\"date\": \"2025-08-20\", \"company\": \"Acme\", \"role\": \"SRE\"}]")
                .reply_text("{\"success\": true, \"row_count_appended\": 1, \"message\": \"ok\"}"),
        );
        let config = ProviderConfig::resolve_with(|key| {
            (key == "SHEET_ID").then(|| "env-sheet".to_string())
        });

        let report = orchestrator_with(&agent, None, config)
            .gmail_to_sheets(" ", "", false)
            .await;

        assert!(report.sheet_update.unwrap().is_success());
        assert!(agent.prompts()[1].contains("spreadsheet id 'env-sheet', tab 'Applications'"));
    }

    #[tokio::test]
    async fn test_execute_task_prefixes_preamble() {
        let agent = Arc::new(ScriptedAgent::new(LlmProvider::Google).reply_text("Found 3 roles"));

        let outcome = single(&agent).execute_task("find backend roles").await;

        assert_eq!(outcome.success().unwrap().reply, "Found 3 roles");
        assert!(agent.prompts()[0].starts_with(prompts::CAREER_TASK));
    }

    #[tokio::test]
    async fn test_tools_without_cloud_key_are_local_only() {
        let orchestrator = CareerOrchestrator::new(None, no_env(), RuntimeSettings::default());
        let tools = orchestrator.get_available_tools().await;
        assert!(tools.iter().all(|t| t.id.starts_with("local:")));
        assert_eq!(
            orchestrator.tool_availability().await,
            ToolAvailability {
                gmail: false,
                sheets: false
            }
        );
    }
}
