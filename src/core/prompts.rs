// src/core/prompts.rs
//! Instruction text for each capability.
//!
//! Structured inputs are embedded as JSON, never as debug output, and every
//! prompt closes with the exact response shape the normalizer expects.

use anyhow::{Context, Result};
use serde::Serialize;

use crate::types::{JobLead, JobTrackerRow, UserProfile};

pub const CAREER_TASK: &str = "You are the Career Copilot Orchestrator. Capabilities:
1) Gmail: parse job/recruiter mails into JSON rows [date, company, role, source, url, deadline?].
2) Append or update rows in the Google Sheet tab 'Applications'.
3) Tailor a resume to a JD: extract resume skills, parse JD keywords, compute an ATS score, propose 5-10 edits and a targeted summary.
4) Interview prep: generate 8-12 Q&A grounded in the user's bio/skills and the JD.
Pause and ask for clarification when anything is missing (OAuth, sheet not found, user profile).";

fn to_json<T: Serialize + ?Sized>(value: &T, what: &str) -> Result<String> {
    serde_json::to_string(value).with_context(|| format!("Failed to serialize {}", what))
}

fn profile_json(profile: Option<&UserProfile>) -> Result<String> {
    match profile {
        Some(profile) => to_json(profile, "user profile"),
        None => Ok("{}".to_string()),
    }
}

pub fn resume_analysis(
    resume_text: &str,
    job_description: &str,
    profile: Option<&UserProfile>,
) -> Result<String> {
    let profile = profile_json(profile)?;
    Ok(format!(
        "You are an expert ATS optimizer.
USER PROFILE: {profile}

RESUME TEXT:
{resume_text}

JOB DESCRIPTION:
{job_description}

Perform:
- Extract resume skills
- Extract JD keywords
- ATS score 0-100
- 8-10 improvements
- Tailored 3-4 line summary
- Skill gaps and recommendations

Return valid JSON only, a single object with keys: ats_score (integer 0-100), resume_skills (array of strings), job_keywords (array of strings), improvements (array of strings), tailored_summary (string), skill_gaps (array of strings), recommendations (array of strings)."
    ))
}

pub fn interview_prep(job_description: &str, profile: Option<&UserProfile>) -> Result<String> {
    let profile = profile_json(profile)?;
    Ok(format!(
        "Create 10-12 interview Q&A tailored to the following role and profile.
USER PROFILE: {profile}

JOB DESCRIPTION:
{job_description}

Include 3-4 behavioral questions (STAR method answers), 3-4 technical questions specific to the role, 2-3 system design or problem-solving questions and 2 situational questions.

Return JSON only, a single object of this shape:
{{\"interview_prep\": [{{\"category\": \"behavioral|technical|system design|situational\", \"question\": \"...\", \"sample_answer\": \"...\", \"key_points\": [\"...\"], \"interviewer_focus\": \"...\"}}]}}"
    ))
}

pub fn email_scan() -> String {
    "Use the Gmail tool to search for recent emails related to job opportunities, recruiters and career-related messages.

Search criteria:
- Emails from the last 30 days
- Keywords: job, opportunity, interview, hiring, recruiter, position, career, application
- Senders from domains commonly used by recruiters (linkedin.com, indeed.com, etc.)

For each relevant email extract the sender, subject, date received, company, job title, links to job postings and any application deadline.

Return JSON only, a single object of this shape:
{\"job_emails\": [{\"sender\": \"<name and email>\", \"subject\": \"...\", \"date\": \"...\", \"company\": \"...\", \"position\": \"...\", \"links\": [\"...\"], \"deadline\": \"...\", \"priority\": \"high|medium|low\"}], \"summary\": {\"total_emails\": 0, \"high_priority\": 0, \"companies\": [\"...\"]}}"
        .to_string()
}

pub fn tracker_update(row: &JobTrackerRow, sheet_id: &str, sheet_tab: &str) -> Result<String> {
    let payload = to_json(row, "tracker row")?;
    Ok(format!(
        "Using the Google Sheets tool, append this job application row to spreadsheet id '{sheet_id}', tab '{sheet_tab}'.
Ensure headers exist (Date Applied, Company, Position, Status, Source, Contact Person, Next Action, Application Link, Notes); create them if needed. Avoid duplicates based on (date_applied, company, position).
Row JSON: {payload}
Return a summary JSON object with keys: success (bool), row_count_appended (int), message (str)."
    ))
}

/// Step one of the mailbox-to-sheet flow: extract lead rows only.
pub fn lead_scan() -> String {
    "Use the Gmail tool to scan job or recruiter emails from the last 30 days. If OAuth is needed, initiate it.
For each relevant email extract one row: date, company, role, source, url and deadline (optional).
Do not write anything anywhere.
Return JSON only, a single object of this shape:
{\"rows\": [{\"date\": \"YYYY-MM-DD\", \"company\": \"...\", \"role\": \"...\", \"source\": \"...\", \"url\": \"...\", \"deadline\": null}], \"total_scanned\": 0}"
        .to_string()
}

/// Step two of the mailbox-to-sheet flow: upsert the extracted rows.
pub fn sheet_write(leads: &[JobLead], sheet_id: &str, sheet_tab: &str) -> Result<String> {
    let rows = to_json(leads, "lead rows")?;
    Ok(format!(
        "Using the Google Sheets tool, append or upsert these rows into spreadsheet id '{sheet_id}', tab '{sheet_tab}'.
Ensure headers exist: Date, Company, Role, Source, URL, Deadline.
Be idempotent: skip rows whose date+company+role already exist.
Rows JSON: {rows}
Return a summary JSON object with keys: success (bool), row_count_appended (int), message (str)."
    ))
}

pub fn career_task(description: &str) -> String {
    format!("{}\n\nUser request: {}", CAREER_TASK, description.trim())
}
