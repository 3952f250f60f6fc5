// src/types/mod.rs
//! Request-scoped value types shared by the orchestrator, the CLI and the API.

pub mod profile;
pub mod results;
pub mod tracker;

pub use profile::UserProfile;
pub use results::{
    ErrorReport, GmailToSheetsReport, InterviewPrep, JobEmail, JobEmailScan, JobLead, LeadScan,
    Outcome, QuestionItem, ResumeAnalysis, ScanSummary, TaskReply, TrackerUpdate,
};
pub use tracker::JobTrackerRow;
