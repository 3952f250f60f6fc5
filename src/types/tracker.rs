// src/types/tracker.rs
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::results::{JobEmail, JobLead};

pub const LEAD_CSV_HEADERS: [&str; 6] = ["Date", "Company", "Role", "Source", "URL", "Deadline"];

/// A job application row for the tracker spreadsheet.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobTrackerRow {
    pub date_applied: String,
    pub company: String,
    pub position: String,
    pub status: String,
    pub source: String,
    pub contact_person: String,
    pub next_action: String,
    pub application_link: String,
    pub notes: String,
}

impl JobTrackerRow {
    pub fn today() -> String {
        chrono::Local::now().format("%Y-%m-%d").to_string()
    }

    /// Fill the application date with today when the form left it blank.
    pub fn with_default_date(mut self) -> Self {
        if self.date_applied.trim().is_empty() {
            self.date_applied = Self::today();
        }
        self
    }

    /// Build a tracker row from a scanned recruiter email.
    pub fn from_email(email: &JobEmail, date_applied: &str) -> Self {
        let or_unknown = |s: &str| {
            if s.trim().is_empty() {
                "Unknown".to_string()
            } else {
                s.to_string()
            }
        };

        Self {
            date_applied: date_applied.to_string(),
            company: or_unknown(&email.company),
            position: or_unknown(&email.position),
            status: "Email Received".to_string(),
            source: "Gmail Scanner".to_string(),
            contact_person: email.sender.clone(),
            next_action: "Review and Apply".to_string(),
            application_link: email.links.join(", "),
            notes: format!("Email subject: {}", email.subject),
        }
    }

    /// Company and position are the minimum for a useful row.
    pub fn validate(&self) -> Result<()> {
        if self.company.trim().is_empty() || self.position.trim().is_empty() {
            anyhow::bail!("Please provide at least company name and position.");
        }
        Ok(())
    }
}

pub fn write_leads_csv<W: std::io::Write>(writer: W, leads: &[JobLead]) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer
        .write_record(LEAD_CSV_HEADERS)
        .context("Failed to write CSV header")?;

    for lead in leads {
        csv_writer
            .write_record([
                lead.date.as_str(),
                lead.company.as_str(),
                lead.role.as_str(),
                lead.source.as_str(),
                lead.url.as_str(),
                lead.deadline.as_deref().unwrap_or(""),
            ])
            .context("Failed to write CSV row")?;
    }

    csv_writer.flush().context("Failed to flush CSV output")?;
    Ok(())
}

pub fn export_leads_csv(path: &Path, leads: &[JobLead]) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    write_leads_csv(file, leads)
}
