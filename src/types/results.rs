// src/types/results.rs
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// What every capability hands back: a well-shaped success or an error report.
///
/// Serialized untagged, so a failure renders as `{"error": "...", "raw": "..."}`
/// and a success renders as the payload itself.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Outcome<T> {
    Success(T),
    Failure(ErrorReport),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorReport {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
}

impl<T> Outcome<T> {
    pub fn failure(error: impl Into<String>) -> Self {
        Outcome::Failure(ErrorReport {
            error: error.into(),
            raw: None,
        })
    }

    pub fn failure_with_raw(error: impl Into<String>, raw: impl Into<String>) -> Self {
        Outcome::Failure(ErrorReport {
            error: error.into(),
            raw: Some(raw.into()),
        })
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }

    pub fn success(&self) -> Option<&T> {
        match self {
            Outcome::Success(value) => Some(value),
            Outcome::Failure(_) => None,
        }
    }

    pub fn error(&self) -> Option<&ErrorReport> {
        match self {
            Outcome::Success(_) => None,
            Outcome::Failure(report) => Some(report),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Outcome::Success(value) => Outcome::Success(f(value)),
            Outcome::Failure(report) => Outcome::Failure(report),
        }
    }

    pub fn into_result(self) -> Result<T, ErrorReport> {
        match self {
            Outcome::Success(value) => Ok(value),
            Outcome::Failure(report) => Err(report),
        }
    }
}

/// Accepts either a JSON list of strings or a single string.
fn string_or_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(string_list(&Value::deserialize(deserializer)?))
}

/// Treats an explicit JSON `null` the same as a missing key.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Flatten an agent-provided value into a list of strings.
pub fn string_list(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items
            .iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s.clone()),
                Value::Null => None,
                other => Some(other.to_string()),
            })
            .collect(),
        Value::String(s) if !s.trim().is_empty() => vec![s.clone()],
        _ => Vec::new(),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResumeAnalysis {
    pub ats_score: u32,
    pub resume_skills: Vec<String>,
    pub job_keywords: Vec<String>,
    pub improvements: Vec<String>,
    pub tailored_summary: String,
    pub skill_gaps: Vec<String>,
    pub recommendations: Vec<String>,
    /// Agent text kept verbatim when it could not be parsed as JSON.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
}

impl ResumeAnalysis {
    pub fn ats_feedback(&self) -> &'static str {
        match self.ats_score {
            80.. => "Excellent match! Your resume is well-optimized for this role.",
            60..=79 => "Good match with room for improvement. Follow the suggestions below.",
            40..=59 => "Moderate match. Significant improvements needed.",
            _ => "Poor match. Major revisions required to pass ATS screening.",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuestionItem {
    #[serde(deserialize_with = "null_as_default")]
    pub category: String,
    #[serde(deserialize_with = "null_as_default")]
    pub question: String,
    #[serde(deserialize_with = "null_as_default")]
    pub sample_answer: String,
    #[serde(deserialize_with = "string_or_list")]
    pub key_points: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub interviewer_focus: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InterviewPrep {
    pub interview_prep: Vec<QuestionItem>,
}

impl InterviewPrep {
    /// Questions grouped by category, categories in first-seen order.
    pub fn by_category(&self) -> Vec<(String, Vec<&QuestionItem>)> {
        let mut groups: Vec<(String, Vec<&QuestionItem>)> = Vec::new();
        for item in &self.interview_prep {
            let category = if item.category.trim().is_empty() {
                "general".to_string()
            } else {
                item.category.trim().to_lowercase()
            };
            match groups.iter_mut().find(|(name, _)| *name == category) {
                Some((_, items)) => items.push(item),
                None => groups.push((category, vec![item])),
            }
        }
        groups
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobEmail {
    #[serde(deserialize_with = "null_as_default")]
    pub sender: String,
    #[serde(deserialize_with = "null_as_default")]
    pub subject: String,
    #[serde(deserialize_with = "null_as_default")]
    pub date: String,
    #[serde(deserialize_with = "null_as_default")]
    pub company: String,
    #[serde(deserialize_with = "null_as_default")]
    pub position: String,
    #[serde(deserialize_with = "string_or_list")]
    pub links: Vec<String>,
    pub deadline: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub priority: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanSummary {
    pub total_emails: u32,
    pub high_priority: u32,
    #[serde(deserialize_with = "string_or_list")]
    pub companies: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobEmailScan {
    pub job_emails: Vec<JobEmail>,
    pub summary: Option<ScanSummary>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerUpdate {
    #[serde(deserialize_with = "null_as_default")]
    pub success: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub row_count_appended: u32,
    #[serde(deserialize_with = "null_as_default")]
    pub message: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One job lead extracted from the mailbox for the spreadsheet.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobLead {
    #[serde(deserialize_with = "null_as_default")]
    pub date: String,
    #[serde(deserialize_with = "null_as_default")]
    pub company: String,
    #[serde(deserialize_with = "null_as_default")]
    pub role: String,
    #[serde(deserialize_with = "null_as_default")]
    pub source: String,
    #[serde(deserialize_with = "null_as_default")]
    pub url: String,
    pub deadline: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LeadScan {
    pub rows: Vec<JobLead>,
    pub total_scanned: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GmailToSheetsReport {
    pub email_scan: Outcome<LeadScan>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sheet_update: Option<Outcome<TrackerUpdate>>,
    pub demo_mode: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskReply {
    pub reply: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_failure_serializes_as_error_object() {
        let outcome: Outcome<TaskReply> = Outcome::failure("boom");
        assert_eq!(serde_json::to_value(&outcome).unwrap(), json!({"error": "boom"}));

        let outcome: Outcome<TaskReply> = Outcome::failure_with_raw("bad json", "{oops");
        assert_eq!(
            serde_json::to_value(&outcome).unwrap(),
            json!({"error": "bad json", "raw": "{oops"})
        );
    }

    #[test]
    fn test_success_serializes_as_payload() {
        let outcome = Outcome::Success(TaskReply {
            reply: "done".to_string(),
        });
        assert_eq!(serde_json::to_value(&outcome).unwrap(), json!({"reply": "done"}));
        assert!(outcome.is_success());
    }

    #[test]
    fn test_question_item_accepts_string_key_points() {
        let item: QuestionItem = serde_json::from_value(json!({
            "category": "technical",
            "question": "Q",
            "key_points": "only one"
        }))
        .unwrap();
        assert_eq!(item.key_points, vec!["only one"]);
        assert_eq!(item.sample_answer, "");
    }

    #[test]
    fn test_by_category_groups_in_order() {
        let prep = InterviewPrep {
            interview_prep: vec![
                QuestionItem {
                    category: "Technical".to_string(),
                    question: "Q1".to_string(),
                    ..Default::default()
                },
                QuestionItem {
                    category: "behavioral".to_string(),
                    question: "Q2".to_string(),
                    ..Default::default()
                },
                QuestionItem {
                    category: "technical".to_string(),
                    question: "Q3".to_string(),
                    ..Default::default()
                },
                QuestionItem::default(),
            ],
        };
        let groups = prep.by_category();
        let names: Vec<&str> = groups.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["technical", "behavioral", "general"]);
        assert_eq!(groups[0].1.len(), 2);
    }

    #[test]
    fn test_ats_feedback_bands() {
        let mut analysis = ResumeAnalysis {
            ats_score: 85,
            ..Default::default()
        };
        assert!(analysis.ats_feedback().starts_with("Excellent"));
        analysis.ats_score = 60;
        assert!(analysis.ats_feedback().starts_with("Good"));
        analysis.ats_score = 40;
        assert!(analysis.ats_feedback().starts_with("Moderate"));
        analysis.ats_score = 0;
        assert!(analysis.ats_feedback().starts_with("Poor"));
    }

    #[test]
    fn test_tracker_update_keeps_extra_fields() {
        let update: TrackerUpdate = serde_json::from_value(json!({
            "success": true,
            "row_count_appended": 1,
            "message": "ok",
            "spreadsheet_url": "https://example.com"
        }))
        .unwrap();
        assert!(update.success);
        assert_eq!(update.extra.get("spreadsheet_url"), Some(&json!("https://example.com")));
    }

    #[test]
    fn test_null_fields_read_as_defaults() {
        let lead: JobLead = serde_json::from_value(json!({
            "date": "2025-08-20",
            "company": null,
            "role": "SRE",
            "url": null,
            "deadline": null
        }))
        .unwrap();
        assert_eq!(lead.company, "");
        assert_eq!(lead.url, "");
        assert_eq!(lead.role, "SRE");

        let update: TrackerUpdate = serde_json::from_value(json!({
            "success": null,
            "row_count_appended": null,
            "message": null
        }))
        .unwrap();
        assert!(!update.success);
        assert_eq!(update.row_count_appended, 0);
        assert_eq!(update.message, "");
        assert!(update.extra.is_empty());
    }
}
