// src/core/local_tools.rs
//! Small built-in helpers exposed next to the cloud tools.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::tool_registry::ToolInfo;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordScore {
    pub ats_score: u32,
    pub matched_keywords: Vec<String>,
    pub missing_keywords: Vec<String>,
}

/// Naive keyword overlap: JD words longer than three characters found in the resume.
pub fn ats_keyword_score(resume_text: &str, job_description: &str) -> KeywordScore {
    let resume = resume_text.to_lowercase();
    let jd = job_description.to_lowercase();

    if resume.trim().is_empty() || jd.trim().is_empty() {
        return KeywordScore {
            ats_score: 0,
            matched_keywords: Vec::new(),
            missing_keywords: Vec::new(),
        };
    }

    let words: BTreeSet<&str> = jd
        .split_whitespace()
        .filter(|w| w.chars().count() > 3)
        .collect();
    let (matched, missing): (Vec<&str>, Vec<&str>) =
        words.iter().partition(|w| resume.contains(*w));

    let ats_score = (100 * matched.len() / words.len().max(1)) as u32;

    KeywordScore {
        ats_score,
        matched_keywords: matched.into_iter().map(str::to_string).collect(),
        missing_keywords: missing.into_iter().map(str::to_string).collect(),
    }
}

/// Collapse all whitespace runs to single spaces.
pub fn normalize_jd(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResumeText {
    pub text: String,
    pub chars: usize,
}

/// Plain-text resumes pass through unchanged.
pub fn extract_resume_text(text: &str) -> ResumeText {
    ResumeText {
        text: text.to_string(),
        chars: text.chars().count(),
    }
}

pub fn local_tools() -> Vec<ToolInfo> {
    vec![
        ToolInfo::new(
            "local:ats_keyword_score",
            "ats_keyword_score",
            "Naive ATS match score from job description keywords found in the resume",
        ),
        ToolInfo::new(
            "local:normalize_jd",
            "normalize_jd",
            "Collapse whitespace in a raw job description",
        ),
        ToolInfo::new(
            "local:extract_resume_text",
            "extract_resume_text",
            "Return resume text with its character count",
        ),
    ]
}
