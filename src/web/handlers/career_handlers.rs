// src/web/handlers/career_handlers.rs
use crate::core::local_tools::{
    ats_keyword_score, extract_resume_text, normalize_jd, KeywordScore, ResumeText,
};
use crate::core::CareerOrchestrator;
use crate::types::{
    InterviewPrep, JobEmailScan, JobTrackerRow, Outcome, ResumeAnalysis, TaskReply, TrackerUpdate,
};
use crate::web::handlers::profile_handlers::profile_from_cookies;
use crate::web::types::*;

use rocket::http::CookieJar;
use rocket::serde::json::Json;
use tracing::{info, warn};

type HandlerResult<T> = Result<Json<DataResponse<T>>, Json<StandardErrorResponse>>;

fn missing_input(message: &str, conversation_id: Option<String>) -> Json<StandardErrorResponse> {
    Json(StandardErrorResponse::new(
        message.to_string(),
        "MISSING_INPUT".to_string(),
        vec!["Fill in the required fields and try again".to_string()],
        conversation_id,
    ))
}

fn into_data<T>(
    outcome: Outcome<T>,
    conversation_id: &Option<String>,
) -> Result<T, Json<StandardErrorResponse>> {
    outcome.into_result().map_err(|report| {
        warn!("Capability failed: {}", report.error);
        Json(StandardErrorResponse::from_report(
            report,
            conversation_id.clone(),
        ))
    })
}

fn resume_display(analysis: &ResumeAnalysis, resume: &ResumeText) -> DisplayFormat {
    let mut sections = vec![
        DisplaySection {
            title: "ATS Score".to_string(),
            content: analysis.ats_feedback().to_string(),
            score: Some(format!("{}/100", analysis.ats_score)),
            points: None,
        },
        DisplaySection::text("Resume", format!("{} characters analyzed", resume.chars)),
    ];

    if !analysis.tailored_summary.is_empty() {
        sections.push(DisplaySection::text(
            "Tailored Summary",
            analysis.tailored_summary.clone(),
        ));
    }

    for (title, items) in [
        ("Resume Skills", &analysis.resume_skills),
        ("Job Keywords", &analysis.job_keywords),
        ("Improvements", &analysis.improvements),
        ("Skill Gaps", &analysis.skill_gaps),
        ("Recommendations", &analysis.recommendations),
    ] {
        if !items.is_empty() {
            sections.push(DisplaySection::list(title, items.clone()));
        }
    }

    if let Some(raw) = &analysis.raw {
        sections.push(DisplaySection::text("Raw Agent Output", raw.clone()));
    }

    DisplayFormat {
        format_type: "resume_analysis".to_string(),
        sections: Some(sections),
    }
}

fn interview_display(prep: &InterviewPrep) -> DisplayFormat {
    let sections = prep
        .by_category()
        .into_iter()
        .map(|(category, items)| DisplaySection {
            title: category,
            content: format!("{} question(s)", items.len()),
            score: None,
            points: Some(items.iter().map(|item| item.question.clone()).collect()),
        })
        .collect();

    DisplayFormat {
        format_type: "interview_prep".to_string(),
        sections: Some(sections),
    }
}

fn email_display(scan: &JobEmailScan) -> DisplayFormat {
    let mut sections: Vec<DisplaySection> = scan
        .job_emails
        .iter()
        .map(|email| DisplaySection {
            title: format!("{} - {}", email.company, email.position),
            content: email.subject.clone(),
            score: (!email.priority.is_empty()).then(|| email.priority.clone()),
            points: (!email.links.is_empty()).then(|| email.links.clone()),
        })
        .collect();

    if let Some(summary) = &scan.summary {
        sections.insert(
            0,
            DisplaySection {
                title: "Summary".to_string(),
                content: format!(
                    "{} emails, {} high priority",
                    summary.total_emails, summary.high_priority
                ),
                score: None,
                points: Some(summary.companies.clone()),
            },
        );
    }

    DisplayFormat {
        format_type: "email_scan".to_string(),
        sections: Some(sections),
    }
}

pub async fn analyze_resume_handler(
    request: Json<StandardRequest<ResumeAnalyzeRequest>>,
    orchestrator: &CareerOrchestrator,
    jar: &CookieJar<'_>,
) -> HandlerResult<ResumeAnalysis> {
    let conversation_id = request.conversation_id();
    let data = request.into_inner().data;

    if data.resume_text.trim().is_empty() || data.job_description.trim().is_empty() {
        return Err(missing_input(
            "Please provide both resume text and job description.",
            conversation_id,
        ));
    }

    let resume = extract_resume_text(&data.resume_text);
    let profile = data.profile.or_else(|| profile_from_cookies(jar));
    let outcome = orchestrator
        .analyze_resume_and_job(&resume.text, &data.job_description, profile.as_ref())
        .await;
    let analysis = into_data(outcome, &conversation_id)?;

    info!(
        "Resume ({} chars) analyzed with ATS score {}",
        resume.chars, analysis.ats_score
    );
    let display = resume_display(&analysis, &resume);
    Ok(Json(
        DataResponse::success(
            format!("ATS compatibility score: {}/100", analysis.ats_score),
            analysis,
            conversation_id,
        )
        .with_display_format(display),
    ))
}

pub async fn keyword_match_handler(
    request: Json<StandardRequest<KeywordMatchRequest>>,
) -> HandlerResult<KeywordScore> {
    let conversation_id = request.conversation_id();
    let data = request.into_inner().data;

    if data.resume_text.trim().is_empty() || data.job_description.trim().is_empty() {
        return Err(missing_input(
            "Please provide both resume text and job description.",
            conversation_id,
        ));
    }

    let score = ats_keyword_score(&data.resume_text, &normalize_jd(&data.job_description));
    let display = DisplayFormat {
        format_type: "keyword_match".to_string(),
        sections: Some(vec![
            DisplaySection {
                title: "Keyword Match".to_string(),
                content: format!("{} keywords matched", score.matched_keywords.len()),
                score: Some(format!("{}/100", score.ats_score)),
                points: None,
            },
            DisplaySection::list("Missing Keywords", score.missing_keywords.clone()),
        ]),
    };

    Ok(Json(
        DataResponse::success(
            format!("Keyword match score: {}/100", score.ats_score),
            score,
            conversation_id,
        )
        .with_display_format(display),
    ))
}

pub async fn interview_prep_handler(
    request: Json<StandardRequest<InterviewPrepRequest>>,
    orchestrator: &CareerOrchestrator,
    jar: &CookieJar<'_>,
) -> HandlerResult<InterviewPrep> {
    let conversation_id = request.conversation_id();
    let data = request.into_inner().data;

    if data.job_description.trim().is_empty() {
        return Err(missing_input(
            "Please provide a job description.",
            conversation_id,
        ));
    }

    let profile = data.profile.or_else(|| profile_from_cookies(jar));
    let outcome = orchestrator
        .generate_interview_questions(&data.job_description, profile.as_ref())
        .await;
    let prep = into_data(outcome, &conversation_id)?;

    let display = interview_display(&prep);
    Ok(Json(
        DataResponse::success(
            format!("Generated {} interview questions", prep.interview_prep.len()),
            prep,
            conversation_id,
        )
        .with_display_format(display),
    ))
}

pub async fn email_scan_handler(orchestrator: &CareerOrchestrator) -> HandlerResult<JobEmailScan> {
    let scan = into_data(orchestrator.fetch_job_emails().await, &None)?;

    let message = if scan.job_emails.is_empty() {
        "No job-related emails found in recent messages.".to_string()
    } else {
        format!("Found {} job-related emails", scan.job_emails.len())
    };
    let display = email_display(&scan);
    Ok(Json(
        DataResponse::success(message, scan, None).with_display_format(display),
    ))
}

fn tracker_disabled(conversation_id: Option<String>) -> Json<StandardErrorResponse> {
    Json(StandardErrorResponse::new(
        "The job tracker is disabled".to_string(),
        "TRACKER_DISABLED".to_string(),
        vec!["Set tracker_enabled: true in the settings file".to_string()],
        conversation_id,
    ))
}

async fn append_tracker_row(
    orchestrator: &CareerOrchestrator,
    row: JobTrackerRow,
    sheet_id: Option<&str>,
    sheet_tab: Option<&str>,
    conversation_id: Option<String>,
) -> HandlerResult<TrackerUpdate> {
    if let Err(e) = row.validate() {
        return Err(Json(StandardErrorResponse::new(
            e.to_string(),
            "VALIDATION_ERROR".to_string(),
            vec!["Company and position are required".to_string()],
            conversation_id,
        )));
    }

    let row = row.with_default_date();
    info!("Adding {} at {} to the tracker", row.position, row.company);

    let outcome = orchestrator
        .update_job_tracker(&row, sheet_id, sheet_tab)
        .await;
    let update = into_data(outcome, &conversation_id)?;

    if !update.success {
        warn!("Agent reported a failed sheet write: {}", update.message);
        let error = if update.message.is_empty() {
            "The agent could not write the row to the sheet".to_string()
        } else {
            update.message.clone()
        };
        return Err(Json(StandardErrorResponse::new(
            error,
            "SHEET_WRITE_FAILED".to_string(),
            vec![
                "Check that the Google Sheets tool is authorized".to_string(),
                "Verify the sheet id and tab name".to_string(),
            ],
            conversation_id,
        )));
    }

    let message = if update.message.is_empty() {
        "Job application added to tracker!".to_string()
    } else {
        update.message.clone()
    };
    Ok(Json(DataResponse::success(message, update, conversation_id)))
}

pub async fn tracker_row_handler(
    request: Json<StandardRequest<TrackerRowRequest>>,
    orchestrator: &CareerOrchestrator,
) -> HandlerResult<TrackerUpdate> {
    let conversation_id = request.conversation_id();
    if !orchestrator.settings().tracker_enabled {
        return Err(tracker_disabled(conversation_id));
    }

    let data = request.into_inner().data;
    append_tracker_row(
        orchestrator,
        data.row,
        data.sheet_id.as_deref(),
        data.sheet_tab.as_deref(),
        conversation_id,
    )
    .await
}

pub async fn tracker_from_email_handler(
    request: Json<StandardRequest<TrackerFromEmailRequest>>,
    orchestrator: &CareerOrchestrator,
) -> HandlerResult<TrackerUpdate> {
    let conversation_id = request.conversation_id();
    if !orchestrator.settings().tracker_enabled {
        return Err(tracker_disabled(conversation_id));
    }

    let data = request.into_inner().data;
    let row = JobTrackerRow::from_email(&data.email, &JobTrackerRow::today());
    append_tracker_row(
        orchestrator,
        row,
        data.sheet_id.as_deref(),
        data.sheet_tab.as_deref(),
        conversation_id,
    )
    .await
}

pub async fn task_handler(
    request: Json<StandardRequest<TaskRequest>>,
    orchestrator: &CareerOrchestrator,
) -> HandlerResult<TaskReply> {
    let conversation_id = request.conversation_id();
    let data = request.into_inner().data;

    if data.task.trim().is_empty() {
        return Err(missing_input("Please describe the task.", conversation_id));
    }

    let reply = into_data(orchestrator.execute_task(&data.task).await, &conversation_id)?;
    Ok(Json(DataResponse::success(
        "Task completed".to_string(),
        reply,
        conversation_id,
    )))
}
