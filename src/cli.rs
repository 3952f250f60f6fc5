// src/cli.rs
use crate::config::ProviderConfig;
use crate::core::CareerOrchestrator;
use crate::environment::RuntimeSettings;
use crate::types::tracker::export_leads_csv;
use crate::types::{GmailToSheetsReport, Outcome};
use crate::web::{start_web_server, AppState};
use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "career-copilot")]
#[command(about = "Resume tailoring, interview prep and job-lead tracking on top of an LLM agent")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Scan Gmail for job leads and write them to a Google Sheet
    GmailToSheets {
        /// Spreadsheet id; falls back to SHEET_ID when omitted or empty
        #[arg(long, num_args = 0..=1, default_missing_value = "")]
        sheet_id: Option<String>,
        /// Sheet tab; falls back to SHEET_TAB, then "Applications"
        #[arg(long, num_args = 0..=1, default_missing_value = "")]
        sheet_tab: Option<String>,
        /// Extract leads only, skip the sheet write
        #[arg(long)]
        demo: bool,
        /// Also write the extracted leads to a CSV file
        #[arg(long)]
        csv: Option<PathBuf>,
    },
    /// Start the HTTP API
    Serve {
        #[arg(long)]
        port: Option<u16>,
    },
    /// Print the resolved configuration
    Status,
    /// List available tools
    Tools,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetTarget {
    pub sheet_id: String,
    pub sheet_tab: String,
}

/// Flags win over the environment; empty values count as absent.
pub fn resolve_sheet_target(
    sheet_id: Option<&str>,
    sheet_tab: Option<&str>,
    config: &ProviderConfig,
) -> Option<SheetTarget> {
    let given = |v: Option<&str>| v.map(str::trim).filter(|v| !v.is_empty()).map(str::to_string);

    let sheet_id = given(sheet_id).or_else(|| config.sheet_id.clone())?;
    let sheet_tab = given(sheet_tab).unwrap_or_else(|| config.sheet_tab.clone());
    Some(SheetTarget {
        sheet_id,
        sheet_tab,
    })
}

pub async fn handle_command(cli: Cli) -> Result<ExitCode> {
    let config = ProviderConfig::resolve();
    let settings = RuntimeSettings::load()?;

    match cli.command {
        Command::GmailToSheets {
            sheet_id,
            sheet_tab,
            demo,
            csv,
        } => {
            let target =
                match resolve_sheet_target(sheet_id.as_deref(), sheet_tab.as_deref(), &config) {
                    Some(target) => target,
                    None => {
                        eprintln!(
                            "Missing Sheet ID. Either set SHEET_ID in .env or pass --sheet-id \"<SHEET_ID>\"."
                        );
                        return Ok(ExitCode::from(2));
                    }
                };

            if demo {
                println!("Running in DEMO MODE - will extract emails but not write to Google Sheets");
            }
            println!("Using Sheet ID: {}", target.sheet_id);
            println!("Using Sheet Tab: {}", target.sheet_tab);

            let orchestrator = CareerOrchestrator::from_config(config, settings)?;
            if !orchestrator.is_configured() {
                eprintln!("No LLM provider configured. Set OPENAI_API_KEY or GOOGLE_API_KEY.");
                return Ok(ExitCode::FAILURE);
            }

            println!("Starting Gmail -> Sheets run.");
            let report = orchestrator
                .gmail_to_sheets(&target.sheet_id, &target.sheet_tab, demo)
                .await;

            print_report(&report);

            if let (Some(path), Some(scan)) = (csv, report.email_scan.success()) {
                export_leads_csv(&path, &scan.rows)?;
                info!("Wrote {} leads to {}", scan.rows.len(), path.display());
                println!("CSV written: {}", path.display());
            }

            Ok(ExitCode::SUCCESS)
        }

        Command::Serve { port } => {
            let orchestrator = CareerOrchestrator::from_config(config, settings)?;
            start_web_server(AppState { orchestrator }, port).await?;
            Ok(ExitCode::SUCCESS)
        }

        Command::Status => {
            let summary = config.status_summary();
            println!("{}", serde_json::to_string_pretty(&summary)?);
            Ok(ExitCode::SUCCESS)
        }

        Command::Tools => {
            let orchestrator = CareerOrchestrator::from_config(config, settings)?;
            let tools = orchestrator.get_available_tools().await;
            println!("Available tools ({}):", tools.len());
            for tool in tools {
                println!("  {} - {}: {}", tool.id, tool.name, tool.description);
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn print_report(report: &GmailToSheetsReport) {
    println!();
    println!("RESULTS SUMMARY");
    println!("==================");

    match &report.email_scan {
        Outcome::Success(scan) => {
            match scan.total_scanned {
                Some(total) => println!("Emails scanned: {}", total),
                None => println!("Emails scanned: {}", scan.rows.len()),
            }
            println!("Matched rows: {}", scan.rows.len());
        }
        Outcome::Failure(report) => {
            error!("Email scan failed: {}", report.error);
            println!("Email scan: Failed - {}", report.error);
        }
    }

    println!("{}", sheet_update_line(report));
}

fn sheet_update_line(report: &GmailToSheetsReport) -> String {
    match (&report.sheet_update, report.demo_mode) {
        (_, true) => "Sheet update: Skipped (Demo Mode)".to_string(),
        (None, false) if !report.email_scan.is_success() => {
            "Sheet update: Skipped (email scan failed)".to_string()
        }
        (None, false) => "Sheet update: Skipped (no rows extracted)".to_string(),
        (Some(Outcome::Success(update)), false) => format!(
            "Sheet update: {} row(s) appended. {}",
            update.row_count_appended, update.message
        ),
        (Some(Outcome::Failure(report)), false) => {
            format!("Sheet update: Failed - {}", report.error)
        }
    }
}
