use anyhow::{bail, Result};

use crate::config::AppConfig;
use crate::model::issue::Extraction;
use crate::model::report::AnalysisReport;
use crate::model::web::WebDocument;
use crate::providers;
use crate::stages::analyze::build_report;
use crate::stages::extract::{extract, ExtractSettings};
use crate::stages::format::format_for_web;
use crate::store::{read_json, write_json};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Extract,
    Analyze,
    Format,
    All,
    Help,
}

/// Parse the subcommand. No arguments means help.
pub fn parse_args(args: &[String]) -> Result<Command> {
    let Some(first) = args.first() else {
        return Ok(Command::Help);
    };
    if args.len() > 1 {
        bail!("Unexpected arguments after '{first}': {}", args[1..].join(" "));
    }
    match first.as_str() {
        "extract" => Ok(Command::Extract),
        "analyze" => Ok(Command::Analyze),
        "format" => Ok(Command::Format),
        "all" => Ok(Command::All),
        "help" | "-h" | "--help" => Ok(Command::Help),
        other => bail!("Unknown command '{other}'. Run `issue-digest help` for usage."),
    }
}

pub async fn run(command: Command, config: &AppConfig) -> Result<()> {
    match command {
        Command::Extract => handle_extract(config).await,
        Command::Analyze => handle_analyze(config),
        Command::Format => handle_format(config),
        Command::All => {
            handle_extract(config).await?;
            handle_analyze(config)?;
            handle_format(config)
        }
        Command::Help => {
            print_help();
            Ok(())
        }
    }
}

pub async fn handle_extract(config: &AppConfig) -> Result<()> {
    let repo = config.repo()?;
    let settings = ExtractSettings {
        repository: repo.to_string(),
        target_user: config.target_user.clone(),
        per_page: config.per_page,
        page_delay: config.page_delay(),
    };
    let source = providers::create_source(config, repo)?;
    let data = extract(source.as_ref(), &settings).await;

    let path = config.paths().issues;
    write_json(&path, &data)?;

    println!("=== EXTRACTION COMPLETE ===");
    println!("Data saved to: {}", path.display());
    println!("Total issues: {}", data.summary.total_issues);
    println!(
        "Total {} comments: {}",
        data.target_user, data.summary.total_target_user_comments
    );
    println!(
        "Issues with {} comments: {}",
        data.target_user, data.summary.issues_with_target_user_comments
    );
    Ok(())
}

pub fn handle_analyze(config: &AppConfig) -> Result<()> {
    let paths = config.paths();
    let data: Extraction = read_json(&paths.issues)?;
    let report = build_report(&data, chrono::Local::now().to_rfc3339())?;
    write_json(&paths.analysis, &report)?;

    println!("=== {} COMMENT ANALYSIS ===", data.target_user.to_uppercase());
    println!("Total issues: {}", report.overview.total_issues_analyzed);
    println!(
        "Issues with {} comments: {}",
        data.target_user, report.overview.issues_with_target_user_comments
    );
    println!(
        "Total {} comments: {}",
        data.target_user, report.overview.total_target_user_comments
    );
    println!("\nDecision breakdown:");
    for (status, count) in &report.decision_analysis {
        println!("  {status}: {count}");
    }
    println!("\nComment categories:");
    for (category, count) in &report.comment_categories {
        println!("  {category}: {count}");
    }
    println!("\nTop keywords:");
    if report.comment_patterns.keyword_frequency.is_empty() {
        println!("  (none)");
    }
    for (keyword, count) in report.comment_patterns.keyword_frequency.top(10) {
        println!("  {keyword}: {count}");
    }
    println!("\nAnalysis report saved to: {}", paths.analysis.display());
    Ok(())
}

pub fn handle_format(config: &AppConfig) -> Result<()> {
    let paths = config.paths();
    let data: Extraction = read_json(&paths.issues)?;
    let report: AnalysisReport = read_json(&paths.analysis)?;
    let doc: WebDocument = format_for_web(&data, &report, chrono::Local::now().to_rfc3339());
    write_json(&paths.web, &doc)?;

    let s = &doc.summary;
    println!("=== WEB DATA PROCESSING COMPLETE ===");
    println!("Processed {} issues", s.total_issues);
    println!(
        "Total {} comments: {}",
        data.target_user, s.total_target_user_comments
    );
    println!(
        "Issues with {} comments: {}",
        data.target_user, s.issues_with_target_user_comments
    );
    println!("\nStatus breakdown:");
    println!("  Awarded: {}", s.awarded_count);
    println!("  In Review: {}", s.in_review_count);
    println!("  Pending: {}", s.pending_count);
    println!("\nData saved to: {}", paths.web.display());
    Ok(())
}

pub fn print_help() {
    println!("issue-digest — extract, analyze and format one user's issue comments\n");
    println!("USAGE:");
    println!("  issue-digest extract   Fetch issues and the target user's comments");
    println!("  issue-digest analyze   Categorize comments and summarize decisions");
    println!("  issue-digest format    Build the web-ready JSON document");
    println!("  issue-digest all       Run the three stages in order");
    println!();
    println!("CONFIG:");
    println!("  ~/.issue-digest/config.toml  repository, target_user, output_dir, ...");
    println!("  GITHUB_TOKEN                 optional API token");
}
