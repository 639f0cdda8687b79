use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, info};

use crate::model::issue::{Comment, Extraction, Issue};
use crate::model::report::{AnalysisReport, DecisionStatus, IssueSummary};
use crate::model::web::{
    AnalysisInsights, Applicant, BadgeKind, FormattedComment, Metadata, ProjectInfo,
    StatusBadge, WebDocument, WebIssue, WebSummary,
};
use crate::util::dates::format_date;
use crate::util::round2;
use crate::util::text::{clean_markdown_text, markdown_to_html, preview};

pub const DATA_SOURCE: &str = "GitHub REST API";
pub const SCHEMA_VERSION: &str = "1.0";
const BODY_PREVIEW_CHARS: usize = 200;
const TOP_KEYWORDS: usize = 10;

fn field_pattern(field: &str) -> Regex {
    let (head, tail) = field.split_at(1);
    let pattern = format!(
        r"[{}{}]{}[:\s]*([^\n\r]+)",
        head.to_uppercase(),
        head,
        tail
    );
    Regex::new(&pattern).expect("valid project field regex")
}

static EMAIL: Lazy<Regex> = Lazy::new(|| field_pattern("email"));
static TWITTER: Lazy<Regex> = Lazy::new(|| field_pattern("twitter"));
static BUDGET: Lazy<Regex> = Lazy::new(|| field_pattern("budget"));
static GOAL: Lazy<Regex> = Lazy::new(|| field_pattern("goal"));
static TEAM: Lazy<Regex> = Lazy::new(|| field_pattern("team"));

/// Labels that decide the badge on their own, highest priority first.
const LABEL_BADGES: &[(&str, BadgeKind, &str, &str)] = &[
    ("Awarded", BadgeKind::Success, "Awarded", "#28a745"),
    ("In Review", BadgeKind::Warning, "In Review", "#ffc107"),
    (
        "Pending Final Applicant Feedback",
        BadgeKind::Info,
        "Pending Feedback",
        "#17a2b8",
    ),
    ("In Progress", BadgeKind::Primary, "In Progress", "#007bff"),
];

fn badge(kind: BadgeKind, text: &str, color: &str) -> StatusBadge {
    StatusBadge {
        kind,
        text: text.to_string(),
        color: color.to_string(),
    }
}

fn first_capture(re: &Regex, body: &str) -> String {
    re.captures(body)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_default()
}

/// Best-effort scrape of applicant fields. Misses are empty strings.
pub fn extract_project_info(body: &str) -> ProjectInfo {
    ProjectInfo {
        email: first_capture(&EMAIL, body),
        twitter: first_capture(&TWITTER, body),
        budget: first_capture(&BUDGET, body),
        goal: first_capture(&GOAL, body),
        team: first_capture(&TEAM, body),
    }
}

pub fn status_badge(labels: &[String], decision: DecisionStatus) -> StatusBadge {
    if let Some((_, kind, text, color)) = LABEL_BADGES
        .iter()
        .find(|(label, ..)| labels.iter().any(|l| l == label))
    {
        return badge(*kind, text, color);
    }
    match decision {
        DecisionStatus::Approved => badge(BadgeKind::Success, "Approved", "#28a745"),
        DecisionStatus::Rejected => badge(BadgeKind::Danger, "Rejected", "#dc3545"),
        DecisionStatus::NeedsInfo => badge(BadgeKind::Warning, "Needs Info", "#ffc107"),
        DecisionStatus::Pending => badge(BadgeKind::Secondary, "Pending", "#6c757d"),
    }
}

pub fn format_comment(comment: &Comment) -> FormattedComment {
    FormattedComment {
        id: comment.id,
        body: clean_markdown_text(&comment.body),
        body_html: markdown_to_html(&comment.body),
        created_at: comment.created_at.clone(),
        created_at_formatted: format_date(&comment.created_at),
        html_url: comment.html_url.clone(),
    }
}

pub fn activity_summary(comments: &[FormattedComment], target_user: &str) -> String {
    match comments {
        [] => format!("No comments from {target_user}"),
        [_] => format!("1 comment from {target_user}"),
        [.., latest] => format!(
            "{} comments from {target_user}, latest on {}",
            comments.len(),
            latest.created_at_formatted
        ),
    }
}

pub fn format_issue(issue: &Issue, summary: Option<&IssueSummary>, target_user: &str) -> WebIssue {
    let decision_status = summary.map(|s| s.decision_status).unwrap_or_default();
    let body = issue.body_text();

    let mut comments: Vec<FormattedComment> =
        issue.target_user_comments.iter().map(format_comment).collect();
    comments.sort_by(|a, b| a.created_at.cmp(&b.created_at));

    WebIssue {
        number: issue.number,
        title: issue.title.clone(),
        body: clean_markdown_text(body),
        body_html: markdown_to_html(body),
        body_preview: preview(body, BODY_PREVIEW_CHARS),
        state: issue.state.clone(),
        created_at: issue.created_at.clone(),
        created_at_formatted: format_date(&issue.created_at),
        updated_at: issue.updated_at.clone(),
        updated_at_formatted: format_date(&issue.updated_at),
        html_url: issue.html_url.clone(),
        applicant: Applicant {
            login: issue.user.login.clone(),
            avatar_url: issue.user.avatar_url.clone(),
            profile_url: format!("https://github.com/{}", issue.user.login),
        },
        labels: issue.labels.clone(),
        status_badge: status_badge(&issue.labels, decision_status),
        project_info: extract_project_info(body),
        total_comments: issue.total_comments,
        target_user_comment_count: comments.len(),
        decision_status,
        has_target_user_comments: !comments.is_empty(),
        latest_target_user_comment: comments.last().cloned(),
        activity_summary: activity_summary(&comments, target_user),
        target_user_comments: comments,
    }
}

pub fn summarize(issues: &[WebIssue]) -> WebSummary {
    let mut badge_counts: BTreeMap<BadgeKind, usize> = BTreeMap::new();
    for issue in issues {
        *badge_counts.entry(issue.status_badge.kind).or_default() += 1;
    }
    let count_of = |kind: BadgeKind| badge_counts.get(&kind).copied().unwrap_or(0);

    let total_comments: usize = issues.iter().map(|i| i.target_user_comment_count).sum();
    let commented = issues.iter().filter(|i| i.has_target_user_comments).count();
    let average = if commented == 0 {
        0.0
    } else {
        total_comments as f64 / commented as f64
    };

    WebSummary {
        total_issues: issues.len(),
        awarded_count: count_of(BadgeKind::Success),
        in_review_count: count_of(BadgeKind::Warning),
        pending_count: count_of(BadgeKind::Secondary),
        total_target_user_comments: total_comments,
        issues_with_target_user_comments: commented,
        average_comments_per_commented_issue: round2(average),
        last_updated: issues.iter().map(|i| i.updated_at.clone()).max(),
        badge_counts,
    }
}

/// Builds the display document. Output depends only on the inputs and
/// `generated_at`.
pub fn format_for_web(
    extraction: &Extraction,
    report: &AnalysisReport,
    generated_at: String,
) -> WebDocument {
    let lookup: HashMap<u64, &IssueSummary> = report
        .issue_summaries
        .iter()
        .map(|s| (s.issue_number, s))
        .collect();

    let mut issues: Vec<WebIssue> = extraction
        .issues
        .iter()
        .map(|issue| {
            let summary = lookup.get(&issue.number).copied();
            if summary.is_none() {
                debug!(target: "format", issue = issue.number, "no analysis summary; defaulting to pending");
            }
            format_issue(issue, summary, &extraction.target_user)
        })
        .collect();
    issues.sort_by(|a, b| b.number.cmp(&a.number));

    let summary = summarize(&issues);
    info!(
        target: "format",
        issues = summary.total_issues,
        comments = summary.total_target_user_comments,
        "web document assembled"
    );

    WebDocument {
        metadata: Metadata {
            generated_at,
            repository: extraction.repository.clone(),
            target_user: extraction.target_user.clone(),
            data_source: DATA_SOURCE.to_string(),
            version: SCHEMA_VERSION.to_string(),
        },
        summary,
        issues,
        analysis_insights: AnalysisInsights {
            top_keywords: report.comment_patterns.keyword_frequency.top(TOP_KEYWORDS),
            comment_categories: report.comment_categories.clone(),
            decision_breakdown: report.decision_analysis.clone(),
        },
    }
}
