use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::report::{Category, DecisionStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BadgeKind {
    Success,
    Warning,
    Info,
    Primary,
    Danger,
    Secondary,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusBadge {
    #[serde(rename = "type")]
    pub kind: BadgeKind,
    pub text: String,
    pub color: String,
}

/// Fields scraped from an application body. Empty when not found.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectInfo {
    pub email: String,
    pub twitter: String,
    pub budget: String,
    pub goal: String,
    pub team: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormattedComment {
    pub id: u64,
    pub body: String,
    pub body_html: String,
    pub created_at: String,
    pub created_at_formatted: String,
    pub html_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Applicant {
    pub login: String,
    pub avatar_url: String,
    pub profile_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebIssue {
    pub number: u64,
    pub title: String,
    pub body: String,
    pub body_html: String,
    pub body_preview: String,
    pub state: String,
    pub created_at: String,
    pub created_at_formatted: String,
    pub updated_at: String,
    pub updated_at_formatted: String,
    pub html_url: String,
    pub applicant: Applicant,
    pub labels: Vec<String>,
    pub status_badge: StatusBadge,
    pub project_info: ProjectInfo,
    pub total_comments: usize,
    pub target_user_comments: Vec<FormattedComment>,
    pub target_user_comment_count: usize,
    pub decision_status: DecisionStatus,
    pub has_target_user_comments: bool,
    pub latest_target_user_comment: Option<FormattedComment>,
    pub activity_summary: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebSummary {
    pub total_issues: usize,
    pub badge_counts: BTreeMap<BadgeKind, usize>,
    pub awarded_count: usize,
    pub in_review_count: usize,
    pub pending_count: usize,
    pub total_target_user_comments: usize,
    pub issues_with_target_user_comments: usize,
    pub average_comments_per_commented_issue: f64,
    pub last_updated: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    pub generated_at: String,
    pub repository: String,
    pub target_user: String,
    pub data_source: String,
    pub version: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisInsights {
    pub top_keywords: Vec<(String, usize)>,
    pub comment_categories: BTreeMap<Category, usize>,
    pub decision_breakdown: BTreeMap<DecisionStatus, usize>,
}

/// Output of the format stage, consumed by the web front end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebDocument {
    pub metadata: Metadata,
    pub summary: WebSummary,
    pub issues: Vec<WebIssue>,
    pub analysis_insights: AnalysisInsights,
}
