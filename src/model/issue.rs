use serde::{Deserialize, Serialize};

/// A comment written by the target user, as kept by the extractor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: u64,
    #[serde(default)]
    pub body: String,
    pub created_at: String,
    pub updated_at: String,
    pub html_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssueAuthor {
    pub login: String,
    pub avatar_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub number: u64,
    pub title: String,
    pub body: Option<String>,
    pub state: String,
    pub created_at: String,
    pub updated_at: String,
    pub html_url: String,
    pub user: IssueAuthor,
    #[serde(default)]
    pub labels: Vec<String>,
    /// Size of the whole thread, before filtering by author.
    pub total_comments: usize,
    #[serde(default)]
    pub target_user_comments: Vec<Comment>,
    pub target_user_comment_count: usize,
}

impl Issue {
    pub fn has_target_user_comments(&self) -> bool {
        !self.target_user_comments.is_empty()
    }

    pub fn body_text(&self) -> &str {
        self.body.as_deref().unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionSummary {
    pub total_issues: usize,
    pub total_target_user_comments: usize,
    pub issues_with_target_user_comments: usize,
}

impl ExtractionSummary {
    pub fn from_issues(issues: &[Issue]) -> Self {
        Self {
            total_issues: issues.len(),
            total_target_user_comments: issues.iter().map(|i| i.target_user_comment_count).sum(),
            issues_with_target_user_comments: issues
                .iter()
                .filter(|i| i.target_user_comment_count > 0)
                .count(),
        }
    }
}

/// Output of the extract stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Extraction {
    pub extraction_date: String,
    pub repository: String,
    pub target_user: String,
    pub summary: ExtractionSummary,
    pub issues: Vec<Issue>,
}
