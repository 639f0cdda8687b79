use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

use super::issue::Comment;

/// Intent of a single comment. Declaration order is rule precedence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Approval,
    Rejection,
    RequestForInfo,
    Question,
    StatusUpdate,
    Feedback,
    Other,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::Approval,
        Category::Rejection,
        Category::RequestForInfo,
        Category::Question,
        Category::StatusUpdate,
        Category::Feedback,
        Category::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Approval => "approval",
            Category::Rejection => "rejection",
            Category::RequestForInfo => "request_for_info",
            Category::Question => "question",
            Category::StatusUpdate => "status_update",
            Category::Feedback => "feedback",
            Category::Other => "other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of an issue as read from the latest target-user comment.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum DecisionStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
    NeedsInfo,
}

impl DecisionStatus {
    pub const ALL: [DecisionStatus; 4] = [
        DecisionStatus::Pending,
        DecisionStatus::Approved,
        DecisionStatus::Rejected,
        DecisionStatus::NeedsInfo,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DecisionStatus::Pending => "pending",
            DecisionStatus::Approved => "approved",
            DecisionStatus::Rejected => "rejected",
            DecisionStatus::NeedsInfo => "needs_info",
        }
    }
}

impl fmt::Display for DecisionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Keyword counts kept in ranking order. Serialized as a JSON object whose
/// key order is the ranking.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeywordFrequency(pub Vec<(String, usize)>);

impl KeywordFrequency {
    pub fn top(&self, n: usize) -> Vec<(String, usize)> {
        self.0.iter().take(n).cloned().collect()
    }

    #[allow(dead_code)]
    pub fn get(&self, keyword: &str) -> Option<usize> {
        self.0.iter().find(|(k, _)| k == keyword).map(|(_, c)| *c)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for KeywordFrequency {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (keyword, count) in &self.0 {
            map.serialize_entry(keyword, count)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for KeywordFrequency {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct OrderedVisitor;

        impl<'de> Visitor<'de> for OrderedVisitor {
            type Value = KeywordFrequency;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of keyword to count")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((keyword, count)) = access.next_entry::<String, usize>()? {
                    entries.push((keyword, count));
                }
                Ok(KeywordFrequency(entries))
            }
        }

        deserializer.deserialize_map(OrderedVisitor)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LengthRange {
    pub min: usize,
    pub max: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TemporalAnalysis {
    pub earliest_comment: Option<String>,
    pub latest_comment: Option<String>,
    pub activity_span_days: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommentPatterns {
    pub total_comments: usize,
    pub keyword_frequency: KeywordFrequency,
    pub average_comment_length: f64,
    pub comment_length_range: LengthRange,
    pub temporal_analysis: TemporalAnalysis,
}

/// A target-user comment together with the issue it was left on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextComment {
    #[serde(flatten)]
    pub comment: Comment,
    pub issue_number: u64,
    pub issue_title: String,
    pub issue_state: String,
    pub issue_labels: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssueSummary {
    pub issue_number: u64,
    pub title: String,
    pub state: String,
    pub labels: Vec<String>,
    pub applicant: String,
    pub target_user_comment_count: usize,
    pub decision_status: DecisionStatus,
    pub latest_comment: Comment,
    pub first_comment: Comment,
    pub comment_summary: String,
    pub html_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Overview {
    pub total_issues_analyzed: usize,
    pub issues_with_target_user_comments: usize,
    pub total_target_user_comments: usize,
}

/// Output of the analyze stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub analysis_date: String,
    pub overview: Overview,
    pub comment_patterns: CommentPatterns,
    pub comment_categories: BTreeMap<Category, usize>,
    pub decision_analysis: BTreeMap<DecisionStatus, usize>,
    pub issue_summaries: Vec<IssueSummary>,
    pub detailed_categories: BTreeMap<Category, Vec<ContextComment>>,
}
