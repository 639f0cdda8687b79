pub mod github;

use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;

use crate::config::{AppConfig, RepoRef};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueState {
    Open,
    Closed,
}

impl IssueState {
    pub const ALL: [IssueState; 2] = [IssueState::Open, IssueState::Closed];

    pub fn as_str(&self) -> &'static str {
        match self {
            IssueState::Open => "open",
            IssueState::Closed => "closed",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawUser {
    pub login: String,
    #[serde(default)]
    pub avatar_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawLabel {
    pub name: String,
}

/// An issue record as returned by the tracker's listing endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct RawIssue {
    pub number: u64,
    pub title: String,
    pub body: Option<String>,
    pub state: String,
    pub created_at: String,
    pub updated_at: String,
    pub html_url: String,
    pub user: RawUser,
    #[serde(default)]
    pub labels: Vec<RawLabel>,
    /// Present only on pull requests.
    #[serde(default)]
    pub pull_request: Option<serde_json::Value>,
}

impl RawIssue {
    pub fn is_pull_request(&self) -> bool {
        self.pull_request.is_some()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawComment {
    pub id: u64,
    pub body: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    pub html_url: String,
    pub user: Option<RawUser>,
}

impl RawComment {
    pub fn author_login(&self) -> Option<&str> {
        self.user.as_ref().map(|u| u.login.as_str())
    }
}

/// One page-addressable issue tracker. Each call fetches exactly one page.
#[async_trait]
pub trait IssueSource: Send + Sync {
    fn name(&self) -> &str;
    async fn issue_page(&self, state: IssueState, page: u32, per_page: u32)
        -> Result<Vec<RawIssue>>;
    async fn comment_page(
        &self,
        issue_number: u64,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<RawComment>>;
}


pub fn create_source(config: &AppConfig, repo: RepoRef) -> Result<Box<dyn IssueSource>> {
    let source = github::GitHubSource::new(&config.api_base_url, repo, AppConfig::token())?;
    Ok(Box::new(source))
}
