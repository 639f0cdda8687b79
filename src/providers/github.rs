use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use tracing::debug;

use super::{IssueSource, IssueState, RawComment, RawIssue};
use crate::config::RepoRef;

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("GET {url} returned HTTP {status}")]
    Status { url: String, status: StatusCode },
}

/// GitHub REST v3 issue source for a single repository.
pub struct GitHubSource {
    base_url: String,
    repo: RepoRef,
    client: reqwest::Client,
}

impl GitHubSource {
    pub fn new(base_url: &str, repo: RepoRef, token: Option<String>) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
        headers.insert(
            "X-GitHub-Api-Version",
            HeaderValue::from_static("2022-11-28"),
        );
        if let Some(token) = token {
            let value = HeaderValue::from_str(&format!("Bearer {token}"))
                .context("GITHUB_TOKEN is not a valid header value")?;
            headers.insert(AUTHORIZATION, value);
        }

        let client = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            repo,
            client,
        })
    }

    fn repo_url(&self) -> String {
        format!(
            "{}/repos/{}/{}",
            self.base_url,
            urlencoding::encode(&self.repo.owner),
            urlencoding::encode(&self.repo.name)
        )
    }

    async fn get_page<T: DeserializeOwned>(
        &self,
        url: &str,
        params: &[(&str, String)],
    ) -> Result<Vec<T>> {
        debug!(target: "github", %url, ?params, "GET");
        let resp = self
            .client
            .get(url)
            .query(params)
            .send()
            .await
            .with_context(|| format!("GitHub request to {url} failed"))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status,
            }
            .into());
        }

        resp.json()
            .await
            .with_context(|| format!("Failed to parse GitHub response from {url}"))
    }
}

#[async_trait]
impl IssueSource for GitHubSource {
    fn name(&self) -> &str {
        "GitHub"
    }

    async fn issue_page(
        &self,
        state: IssueState,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<RawIssue>> {
        let url = format!("{}/issues", self.repo_url());
        let params = [
            ("state", state.as_str().to_string()),
            ("page", page.to_string()),
            ("per_page", per_page.to_string()),
            ("sort", "created".to_string()),
            ("direction", "asc".to_string()),
        ];
        self.get_page(&url, &params).await
    }

    async fn comment_page(
        &self,
        issue_number: u64,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<RawComment>> {
        let url = format!("{}/issues/{issue_number}/comments", self.repo_url());
        let params = [("page", page.to_string()), ("per_page", per_page.to_string())];
        self.get_page(&url, &params).await
    }
}
