use anyhow::Result;
use std::future::Future;
use std::time::Duration;
use tracing::{info, warn};

use crate::model::issue::{Comment, Extraction, ExtractionSummary, Issue, IssueAuthor};
use crate::providers::{IssueSource, IssueState, RawComment, RawIssue};

#[derive(Debug, Clone)]
pub struct ExtractSettings {
    pub repository: String,
    pub target_user: String,
    pub per_page: u32,
    pub page_delay: Duration,
}

/// Walks every issue of the repository and keeps the target user's comments.
pub async fn extract(source: &dyn IssueSource, settings: &ExtractSettings) -> Extraction {
    let raw_issues = fetch_all_issues(source, settings).await;
    info!(target: "extract", source = source.name(), total = raw_issues.len(), "issues listed");

    let mut issues = Vec::with_capacity(raw_issues.len());
    for raw in raw_issues {
        let number = raw.number;
        let comments = walk_pages(
            &format!("comments of #{number}"),
            settings.per_page,
            settings.page_delay,
            move |page| source.comment_page(number, page, settings.per_page),
        )
        .await;
        let kept = filter_target_comments(&comments, &settings.target_user);
        info!(
            target: "extract",
            issue = number,
            title = %raw.title.chars().take(50).collect::<String>(),
            total_comments = comments.len(),
            target_user_comments = kept.len(),
            "processed issue"
        );
        issues.push(build_issue(raw, comments.len(), kept));
    }

    Extraction {
        extraction_date: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        repository: settings.repository.clone(),
        target_user: settings.target_user.clone(),
        summary: ExtractionSummary::from_issues(&issues),
        issues,
    }
}

async fn fetch_all_issues(source: &dyn IssueSource, settings: &ExtractSettings) -> Vec<RawIssue> {
    let mut all = Vec::new();
    for state in IssueState::ALL {
        let page_items = walk_pages(
            &format!("{} issues", state.as_str()),
            settings.per_page,
            settings.page_delay,
            move |page| source.issue_page(state, page, settings.per_page),
        )
        .await;
        all.extend(page_items.into_iter().filter(|issue| !issue.is_pull_request()));
    }
    all
}

/// Fetches pages starting at 1 until one comes back empty or short. A failed
/// page ends the walk and whatever was gathered so far is returned.
pub async fn walk_pages<T, F, Fut>(
    resource: &str,
    per_page: u32,
    delay: Duration,
    mut fetch: F,
) -> Vec<T>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<Vec<T>>>,
{
    let mut items = Vec::new();
    let mut page = 1;
    loop {
        let batch = match fetch(page).await {
            Ok(batch) => batch,
            Err(err) => {
                warn!(target: "extract", resource, page, error = %err, "page fetch failed; keeping earlier pages");
                break;
            }
        };
        if batch.is_empty() {
            break;
        }
        let full_page = batch.len() >= per_page as usize;
        items.extend(batch);
        if !full_page {
            break;
        }
        page += 1;
        tokio::time::sleep(delay).await;
    }
    items
}

/// Keeps comments whose author login equals `target_user` exactly.
pub fn filter_target_comments(comments: &[RawComment], target_user: &str) -> Vec<Comment> {
    comments
        .iter()
        .filter(|c| c.author_login() == Some(target_user))
        .map(|c| Comment {
            id: c.id,
            body: c.body.clone().unwrap_or_default(),
            created_at: c.created_at.clone(),
            updated_at: c.updated_at.clone(),
            html_url: c.html_url.clone(),
        })
        .collect()
}

fn build_issue(raw: RawIssue, total_comments: usize, kept: Vec<Comment>) -> Issue {
    Issue {
        number: raw.number,
        title: raw.title,
        body: raw.body,
        state: raw.state,
        created_at: raw.created_at,
        updated_at: raw.updated_at,
        html_url: raw.html_url,
        user: IssueAuthor {
            login: raw.user.login,
            avatar_url: raw.user.avatar_url,
        },
        labels: raw.labels.into_iter().map(|l| l.name).collect(),
        total_comments,
        target_user_comment_count: kept.len(),
        target_user_comments: kept,
    }
}
