use anyhow::{Context, Result};
use std::collections::BTreeMap;
use tracing::info;

use crate::model::issue::{Comment, Extraction, Issue};
use crate::model::report::{
    AnalysisReport, Category, CommentPatterns, ContextComment, DecisionStatus, IssueSummary,
    KeywordFrequency, LengthRange, Overview, TemporalAnalysis,
};
use crate::util::dates::parse_timestamp;
use crate::util::text::preview;
use crate::util::round2;

/// Vocabulary counted by the keyword frequency report, in tie-break order.
pub const DECISION_KEYWORDS: &[&str] = &[
    "approved",
    "denied",
    "rejected",
    "accepted",
    "awarded",
    "granted",
    "needs",
    "requires",
    "missing",
    "incomplete",
    "complete",
    "good",
    "excellent",
    "strong",
    "weak",
    "concerns",
    "issues",
    "budget",
    "funding",
    "amount",
    "timeline",
    "milestone",
    "team",
    "experience",
    "track record",
    "previous work",
    "impact",
    "value",
    "benefit",
    "risk",
    "feasible",
];

/// First match wins. A raw `?` also marks a question.
const CATEGORY_RULES: &[(Category, &[&str])] = &[
    (
        Category::Approval,
        &["approved", "awarded", "granted", "accepted", "looks good", "lgtm"],
    ),
    (
        Category::Rejection,
        &["rejected", "denied", "not approved", "cannot approve"],
    ),
    (
        Category::RequestForInfo,
        &["need more", "please provide", "missing", "incomplete", "clarify"],
    ),
    (Category::Question, &["what", "how", "when", "where", "why"]),
    (
        Category::StatusUpdate,
        &["update", "progress", "status", "milestone", "completed"],
    ),
    (
        Category::Feedback,
        &["feedback", "suggestion", "recommend", "consider", "think"],
    ),
];

const DECISION_RULES: &[(DecisionStatus, &[&str])] = &[
    (DecisionStatus::Approved, &["approved", "awarded", "granted"]),
    (DecisionStatus::Rejected, &["rejected", "denied"]),
    (DecisionStatus::NeedsInfo, &["need more", "missing", "incomplete"]),
];

const SUMMARY_PREVIEW_CHARS: usize = 200;

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| haystack.contains(needle))
}

pub fn categorize(body: &str) -> Category {
    let lower = body.to_lowercase();
    CATEGORY_RULES
        .iter()
        .find(|(category, words)| {
            (*category == Category::Question && body.contains('?')) || contains_any(&lower, words)
        })
        .map(|(category, _)| *category)
        .unwrap_or(Category::Other)
}

pub fn decision_status(body: &str) -> DecisionStatus {
    let lower = body.to_lowercase();
    DECISION_RULES
        .iter()
        .find(|(_, words)| contains_any(&lower, words))
        .map(|(status, _)| *status)
        .unwrap_or_default()
}

/// Counts unanchored, case-insensitive occurrences of each vocabulary keyword.
pub fn keyword_frequency<'a>(bodies: impl IntoIterator<Item = &'a str>) -> KeywordFrequency {
    let all_text = bodies
        .into_iter()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ");

    let mut counts: Vec<(String, usize)> = DECISION_KEYWORDS
        .iter()
        .map(|keyword| (keyword.to_string(), all_text.matches(keyword).count()))
        .filter(|(_, count)| *count > 0)
        .collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    KeywordFrequency(counts)
}

/// Every target-user comment with its issue context, in issue order.
pub fn collect_comments(issues: &[Issue]) -> Vec<ContextComment> {
    issues
        .iter()
        .flat_map(|issue| {
            issue
                .target_user_comments
                .iter()
                .map(move |comment| ContextComment {
                    comment: comment.clone(),
                    issue_number: issue.number,
                    issue_title: issue.title.clone(),
                    issue_state: issue.state.clone(),
                    issue_labels: issue.labels.clone(),
                })
        })
        .collect()
}

pub fn analyze_patterns(comments: &[ContextComment]) -> Result<CommentPatterns> {
    let frequency = keyword_frequency(comments.iter().map(|c| c.comment.body.as_str()));

    let lengths: Vec<usize> = comments
        .iter()
        .map(|c| c.comment.body.chars().count())
        .collect();
    let average = if lengths.is_empty() {
        0.0
    } else {
        lengths.iter().sum::<usize>() as f64 / lengths.len() as f64
    };

    let mut dates = Vec::with_capacity(comments.len());
    for c in comments {
        let parsed = parse_timestamp(&c.comment.created_at).with_context(|| {
            format!(
                "comment {} on #{} has an unreadable created_at {:?}",
                c.comment.id, c.issue_number, c.comment.created_at
            )
        })?;
        dates.push(parsed);
    }
    let temporal = match (dates.iter().min(), dates.iter().max()) {
        (Some(earliest), Some(latest)) => TemporalAnalysis {
            earliest_comment: Some(earliest.to_rfc3339()),
            latest_comment: Some(latest.to_rfc3339()),
            activity_span_days: (*latest - *earliest).num_days(),
        },
        _ => TemporalAnalysis::default(),
    };

    Ok(CommentPatterns {
        total_comments: comments.len(),
        keyword_frequency: frequency,
        average_comment_length: round2(average),
        comment_length_range: LengthRange {
            min: lengths.iter().copied().min().unwrap_or(0),
            max: lengths.iter().copied().max().unwrap_or(0),
        },
        temporal_analysis: temporal,
    })
}

/// Buckets every comment into exactly one category. All categories are present.
pub fn categorize_comments(comments: &[ContextComment]) -> BTreeMap<Category, Vec<ContextComment>> {
    let mut buckets: BTreeMap<Category, Vec<ContextComment>> =
        Category::ALL.iter().map(|c| (*c, Vec::new())).collect();
    for comment in comments {
        buckets
            .entry(categorize(&comment.comment.body))
            .or_default()
            .push(comment.clone());
    }
    buckets
}

fn latest_comment(comments: &[Comment]) -> Option<&Comment> {
    // max_by keeps the last of equal elements; reversing keeps the first listed.
    comments
        .iter()
        .rev()
        .max_by(|a, b| a.created_at.cmp(&b.created_at))
}

fn first_comment(comments: &[Comment]) -> Option<&Comment> {
    comments.iter().min_by(|a, b| a.created_at.cmp(&b.created_at))
}

pub fn summarize_issue(issue: &Issue) -> Option<IssueSummary> {
    let latest = latest_comment(&issue.target_user_comments)?;
    let first = first_comment(&issue.target_user_comments)?;
    let all_text = issue
        .target_user_comments
        .iter()
        .map(|c| c.body.as_str())
        .collect::<Vec<_>>()
        .join(" ");

    Some(IssueSummary {
        issue_number: issue.number,
        title: issue.title.clone(),
        state: issue.state.clone(),
        labels: issue.labels.clone(),
        applicant: issue.user.login.clone(),
        target_user_comment_count: issue.target_user_comments.len(),
        decision_status: decision_status(&latest.body),
        latest_comment: latest.clone(),
        first_comment: first.clone(),
        comment_summary: preview(&all_text, SUMMARY_PREVIEW_CHARS),
        html_url: issue.html_url.clone(),
    })
}

/// Summaries for issues the target user commented on, by ascending number.
pub fn issue_summaries(issues: &[Issue]) -> Vec<IssueSummary> {
    let mut summaries: Vec<IssueSummary> = issues.iter().filter_map(summarize_issue).collect();
    summaries.sort_by_key(|s| s.issue_number);
    summaries
}

pub fn build_report(extraction: &Extraction, analysis_date: String) -> Result<AnalysisReport> {
    let comments = collect_comments(&extraction.issues);
    let comment_patterns = analyze_patterns(&comments)?;
    let detailed_categories = categorize_comments(&comments);
    let issue_summaries = issue_summaries(&extraction.issues);

    let comment_categories = detailed_categories
        .iter()
        .map(|(category, list)| (*category, list.len()))
        .collect();

    let mut decision_analysis: BTreeMap<DecisionStatus, usize> =
        DecisionStatus::ALL.iter().map(|s| (*s, 0)).collect();
    for summary in &issue_summaries {
        *decision_analysis.entry(summary.decision_status).or_default() += 1;
    }

    info!(
        target: "analyze",
        issues = extraction.issues.len(),
        comments = comments.len(),
        summaries = issue_summaries.len(),
        "analysis complete"
    );

    Ok(AnalysisReport {
        analysis_date,
        overview: Overview {
            total_issues_analyzed: extraction.issues.len(),
            issues_with_target_user_comments: extraction
                .issues
                .iter()
                .filter(|i| i.has_target_user_comments())
                .count(),
            total_target_user_comments: comment_patterns.total_comments,
        },
        comment_patterns,
        comment_categories,
        decision_analysis,
        issue_summaries,
        detailed_categories,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::issue::{ExtractionSummary, IssueAuthor};

    fn comment(id: u64, body: &str, created_at: &str) -> Comment {
        Comment {
            id,
            body: body.to_string(),
            created_at: created_at.to_string(),
            updated_at: created_at.to_string(),
            html_url: format!("https://github.com/acme/grants/issues/1#issuecomment-{id}"),
        }
    }

    fn issue(number: u64, comments: Vec<Comment>) -> Issue {
        Issue {
            number,
            title: format!("Application {number}"),
            body: Some("Budget: $1,000".into()),
            state: "open".into(),
            created_at: "2024-01-01T00:00:00Z".into(),
            updated_at: "2024-01-02T00:00:00Z".into(),
            html_url: format!("https://github.com/acme/grants/issues/{number}"),
            user: IssueAuthor {
                login: format!("applicant{number}"),
                avatar_url: String::new(),
            },
            labels: vec!["In Review".into()],
            total_comments: comments.len() + 1,
            target_user_comment_count: comments.len(),
            target_user_comments: comments,
        }
    }

    fn extraction(issues: Vec<Issue>) -> Extraction {
        Extraction {
            extraction_date: "2024-05-01 10:00:00".into(),
            repository: "acme/grants".into(),
            target_user: "cuevasm".into(),
            summary: ExtractionSummary::from_issues(&issues),
            issues,
        }
    }

    #[test]
    fn approval_wins_over_later_rules() {
        assert_eq!(
            categorize("We approved this and look forward to the milestone"),
            Category::Approval
        );
    }

    #[test]
    fn not_approved_still_reads_as_approval() {
        // "not approved" contains "approved", and approval is checked first.
        assert_eq!(categorize("This is not approved."), Category::Approval);
        assert_eq!(categorize("Cannot approve at this time."), Category::Rejection);
    }

    #[test]
    fn category_rule_precedence() {
        assert_eq!(categorize("Application DENIED"), Category::Rejection);
        assert_eq!(categorize("Please provide a budget"), Category::RequestForInfo);
        assert_eq!(categorize("Ready?"), Category::Question);
        assert_eq!(categorize("Where is the repo"), Category::Question);
        assert_eq!(categorize("Status: in progress"), Category::StatusUpdate);
        assert_eq!(categorize("I recommend a smaller scope"), Category::Feedback);
        assert_eq!(categorize("Thanks!"), Category::Other);
        assert_eq!(categorize(""), Category::Other);
    }

    #[test]
    fn question_keywords_match_inside_words() {
        // "somehow" contains "how".
        assert_eq!(categorize("somehow it shipped"), Category::Question);
    }

    #[test]
    fn decision_uses_narrower_keywords_than_category() {
        assert_eq!(decision_status("Looks good to me"), DecisionStatus::Pending);
        assert_eq!(categorize("Looks good to me"), Category::Approval);
        assert_eq!(decision_status("Grant AWARDED"), DecisionStatus::Approved);
        assert_eq!(decision_status("denied"), DecisionStatus::Rejected);
        assert_eq!(decision_status("Missing a timeline"), DecisionStatus::NeedsInfo);
    }

    #[test]
    fn keyword_counts_are_unanchored_and_ranked() {
        let freq = keyword_frequency(["Team team TEAM", "needs budget", "Neediness"]);
        assert_eq!(freq.get("team"), Some(3));
        assert_eq!(freq.get("needs"), Some(1));
        assert_eq!(freq.get("budget"), Some(1));
        assert_eq!(freq.0[0], ("team".to_string(), 3));
        // Ties keep vocabulary order: "needs" precedes "budget".
        assert_eq!(freq.0[1].0, "needs");
        assert_eq!(freq.0[2].0, "budget");
        assert_eq!(freq.get("approved"), None);
    }

    #[test]
    fn keyword_counts_include_complete_inside_incomplete() {
        let freq = keyword_frequency(["incomplete"]);
        assert_eq!(freq.get("incomplete"), Some(1));
        assert_eq!(freq.get("complete"), Some(1));
    }

    #[test]
    fn patterns_over_empty_set_are_zero() {
        let patterns = analyze_patterns(&[]).unwrap();
        assert_eq!(patterns.total_comments, 0);
        assert_eq!(patterns.average_comment_length, 0.0);
        assert_eq!(patterns.comment_length_range, LengthRange { min: 0, max: 0 });
        assert_eq!(patterns.temporal_analysis.earliest_comment, None);
        assert_eq!(patterns.temporal_analysis.activity_span_days, 0);
        assert!(patterns.keyword_frequency.is_empty());
    }

    #[test]
    fn patterns_lengths_and_span() {
        let issues = vec![issue(
            1,
            vec![
                comment(1, "abc", "2024-01-01T10:00:00Z"),
                comment(2, "abcd", "2024-01-11T09:00:00Z"),
                comment(3, "abcdef", "2024-01-05T00:00:00Z"),
            ],
        )];
        let patterns = analyze_patterns(&collect_comments(&issues)).unwrap();
        assert_eq!(patterns.total_comments, 3);
        assert_eq!(patterns.average_comment_length, 4.33);
        assert_eq!(patterns.comment_length_range, LengthRange { min: 3, max: 6 });
        assert_eq!(
            patterns.temporal_analysis.earliest_comment.as_deref(),
            Some("2024-01-01T10:00:00+00:00")
        );
        assert_eq!(
            patterns.temporal_analysis.latest_comment.as_deref(),
            Some("2024-01-11T09:00:00+00:00")
        );
        // 9 days 23 hours rounds down.
        assert_eq!(patterns.temporal_analysis.activity_span_days, 9);
    }

    #[test]
    fn unreadable_timestamp_is_an_error() {
        let issues = vec![issue(1, vec![comment(1, "x", "not a date")])];
        let err = analyze_patterns(&collect_comments(&issues)).unwrap_err();
        assert!(err.to_string().contains("unreadable created_at"));
    }

    #[test]
    fn categorized_counts_add_up() {
        let bodies = [
            "approved",
            "denied",
            "please provide docs",
            "why?",
            "progress update",
            "consider this",
            "ok",
            "lgtm",
        ];
        let comments: Vec<Comment> = bodies
            .iter()
            .enumerate()
            .map(|(i, b)| comment(i as u64, b, "2024-01-01T00:00:00Z"))
            .collect();
        let all = collect_comments(&[issue(1, comments)]);
        let buckets = categorize_comments(&all);

        assert_eq!(buckets.len(), 7);
        assert_eq!(buckets.values().map(Vec::len).sum::<usize>(), bodies.len());
        assert_eq!(buckets[&Category::Approval].len(), 2);
        assert_eq!(buckets[&Category::Other].len(), 1);
        assert_eq!(buckets[&Category::Question][0].issue_number, 1);
    }

    #[test]
    fn summaries_skip_issues_without_comments_and_sort() {
        let issues = vec![
            issue(5, vec![comment(1, "Approved!", "2024-01-01T00:00:00Z")]),
            issue(2, vec![]),
            issue(3, vec![comment(2, "Missing budget", "2024-01-01T00:00:00Z")]),
        ];
        let summaries = issue_summaries(&issues);
        let numbers: Vec<u64> = summaries.iter().map(|s| s.issue_number).collect();
        assert_eq!(numbers, vec![3, 5]);
        assert_eq!(summaries[0].decision_status, DecisionStatus::NeedsInfo);
        assert_eq!(summaries[1].decision_status, DecisionStatus::Approved);
        assert_eq!(summaries[1].applicant, "applicant5");
    }

    #[test]
    fn summary_status_comes_from_latest_comment() {
        let summary = summarize_issue(&issue(
            1,
            vec![
                comment(2, "Denied for now", "2024-03-01T00:00:00Z"),
                comment(1, "Approved", "2024-01-01T00:00:00Z"),
            ],
        ))
        .unwrap();
        assert_eq!(summary.decision_status, DecisionStatus::Rejected);
        assert_eq!(summary.latest_comment.id, 2);
        assert_eq!(summary.first_comment.id, 1);
        assert_eq!(summary.comment_summary, "Denied for now Approved");
    }

    #[test]
    fn summary_ties_pick_first_listed() {
        let summary = summarize_issue(&issue(
            1,
            vec![
                comment(7, "awarded", "2024-03-01T00:00:00Z"),
                comment(8, "rejected", "2024-03-01T00:00:00Z"),
            ],
        ))
        .unwrap();
        assert_eq!(summary.latest_comment.id, 7);
        assert_eq!(summary.first_comment.id, 7);
        assert_eq!(summary.decision_status, DecisionStatus::Approved);
    }

    #[test]
    fn summary_preview_truncates_long_threads() {
        let long = "a".repeat(150);
        let summary = summarize_issue(&issue(
            1,
            vec![
                comment(1, &long, "2024-01-01T00:00:00Z"),
                comment(2, &long, "2024-01-02T00:00:00Z"),
            ],
        ))
        .unwrap();
        assert_eq!(summary.comment_summary.chars().count(), 203);
        assert!(summary.comment_summary.ends_with("..."));
    }

    #[test]
    fn report_tallies_categories_and_decisions() {
        let data = extraction(vec![
            issue(1, vec![comment(1, "Approved", "2024-01-01T00:00:00Z")]),
            issue(2, vec![comment(2, "Looks good", "2024-01-02T00:00:00Z")]),
            issue(3, vec![]),
        ]);
        let report = build_report(&data, "2024-05-01T00:00:00".into()).unwrap();

        assert_eq!(report.overview.total_issues_analyzed, 3);
        assert_eq!(report.overview.issues_with_target_user_comments, 2);
        assert_eq!(report.overview.total_target_user_comments, 2);
        assert_eq!(report.comment_categories[&Category::Approval], 2);
        assert_eq!(report.comment_categories[&Category::Feedback], 0);
        assert_eq!(report.decision_analysis[&DecisionStatus::Approved], 1);
        assert_eq!(report.decision_analysis[&DecisionStatus::Pending], 1);
        assert_eq!(report.decision_analysis[&DecisionStatus::Rejected], 0);
        assert_eq!(report.issue_summaries.len(), 2);
        assert_eq!(report.detailed_categories[&Category::Approval].len(), 2);
    }

    #[test]
    fn report_over_empty_extraction_degrades_to_zero() {
        let report = build_report(&extraction(vec![]), "now".into()).unwrap();
        assert_eq!(report.overview.total_target_user_comments, 0);
        assert!(report.issue_summaries.is_empty());
        assert_eq!(report.comment_categories.values().sum::<usize>(), 0);
        assert_eq!(report.comment_patterns.average_comment_length, 0.0);
    }
}
