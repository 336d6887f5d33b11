use crate::api::{
    GithubIssueComment, GithubPullRequest, GithubReview, GithubReviewComment, GithubUser,
};
use crate::client::{GithubClient, GithubError};
use crate::stats;
use crate::types::{FetchOptions, InlineComment, ReplyComment, ReviewRecord, ReviewStats, ReviewsResponse};
use chrono::{DateTime, Duration, Utc};
use revq_repo::RepoRef;
use std::path::Path;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum TrackError {
    #[error(
        "current directory is not a recognized GitHub repository; \
         run inside a git checkout with a GitHub origin remote"
    )]
    RepositoryUnresolved,

    #[error("repository not found or no access: {owner}/{name}")]
    RepoNotFound { owner: String, name: String },

    #[error("authentication error: check token permissions and expiry")]
    Auth,

    #[error("failed to fetch pull requests: {0}")]
    Fetch(#[from] GithubError),
}

/// Aggregates the reviews a user received on their pull requests in
/// the repository the tool runs inside.
pub struct ReviewTracker {
    client: GithubClient,
}

impl ReviewTracker {
    pub fn new(token: impl Into<String>) -> Self {
        Self::with_client(GithubClient::new(token))
    }

    pub fn with_client(client: GithubClient) -> Self {
        Self { client }
    }

    /// Resolve the repository from the current directory, then fetch.
    pub async fn received_reviews(
        &self,
        username: &str,
        options: &FetchOptions,
    ) -> Result<ReviewsResponse, TrackError> {
        let repo = revq_repo::resolve_repository(Path::new("."))
            .ok_or(TrackError::RepositoryUnresolved)?;
        self.received_reviews_in(&repo, username, options).await
    }

    /// Fetch all reviews others left on `username`'s pull requests in
    /// `repo`, newest first.
    ///
    /// The primary pull-request listing is fatal on failure; review,
    /// comment and reply sub-fetches degrade instead (the affected
    /// pull request or review is emitted without them, or skipped).
    pub async fn received_reviews_in(
        &self,
        repo: &RepoRef,
        username: &str,
        options: &FetchOptions,
    ) -> Result<ReviewsResponse, TrackError> {
        let pulls = self
            .client
            .list_pulls(&repo.owner, &repo.name, options.state)
            .await
            .map_err(|e| match e {
                GithubError::NotFound { .. } => TrackError::RepoNotFound {
                    owner: repo.owner.clone(),
                    name: repo.name.clone(),
                },
                GithubError::Auth { .. } => TrackError::Auth,
                other => TrackError::Fetch(other),
            })?;

        let own_pulls = filter_authored_pulls(pulls, username);
        info!(
            count = own_pulls.len(),
            "pull requests authored by {} in {}", username, repo
        );

        let cutoff = options.timeframe_days.map(timeframe_cutoff);
        let mut reviews = Vec::new();

        for pr in &own_pulls {
            let pr_reviews = match self
                .client
                .list_reviews(&repo.owner, &repo.name, pr.number)
                .await
            {
                Ok(r) => r,
                Err(e) => {
                    warn!("skipping PR #{}: failed to fetch reviews: {}", pr.number, e);
                    continue;
                }
            };

            for review in pr_reviews {
                let Some(record) = self
                    .build_record(repo, pr, review, username, cutoff)
                    .await
                else {
                    continue;
                };
                reviews.push(record);
            }
        }

        sort_newest_first(&mut reviews);

        Ok(ReviewsResponse {
            total_count: reviews.len(),
            reviews,
            page: options.page,
            per_page: options.per_page,
        })
    }

    /// Fetch and reduce to statistics in one step.
    pub async fn review_stats(
        &self,
        username: &str,
        options: &FetchOptions,
    ) -> Result<ReviewStats, TrackError> {
        let response = self.received_reviews(username, options).await?;
        Ok(stats::compute_stats(&response.reviews))
    }

    async fn build_record(
        &self,
        repo: &RepoRef,
        pr: &GithubPullRequest,
        review: GithubReview,
        username: &str,
        cutoff: Option<DateTime<Utc>>,
    ) -> Option<ReviewRecord> {
        let (reviewer, submitted_at) = admit_review(&review, username, cutoff)?;
        let reviewer_login = reviewer.login.clone();
        let reviewer_avatar = reviewer.avatar_url.clone().unwrap_or_default();

        let comments = match self
            .client
            .list_review_comments(&repo.owner, &repo.name, pr.number)
            .await
        {
            Ok(raw) => raw
                .into_iter()
                .filter(|c| c.pull_request_review_id == Some(review.id))
                .map(to_inline_comment)
                .collect(),
            Err(e) => {
                warn!(
                    "PR #{}: failed to fetch review comments, continuing without: {}",
                    pr.number, e
                );
                Vec::new()
            }
        };

        let reply_comments = match self
            .client
            .list_issue_comments(&repo.owner, &repo.name, pr.number)
            .await
        {
            Ok(raw) => raw.into_iter().filter_map(to_reply_comment).collect(),
            Err(e) => {
                warn!(
                    "PR #{}: failed to fetch reply comments, continuing without: {}",
                    pr.number, e
                );
                Vec::new()
            }
        };

        Some(ReviewRecord {
            pr_title: pr.title.clone(),
            pr_number: pr.number,
            pr_url: pr.html_url.clone(),
            repository: repo.to_string(),
            reviewer: reviewer_login,
            reviewer_avatar,
            state: review.state,
            submitted_at,
            body: review.body.unwrap_or_default(),
            review_url: review.html_url.unwrap_or_default(),
            comments,
            reply_comments,
        })
    }
}

/// Decide whether a raw review belongs in the output: it needs an
/// author other than the subject (login casing varies between
/// invocations) and a submission time within the cutoff. Reviews
/// without a submission time (PENDING) have no sort key and are
/// dropped.
fn admit_review<'a>(
    review: &'a GithubReview,
    username: &str,
    cutoff: Option<DateTime<Utc>>,
) -> Option<(&'a GithubUser, DateTime<Utc>)> {
    let reviewer = review.user.as_ref()?;
    if reviewer.login.eq_ignore_ascii_case(username) {
        return None;
    }
    let submitted_at = review.submitted_at?;
    if let Some(cutoff) = cutoff {
        if submitted_at < cutoff {
            return None;
        }
    }
    Some((reviewer, submitted_at))
}

/// Newest first; ties keep their input order.
fn sort_newest_first(reviews: &mut [ReviewRecord]) {
    reviews.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at));
}

/// Keep only pull requests authored by `username`, matched
/// case-insensitively on the login.
fn filter_authored_pulls(
    pulls: Vec<GithubPullRequest>,
    username: &str,
) -> Vec<GithubPullRequest> {
    let username_lower = username.to_lowercase();
    pulls
        .into_iter()
        .filter(|pr| {
            pr.user
                .as_ref()
                .map(|u| u.login.to_lowercase() == username_lower)
                .unwrap_or(false)
        })
        .collect()
}

fn timeframe_cutoff(days: i64) -> DateTime<Utc> {
    Utc::now() - Duration::days(days)
}

fn to_inline_comment(raw: GithubReviewComment) -> InlineComment {
    InlineComment {
        id: raw.id,
        body: raw.body.unwrap_or_default(),
        path: raw.path,
        // Fall back to the original line for comments on outdated diffs.
        line: raw.line.or(raw.original_line),
        diff_hunk: raw.diff_hunk,
        url: raw.html_url.unwrap_or_default(),
        created_at: raw.created_at,
        author: raw.user.map(|u| u.login),
    }
}

/// Replies without a resolvable author are dropped at the boundary.
fn to_reply_comment(raw: GithubIssueComment) -> Option<ReplyComment> {
    let author = raw.user.map(|u| u.login)?;
    Some(ReplyComment {
        id: raw.id,
        author,
        body: raw.body.unwrap_or_default(),
        created_at: raw.created_at,
        url: raw.html_url.unwrap_or_default(),
    })
}
