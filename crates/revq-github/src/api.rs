//! GitHub REST API response shapes, limited to the fields we consume.

use crate::types::ReviewState;
use chrono::{DateTime, Utc};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct GithubUser {
    pub login: String,
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GithubPullRequest {
    pub number: u64,
    pub title: String,
    pub html_url: String,
    pub user: Option<GithubUser>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GithubReview {
    pub id: u64,
    pub user: Option<GithubUser>,
    pub state: ReviewState,
    pub body: Option<String>,
    pub html_url: Option<String>,
    /// Absent for reviews that were never submitted (PENDING).
    pub submitted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GithubReviewComment {
    pub id: u64,
    pub user: Option<GithubUser>,
    pub body: Option<String>,
    pub path: Option<String>,
    pub line: Option<u64>,
    pub original_line: Option<u64>,
    pub diff_hunk: Option<String>,
    pub html_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub pull_request_review_id: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GithubIssueComment {
    pub id: u64,
    pub user: Option<GithubUser>,
    pub body: Option<String>,
    pub html_url: Option<String>,
    pub created_at: DateTime<Utc>,
}
