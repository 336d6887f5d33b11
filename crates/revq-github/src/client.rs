use crate::api::{GithubIssueComment, GithubPullRequest, GithubReview, GithubReviewComment};
use crate::types::PrState;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::debug;

/// Minimum interval between the start of successive API calls.
/// 10 req/s stays comfortably under GitHub's 5000/hour quota.
pub const MIN_CALL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, Error)]
pub enum GithubError {
    #[error("authentication failed (HTTP {status}): check token scope and expiry")]
    Auth { status: u16 },

    #[error("not found: {url}")]
    NotFound { url: String },

    #[error("GitHub API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Rate-limited GitHub API client.
///
/// All calls go through [`GithubClient::get`], which waits out the
/// minimum inter-call interval tracked by a single shared timestamp
/// before sending.
pub struct GithubClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
    min_interval: Duration,
    last_call: Mutex<Option<Instant>>,
}

impl GithubClient {
    pub fn new(token: impl Into<String>) -> Self {
        Self::with_base_url(token, "https://api.github.com")
    }

    pub fn with_base_url(token: impl Into<String>, base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            http: reqwest::Client::new(),
            base_url,
            token: token.into(),
            min_interval: MIN_CALL_INTERVAL,
            last_call: Mutex::new(None),
        }
    }

    /// Override the throttle interval. Intended for tests.
    pub fn set_min_interval(&mut self, interval: Duration) {
        self.min_interval = interval;
    }

    async fn throttle(&self) {
        let mut last_call = self.last_call.lock().await;
        if let Some(previous) = *last_call {
            let elapsed = previous.elapsed();
            if elapsed < self.min_interval {
                tokio::time::sleep(self.min_interval - elapsed).await;
            }
        }
        *last_call = Some(Instant::now());
    }

    fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static("revq/0.3"));
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        if let Ok(value) = HeaderValue::from_str(&format!("Bearer {}", self.token)) {
            headers.insert(AUTHORIZATION, value);
        }
        headers
    }

    async fn get<T: DeserializeOwned>(&self, url: &str) -> Result<T, GithubError> {
        self.throttle().await;
        debug!("GET {}", url);

        let resp = self.http.get(url).headers(self.headers()).send().await?;

        let status = resp.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(GithubError::Auth {
                status: status.as_u16(),
            });
        }
        if status == StatusCode::NOT_FOUND {
            return Err(GithubError::NotFound {
                url: url.to_string(),
            });
        }
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(GithubError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(resp.json().await?)
    }

    pub async fn list_pulls(
        &self,
        owner: &str,
        repo: &str,
        state: PrState,
    ) -> Result<Vec<GithubPullRequest>, GithubError> {
        let url = format!(
            "{}/repos/{}/{}/pulls?state={}&per_page=100",
            self.base_url,
            owner,
            repo,
            state.as_str()
        );
        self.get(&url).await
    }

    pub async fn list_reviews(
        &self,
        owner: &str,
        repo: &str,
        pr_number: u64,
    ) -> Result<Vec<GithubReview>, GithubError> {
        let url = format!(
            "{}/repos/{}/{}/pulls/{}/reviews",
            self.base_url, owner, repo, pr_number
        );
        self.get(&url).await
    }

    pub async fn list_review_comments(
        &self,
        owner: &str,
        repo: &str,
        pr_number: u64,
    ) -> Result<Vec<GithubReviewComment>, GithubError> {
        let url = format!(
            "{}/repos/{}/{}/pulls/{}/comments?per_page=100",
            self.base_url, owner, repo, pr_number
        );
        self.get(&url).await
    }

    pub async fn list_issue_comments(
        &self,
        owner: &str,
        repo: &str,
        pr_number: u64,
    ) -> Result<Vec<GithubIssueComment>, GithubError> {
        let url = format!(
            "{}/repos/{}/{}/issues/{}/comments?per_page=100",
            self.base_url, owner, repo, pr_number
        );
        self.get(&url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_throttle_enforces_min_interval() {
        let mut client = GithubClient::new("token");
        client.set_min_interval(Duration::from_millis(30));

        let start = Instant::now();
        client.throttle().await;
        client.throttle().await;
        client.throttle().await;

        // Two full waits between three calls.
        assert!(start.elapsed() >= Duration::from_millis(60));
    }

    #[tokio::test]
    async fn test_throttle_first_call_is_immediate() {
        let mut client = GithubClient::new("token");
        client.set_min_interval(Duration::from_millis(200));

        let start = Instant::now();
        client.throttle().await;
        assert!(start.elapsed() < Duration::from_millis(100));
    }

    #[test]
    fn test_base_url_trailing_slash_stripped() {
        let client = GithubClient::with_base_url("token", "https://api.github.com/");
        assert_eq!(client.base_url, "https://api.github.com");
    }
}
