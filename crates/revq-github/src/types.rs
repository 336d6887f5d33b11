use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Review verdict as reported by GitHub.
///
/// GitHub's wire value is an open string; anything outside the known
/// set (e.g. `PENDING`) lands in `Unknown` so display mappings always
/// have a real default arm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReviewState {
    #[serde(rename = "APPROVED")]
    Approved,
    #[serde(rename = "CHANGES_REQUESTED")]
    ChangesRequested,
    #[serde(rename = "COMMENTED")]
    Commented,
    #[serde(rename = "DISMISSED")]
    Dismissed,
    #[serde(other, rename = "UNKNOWN")]
    Unknown,
}

impl ReviewState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReviewState::Approved => "APPROVED",
            ReviewState::ChangesRequested => "CHANGES_REQUESTED",
            ReviewState::Commented => "COMMENTED",
            ReviewState::Dismissed => "DISMISSED",
            ReviewState::Unknown => "UNKNOWN",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            ReviewState::Approved => "✅",
            ReviewState::ChangesRequested => "🔄",
            ReviewState::Commented => "💬",
            ReviewState::Dismissed => "❌",
            ReviewState::Unknown => "❓",
        }
    }
}

impl fmt::Display for ReviewState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pull request state filter for the primary listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PrState {
    Open,
    Closed,
    #[default]
    All,
}

impl PrState {
    pub fn as_str(&self) -> &'static str {
        match self {
            PrState::Open => "open",
            PrState::Closed => "closed",
            PrState::All => "all",
        }
    }
}

impl FromStr for PrState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(PrState::Open),
            "closed" => Ok(PrState::Closed),
            "all" => Ok(PrState::All),
            other => Err(format!("invalid PR state: {other} (expected open, closed or all)")),
        }
    }
}

/// One review received on one pull request, with its inline comments
/// and the pull request's conversation replies attached.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewRecord {
    pub pr_title: String,
    pub pr_number: u64,
    pub pr_url: String,
    /// `owner/name` of the repository the pull request lives in.
    pub repository: String,
    pub reviewer: String,
    pub reviewer_avatar: String,
    pub state: ReviewState,
    pub submitted_at: DateTime<Utc>,
    pub body: String,
    pub review_url: String,
    #[serde(default)]
    pub comments: Vec<InlineComment>,
    #[serde(default)]
    pub reply_comments: Vec<ReplyComment>,
}

/// A comment anchored to a diff line, belonging to exactly one review.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InlineComment {
    pub id: u64,
    pub body: String,
    pub path: Option<String>,
    pub line: Option<u64>,
    pub diff_hunk: Option<String>,
    pub url: String,
    pub created_at: DateTime<Utc>,
    pub author: Option<String>,
}

/// An issue-style conversation reply on the pull request, not tied to
/// a diff line or a specific review.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplyComment {
    pub id: u64,
    pub author: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub url: String,
}

/// Request options for a review fetch.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    pub state: PrState,
    pub per_page: u32,
    pub page: u32,
    pub org: Option<String>,
    /// Keep only reviews submitted within this many days of now.
    pub timeframe_days: Option<i64>,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            state: PrState::All,
            per_page: 30,
            page: 1,
            org: None,
            timeframe_days: None,
        }
    }
}

/// Review fetch result. `page`/`per_page` echo the request; the review
/// list itself is fully materialized and never re-sliced.
#[derive(Debug, Clone, Serialize)]
pub struct ReviewsResponse {
    pub reviews: Vec<ReviewRecord>,
    pub total_count: usize,
    pub page: u32,
    pub per_page: u32,
}

/// Counts per user-facing review state. DISMISSED and unknown states
/// count toward the total only.
#[derive(Debug, Clone, Default, Serialize)]
pub struct StateCounts {
    pub approved: usize,
    pub changes_requested: usize,
    pub commented: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReviewStats {
    pub total_reviews: usize,
    pub by_state: StateCounts,
    pub by_reviewer: BTreeMap<String, usize>,
    pub by_repository: BTreeMap<String, usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_review_state_round_trip() {
        let state: ReviewState = serde_json::from_str("\"APPROVED\"").unwrap();
        assert_eq!(state, ReviewState::Approved);
        assert_eq!(serde_json::to_string(&state).unwrap(), "\"APPROVED\"");
    }

    #[test]
    fn test_review_state_unknown_catch_all() {
        let state: ReviewState = serde_json::from_str("\"PENDING\"").unwrap();
        assert_eq!(state, ReviewState::Unknown);
        assert_eq!(state.emoji(), "❓");
    }

    #[test]
    fn test_pr_state_parse() {
        assert_eq!("open".parse::<PrState>().unwrap(), PrState::Open);
        assert_eq!("all".parse::<PrState>().unwrap(), PrState::All);
        assert!("merged".parse::<PrState>().is_err());
    }

    #[test]
    fn test_fetch_options_defaults() {
        let options = FetchOptions::default();
        assert_eq!(options.state, PrState::All);
        assert_eq!(options.per_page, 30);
        assert_eq!(options.page, 1);
        assert_eq!(options.timeframe_days, None);
    }
}
