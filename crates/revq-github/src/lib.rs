//! GitHub review retrieval and aggregation.
//!
//! Fetches the reviews a user received on their pull requests in one
//! repository and normalizes them into the closed model in [`types`]:
//! raw API shapes are validated and coerced at the aggregation
//! boundary so downstream consumers never see wire types.

mod aggregate;
mod api;
mod client;
mod stats;
mod types;

pub use aggregate::{ReviewTracker, TrackError};
pub use api::{
    GithubIssueComment, GithubPullRequest, GithubReview, GithubReviewComment, GithubUser,
};
pub use client::{GithubClient, GithubError, MIN_CALL_INTERVAL};
pub use stats::compute_stats;
pub use types::{
    FetchOptions, InlineComment, PrState, ReplyComment, ReviewRecord, ReviewState,
    ReviewStats, ReviewsResponse, StateCounts,
};
