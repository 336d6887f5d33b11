use crate::cli::{Cli, Command};
use crate::{output, sanitize};
use anyhow::{Context, Result};
use chrono::Local;
use revq_core::Config;
use revq_github::{FetchOptions, GithubClient, PrState, ReviewTracker, TrackError};
use revq_report::{render_error_report, render_markdown, MarkdownOptions};
use std::fs;
use tracing::warn;

pub async fn execute(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Reviews {
            username,
            token,
            org,
            state,
            page,
            limit,
            days,
            json,
            markdown,
        } => {
            cmd_reviews(
                &username, token, org, &state, page, limit, days, json, markdown,
            )
            .await
        }
        Command::Stats {
            username,
            token,
            org,
            days,
            json,
        } => cmd_stats(&username, token, org, days, json).await,
    }
}

#[allow(clippy::too_many_arguments)]
async fn cmd_reviews(
    username: &str,
    token: Option<String>,
    org: Option<String>,
    state: &str,
    page: u32,
    limit: u32,
    days: Option<i64>,
    json: bool,
    markdown: Option<String>,
) -> Result<()> {
    require_valid_username(username);

    let config = load_config();
    let token = resolve_token(token, &config);
    let state: PrState = state.parse().map_err(|e: String| anyhow::anyhow!(e))?;

    let tracker = ReviewTracker::with_client(GithubClient::with_base_url(
        token,
        &config.github.api_url,
    ));
    let options = FetchOptions {
        state,
        per_page: limit,
        page,
        org,
        timeframe_days: days,
    };

    match tracker.received_reviews(username, &options).await {
        Ok(result) => {
            if let Some(filename) = markdown {
                let path = require_markdown_path(&filename);
                let report = render_markdown(
                    &result.reviews,
                    username,
                    &MarkdownOptions {
                        title: Some(report_title(username)),
                        include_stats: true,
                    },
                    Local::now(),
                );
                fs::write(&path, report)
                    .with_context(|| format!("failed to write {}", path.display()))?;
                println!("✅ Markdown report written to {}", path.display());
                println!("📊 Total reviews: {}", result.total_count);
            } else if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                output::print_reviews(&result, username);
            }
            Ok(())
        }
        Err(e) => {
            let message = describe_error(&e);

            // A fatal fetch with --markdown still produces a
            // best-effort report documenting the failure.
            if let Some(filename) = markdown {
                if let Some(path) = sanitize::validate_markdown_path(&filename) {
                    let report = render_error_report(
                        username,
                        &report_title(username),
                        &message,
                        Local::now(),
                    );
                    if fs::write(&path, report).is_ok() {
                        println!("✅ Error report written to {}", path.display());
                    }
                }
                eprintln!("❌ Error: {message}");
                return Ok(());
            }

            Err(anyhow::anyhow!(message))
        }
    }
}

async fn cmd_stats(
    username: &str,
    token: Option<String>,
    org: Option<String>,
    days: Option<i64>,
    json: bool,
) -> Result<()> {
    require_valid_username(username);

    let config = load_config();
    let token = resolve_token(token, &config);

    let tracker = ReviewTracker::with_client(GithubClient::with_base_url(
        token,
        &config.github.api_url,
    ));
    let options = FetchOptions {
        org,
        timeframe_days: days,
        ..FetchOptions::default()
    };

    match tracker.review_stats(username, &options).await {
        Ok(stats) => {
            if json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                output::print_stats(&stats, username);
            }
            Ok(())
        }
        Err(e) => Err(anyhow::anyhow!(describe_error(&e))),
    }
}

fn report_title(username: &str) -> String {
    format!("Reviews received by {username}")
}

fn require_valid_username(username: &str) {
    if !sanitize::validate_username(username) {
        eprintln!(
            "❌ Invalid GitHub username: alphanumeric characters and single hyphens only, 39 characters max."
        );
        std::process::exit(2);
    }
}

fn require_markdown_path(filename: &str) -> std::path::PathBuf {
    match sanitize::validate_markdown_path(filename) {
        Some(path) => path,
        None => {
            eprintln!(
                "❌ Invalid output filename: alphanumeric characters, hyphens, underscores and dots only."
            );
            std::process::exit(1);
        }
    }
}

fn load_config() -> Config {
    match Config::load() {
        Ok(config) => config,
        Err(e) => {
            warn!("ignoring config file: {e}");
            Config::default()
        }
    }
}

/// Token precedence: --token / GITHUB_TOKEN (folded by clap), then the
/// config file. Missing everywhere is a setup error, not a bug.
fn resolve_token(cli_token: Option<String>, config: &Config) -> String {
    if let Some(token) = cli_token.or_else(|| config.github.token.clone()) {
        return token;
    }

    eprintln!("❌ GitHub token is required!");
    eprintln!();
    eprintln!("🔧 Setup instructions:");
    eprintln!("1. Get a token: https://github.com/settings/tokens");
    if let Some(path) = Config::default_path() {
        eprintln!("2. Add it under [github] in {}", path.display());
    } else {
        eprintln!("2. Add it under [github] in the revq config file");
    }
    eprintln!("3. Or export GITHUB_TOKEN, or pass --token");
    std::process::exit(1);
}

/// Fatal errors carry their own user-facing message; transport errors
/// are scrubbed before display.
fn describe_error(error: &TrackError) -> String {
    match error {
        TrackError::Fetch(inner) => sanitize::sanitize_error(&inner.to_string()),
        other => other.to_string(),
    }
}
