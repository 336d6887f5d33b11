//! Input validation and error-message scrubbing for the CLI surface.

use regex::Regex;
use std::path::PathBuf;

/// Validate a GitHub username: alphanumeric and single hyphens, no
/// leading or trailing hyphen, at most 39 characters.
pub fn validate_username(username: &str) -> bool {
    if username.is_empty() || username.contains("--") {
        return false;
    }
    let re = Regex::new(r"^[a-zA-Z0-9]([a-zA-Z0-9-]{0,37}[a-zA-Z0-9])?$").unwrap();
    re.is_match(username)
}

/// Sanitize a user-supplied Markdown filename and pin it to the
/// current working directory. Returns `None` when no safe name can be
/// derived.
pub fn validate_markdown_path(input: &str) -> Option<PathBuf> {
    if input.is_empty() {
        return None;
    }

    let sanitized = input.replace(['/', '\\'], "_").replace("..", "_");

    // Never overwrite well-known project files.
    const FORBIDDEN: &[&str] = &["package.json", "Cargo.toml", "README.md", ".env"];
    if FORBIDDEN.contains(&sanitized.as_str()) {
        return None;
    }

    let filename = if sanitized.ends_with(".md") {
        sanitized
    } else {
        format!("{sanitized}.md")
    };

    let re = Regex::new(r"^[a-zA-Z0-9._-]+\.md$").unwrap();
    if !re.is_match(&filename) || FORBIDDEN.contains(&filename.as_str()) {
        return None;
    }

    std::env::current_dir().ok().map(|cwd| cwd.join(filename))
}

/// Scrub URLs, paths and token-like strings out of an error message
/// and map well-known HTTP failures to fixed human-readable lines.
pub fn sanitize_error(error: &str) -> String {
    let sanitized = mask_sensitive(error);

    if sanitized.contains("401") {
        return "GitHub token is invalid or expired.".to_string();
    }
    if sanitized.contains("403") {
        return "GitHub token lacks permission or the rate limit was reached.".to_string();
    }
    if sanitized.contains("404") {
        return "The requested user or repository was not found.".to_string();
    }
    if sanitized.contains("dns error") || sanitized.contains("connection refused") {
        return "Network connection error; check your internet connection.".to_string();
    }

    let truncated = if sanitized.chars().count() > 100 {
        let head: String = sanitized.chars().take(100).collect();
        format!("{head}...")
    } else {
        sanitized
    };
    format!("Request failed: {truncated}")
}

fn mask_sensitive(message: &str) -> String {
    let url = Regex::new(r"https?://\S+").unwrap();
    let token_kv = Regex::new(r"(?i)(token|key|password)[=:]\s*\S+").unwrap();
    let token_blob = Regex::new(r"\b[A-Za-z0-9+/]{40,}={0,2}\b").unwrap();
    let unix_path = Regex::new(r"/[\w./-]+").unwrap();

    let masked = url.replace_all(message, "[URL]");
    let masked = token_kv.replace_all(&masked, "$1=[HIDDEN]");
    let masked = token_blob.replace_all(&masked, "[TOKEN]");
    unix_path.replace_all(&masked, "[PATH]").to_string()
}
