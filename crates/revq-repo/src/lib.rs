//! Best-effort discovery of the GitHub repository a directory belongs to.
//!
//! Reads `.git/config` as plain text and extracts the `origin` remote
//! URL. This is a heuristic, not a git client: any missing file,
//! unparseable stanza or unrecognized URL shape yields `None`.

use regex::Regex;
use std::fmt;
use std::fs;
use std::path::Path;

/// An `owner/name` pair identifying a remote repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRef {
    pub owner: String,
    pub name: String,
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Resolve the repository for `dir` from its `.git/config`.
pub fn resolve_repository(dir: &Path) -> Option<RepoRef> {
    let config_path = dir.join(".git").join("config");
    let content = fs::read_to_string(config_path).ok()?;
    let url = origin_url(&content)?;
    parse_remote_url(url.trim())
}

/// Extract the `url = ...` line of the `[remote "origin"]` stanza.
fn origin_url(config: &str) -> Option<String> {
    let re = Regex::new(r#"(?s)\[remote "origin"\].*?url\s*=\s*([^\r\n]+)"#).unwrap();
    re.captures(config)
        .map(|caps| caps[1].trim().to_string())
}

/// Parse an SSH (`git@host:owner/repo(.git)?`) or HTTPS
/// (`https://host/owner/repo(.git)?`) remote URL.
pub fn parse_remote_url(url: &str) -> Option<RepoRef> {
    let ssh = Regex::new(r"^git@[^:/]+:(.+)/(.+?)(?:\.git)?$").unwrap();
    let https = Regex::new(r"^https://[^/]+/(.+)/(.+?)(?:\.git)?$").unwrap();

    let caps = ssh.captures(url).or_else(|| https.captures(url))?;

    Some(RepoRef {
        owner: caps[1].to_string(),
        name: caps[2].to_string(),
    })
}
