//! Diff-hunk context extraction.
//!
//! Inline-comment hunks returned by the API can span a whole file;
//! embedding them verbatim makes reports unreadable. Hunks up to
//! [`VERBATIM_MAX_LINES`] lines pass through untouched; longer hunks
//! are reduced to the added/context lines near the commented line,
//! with a head-truncation fallback when no such window exists.

/// Hunks at or below this many lines are emitted verbatim.
const VERBATIM_MAX_LINES: usize = 50;

/// Lines within this distance of the target line are kept.
const CONTEXT_RADIUS: u64 = 10;

/// Raw lines shown when no context window can be built.
const FALLBACK_HEAD_LINES: usize = 25;

/// A reduced code excerpt ready for a fenced Markdown block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HunkExcerpt {
    pub code: String,
    /// Fence tag: the inferred source language for windowed excerpts,
    /// `diff` for raw hunk output.
    pub language: &'static str,
    pub truncated: bool,
}

/// Infer a Markdown fence language tag from a file path.
pub fn language_for_path(path: Option<&str>) -> &'static str {
    let ext = match path.and_then(|p| p.rsplit_once('.')) {
        Some((_, ext)) => ext.to_lowercase(),
        None => return "text",
    };

    match ext.as_str() {
        "js" | "jsx" => "javascript",
        "ts" | "tsx" => "typescript",
        "go" => "go",
        "py" => "python",
        "java" => "java",
        "sql" => "sql",
        "json" => "json",
        "yml" | "yaml" => "yaml",
        "html" => "html",
        "css" => "css",
        _ => "text",
    }
}

/// Reduce `diff_hunk` to the excerpt relevant to `target_line`.
///
/// `target_line` is 1-based and counted over the hunk's added and
/// context lines only; removed lines do not advance it.
pub fn extract_context(
    diff_hunk: &str,
    target_line: Option<u64>,
    path: Option<&str>,
) -> HunkExcerpt {
    let lines: Vec<&str> = diff_hunk.split('\n').collect();

    if lines.len() <= VERBATIM_MAX_LINES {
        return HunkExcerpt {
            code: diff_hunk.to_string(),
            language: "diff",
            truncated: false,
        };
    }

    let mut context_lines: Vec<&str> = Vec::new();
    let mut line_number: u64 = 1;

    for line in &lines {
        if line.starts_with("@@") {
            continue;
        }
        if line.starts_with('+') || line.starts_with(' ') {
            if let Some(target) = target_line {
                if line_number.abs_diff(target) <= CONTEXT_RADIUS {
                    context_lines.push(&line[1..]);
                }
            }
            line_number += 1;
        }
    }

    if !context_lines.is_empty() {
        return HunkExcerpt {
            code: context_lines.join("\n"),
            language: language_for_path(path),
            truncated: true,
        };
    }

    // No reachable window: show the head of the hunk instead.
    let head = lines[..FALLBACK_HEAD_LINES].join("\n");
    HunkExcerpt {
        code: format!("{head}\n..."),
        language: "diff",
        truncated: true,
    }
}
