//! Report rendering for received reviews.
//!
//! `hunk` trims oversized diff hunks down to the lines an inline
//! comment is about; `markdown` merges reviews, inline comments and
//! replies into per-pull-request timelines and renders the report.

mod hunk;
mod markdown;

pub use hunk::{extract_context, language_for_path, HunkExcerpt};
pub use markdown::{render_error_report, render_markdown, MarkdownOptions};
