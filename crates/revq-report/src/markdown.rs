use crate::hunk;
use chrono::{DateTime, Local, Utc};
use revq_github::{compute_stats, InlineComment, ReplyComment, ReviewRecord};
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone)]
pub struct MarkdownOptions {
    pub title: Option<String>,
    pub include_stats: bool,
}

impl Default for MarkdownOptions {
    fn default() -> Self {
        Self {
            title: None,
            include_stats: true,
        }
    }
}

const DEFAULT_TITLE: &str = "Received Reviews Report";
const TITLE_BUDGET: usize = 30;

/// Reviews grouped under one pull request, most recent review first.
struct PullRequestGroup<'a> {
    pr_title: &'a str,
    pr_url: &'a str,
    repository: &'a str,
    pr_number: u64,
    reviews: Vec<&'a ReviewRecord>,
}

/// One entry of a pull request's merged conversation timeline.
enum TimelineEntry<'a> {
    Review(&'a ReviewRecord),
    Comment(&'a InlineComment),
    Reply(&'a ReplyComment),
}

impl TimelineEntry<'_> {
    fn created_at(&self) -> DateTime<Utc> {
        match self {
            TimelineEntry::Review(review) => review.submitted_at,
            TimelineEntry::Comment(comment) => comment.created_at,
            TimelineEntry::Reply(reply) => reply.created_at,
        }
    }
}

/// Render the full Markdown report.
///
/// Pure except for `now`, which only feeds the "generated" stamp:
/// rendering the same collection with the same `now` is byte-stable.
pub fn render_markdown(
    reviews: &[ReviewRecord],
    username: &str,
    options: &MarkdownOptions,
    now: DateTime<Local>,
) -> String {
    let title = options.title.as_deref().unwrap_or(DEFAULT_TITLE);

    let mut md = String::new();
    md.push_str(&format!("# {title}\n\n"));
    md.push_str(&format!("**Generated:** {}\n", now.format("%Y-%m-%d")));
    md.push_str(&format!("**User:** {username}\n"));
    md.push_str(&format!("**Total reviews:** {}\n\n", reviews.len()));

    if options.include_stats && !reviews.is_empty() {
        let stats = compute_stats(reviews);
        md.push_str("## 📊 Statistics\n\n");
        md.push_str(&format!("- ✅ Approved: {}\n", stats.by_state.approved));
        md.push_str(&format!(
            "- 🔄 Changes requested: {}\n",
            stats.by_state.changes_requested
        ));
        md.push_str(&format!("- 💬 Commented: {}\n\n", stats.by_state.commented));
    }

    if reviews.is_empty() {
        md.push_str("## 📝 Reviews\n\n");
        md.push_str("No reviews found.\n");
        return md;
    }

    let groups = group_by_pull_request(reviews);

    md.push_str("## 📋 Table of Contents\n\n");
    md.push_str("### Pull Requests\n\n");
    for group in &groups {
        md.push_str(&format!(
            "- [{}](#{}) - **{} reviews** ({}#{})\n",
            group.pr_title,
            pr_anchor(group.repository, group.pr_number),
            group.reviews.len(),
            group.repository,
            group.pr_number
        ));
    }
    md.push('\n');

    md.push_str("### Reviews\n\n");
    for group in &groups {
        md.push_str(&format!("#### {}\n\n", group.pr_title));
        for review in dedup_reviews(&group.reviews) {
            md.push_str(&format!(
                "- {} [{}: {}](#{}) _({})_\n",
                review.state.emoji(),
                review.reviewer,
                review_title(review),
                review_anchor(group.repository, group.pr_number, review),
                review.submitted_at.format("%Y-%m-%d")
            ));
        }
        md.push('\n');
    }

    md.push_str("## 📝 Review Details\n\n");
    for group in &groups {
        render_group(&mut md, group, username);
    }

    md
}

/// Best-effort report written when aggregation fails fatally.
pub fn render_error_report(username: &str, title: &str, error: &str, now: DateTime<Local>) -> String {
    let mut md = String::new();
    md.push_str(&format!("# {title}\n\n"));
    md.push_str(&format!("**Generated:** {}\n", now.format("%Y-%m-%d")));
    md.push_str(&format!("**User:** {username}\n\n"));
    md.push_str("## ❌ Error\n\n");
    md.push_str(&format!("Fetching review data failed:\n{error}\n\n"));
    md.push_str("## 💡 Remediation\n\n");
    md.push_str("1. Check that the GitHub username is correct\n");
    md.push_str("2. Check the token's permissions and expiry\n");
    md.push_str("3. Check that you are inside a repository you have access to\n");
    md
}

fn group_by_pull_request(reviews: &[ReviewRecord]) -> Vec<PullRequestGroup<'_>> {
    let mut order: Vec<String> = Vec::new();
    let mut by_key: HashMap<String, PullRequestGroup<'_>> = HashMap::new();

    for review in reviews {
        let key = format!("{}#{}", review.repository, review.pr_number);
        by_key
            .entry(key.clone())
            .or_insert_with(|| {
                order.push(key);
                PullRequestGroup {
                    pr_title: &review.pr_title,
                    pr_url: &review.pr_url,
                    repository: &review.repository,
                    pr_number: review.pr_number,
                    reviews: Vec::new(),
                }
            })
            .reviews
            .push(review);
    }

    let mut groups: Vec<PullRequestGroup<'_>> = order
        .iter()
        .filter_map(|key| by_key.remove(key))
        .collect();

    // Input is sorted newest-first, so each group's first review is
    // its most recent one.
    groups.sort_by(|a, b| b.reviews[0].submitted_at.cmp(&a.reviews[0].submitted_at));
    groups
}

/// Collapse exact duplicates that relisting can produce.
fn dedup_reviews<'a>(reviews: &[&'a ReviewRecord]) -> Vec<&'a ReviewRecord> {
    let mut seen: HashSet<(String, DateTime<Utc>)> = HashSet::new();
    let mut unique = Vec::new();
    for review in reviews {
        if seen.insert((review.reviewer.clone(), review.submitted_at)) {
            unique.push(*review);
        }
    }
    unique.sort_by_key(|review| review.submitted_at);
    unique
}

/// Interleave a group's reviews, inline comments and replies into one
/// ascending timeline. Replies are attached to every review by the
/// fetch, so they are deduplicated by id; replies by the subject are
/// dropped.
fn build_timeline<'a>(
    reviews: &[&'a ReviewRecord],
    username: &str,
) -> Vec<TimelineEntry<'a>> {
    let mut entries: Vec<TimelineEntry<'a>> = Vec::new();
    let mut seen_replies: HashSet<u64> = HashSet::new();

    for review in reviews {
        entries.push(TimelineEntry::Review(review));
        for comment in &review.comments {
            entries.push(TimelineEntry::Comment(comment));
        }
        for reply in &review.reply_comments {
            // Login casing varies between invocations.
            if reply.author.eq_ignore_ascii_case(username) || !seen_replies.insert(reply.id) {
                continue;
            }
            entries.push(TimelineEntry::Reply(reply));
        }
    }

    entries.sort_by_key(|entry| entry.created_at());
    entries
}

fn render_group(md: &mut String, group: &PullRequestGroup<'_>, username: &str) {
    md.push_str(&format!(
        "### <a id=\"{}\"></a>[{}]({}) (#{})\n\n",
        pr_anchor(group.repository, group.pr_number),
        group.pr_title,
        group.pr_url,
        group.pr_number
    ));
    md.push_str(&format!("**Repository:** {}\n\n", group.repository));

    let unique = dedup_reviews(&group.reviews);
    for entry in build_timeline(&unique, username) {
        match entry {
            TimelineEntry::Review(review) => render_review(md, group, review),
            TimelineEntry::Comment(comment) => render_comment(md, group, comment),
            TimelineEntry::Reply(reply) => render_reply(md, group, reply),
        }
        md.push_str("---\n\n");
    }
}

fn render_review(md: &mut String, group: &PullRequestGroup<'_>, review: &ReviewRecord) {
    md.push_str(&format!(
        "#### <a id=\"{}\"></a>{} {} by [@{}](https://github.com/{})\n\n",
        review_anchor(group.repository, group.pr_number, review),
        review.state.emoji(),
        review.state,
        review.reviewer,
        review.reviewer
    ));
    md.push_str(&format!(
        "**Date:** {}\n\n",
        review.submitted_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));

    if !review.body.trim().is_empty() {
        md.push_str(&format!("**Comment:**\n> {}\n\n", blockquote(&review.body)));
    }

    if !review.review_url.is_empty() {
        md.push_str(&format!("**[📖 View review]({})**\n\n", review.review_url));
    }
}

fn render_comment(md: &mut String, group: &PullRequestGroup<'_>, comment: &InlineComment) {
    let author = comment.author.as_deref().unwrap_or("unknown");
    md.push_str(&format!(
        "#### <a id=\"{}\"></a>💬 Inline comment by @{}\n\n",
        comment_anchor(group.repository, group.pr_number, comment.id),
        author
    ));
    md.push_str(&format!(
        "**Date:** {}\n\n",
        comment.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));

    if let Some(path) = &comment.path {
        match comment.line {
            Some(line) => md.push_str(&format!("**📁 {path}:{line}**\n\n")),
            None => md.push_str(&format!("**📁 {path}**\n\n")),
        }
    }

    if let Some(diff_hunk) = &comment.diff_hunk {
        let excerpt = hunk::extract_context(diff_hunk, comment.line, comment.path.as_deref());
        md.push_str(&format!(
            "```{}\n{}\n```\n\n",
            excerpt.language, excerpt.code
        ));
    }

    md.push_str(&format!("> 💬 {}\n\n", blockquote(&comment.body)));

    if !comment.url.is_empty() {
        md.push_str(&format!("[🔗 View comment]({})\n\n", comment.url));
    }
}

fn render_reply(md: &mut String, group: &PullRequestGroup<'_>, reply: &ReplyComment) {
    md.push_str(&format!(
        "#### <a id=\"{}\"></a>↩️ Reply by [@{}](https://github.com/{})\n\n",
        reply_anchor(group.repository, group.pr_number, reply.id),
        reply.author,
        reply.author
    ));
    md.push_str(&format!(
        "**Date:** {}\n\n",
        reply.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    md.push_str(&format!("> {}\n\n", blockquote(&reply.body)));

    if !reply.url.is_empty() {
        md.push_str(&format!("[🔗 View comment]({})\n\n", reply.url));
    }
}

/// TOC title for a review: first line of the body, else the first
/// inline comment, else a generic state label.
fn review_title(review: &ReviewRecord) -> String {
    if !review.body.trim().is_empty() {
        let first_line = review.body.lines().next().unwrap_or("");
        return clip(first_line, review.body.chars().count());
    }

    if let Some(comment) = review.comments.first() {
        if !comment.body.is_empty() {
            let first_line = comment.body.lines().next().unwrap_or("");
            return clip(first_line, comment.body.chars().count());
        }
    }

    format!("{} review", review.state)
}

fn clip(text: &str, full_len: usize) -> String {
    let mut clipped: String = text.chars().take(TITLE_BUDGET).collect();
    if full_len > TITLE_BUDGET {
        clipped.push_str("...");
    }
    clipped
}

fn blockquote(text: &str) -> String {
    text.replace('\n', "\n> ")
}

fn pr_anchor(repository: &str, pr_number: u64) -> String {
    format!("pr-{}-{}", repository.replace('/', "-"), pr_number)
}

fn review_anchor(repository: &str, pr_number: u64, review: &ReviewRecord) -> String {
    format!(
        "review-{}-{}-{}-{}",
        repository.replace('/', "-"),
        pr_number,
        review.reviewer,
        review.submitted_at.timestamp()
    )
}

fn comment_anchor(repository: &str, pr_number: u64, id: u64) -> String {
    format!("comment-{}-{}-{}", repository.replace('/', "-"), pr_number, id)
}

fn reply_anchor(repository: &str, pr_number: u64, id: u64) -> String {
    format!("reply-{}-{}-{}", repository.replace('/', "-"), pr_number, id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use revq_github::ReviewState;

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 11, day, hour, 0, 0).unwrap()
    }

    fn now() -> DateTime<Local> {
        Utc.with_ymd_and_hms(2024, 12, 1, 9, 0, 0).unwrap().into()
    }

    fn review(reviewer: &str, pr_number: u64, submitted_at: DateTime<Utc>) -> ReviewRecord {
        ReviewRecord {
            pr_title: format!("Improve feature {pr_number}"),
            pr_number,
            pr_url: format!("https://github.com/o/r/pull/{pr_number}"),
            repository: "o/r".to_string(),
            reviewer: reviewer.to_string(),
            reviewer_avatar: String::new(),
            state: ReviewState::Commented,
            submitted_at,
            body: "Looks mostly fine".to_string(),
            review_url: format!("https://github.com/o/r/pull/{pr_number}#review"),
            comments: vec![],
            reply_comments: vec![],
        }
    }

    fn inline_comment(id: u64, body: &str, created_at: DateTime<Utc>) -> InlineComment {
        InlineComment {
            id,
            body: body.to_string(),
            path: Some("src/lib.rs".to_string()),
            line: Some(12),
            diff_hunk: Some("@@ -1,2 +1,3 @@\n context\n+added".to_string()),
            url: format!("https://github.com/o/r/pull/1#discussion_r{id}"),
            created_at,
            author: Some("alice".to_string()),
        }
    }

    fn reply(id: u64, author: &str, created_at: DateTime<Utc>) -> ReplyComment {
        ReplyComment {
            id,
            author: author.to_string(),
            body: "thanks, fixed".to_string(),
            created_at,
            url: format!("https://github.com/o/r/pull/1#issuecomment-{id}"),
        }
    }

    #[test]
    fn test_empty_collection_has_no_toc() {
        let md = render_markdown(&[], "octocat", &MarkdownOptions::default(), now());
        assert!(md.contains("# Received Reviews Report"));
        assert!(md.contains("**Total reviews:** 0"));
        assert!(md.contains("No reviews found."));
        assert!(!md.contains("Table of Contents"));
        assert!(!md.contains("Statistics"));
    }

    #[test]
    fn test_stats_block_present_and_optional() {
        let reviews = vec![review("alice", 1, at(17, 12))];
        let md = render_markdown(&reviews, "octocat", &MarkdownOptions::default(), now());
        assert!(md.contains("## 📊 Statistics"));
        assert!(md.contains("- 💬 Commented: 1"));

        let options = MarkdownOptions {
            title: Some("Custom title".to_string()),
            include_stats: false,
        };
        let md = render_markdown(&reviews, "octocat", &options, now());
        assert!(md.starts_with("# Custom title\n"));
        assert!(!md.contains("## 📊 Statistics"));
    }

    #[test]
    fn test_toc_title_falls_back_to_first_inline_comment() {
        let mut r = review("alice", 1, at(17, 12));
        r.body = String::new();
        r.comments = vec![inline_comment(5, "fix this", at(17, 13))];

        let md = render_markdown(&[r], "octocat", &MarkdownOptions::default(), now());
        assert!(md.contains("[alice: fix this](#review-o-r-1-alice-"));
        assert!(!md.contains("COMMENTED review"));
    }

    #[test]
    fn test_toc_title_clips_multiline_comment_to_first_line() {
        let mut r = review("alice", 1, at(17, 12));
        r.body = String::new();
        r.comments = vec![inline_comment(5, "fix this\nand explain why below", at(17, 13))];

        let md = render_markdown(&[r], "octocat", &MarkdownOptions::default(), now());
        assert!(md.contains("[alice: fix this](#review-o-r-1-alice-"));
        assert!(!md.contains("fix this\nand explain"));
    }

    #[test]
    fn test_toc_title_generic_label_when_nothing_else() {
        let mut r = review("alice", 1, at(17, 12));
        r.body = String::new();

        let md = render_markdown(&[r], "octocat", &MarkdownOptions::default(), now());
        assert!(md.contains("[alice: COMMENTED review]"));
    }

    #[test]
    fn test_toc_title_truncated_to_budget() {
        let mut r = review("alice", 1, at(17, 12));
        r.body = "This review body is much longer than thirty characters".to_string();

        let md = render_markdown(&[r], "octocat", &MarkdownOptions::default(), now());
        assert!(md.contains("[alice: This review body is much longe...]"));
    }

    #[test]
    fn test_duplicate_reviews_collapse() {
        let reviews = vec![
            review("alice", 1, at(17, 12)),
            review("alice", 1, at(17, 12)),
        ];

        let md = render_markdown(&reviews, "octocat", &MarkdownOptions::default(), now());
        let occurrences = md.matches("COMMENTED by [@alice]").count();
        assert_eq!(occurrences, 1);
    }

    #[test]
    fn test_timeline_is_chronological() {
        let mut early = review("alice", 1, at(10, 9));
        early.comments = vec![inline_comment(5, "inline note", at(16, 8))];
        early.reply_comments = vec![reply(90, "alice", at(12, 10))];
        let late = review("bob", 1, at(15, 9));

        let md = render_markdown(
            &[late.clone(), early.clone()],
            "octocat",
            &MarkdownOptions::default(),
            now(),
        );

        let details = md.split("## 📝 Review Details").nth(1).unwrap();
        let alice_review = details.find("COMMENTED by [@alice]").unwrap();
        let alice_reply = details.find("↩️ Reply by [@alice]").unwrap();
        let bob_review = details.find("COMMENTED by [@bob]").unwrap();
        let inline = details.find("💬 Inline comment by @alice").unwrap();

        assert!(alice_review < alice_reply);
        assert!(alice_reply < bob_review);
        assert!(bob_review < inline);
    }

    #[test]
    fn test_replies_by_subject_are_excluded_and_deduped() {
        let mut r1 = review("alice", 1, at(10, 9));
        r1.reply_comments = vec![reply(90, "octocat", at(11, 9)), reply(91, "bob", at(12, 9))];
        let mut r2 = review("bob", 1, at(13, 9));
        // The same PR-level replies arrive attached to every review.
        r2.reply_comments = r1.reply_comments.clone();

        let md = render_markdown(&[r2, r1], "octocat", &MarkdownOptions::default(), now());
        assert!(!md.contains("Reply by [@octocat]"));
        assert_eq!(md.matches("Reply by [@bob]").count(), 1);
    }

    #[test]
    fn test_subject_replies_excluded_regardless_of_login_casing() {
        let mut r = review("alice", 1, at(10, 9));
        r.reply_comments = vec![reply(90, "OctoCat", at(11, 9)), reply(91, "bob", at(12, 9))];

        let md = render_markdown(&[r], "octocat", &MarkdownOptions::default(), now());
        assert!(!md.contains("Reply by [@OctoCat]"));
        assert!(md.contains("Reply by [@bob]"));
    }

    #[test]
    fn test_groups_ordered_by_most_recent_review() {
        let reviews = vec![
            review("alice", 2, at(20, 9)),
            review("bob", 1, at(10, 9)),
        ];

        let md = render_markdown(&reviews, "octocat", &MarkdownOptions::default(), now());
        let pr2 = md.find("Improve feature 2").unwrap();
        let pr1 = md.find("Improve feature 1").unwrap();
        assert!(pr2 < pr1);
    }

    #[test]
    fn test_anchors_unique() {
        let mut r1 = review("alice", 1, at(10, 9));
        r1.comments = vec![inline_comment(5, "a", at(10, 10)), inline_comment(6, "b", at(10, 11))];
        r1.reply_comments = vec![reply(90, "bob", at(10, 12))];
        let r2 = review("alice", 1, at(11, 9));
        let r3 = review("alice", 2, at(12, 9));

        let md = render_markdown(&[r3, r2, r1], "octocat", &MarkdownOptions::default(), now());

        let mut anchors = Vec::new();
        for part in md.split("<a id=\"").skip(1) {
            let anchor = part.split('"').next().unwrap();
            anchors.push(anchor.to_string());
        }
        let unique: HashSet<&String> = anchors.iter().collect();
        assert!(!anchors.is_empty());
        assert_eq!(anchors.len(), unique.len());
    }

    #[test]
    fn test_toc_anchors_resolve_to_details() {
        let reviews = vec![review("alice", 1, at(10, 9))];
        let md = render_markdown(&reviews, "octocat", &MarkdownOptions::default(), now());

        for part in md.split("](#").skip(1) {
            let anchor = part.split(')').next().unwrap();
            assert!(
                md.contains(&format!("<a id=\"{anchor}\">")),
                "unresolved anchor {anchor}"
            );
        }
    }

    #[test]
    fn test_render_is_deterministic() {
        let mut r1 = review("alice", 1, at(10, 9));
        r1.comments = vec![inline_comment(5, "note", at(10, 10))];
        let r2 = review("bob", 2, at(12, 9));
        let reviews = vec![r2, r1];

        let stamp = now();
        let first = render_markdown(&reviews, "octocat", &MarkdownOptions::default(), stamp);
        let second = render_markdown(&reviews, "octocat", &MarkdownOptions::default(), stamp);
        assert_eq!(first, second);
    }

    #[test]
    fn test_inline_comment_rendering() {
        let mut r = review("alice", 1, at(10, 9));
        r.comments = vec![inline_comment(5, "tighten this loop", at(10, 10))];

        let md = render_markdown(&[r], "octocat", &MarkdownOptions::default(), now());
        assert!(md.contains("**📁 src/lib.rs:12**"));
        assert!(md.contains("```diff\n@@ -1,2 +1,3 @@\n context\n+added\n```"));
        assert!(md.contains("> 💬 tighten this loop"));
        assert!(md.contains("[🔗 View comment](https://github.com/o/r/pull/1#discussion_r5)"));
    }

    #[test]
    fn test_multiline_body_blockquoted() {
        let mut r = review("alice", 1, at(10, 9));
        r.body = "First line\nSecond line".to_string();

        let md = render_markdown(&[r], "octocat", &MarkdownOptions::default(), now());
        assert!(md.contains("> First line\n> Second line"));
    }
}
