//! Plain console rendering of review collections and statistics.

use revq_github::{ReviewStats, ReviewsResponse};

pub fn print_reviews(result: &ReviewsResponse, username: &str) {
    println!("\n📝 Reviews received by {username}:");
    println!("Total: {} reviews\n", result.total_count);

    for (index, review) in result.reviews.iter().enumerate() {
        println!("{}. {} {}", index + 1, review.state.emoji(), review.state);
        println!("   PR: {} (#{})", review.pr_title, review.pr_number);
        println!("   Repository: {}", review.repository);
        println!("   Reviewer: {}", review.reviewer);
        println!("   Date: {}", review.submitted_at.format("%Y-%m-%d"));
        println!("   URL: {}", review.pr_url);

        if !review.body.trim().is_empty() {
            let body: String = review.body.chars().take(100).collect();
            let ellipsis = if review.body.chars().count() > 100 {
                "..."
            } else {
                ""
            };
            println!("   Comment: {body}{ellipsis}");
        }
        println!();
    }
}

pub fn print_stats(stats: &ReviewStats, username: &str) {
    println!("\n📊 Review Statistics for {username}:");
    println!("Total Reviews: {}\n", stats.total_reviews);

    println!("📈 By Review State:");
    println!("   ✅ Approved: {}", stats.by_state.approved);
    println!("   🔄 Changes Requested: {}", stats.by_state.changes_requested);
    println!("   💬 Commented: {}\n", stats.by_state.commented);

    println!("👥 Top Reviewers:");
    for (reviewer, count) in top_entries(&stats.by_reviewer) {
        println!("   {reviewer}: {count} reviews");
    }

    println!("\n📁 Top Repositories:");
    for (repo, count) in top_entries(&stats.by_repository) {
        println!("   {repo}: {count} reviews");
    }
}

/// Top five entries by count, descending; name order breaks ties.
fn top_entries(map: &std::collections::BTreeMap<String, usize>) -> Vec<(&String, usize)> {
    let mut entries: Vec<(&String, usize)> = map.iter().map(|(k, v)| (k, *v)).collect();
    entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    entries.truncate(5);
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_top_entries_orders_and_limits() {
        let mut map = BTreeMap::new();
        for (name, count) in [
            ("alice", 5usize),
            ("bob", 9),
            ("carol", 1),
            ("dave", 3),
            ("erin", 7),
            ("frank", 2),
        ] {
            map.insert(name.to_string(), count);
        }

        let top = top_entries(&map);
        assert_eq!(top.len(), 5);
        assert_eq!(top[0].0, "bob");
        assert_eq!(top[1].0, "erin");
        assert_eq!(top[4].0, "frank");
    }

    #[test]
    fn test_top_entries_ties_break_by_name() {
        let mut map = BTreeMap::new();
        map.insert("zoe".to_string(), 2usize);
        map.insert("amy".to_string(), 2usize);

        let top = top_entries(&map);
        assert_eq!(top[0].0, "amy");
        assert_eq!(top[1].0, "zoe");
    }
}
