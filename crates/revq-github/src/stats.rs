use crate::types::{ReviewRecord, ReviewState, ReviewStats, StateCounts};
use std::collections::BTreeMap;

/// Reduce a review collection into counts by state, reviewer and
/// repository. Pure; recomputed from scratch on every call.
pub fn compute_stats(reviews: &[ReviewRecord]) -> ReviewStats {
    let mut by_state = StateCounts::default();
    let mut by_reviewer: BTreeMap<String, usize> = BTreeMap::new();
    let mut by_repository: BTreeMap<String, usize> = BTreeMap::new();

    for review in reviews {
        match review.state {
            ReviewState::Approved => by_state.approved += 1,
            ReviewState::ChangesRequested => by_state.changes_requested += 1,
            ReviewState::Commented => by_state.commented += 1,
            // Dismissed and unknown states count toward the total only.
            ReviewState::Dismissed | ReviewState::Unknown => {}
        }

        *by_reviewer.entry(review.reviewer.clone()).or_insert(0) += 1;
        *by_repository.entry(review.repository.clone()).or_insert(0) += 1;
    }

    ReviewStats {
        total_reviews: reviews.len(),
        by_state,
        by_reviewer,
        by_repository,
    }
}
