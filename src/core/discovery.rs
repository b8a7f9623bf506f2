use std::cmp::Ordering;
use std::sync::Arc;

use crate::core::distance::distance_km;
use crate::core::error::DiscoveryError;
use crate::models::{Candidate, CandidateQuery, DiscoveryFilters, User};
use crate::services::Store;

/// Builds the ranked candidate list shown to a user
///
/// # Pipeline Stages
/// 1. Exclusion set: the requester plus everyone they have ever swiped
/// 2. Store query with the optional age and gender filters
/// 3. Distance from the requester for each candidate
/// 4. Ranking by score, then distance, then id
#[derive(Clone)]
pub struct DiscoveryRanker {
    store: Arc<dyn Store>,
    max_limit: usize,
}

impl DiscoveryRanker {
    pub fn new(store: Arc<dyn Store>, max_limit: usize) -> Self {
        Self { store, max_limit }
    }

    /// Ranked candidates for `requester`
    ///
    /// An empty list is a valid answer. `filters.limit` is capped at the
    /// configured maximum; without it every candidate is returned.
    pub async fn discover(
        &self,
        requester: &User,
        filters: &DiscoveryFilters,
    ) -> Result<Vec<Candidate>, DiscoveryError> {
        if let (Some(min), Some(max)) = (filters.min_age, filters.max_age) {
            if min > max {
                return Err(DiscoveryError::InvalidFilter(format!(
                    "minAge ({}) must not exceed maxAge ({})",
                    min, max
                )));
            }
        }

        // Stage 1: exclusion set
        let mut exclude_user_ids = self.store.swiped_target_ids(requester.id).await?;
        exclude_user_ids.push(requester.id);

        // Stage 2: filtered store query
        let query = CandidateQuery {
            exclude_user_ids,
            min_age: filters.min_age,
            max_age: filters.max_age,
            gender: filters.gender.clone(),
        };
        let users = self.store.list_candidates(&query).await?;

        tracing::debug!(
            "Found {} candidates for user {} (excluding {})",
            users.len(),
            requester.id,
            query.exclude_user_ids.len()
        );

        // Stages 3 & 4
        let mut candidates = rank_candidates(requester, users);

        if let Some(limit) = filters.limit {
            candidates.truncate(limit.min(self.max_limit));
        }

        Ok(candidates)
    }
}

/// Project users to candidates and sort them for display
///
/// Order: attractiveness score descending, distance ascending, id ascending.
/// The id tie-break makes the output reproducible.
pub fn rank_candidates(requester: &User, users: Vec<User>) -> Vec<Candidate> {
    let mut candidates: Vec<Candidate> = users
        .into_iter()
        .map(|user| Candidate {
            distance_from_me: distance_km(
                requester.latitude,
                requester.longitude,
                user.latitude,
                user.longitude,
            ),
            attractiveness_score: user.attractiveness_score,
            id: user.id,
            name: user.name,
            gender: user.gender,
            age: user.age,
        })
        .collect();

    candidates.sort_by(compare_candidates);
    candidates
}

fn compare_candidates(a: &Candidate, b: &Candidate) -> Ordering {
    b.attractiveness_score
        .total_cmp(&a.attractiveness_score)
        .then_with(|| a.distance_from_me.total_cmp(&b.distance_from_me))
        .then_with(|| a.id.cmp(&b.id))
}
