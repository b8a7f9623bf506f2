use std::sync::Arc;

use crate::models::{Match, SwipeKind, UserId, UserPair};
use crate::services::{MatchInsert, Store, StoreError};

/// Result of checking a fresh LIKE for reciprocity
#[derive(Debug, Clone, PartialEq)]
pub enum MatchOutcome {
    /// The target has not liked the swiper back
    NoMatch,
    /// Both directions hold a LIKE and this call created the match row
    NewMatch(Match),
    /// The pair was already matched, by an earlier swipe or a concurrent one
    AlreadyMatched,
}

impl MatchOutcome {
    pub fn match_id(&self) -> Option<i64> {
        match self {
            MatchOutcome::NewMatch(m) => Some(m.id),
            _ => None,
        }
    }
}

/// Detects mutual likes and creates at most one match per pair
///
/// Must only be invoked after a LIKE from `swiper_id` to `target_id` has
/// been persisted.
#[derive(Clone)]
pub struct MatchDetector {
    store: Arc<dyn Store>,
}

impl MatchDetector {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Check for the reverse LIKE and create the match if it is new
    ///
    /// The existence check is only a fast path. Uniqueness rests on the
    /// store's insert, which reports a pair already present (including one
    /// created by a racing opposite swipe) as `AlreadyExists`.
    pub async fn check_and_create_match(
        &self,
        swiper_id: UserId,
        target_id: UserId,
    ) -> Result<MatchOutcome, StoreError> {
        let reverse_like = self
            .store
            .find_swipe(target_id, swiper_id, SwipeKind::Like)
            .await?;

        if reverse_like.is_none() {
            tracing::debug!("No reverse like from {} to {}", target_id, swiper_id);
            return Ok(MatchOutcome::NoMatch);
        }

        // A user can never like themselves back
        let Some(pair) = UserPair::new(swiper_id, target_id) else {
            return Ok(MatchOutcome::NoMatch);
        };

        if self.store.find_match(pair).await?.is_some() {
            tracing::debug!("Users {} and {} are already matched", pair.low(), pair.high());
            return Ok(MatchOutcome::AlreadyMatched);
        }

        match self.store.create_match(pair).await? {
            MatchInsert::Created(created) => {
                tracing::info!(
                    "Created match {} between users {} and {}",
                    created.id,
                    created.user1_id,
                    created.user2_id
                );
                Ok(MatchOutcome::NewMatch(created))
            }
            MatchInsert::AlreadyExists => {
                tracing::debug!(
                    "Match insert for {} and {} lost a race, treating as already matched",
                    pair.low(),
                    pair.high()
                );
                Ok(MatchOutcome::AlreadyMatched)
            }
        }
    }
}
