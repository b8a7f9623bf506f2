use std::sync::Arc;

use crate::core::error::SwipeError;
use crate::core::matcher::{MatchDetector, MatchOutcome};
use crate::models::{Swipe, SwipeKind, UserId};
use crate::services::Store;

/// How the target's counters are updated after a swipe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreUpdateMode {
    /// Detached task, best effort; failures are logged only
    Background,
    /// Awaited before the swipe call returns; failures are still only logged
    Inline,
}

impl ScoreUpdateMode {
    pub fn from_background_flag(background: bool) -> Self {
        if background {
            ScoreUpdateMode::Background
        } else {
            ScoreUpdateMode::Inline
        }
    }
}

/// Applies swipe counts to the target user's counters and score
///
/// In background mode there is no join point and no cancellation: the
/// score is eventually consistent with the swipe log. A failed update never
/// fails the swipe that triggered it.
#[derive(Clone)]
pub struct ScoreUpdater {
    store: Arc<dyn Store>,
    mode: ScoreUpdateMode,
}

impl ScoreUpdater {
    pub fn new(store: Arc<dyn Store>, mode: ScoreUpdateMode) -> Self {
        Self { store, mode }
    }

    pub fn mode(&self) -> ScoreUpdateMode {
        self.mode
    }

    /// Queue (or apply, in inline mode) one swipe against the target
    pub async fn submit(&self, target_id: UserId, kind: SwipeKind) {
        match self.mode {
            ScoreUpdateMode::Inline => apply_score_update(self.store.as_ref(), target_id, kind).await,
            ScoreUpdateMode::Background => {
                let store = Arc::clone(&self.store);
                tokio::spawn(async move {
                    apply_score_update(store.as_ref(), target_id, kind).await;
                });
            }
        }
    }
}

async fn apply_score_update(store: &dyn Store, target_id: UserId, kind: SwipeKind) {
    match store.apply_swipe_to_target(target_id, kind).await {
        Ok(counters) => {
            tracing::debug!(
                "Updated user {}: likes={}, dislikes={}, score={:.2}",
                target_id,
                counters.total_likes_received,
                counters.total_dislikes_received,
                counters.attractiveness_score
            );
        }
        Err(e) => {
            tracing::error!("Failed to update attractiveness score for user {}: {}", target_id, e);
        }
    }
}

/// A persisted swipe and what it meant for the pair
#[derive(Debug, Clone, PartialEq)]
pub struct SwipeResult {
    pub swipe: Swipe,
    pub outcome: MatchOutcome,
}

/// Records swipes, feeds the score updater and runs match detection
#[derive(Clone)]
pub struct SwipeRecorder {
    store: Arc<dyn Store>,
    scores: ScoreUpdater,
    detector: MatchDetector,
}

impl SwipeRecorder {
    pub fn new(store: Arc<dyn Store>, mode: ScoreUpdateMode) -> Self {
        Self {
            scores: ScoreUpdater::new(Arc::clone(&store), mode),
            detector: MatchDetector::new(Arc::clone(&store)),
            store,
        }
    }

    /// Record a swipe from `swiper_id` on `target_id`
    ///
    /// Validation happens before anything is written. Once the swipe row
    /// exists it stays, even if match detection fails afterwards; that
    /// failure is returned as a store error. Duplicate swipes on the same
    /// target are appended, and every new LIKE re-checks reciprocity.
    pub async fn record_swipe(
        &self,
        swiper_id: UserId,
        target_id: UserId,
        kind: SwipeKind,
    ) -> Result<SwipeResult, SwipeError> {
        if swiper_id == target_id {
            return Err(SwipeError::InvalidTarget);
        }

        if self.store.find_user(target_id).await?.is_none() {
            return Err(SwipeError::TargetNotFound(target_id));
        }

        let swipe = self.store.create_swipe(swiper_id, target_id, kind).await?;

        tracing::info!("Recorded swipe {}: {} -> {} ({:?})", swipe.id, swiper_id, target_id, kind);

        self.scores.submit(target_id, kind).await;

        let outcome = match kind {
            SwipeKind::Like => self
                .detector
                .check_and_create_match(swiper_id, target_id)
                .await
                .map_err(|e| {
                    tracing::error!(
                        "Match detection failed after swipe {} was recorded: {}",
                        swipe.id,
                        e
                    );
                    SwipeError::from(e)
                })?,
            SwipeKind::Dislike => MatchOutcome::NoMatch,
        };

        Ok(SwipeResult { swipe, outcome })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CandidateQuery, Match, NewUser, SwipeCounters, User, UserPair};
    use crate::services::{MatchInsert, MemoryStore, StoreError};
    use async_trait::async_trait;

    fn new_user(n: usize) -> NewUser {
        NewUser {
            email: format!("user{}@example.com", n),
            password_hash: "hash".to_string(),
            name: format!("User {}", n),
            gender: "female".to_string(),
            age: 25,
            latitude: 51.5,
            longitude: -0.12,
        }
    }

    async fn seed_users(store: &MemoryStore, count: usize) -> Vec<UserId> {
        let mut ids = Vec::new();
        for n in 0..count {
            ids.push(store.create_user(new_user(n)).await.unwrap().id);
        }
        ids
    }

    #[tokio::test]
    async fn test_like_updates_target_and_does_not_match() {
        let store = Arc::new(MemoryStore::new());
        let ids = seed_users(&store, 2).await;
        let (a, b) = (ids[0], ids[1]);
        let recorder = SwipeRecorder::new(store.clone(), ScoreUpdateMode::Inline);

        let result = recorder.record_swipe(a, b, SwipeKind::Like).await.unwrap();
        assert_eq!(result.outcome, MatchOutcome::NoMatch);
        assert_eq!(result.swipe.swiper_id, a);
        assert_eq!(result.swipe.target_id, b);

        let target = store.find_user(b).await.unwrap().unwrap();
        assert_eq!(target.total_likes_received, 1);
        assert_eq!(target.total_dislikes_received, 0);
        assert_eq!(target.attractiveness_score, 1.0);

        // The swiper is untouched
        let swiper = store.find_user(a).await.unwrap().unwrap();
        assert_eq!(swiper.total_likes_received, 0);
        assert_eq!(swiper.attractiveness_score, 0.0);
    }

    #[tokio::test]
    async fn test_like_back_matches_then_reports_already_matched() {
        let store = Arc::new(MemoryStore::new());
        let ids = seed_users(&store, 2).await;
        let (a, b) = (ids[0], ids[1]);
        let recorder = SwipeRecorder::new(store.clone(), ScoreUpdateMode::Inline);

        recorder.record_swipe(a, b, SwipeKind::Like).await.unwrap();

        let back = recorder.record_swipe(b, a, SwipeKind::Like).await.unwrap();
        assert!(matches!(back.outcome, MatchOutcome::NewMatch(_)));
        assert!(back.outcome.match_id().is_some());

        let again = recorder.record_swipe(b, a, SwipeKind::Like).await.unwrap();
        assert_eq!(again.outcome, MatchOutcome::AlreadyMatched);

        assert_eq!(store.swipe_count(b, a).await, 2);
        assert_eq!(store.match_count(UserPair::new(a, b).unwrap()).await, 1);
    }

    #[tokio::test]
    async fn test_dislike_never_matches() {
        let store = Arc::new(MemoryStore::new());
        let ids = seed_users(&store, 2).await;
        let (a, b) = (ids[0], ids[1]);
        let recorder = SwipeRecorder::new(store.clone(), ScoreUpdateMode::Inline);

        recorder.record_swipe(a, b, SwipeKind::Like).await.unwrap();
        let result = recorder.record_swipe(b, a, SwipeKind::Dislike).await.unwrap();

        assert_eq!(result.outcome, MatchOutcome::NoMatch);
        let swiper_a = store.find_user(a).await.unwrap().unwrap();
        assert_eq!(swiper_a.total_dislikes_received, 1);
        assert_eq!(swiper_a.attractiveness_score, 0.0);
    }

    #[tokio::test]
    async fn test_self_swipe_rejected_without_writing() {
        let store = Arc::new(MemoryStore::new());
        let ids = seed_users(&store, 1).await;
        let recorder = SwipeRecorder::new(store.clone(), ScoreUpdateMode::Inline);

        let err = recorder.record_swipe(ids[0], ids[0], SwipeKind::Like).await.unwrap_err();
        assert!(matches!(err, SwipeError::InvalidTarget));
        assert_eq!(store.swipe_count(ids[0], ids[0]).await, 0);

        let user = store.find_user(ids[0]).await.unwrap().unwrap();
        assert_eq!(user.total_likes_received, 0);
    }

    #[tokio::test]
    async fn test_unknown_target_rejected_without_writing() {
        let store = Arc::new(MemoryStore::new());
        let ids = seed_users(&store, 1).await;
        let recorder = SwipeRecorder::new(store.clone(), ScoreUpdateMode::Inline);

        let err = recorder.record_swipe(ids[0], 404, SwipeKind::Like).await.unwrap_err();
        assert!(matches!(err, SwipeError::TargetNotFound(404)));
        assert_eq!(store.swipe_count(ids[0], 404).await, 0);
    }

    #[tokio::test]
    async fn test_background_update_eventually_lands() {
        let store = Arc::new(MemoryStore::new());
        let ids = seed_users(&store, 2).await;
        let recorder = SwipeRecorder::new(store.clone(), ScoreUpdateMode::Background);

        recorder.record_swipe(ids[0], ids[1], SwipeKind::Dislike).await.unwrap();

        let mut dislikes = 0;
        for _ in 0..100 {
            dislikes = store.find_user(ids[1]).await.unwrap().unwrap().total_dislikes_received;
            if dislikes == 1 {
                break;
            }
            tokio::task::yield_now().await;
        }
        assert_eq!(dislikes, 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_likes_on_one_target_are_all_counted() {
        let store = Arc::new(MemoryStore::new());
        let ids = seed_users(&store, 21).await;
        let target = ids[0];
        let recorder = SwipeRecorder::new(store.clone(), ScoreUpdateMode::Inline);

        let mut handles = Vec::new();
        for &swiper in &ids[1..] {
            let recorder = recorder.clone();
            handles.push(tokio::spawn(async move {
                recorder.record_swipe(swiper, target, SwipeKind::Like).await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let user = store.find_user(target).await.unwrap().unwrap();
        assert_eq!(user.total_likes_received, 20);
        assert_eq!(user.attractiveness_score, 1.0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_racing_mutual_likes_create_one_match() {
        let store = Arc::new(MemoryStore::new());
        let ids = seed_users(&store, 2).await;
        let (a, b) = (ids[0], ids[1]);
        let recorder = SwipeRecorder::new(store.clone(), ScoreUpdateMode::Inline);

        let mut handles = Vec::new();
        for n in 0..20 {
            let recorder = recorder.clone();
            let (from, to) = if n % 2 == 0 { (a, b) } else { (b, a) };
            handles.push(tokio::spawn(async move {
                recorder.record_swipe(from, to, SwipeKind::Like).await
            }));
        }

        let mut new_matches = 0;
        for handle in handles {
            if let MatchOutcome::NewMatch(_) = handle.await.unwrap().unwrap().outcome {
                new_matches += 1;
            }
        }

        assert_eq!(new_matches, 1);
        assert_eq!(store.match_count(UserPair::new(a, b).unwrap()).await, 1);
    }

    /// Delegates to a memory store but refuses every counter update
    struct BrokenScores(MemoryStore);

    #[async_trait]
    impl Store for BrokenScores {
        async fn find_user(&self, id: UserId) -> Result<Option<User>, StoreError> {
            self.0.find_user(id).await
        }
        async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
            self.0.find_user_by_email(email).await
        }
        async fn create_user(&self, new_user: NewUser) -> Result<User, StoreError> {
            self.0.create_user(new_user).await
        }
        async fn list_candidates(&self, query: &CandidateQuery) -> Result<Vec<User>, StoreError> {
            self.0.list_candidates(query).await
        }
        async fn swiped_target_ids(&self, swiper_id: UserId) -> Result<Vec<UserId>, StoreError> {
            self.0.swiped_target_ids(swiper_id).await
        }
        async fn create_swipe(&self, swiper_id: UserId, target_id: UserId, kind: SwipeKind) -> Result<Swipe, StoreError> {
            self.0.create_swipe(swiper_id, target_id, kind).await
        }
        async fn find_swipe(&self, swiper_id: UserId, target_id: UserId, kind: SwipeKind) -> Result<Option<Swipe>, StoreError> {
            self.0.find_swipe(swiper_id, target_id, kind).await
        }
        async fn create_match(&self, pair: UserPair) -> Result<MatchInsert, StoreError> {
            self.0.create_match(pair).await
        }
        async fn find_match(&self, pair: UserPair) -> Result<Option<Match>, StoreError> {
            self.0.find_match(pair).await
        }
        async fn apply_swipe_to_target(&self, target_id: UserId, _kind: SwipeKind) -> Result<SwipeCounters, StoreError> {
            Err(StoreError::NotFound(format!("user {}", target_id)))
        }
        async fn issue_token(&self, user_id: UserId, value: &str) -> Result<(), StoreError> {
            self.0.issue_token(user_id, value).await
        }
        async fn find_user_by_token(&self, value: &str) -> Result<Option<User>, StoreError> {
            self.0.find_user_by_token(value).await
        }
        async fn health_check(&self) -> Result<bool, StoreError> {
            Ok(false)
        }
    }

    #[tokio::test]
    async fn test_failed_score_update_does_not_fail_swipe() {
        let inner = MemoryStore::new();
        let ids = seed_users(&inner, 2).await;
        let store = Arc::new(BrokenScores(inner));
        let recorder = SwipeRecorder::new(store.clone(), ScoreUpdateMode::Inline);

        recorder.record_swipe(ids[0], ids[1], SwipeKind::Like).await.unwrap();
        let back = recorder.record_swipe(ids[1], ids[0], SwipeKind::Like).await.unwrap();

        assert!(matches!(back.outcome, MatchOutcome::NewMatch(_)));
        assert_eq!(store.0.swipe_count(ids[0], ids[1]).await, 1);
        assert_eq!(store.find_user(ids[1]).await.unwrap().unwrap().total_likes_received, 0);
    }
}
