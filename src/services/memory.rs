use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::Mutex;

use crate::core::scoring::attractiveness_score;
use crate::models::{CandidateQuery, Match, NewUser, Swipe, SwipeCounters, SwipeKind, User, UserId, UserPair};
use crate::services::store::{MatchInsert, Store, StoreError};

#[derive(Debug, Default)]
struct Tables {
    users: Vec<User>,
    swipes: Vec<Swipe>,
    matches: HashMap<UserPair, Match>,
    tokens: HashMap<UserId, String>,
    next_user_id: i64,
    next_swipe_id: i64,
    next_match_id: i64,
}

impl Tables {
    fn user_mut(&mut self, id: UserId) -> Option<&mut User> {
        self.users.iter_mut().find(|u| u.id == id)
    }
}

/// In-process store
///
/// All tables sit behind one mutex and each trait method runs as a single
/// critical section, which gives the same uniqueness and atomicity
/// guarantees the Postgres schema enforces with constraints and row locks.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of match rows recorded for a pair (0 or 1)
    pub async fn match_count(&self, pair: UserPair) -> usize {
        let tables = self.tables.lock().await;
        tables.matches.values().filter(|m| m.user1_id == pair.low() && m.user2_id == pair.high()).count()
    }

    /// Number of swipe rows recorded from `swiper_id` to `target_id`
    pub async fn swipe_count(&self, swiper_id: UserId, target_id: UserId) -> usize {
        let tables = self.tables.lock().await;
        tables
            .swipes
            .iter()
            .filter(|s| s.swiper_id == swiper_id && s.target_id == target_id)
            .count()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn find_user(&self, id: UserId) -> Result<Option<User>, StoreError> {
        let tables = self.tables.lock().await;
        Ok(tables.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let tables = self.tables.lock().await;
        Ok(tables.users.iter().find(|u| u.email == email).cloned())
    }

    async fn create_user(&self, new_user: NewUser) -> Result<User, StoreError> {
        let mut tables = self.tables.lock().await;

        if tables.users.iter().any(|u| u.email == new_user.email) {
            return Err(StoreError::Conflict(format!("email {} already registered", new_user.email)));
        }

        tables.next_user_id += 1;
        let user = User {
            id: tables.next_user_id,
            email: new_user.email,
            password_hash: new_user.password_hash,
            name: new_user.name,
            gender: new_user.gender,
            age: new_user.age,
            latitude: new_user.latitude,
            longitude: new_user.longitude,
            total_likes_received: 0,
            total_dislikes_received: 0,
            attractiveness_score: 0.0,
            created_at: Utc::now(),
        };
        tables.users.push(user.clone());

        Ok(user)
    }

    async fn list_candidates(&self, query: &CandidateQuery) -> Result<Vec<User>, StoreError> {
        let tables = self.tables.lock().await;
        let mut users: Vec<User> = tables.users.iter().filter(|u| query.admits(u)).cloned().collect();
        users.sort_by_key(|u| u.id);
        Ok(users)
    }

    async fn swiped_target_ids(&self, swiper_id: UserId) -> Result<Vec<UserId>, StoreError> {
        let tables = self.tables.lock().await;
        let mut ids: Vec<UserId> = tables
            .swipes
            .iter()
            .filter(|s| s.swiper_id == swiper_id)
            .map(|s| s.target_id)
            .collect();
        ids.sort_unstable();
        ids.dedup();
        Ok(ids)
    }

    async fn create_swipe(
        &self,
        swiper_id: UserId,
        target_id: UserId,
        kind: SwipeKind,
    ) -> Result<Swipe, StoreError> {
        let mut tables = self.tables.lock().await;

        tables.next_swipe_id += 1;
        let swipe = Swipe {
            id: tables.next_swipe_id,
            swiper_id,
            target_id,
            swipe_type: kind,
            swiped_at: Utc::now(),
        };
        tables.swipes.push(swipe.clone());

        Ok(swipe)
    }

    async fn find_swipe(
        &self,
        swiper_id: UserId,
        target_id: UserId,
        kind: SwipeKind,
    ) -> Result<Option<Swipe>, StoreError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .swipes
            .iter()
            .find(|s| s.swiper_id == swiper_id && s.target_id == target_id && s.swipe_type == kind)
            .cloned())
    }

    async fn create_match(&self, pair: UserPair) -> Result<MatchInsert, StoreError> {
        let mut tables = self.tables.lock().await;

        if tables.matches.contains_key(&pair) {
            return Ok(MatchInsert::AlreadyExists);
        }

        tables.next_match_id += 1;
        let created = Match {
            id: tables.next_match_id,
            user1_id: pair.low(),
            user2_id: pair.high(),
            matched_at: Utc::now(),
        };
        tables.matches.insert(pair, created.clone());

        Ok(MatchInsert::Created(created))
    }

    async fn find_match(&self, pair: UserPair) -> Result<Option<Match>, StoreError> {
        let tables = self.tables.lock().await;
        Ok(tables.matches.get(&pair).cloned())
    }

    async fn apply_swipe_to_target(
        &self,
        target_id: UserId,
        kind: SwipeKind,
    ) -> Result<SwipeCounters, StoreError> {
        let mut tables = self.tables.lock().await;
        let user = tables
            .user_mut(target_id)
            .ok_or_else(|| StoreError::NotFound(format!("user {}", target_id)))?;

        match kind {
            SwipeKind::Like => user.total_likes_received += 1,
            SwipeKind::Dislike => user.total_dislikes_received += 1,
        }
        user.attractiveness_score =
            attractiveness_score(user.total_likes_received, user.total_dislikes_received);

        Ok(SwipeCounters {
            total_likes_received: user.total_likes_received,
            total_dislikes_received: user.total_dislikes_received,
            attractiveness_score: user.attractiveness_score,
        })
    }

    async fn issue_token(&self, user_id: UserId, value: &str) -> Result<(), StoreError> {
        let mut tables = self.tables.lock().await;

        if !tables.users.iter().any(|u| u.id == user_id) {
            return Err(StoreError::NotFound(format!("user {}", user_id)));
        }
        tables.tokens.insert(user_id, value.to_string());

        Ok(())
    }

    async fn find_user_by_token(&self, value: &str) -> Result<Option<User>, StoreError> {
        let tables = self.tables.lock().await;
        let user_id = tables
            .tokens
            .iter()
            .find(|(_, token)| token.as_str() == value)
            .map(|(user_id, _)| *user_id);

        Ok(user_id.and_then(|id| tables.users.iter().find(|u| u.id == id).cloned()))
    }

    async fn health_check(&self) -> Result<bool, StoreError> {
        Ok(true)
    }
}
