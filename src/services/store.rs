use async_trait::async_trait;
use thiserror::Error;

use crate::models::{CandidateQuery, Match, NewUser, Swipe, SwipeCounters, SwipeKind, User, UserId, UserPair};

/// Errors that can occur when talking to the store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("SQLx error: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    MigrateError(#[from] sqlx::migrate::MigrateError),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

/// Outcome of inserting a match for a canonical pair
#[derive(Debug, Clone, PartialEq)]
pub enum MatchInsert {
    Created(Match),
    /// The pair already has a match row; nothing was written
    AlreadyExists,
}

/// Transactional relational store backing the swipe engine
///
/// Every component receives the store as an `Arc<dyn Store>`, so tests can
/// swap in [`MemoryStore`](crate::services::MemoryStore).
///
/// Implementations must guarantee:
/// - at most one match row per [`UserPair`], reporting the loser of a race
///   as [`MatchInsert::AlreadyExists`];
/// - [`Store::apply_swipe_to_target`] is an atomic increment-and-recompute;
/// - emails are unique, a duplicate failing with [`StoreError::Conflict`].
#[async_trait]
pub trait Store: Send + Sync {
    async fn find_user(&self, id: UserId) -> Result<Option<User>, StoreError>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    async fn create_user(&self, new_user: NewUser) -> Result<User, StoreError>;

    /// Users passing the query's exclusion list and filters, ordered by id
    async fn list_candidates(&self, query: &CandidateQuery) -> Result<Vec<User>, StoreError>;

    /// Every user the swiper has swiped on, in either direction of preference
    async fn swiped_target_ids(&self, swiper_id: UserId) -> Result<Vec<UserId>, StoreError>;

    async fn create_swipe(
        &self,
        swiper_id: UserId,
        target_id: UserId,
        kind: SwipeKind,
    ) -> Result<Swipe, StoreError>;

    async fn find_swipe(
        &self,
        swiper_id: UserId,
        target_id: UserId,
        kind: SwipeKind,
    ) -> Result<Option<Swipe>, StoreError>;

    async fn create_match(&self, pair: UserPair) -> Result<MatchInsert, StoreError>;

    async fn find_match(&self, pair: UserPair) -> Result<Option<Match>, StoreError>;

    /// Count one swipe of `kind` against the target and recompute its score
    async fn apply_swipe_to_target(
        &self,
        target_id: UserId,
        kind: SwipeKind,
    ) -> Result<SwipeCounters, StoreError>;

    /// Store a login token for the user, replacing any previous one
    async fn issue_token(&self, user_id: UserId, value: &str) -> Result<(), StoreError>;

    async fn find_user_by_token(&self, value: &str) -> Result<Option<User>, StoreError>;

    async fn health_check(&self) -> Result<bool, StoreError>;
}
