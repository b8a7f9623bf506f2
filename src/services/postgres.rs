use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;

use crate::config::DatabaseSettings;
use crate::core::scoring::attractiveness_score;
use crate::models::{CandidateQuery, Match, NewUser, Swipe, SwipeCounters, SwipeKind, User, UserId, UserPair};
use crate::services::store::{MatchInsert, Store, StoreError};

const USER_COLUMNS: &str = "id, email, password_hash, name, gender, age, latitude, longitude, \
     total_likes_received, total_dislikes_received, attractiveness_score, created_at";

/// PostgreSQL-backed store
///
/// Uniqueness of emails, tokens and canonical match pairs is enforced by the
/// schema in `migrations/`; counter updates take a row lock.
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Wrap an existing pool without running migrations
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect with bounded retries, then run migrations
    ///
    /// Each failed attempt is logged and retried after
    /// `connect_retry_interval_secs`, up to `connect_retries` attempts in total.
    pub async fn connect(settings: &DatabaseSettings) -> Result<Self, StoreError> {
        let attempts = settings.connect_retries.max(1);
        let interval = Duration::from_secs(settings.connect_retry_interval_secs);

        let mut attempt = 1;
        let pool = loop {
            match pool_options(settings).connect(&settings.url).await {
                Ok(pool) => break pool,
                Err(e) if attempt < attempts => {
                    tracing::warn!(
                        "Failed to connect to PostgreSQL (attempt {}/{}): {}",
                        attempt,
                        attempts,
                        e
                    );
                    attempt += 1;
                    tokio::time::sleep(interval).await;
                }
                Err(e) => return Err(e.into()),
            }
        };

        // Run migrations on startup
        sqlx::migrate!("./migrations").run(&pool).await?;

        tracing::info!("Connected to PostgreSQL after {} attempt(s)", attempt);

        Ok(Self { pool })
    }
}

fn pool_options(settings: &DatabaseSettings) -> PgPoolOptions {
    PgPoolOptions::new()
        .max_connections(settings.max_connections.unwrap_or(10))
        .min_connections(settings.min_connections.unwrap_or(1))
        .acquire_timeout(Duration::from_secs(settings.acquire_timeout_secs.unwrap_or(5)))
        .idle_timeout(Duration::from_secs(settings.idle_timeout_secs.unwrap_or(600)))
        .test_before_acquire(true)
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.is_unique_violation())
}

#[async_trait]
impl Store for PostgresStore {
    async fn find_user(&self, id: UserId) -> Result<Option<User>, StoreError> {
        let query = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);

        let user = sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let query = format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS);

        let user = sqlx::query_as::<_, User>(&query)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    async fn create_user(&self, new_user: NewUser) -> Result<User, StoreError> {
        let query = format!(
            r#"
            INSERT INTO users (email, password_hash, name, gender, age, latitude, longitude)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {}
            "#,
            USER_COLUMNS
        );

        let result = sqlx::query_as::<_, User>(&query)
            .bind(&new_user.email)
            .bind(&new_user.password_hash)
            .bind(&new_user.name)
            .bind(&new_user.gender)
            .bind(new_user.age)
            .bind(new_user.latitude)
            .bind(new_user.longitude)
            .fetch_one(&self.pool)
            .await;

        match result {
            Ok(user) => Ok(user),
            Err(e) if is_unique_violation(&e) => Err(StoreError::Conflict(format!(
                "email {} already registered",
                new_user.email
            ))),
            Err(e) => Err(e.into()),
        }
    }

    async fn list_candidates(&self, query: &CandidateQuery) -> Result<Vec<User>, StoreError> {
        let sql = format!(
            r#"
            SELECT {}
            FROM users
            WHERE id <> ALL($1)
              AND ($2::INTEGER IS NULL OR age >= $2)
              AND ($3::INTEGER IS NULL OR age <= $3)
              AND ($4::TEXT IS NULL OR gender = $4)
            ORDER BY id
            "#,
            USER_COLUMNS
        );

        let users = sqlx::query_as::<_, User>(&sql)
            .bind(&query.exclude_user_ids)
            .bind(query.min_age)
            .bind(query.max_age)
            .bind(query.gender.as_deref())
            .fetch_all(&self.pool)
            .await?;

        Ok(users)
    }

    async fn swiped_target_ids(&self, swiper_id: UserId) -> Result<Vec<UserId>, StoreError> {
        let ids = sqlx::query_scalar::<_, UserId>(
            r#"
            SELECT DISTINCT target_id
            FROM swipes
            WHERE swiper_id = $1
            "#,
        )
        .bind(swiper_id)
        .fetch_all(&self.pool)
        .await?;

        tracing::debug!("User {} has swiped {} profiles", swiper_id, ids.len());

        Ok(ids)
    }

    async fn create_swipe(
        &self,
        swiper_id: UserId,
        target_id: UserId,
        kind: SwipeKind,
    ) -> Result<Swipe, StoreError> {
        let swipe = sqlx::query_as::<_, Swipe>(
            r#"
            INSERT INTO swipes (swiper_id, target_id, swipe_type, swiped_at)
            VALUES ($1, $2, $3, NOW())
            RETURNING id, swiper_id, target_id, swipe_type, swiped_at
            "#,
        )
        .bind(swiper_id)
        .bind(target_id)
        .bind(kind)
        .fetch_one(&self.pool)
        .await?;

        Ok(swipe)
    }

    async fn find_swipe(
        &self,
        swiper_id: UserId,
        target_id: UserId,
        kind: SwipeKind,
    ) -> Result<Option<Swipe>, StoreError> {
        let swipe = sqlx::query_as::<_, Swipe>(
            r#"
            SELECT id, swiper_id, target_id, swipe_type, swiped_at
            FROM swipes
            WHERE swiper_id = $1 AND target_id = $2 AND swipe_type = $3
            ORDER BY id
            LIMIT 1
            "#,
        )
        .bind(swiper_id)
        .bind(target_id)
        .bind(kind)
        .fetch_optional(&self.pool)
        .await?;

        Ok(swipe)
    }

    /// Insert the canonical pair; a concurrent loser hits the unique
    /// constraint and gets no row back.
    async fn create_match(&self, pair: UserPair) -> Result<MatchInsert, StoreError> {
        let created = sqlx::query_as::<_, Match>(
            r#"
            INSERT INTO matches (user1_id, user2_id, matched_at)
            VALUES ($1, $2, NOW())
            ON CONFLICT (user1_id, user2_id) DO NOTHING
            RETURNING id, user1_id, user2_id, matched_at
            "#,
        )
        .bind(pair.low())
        .bind(pair.high())
        .fetch_optional(&self.pool)
        .await?;

        Ok(match created {
            Some(m) => MatchInsert::Created(m),
            None => MatchInsert::AlreadyExists,
        })
    }

    async fn find_match(&self, pair: UserPair) -> Result<Option<Match>, StoreError> {
        // Order-independent lookup
        let found = sqlx::query_as::<_, Match>(
            r#"
            SELECT id, user1_id, user2_id, matched_at
            FROM matches
            WHERE (user1_id = $1 AND user2_id = $2)
               OR (user1_id = $2 AND user2_id = $1)
            LIMIT 1
            "#,
        )
        .bind(pair.low())
        .bind(pair.high())
        .fetch_optional(&self.pool)
        .await?;

        Ok(found)
    }

    async fn apply_swipe_to_target(
        &self,
        target_id: UserId,
        kind: SwipeKind,
    ) -> Result<SwipeCounters, StoreError> {
        let mut tx = self.pool.begin().await?;

        let current: Option<(i64, i64)> = sqlx::query_as(
            r#"
            SELECT total_likes_received, total_dislikes_received
            FROM users
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(target_id)
        .fetch_optional(&mut *tx)
        .await?;

        let (mut likes, mut dislikes) =
            current.ok_or_else(|| StoreError::NotFound(format!("user {}", target_id)))?;

        match kind {
            SwipeKind::Like => likes += 1,
            SwipeKind::Dislike => dislikes += 1,
        }
        let score = attractiveness_score(likes, dislikes);

        sqlx::query(
            r#"
            UPDATE users
            SET total_likes_received = $2,
                total_dislikes_received = $3,
                attractiveness_score = $4
            WHERE id = $1
            "#,
        )
        .bind(target_id)
        .bind(likes)
        .bind(dislikes)
        .bind(score)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(SwipeCounters {
            total_likes_received: likes,
            total_dislikes_received: dislikes,
            attractiveness_score: score,
        })
    }

    async fn issue_token(&self, user_id: UserId, value: &str) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO tokens (user_id, value, created_at)
            VALUES ($1, $2, NOW())
            ON CONFLICT (user_id)
            DO UPDATE SET
                value = EXCLUDED.value,
                created_at = EXCLUDED.created_at
            "#,
        )
        .bind(user_id)
        .bind(value)
        .execute(&self.pool)
        .await?;

        tracing::debug!("Issued token for user {}", user_id);

        Ok(())
    }

    async fn find_user_by_token(&self, value: &str) -> Result<Option<User>, StoreError> {
        let query = format!(
            r#"
            SELECT {}
            FROM users
            WHERE id = (SELECT user_id FROM tokens WHERE value = $1)
            "#,
            USER_COLUMNS
        );

        let user = sqlx::query_as::<_, User>(&query)
            .bind(value)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    async fn health_check(&self) -> Result<bool, StoreError> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| true)
            .map_err(Into::into)
    }
}
