use serde::{Deserialize, Serialize};

/// Opaque user identity, assigned by the store at registration
pub type UserId = i64;

/// Registered user with profile attributes and derived swipe counters
///
/// The password hash travels with the record so login can verify it, but
/// no response type ever projects it.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub password_hash: String,
    pub name: String,
    pub gender: String,
    pub age: i32,
    pub latitude: f64,
    pub longitude: f64,
    pub total_likes_received: i64,
    pub total_dislikes_received: i64,
    pub attractiveness_score: f64,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Fields supplied at registration; everything else starts at zero
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub name: String,
    pub gender: String,
    pub age: i32,
    pub latitude: f64,
    pub longitude: f64,
}

/// Direction of a swipe. On the wire "YES" is a like and "NO" a dislike.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "swipe_type", rename_all = "lowercase")]
pub enum SwipeKind {
    #[serde(rename = "YES", alias = "LIKE", alias = "like")]
    Like,
    #[serde(rename = "NO", alias = "DISLIKE", alias = "dislike")]
    Dislike,
}

/// Directed, immutable preference edge
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Swipe {
    pub id: i64,
    pub swiper_id: UserId,
    pub target_id: UserId,
    pub swipe_type: SwipeKind,
    pub swiped_at: chrono::DateTime<chrono::Utc>,
}

/// Mutual like between two users, stored with `user1_id < user2_id`
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Match {
    pub id: i64,
    pub user1_id: UserId,
    pub user2_id: UserId,
    pub matched_at: chrono::DateTime<chrono::Utc>,
}

/// Unordered pair of distinct users in canonical (low, high) order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UserPair {
    low: UserId,
    high: UserId,
}

impl UserPair {
    /// Build the canonical pair; returns `None` when both ids are the same user
    pub fn new(a: UserId, b: UserId) -> Option<Self> {
        match a.cmp(&b) {
            std::cmp::Ordering::Less => Some(Self { low: a, high: b }),
            std::cmp::Ordering::Greater => Some(Self { low: b, high: a }),
            std::cmp::Ordering::Equal => None,
        }
    }

    pub fn low(&self) -> UserId {
        self.low
    }

    pub fn high(&self) -> UserId {
        self.high
    }
}

/// Counters left on the target after a swipe has been applied
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwipeCounters {
    pub total_likes_received: i64,
    pub total_dislikes_received: i64,
    pub attractiveness_score: f64,
}

/// Optional discovery filters, AND-combined
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiscoveryFilters {
    pub min_age: Option<i32>,
    pub max_age: Option<i32>,
    pub gender: Option<String>,
    pub limit: Option<usize>,
}

/// Candidate query handed to the store
#[derive(Debug, Clone, Default)]
pub struct CandidateQuery {
    pub exclude_user_ids: Vec<UserId>,
    pub min_age: Option<i32>,
    pub max_age: Option<i32>,
    pub gender: Option<String>,
}

impl CandidateQuery {
    /// Whether a user passes the exclusion list and every present filter
    pub fn admits(&self, user: &User) -> bool {
        if self.exclude_user_ids.contains(&user.id) {
            return false;
        }

        if self.min_age.is_some_and(|min| user.age < min) {
            return false;
        }

        if self.max_age.is_some_and(|max| user.age > max) {
            return false;
        }

        if let Some(gender) = &self.gender {
            if &user.gender != gender {
                return false;
            }
        }

        true
    }
}

/// Ranked discovery entry. Credentials and contact fields are never projected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: UserId,
    pub name: String,
    pub gender: String,
    pub age: i32,
    #[serde(rename = "distanceFromMe")]
    pub distance_from_me: f64,
    #[serde(rename = "attractivenessScore")]
    pub attractiveness_score: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn create_user(id: UserId, age: i32, gender: &str) -> User {
        User {
            id,
            email: format!("user{}@example.com", id),
            password_hash: String::new(),
            name: format!("User {}", id),
            gender: gender.to_string(),
            age,
            latitude: 51.5,
            longitude: -0.12,
            total_likes_received: 0,
            total_dislikes_received: 0,
            attractiveness_score: 0.0,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_user_pair_is_order_independent() {
        assert_eq!(UserPair::new(7, 3), UserPair::new(3, 7));
        let pair = UserPair::new(7, 3).unwrap();
        assert_eq!(pair.low(), 3);
        assert_eq!(pair.high(), 7);
    }

    #[test]
    fn test_user_pair_rejects_self() {
        assert!(UserPair::new(4, 4).is_none());
    }

    #[test]
    fn test_swipe_kind_wire_format() {
        let like: SwipeKind = serde_json::from_str("\"YES\"").unwrap();
        let dislike: SwipeKind = serde_json::from_str("\"NO\"").unwrap();
        assert_eq!(like, SwipeKind::Like);
        assert_eq!(dislike, SwipeKind::Dislike);
        assert!(serde_json::from_str::<SwipeKind>("\"MAYBE\"").is_err());
    }

    #[test]
    fn test_query_admits_filters() {
        let query = CandidateQuery {
            exclude_user_ids: vec![1],
            min_age: Some(21),
            max_age: Some(30),
            gender: Some("female".to_string()),
        };

        assert!(query.admits(&create_user(2, 25, "female")));
        assert!(!query.admits(&create_user(1, 25, "female")));
        assert!(!query.admits(&create_user(3, 20, "female")));
        assert!(!query.admits(&create_user(4, 31, "female")));
        assert!(!query.admits(&create_user(5, 25, "male")));
    }

    #[test]
    fn test_empty_query_admits_everyone() {
        let query = CandidateQuery::default();
        assert!(query.admits(&create_user(9, 99, "other")));
    }
}
