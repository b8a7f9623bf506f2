use serde::{Deserialize, Serialize};
use crate::models::domain::{Candidate, User, UserId};

/// Registered user as returned to the client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: UserId,
    pub email: String,
    pub name: String,
    pub gender: String,
    pub age: i32,
    pub latitude: f64,
    pub longitude: f64,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            gender: user.gender,
            age: user.age,
            latitude: user.latitude,
            longitude: user.longitude,
        }
    }
}

/// Login response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
}

/// Swipe response; `matchID` is only present on a fresh match
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwipeResponse {
    pub matched: bool,
    #[serde(rename = "matchID", skip_serializing_if = "Option::is_none", default)]
    pub match_id: Option<i64>,
}

/// Response for the discover endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoverResponse {
    pub results: Vec<Candidate>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}
