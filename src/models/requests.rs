use serde::{Deserialize, Serialize};
use validator::Validate;
use crate::models::domain::{DiscoveryFilters, SwipeKind, UserId};

/// Request to register a new user
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(length(min = 1))]
    pub gender: String,
    #[validate(range(min = 18, max = 120))]
    pub age: i32,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

impl CreateUserRequest {
    /// Check that any supplied coordinates are on the globe
    pub fn validate_coordinates(&self) -> Result<(), String> {
        if let Some(lat) = self.latitude {
            if !(-90.0..=90.0).contains(&lat) {
                return Err(format!("latitude {} is out of range [-90, 90]", lat));
            }
        }
        if let Some(lon) = self.longitude {
            if !(-180.0..=180.0).contains(&lon) {
                return Err(format!("longitude {} is out of range [-180, 180]", lon));
            }
        }
        Ok(())
    }
}

/// Login request
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1))]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

/// Swipe request from the authenticated user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwipeRequest {
    #[serde(rename = "targetID", alias = "targetId")]
    pub target_id: UserId,
    #[serde(rename = "swipeType")]
    pub swipe_type: SwipeKind,
}

/// Discovery query string
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiscoverQuery {
    #[serde(rename = "minAge")]
    pub min_age: Option<i32>,
    #[serde(rename = "maxAge")]
    pub max_age: Option<i32>,
    pub gender: Option<String>,
    pub limit: Option<usize>,
}

impl From<DiscoverQuery> for DiscoveryFilters {
    fn from(query: DiscoverQuery) -> Self {
        Self {
            min_age: query.min_age,
            max_age: query.max_age,
            // An empty `gender=` is treated as no constraint
            gender: query.gender.filter(|g| !g.trim().is_empty()),
            limit: query.limit,
        }
    }
}
