//! Heartline - swipe, match and discovery backend for the Heartline dating app
//!
//! The engine records directional swipes, keeps each user's attractiveness
//! score in step with the swipes they receive, creates exactly one match per
//! mutually liking pair, and ranks discovery candidates by score and distance.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{attractiveness_score, distance_km, DiscoveryRanker, MatchDetector, MatchOutcome, SwipeRecorder};
pub use crate::models::{Candidate, DiscoveryFilters, SwipeKind, User, UserId, UserPair};
pub use crate::services::{MemoryStore, PostgresStore, Store};
