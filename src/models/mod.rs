// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{Candidate, CandidateQuery, DiscoveryFilters, Match, NewUser, Swipe, SwipeCounters, SwipeKind, User, UserId, UserPair};
pub use requests::{CreateUserRequest, DiscoverQuery, LoginRequest, SwipeRequest};
pub use responses::{DiscoverResponse, ErrorResponse, HealthResponse, LoginResponse, SwipeResponse, UserResponse};
