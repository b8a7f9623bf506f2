// Core engine exports
pub mod discovery;
pub mod distance;
pub mod error;
pub mod matcher;
pub mod scoring;
pub mod swipe;

pub use discovery::{rank_candidates, DiscoveryRanker};
pub use distance::{distance_km, haversine_distance, UNKNOWN_LOCATION_DISTANCE_KM};
pub use error::{DiscoveryError, SwipeError};
pub use matcher::{MatchDetector, MatchOutcome};
pub use scoring::attractiveness_score;
pub use swipe::{ScoreUpdateMode, ScoreUpdater, SwipeRecorder, SwipeResult};
