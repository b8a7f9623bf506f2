use thiserror::Error;

use crate::models::UserId;
use crate::services::StoreError;

/// Errors from recording a swipe
#[derive(Debug, Error)]
pub enum SwipeError {
    #[error("Cannot swipe on yourself")]
    InvalidTarget,

    #[error("Target user {0} not found")]
    TargetNotFound(UserId),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Errors from building a discovery list
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("Invalid filter: {0}")]
    InvalidFilter(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}
