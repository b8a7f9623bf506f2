// Route exports
pub mod discover;
pub mod error;
pub mod extractors;
pub mod health;
pub mod swipe;
pub mod users;

use actix_web::web;
use std::sync::Arc;

use crate::core::{DiscoveryRanker, ScoreUpdateMode, SwipeRecorder};
use crate::services::{AccountService, Store};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub accounts: AccountService,
    pub recorder: SwipeRecorder,
    pub ranker: DiscoveryRanker,
}

impl AppState {
    /// Wire every component to the same store
    pub fn new(store: Arc<dyn Store>, score_updates: ScoreUpdateMode, max_discovery_limit: usize) -> Self {
        Self {
            accounts: AccountService::new(Arc::clone(&store)),
            recorder: SwipeRecorder::new(Arc::clone(&store), score_updates),
            ranker: DiscoveryRanker::new(Arc::clone(&store), max_discovery_limit),
            store,
        }
    }
}

/// Register every route, plus the JSON and query error handlers
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg
        .app_data(web::JsonConfig::default().error_handler(error::handle_json_payload_error))
        .app_data(web::QueryConfig::default().error_handler(error::handle_query_payload_error))
        .configure(health::configure)
        .configure(users::configure)
        .configure(swipe::configure)
        .configure(discover::configure);
}
