use actix_web::{web, HttpResponse};

use crate::core::MatchOutcome;
use crate::models::{SwipeRequest, SwipeResponse};
use crate::routes::{error::ApiError, extractors::AuthUser, AppState};

/// Configure swipe routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/swipe", web::post().to(swipe));
}

/// Swipe on another user
///
/// POST /swipe
///
/// Request body:
/// ```json
/// {
///   "targetID": 42,
///   "swipeType": "YES|NO"
/// }
/// ```
///
/// A repeated like on an already matched pair is still recorded, then
/// reported as 409.
async fn swipe(
    state: web::Data<AppState>,
    AuthUser(user): AuthUser,
    req: web::Json<SwipeRequest>,
) -> Result<HttpResponse, ApiError> {
    let result = state
        .recorder
        .record_swipe(user.id, req.target_id, req.swipe_type)
        .await?;

    match result.outcome {
        MatchOutcome::NoMatch => Ok(HttpResponse::Ok().json(SwipeResponse {
            matched: false,
            match_id: None,
        })),
        MatchOutcome::NewMatch(m) => Ok(HttpResponse::Ok().json(SwipeResponse {
            matched: true,
            match_id: Some(m.id),
        })),
        MatchOutcome::AlreadyMatched => Err(ApiError::Conflict(format!(
            "You are already matched with user {}",
            req.target_id
        ))),
    }
}
