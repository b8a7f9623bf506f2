use actix_web::{web, HttpResponse};

use crate::models::{DiscoverQuery, DiscoverResponse, DiscoveryFilters};
use crate::routes::{error::ApiError, extractors::AuthUser, AppState};

/// Configure discovery routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/discover", web::get().to(discover));
}

/// Ranked candidates the user has not swiped yet
///
/// GET /discover?minAge={n}&maxAge={n}&gender={g}&limit={n}
async fn discover(
    state: web::Data<AppState>,
    AuthUser(user): AuthUser,
    query: web::Query<DiscoverQuery>,
) -> Result<HttpResponse, ApiError> {
    let filters = DiscoveryFilters::from(query.into_inner());

    let results = state.ranker.discover(&user, &filters).await?;

    tracing::info!("Returning {} candidates for user {}", results.len(), user.id);

    Ok(HttpResponse::Ok().json(DiscoverResponse { results }))
}
