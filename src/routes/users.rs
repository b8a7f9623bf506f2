use actix_web::{web, HttpResponse};
use validator::Validate;

use crate::models::{CreateUserRequest, LoginRequest, LoginResponse, UserResponse};
use crate::routes::{error::ApiError, AppState};

/// Configure account routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/user/create", web::post().to(create_user))
        .route("/login", web::post().to(login));
}

/// Register a user
///
/// POST /user/create
///
/// Request body:
/// ```json
/// {
///   "email": "string",
///   "password": "string",
///   "name": "string",
///   "gender": "string",
///   "age": 30,
///   "latitude": 51.5,
///   "longitude": -0.12
/// }
/// ```
async fn create_user(
    state: web::Data<AppState>,
    req: web::Json<CreateUserRequest>,
) -> Result<HttpResponse, ApiError> {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for create_user request: {:?}", errors);
        return Err(ApiError::Validation(errors.to_string()));
    }
    req.validate_coordinates().map_err(ApiError::Validation)?;

    let user = state.accounts.register(req.into_inner()).await?;

    Ok(HttpResponse::Created().json(UserResponse::from(user)))
}

/// Log in and receive a token
///
/// POST /login
async fn login(
    state: web::Data<AppState>,
    req: web::Json<LoginRequest>,
) -> Result<HttpResponse, ApiError> {
    if let Err(errors) = req.validate() {
        return Err(ApiError::Validation(errors.to_string()));
    }

    let token = state.accounts.login(&req.email, &req.password).await?;

    Ok(HttpResponse::Ok().json(LoginResponse { token }))
}
