use actix_web::{dev::Payload, http::header, web, FromRequest, HttpRequest};
use std::future::Future;
use std::pin::Pin;

use crate::models::User;
use crate::routes::{error::ApiError, AppState};

/// The user behind an `Authorization: Token <value>` header
pub struct AuthUser(pub User);

impl FromRequest for AuthUser {
    type Error = ApiError;
    type Future = Pin<Box<dyn Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let state = req.app_data::<web::Data<AppState>>().cloned();
        let auth_header = req
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);

        Box::pin(async move {
            let state = state.ok_or_else(|| {
                tracing::error!("AppState is not registered on the app");
                ApiError::Internal
            })?;

            let auth_header = auth_header
                .ok_or_else(|| ApiError::Unauthorized("Missing Authorization header".to_string()))?;

            let token = parse_token(&auth_header).ok_or_else(|| {
                ApiError::Unauthorized("Invalid Authorization header format".to_string())
            })?;

            match state.accounts.authenticate(token).await? {
                Some(user) => Ok(AuthUser(user)),
                None => Err(ApiError::Unauthorized("Invalid token".to_string())),
            }
        })
    }
}

fn parse_token(auth_header: &str) -> Option<&str> {
    let (scheme, token) = auth_header.split_once(' ')?;
    let token = token.trim();
    (scheme == "Token" && !token.is_empty()).then_some(token)
}
