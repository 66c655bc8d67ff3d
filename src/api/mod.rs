//! API handlers for the Libris REST endpoints

pub mod auth;
pub mod books;
pub mod health;

use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};

use crate::{error::AppError, models::user::UserClaims, AppState};

/// Extractor for the authenticated user from a JWT bearer token.
/// Route handlers that take this reject unauthenticated requests.
pub struct AuthenticatedUser(pub UserClaims);

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| {
                AppError::Authentication("Missing authorization header".to_string())
            })?;

        let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
            AppError::Authentication("Invalid authorization header format".to_string())
        })?;

        let claims = UserClaims::from_token(token, &state.config.auth.jwt_secret)
            .map_err(|e| AppError::Authentication(e.to_string()))?;

        Ok(AuthenticatedUser(claims))
    }
}

/// Request-logging middleware: one line per request, tagged with the
/// username decoded from the bearer token. Decoding here is for
/// identification only and never rejects the request; route extractors
/// enforce authentication.
pub async fn request_log(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();

    let username = match request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
    {
        Some(header) => match header.strip_prefix("Bearer ") {
            Some(token) => match UserClaims::from_token(token, &state.config.auth.jwt_secret) {
                Ok(claims) => claims.username,
                Err(_) => "invalid-token".to_string(),
            },
            None => "invalid-token".to_string(),
        },
        None => "anonymous".to_string(),
    };

    tracing::info!(user = %username, "{} {}", method, uri);

    next.run(request).await
}
