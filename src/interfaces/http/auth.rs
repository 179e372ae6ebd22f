//! Bearer-token extractor

use crate::domain::account::UserAccount;
use crate::interfaces::http::AppState;
use crate::interfaces::http::error::ApiError;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

/// The account behind the request's `Authorization: Bearer <token>` header.
/// Rejects with 401 when the header is missing or the token does not resolve.
pub struct AuthenticatedUser(pub UserAccount);

impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)
            .ok_or_else(|| ApiError::Unauthenticated("Not authenticated".to_string()))?;

        let account = state.services.accounts.authenticate(token).await?;
        Ok(AuthenticatedUser(account))
    }
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    let value = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    let token = token.trim();

    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}
