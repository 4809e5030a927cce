//! Access token extraction
//!
//! The token is read from the `access_token` cookie set at login, falling back
//! to an `Authorization: Bearer` header for non-browser clients.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use axum_extra::extract::cookie::CookieJar;

use crate::models::AccessToken;
use crate::ApiError;

/// Cookie holding the music service access token
pub const ACCESS_TOKEN_COOKIE: &str = "access_token";
/// Cookie holding the refresh token
pub const REFRESH_TOKEN_COOKIE: &str = "refresh_token";

fn bearer_token(parts: &Parts) -> Option<String> {
    let header = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = header.strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then(|| token.to_string())
}

#[async_trait]
impl<S> FromRequestParts<S> for AccessToken
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let from_cookie = jar
            .get(ACCESS_TOKEN_COOKIE)
            .map(|c| c.value().to_string())
            .filter(|v| !v.is_empty());

        match from_cookie.or_else(|| bearer_token(parts)) {
            Some(token) => Ok(AccessToken::new(token)),
            None => {
                tracing::warn!("No access token found in request");
                Err(ApiError::Unauthorized("Authentication required".to_string()))
            }
        }
    }
}
