//! OAuth login endpoints
//!
//! Tokens never reach the browser's script context: they are stored in
//! HttpOnly cookies and read back by the access token extractor.

use axum::{
    extract::{Query, State},
    response::Redirect,
    routing::{get, post},
    Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;

use super::token::{ACCESS_TOKEN_COOKIE, REFRESH_TOKEN_COOKIE};
use crate::{ApiError, ApiResult, AppState};

/// Refresh token cookie lifetime
const REFRESH_TOKEN_MAX_AGE_SECS: i64 = 30 * 24 * 3600;

/// Query parameters of the OAuth callback
#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub error: Option<String>,
}

fn token_cookie(name: &'static str, value: String, max_age_secs: i64, secure: bool) -> Cookie<'static> {
    Cookie::build((name, value))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::seconds(max_age_secs))
        .build()
}

/// GET /auth/login
pub async fn login(State(state): State<AppState>) -> Redirect {
    tracing::info!("Initiating Spotify OAuth login");
    let url = state.oauth.authorize_url();
    tracing::debug!("Redirecting to Spotify auth URL: {}", url);
    Redirect::to(url.as_str())
}

/// GET /auth/callback
///
/// Exchanges the authorization code and stores the tokens as cookies.
pub async fn callback(
    State(state): State<AppState>,
    Query(params): Query<CallbackParams>,
    jar: CookieJar,
) -> ApiResult<(CookieJar, Redirect)> {
    if let Some(error) = params.error {
        tracing::warn!("OAuth callback received error: {}", error);
        return Err(ApiError::BadRequest(format!(
            "Spotify authorization failed: {}",
            error
        )));
    }

    let Some(code) = params.code.filter(|c| !c.is_empty()) else {
        tracing::warn!("OAuth callback missing authorization code");
        return Err(ApiError::BadRequest("Missing authorization code".to_string()));
    };

    tracing::info!("Processing OAuth callback with authorization code");
    let grant = state.oauth.exchange_code(&code).await?;

    let secure = state.settings.is_production();
    let access_max_age = grant
        .expires_in
        .map(|s| s as i64)
        .unwrap_or(state.settings.access_token_expire_minutes as i64 * 60);

    let mut jar = jar.add(token_cookie(
        ACCESS_TOKEN_COOKIE,
        grant.access_token,
        access_max_age,
        secure,
    ));
    tracing::info!("Access token cookie set");

    if let Some(refresh) = grant.refresh_token {
        jar = jar.add(token_cookie(
            REFRESH_TOKEN_COOKIE,
            refresh,
            REFRESH_TOKEN_MAX_AGE_SECS,
            secure,
        ));
        tracing::debug!("Refresh token cookie set");
    }

    Ok((jar, Redirect::to("/")))
}

/// POST /auth/logout
pub async fn logout(jar: CookieJar) -> (CookieJar, Redirect) {
    tracing::info!("User logging out");
    let jar = jar
        .remove(Cookie::build(ACCESS_TOKEN_COOKIE).path("/"))
        .remove(Cookie::build(REFRESH_TOKEN_COOKIE).path("/"));
    (jar, Redirect::to("/"))
}

/// Build auth routes
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", get(login))
        .route("/auth/callback", get(callback))
        .route("/auth/logout", post(logout))
}
