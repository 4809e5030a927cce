//! triage-api library interface
//!
//! Exposes the router and state so integration tests can drive the service
//! without binding a socket.

pub mod api;
pub mod build_info;
pub mod error;
pub mod models;
pub mod services;

pub use crate::build_info::BuildInfo;
pub use crate::error::{ApiError, ApiResult};

use std::sync::Arc;

use axum::http::{HeaderValue, Method};
use axum::Router;
use chrono::{DateTime, Utc};
use tower_http::cors::{AllowHeaders, AllowOrigin, CorsLayer};
use triage_common::config::Settings;

use crate::services::{MusicService, OAuthClient, SpotifyClient, SpotifyError};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    /// Music service used by triage and health probes
    pub music: Arc<dyn MusicService>,
    pub oauth: Arc<OAuthClient>,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    /// State backed by the real Spotify client
    pub fn new(settings: Settings) -> Result<Self, SpotifyError> {
        let music = Arc::new(SpotifyClient::from_settings(&settings)?);
        Self::with_music_service(settings, music)
    }

    /// State with a caller-supplied music service
    pub fn with_music_service(
        settings: Settings,
        music: Arc<dyn MusicService>,
    ) -> Result<Self, SpotifyError> {
        let oauth = Arc::new(OAuthClient::new(&settings)?);
        Ok(Self {
            settings: Arc::new(settings),
            music,
            oauth,
            startup_time: Utc::now(),
        })
    }
}

/// CORS policy for the configured origins
///
/// Credentials are allowed, so a `*` entry mirrors the request origin
/// instead of sending a literal wildcard.
pub fn cors_layer(settings: &Settings) -> CorsLayer {
    let origin = if settings.cors_origins.iter().any(|o| o == "*") {
        AllowOrigin::mirror_request()
    } else {
        let origins: Vec<HeaderValue> = settings
            .cors_origins
            .iter()
            .filter_map(|o| match HeaderValue::from_str(o) {
                Ok(v) => Some(v),
                Err(_) => {
                    tracing::warn!("Ignoring invalid CORS origin: {}", o);
                    None
                }
            })
            .collect();
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(AllowHeaders::mirror_request())
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::middleware;
    use axum::routing::get;

    let cors = cors_layer(&state.settings);

    Router::new()
        .route("/", get(api::root))
        .merge(api::health_routes())
        .merge(api::auth_routes())
        .merge(api::triage_routes())
        .layer(middleware::from_fn(api::request_logging))
        .layer(cors)
        .with_state(state)
}
