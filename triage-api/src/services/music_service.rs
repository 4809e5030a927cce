//! Music service capability set
//!
//! The triage flow only talks to the streaming service through this trait, so
//! the matching engine and the HTTP layer can be exercised with synthetic data
//! and never need a network call in tests.

use async_trait::async_trait;
use reqwest::{header::RETRY_AFTER, Response, StatusCode};
use thiserror::Error;
use triage_common::FeatureVector;

use crate::models::{AccessToken, PlaylistSummary, Track};

/// Music service errors
#[derive(Debug, Error)]
pub enum SpotifyError {
    #[error("Spotify rejected the access token")]
    Unauthorized,

    #[error("Spotify rate limit exceeded")]
    RateLimited { retry_after_secs: Option<u64> },

    #[error("Spotify resource not found: {0}")]
    NotFound(String),

    #[error("Spotify upstream error {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("Spotify API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl SpotifyError {
    /// Errors that invalidate the whole request rather than one playlist
    pub fn is_request_fatal(&self) -> bool {
        matches!(self, SpotifyError::Unauthorized | SpotifyError::RateLimited { .. })
    }
}

impl From<reqwest::Error> for SpotifyError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            SpotifyError::Parse(e.to_string())
        } else {
            SpotifyError::Network(e.to_string())
        }
    }
}

/// Turn a non-success response into a typed error
pub(crate) async fn error_for_status(response: Response) -> Result<Response, SpotifyError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let url = response.url().to_string();
    match status {
        StatusCode::UNAUTHORIZED => Err(SpotifyError::Unauthorized),
        StatusCode::TOO_MANY_REQUESTS => {
            let retry_after_secs = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse().ok());
            Err(SpotifyError::RateLimited { retry_after_secs })
        }
        StatusCode::NOT_FOUND => Err(SpotifyError::NotFound(url)),
        s if s.is_server_error() => {
            let body = response.text().await.unwrap_or_default();
            tracing::error!("Spotify API error: {} - {}", s.as_u16(), body);
            Err(SpotifyError::Upstream { status: s.as_u16(), body })
        }
        s => {
            let body = response.text().await.unwrap_or_default();
            tracing::error!("Spotify API error: {} - {}", s.as_u16(), body);
            Err(SpotifyError::Api { status: s.as_u16(), body })
        }
    }
}

/// Operations the triage flow needs from the streaming service
#[async_trait]
pub trait MusicService: Send + Sync {
    /// Saved tracks that are not part of any of the user's playlists
    async fn unassigned_saved_tracks(&self, token: &AccessToken) -> Result<Vec<Track>, SpotifyError>;

    /// All playlists of the current user, in service order
    async fn user_playlists(&self, token: &AccessToken) -> Result<Vec<PlaylistSummary>, SpotifyError>;

    /// Audio features of a single track
    async fn track_features(&self, token: &AccessToken, track_id: &str) -> Result<FeatureVector, SpotifyError>;

    /// Audio features of every track in a playlist
    ///
    /// Playlists too small for a profile come back empty without the feature
    /// lookup being made.
    async fn playlist_feature_vectors(
        &self,
        token: &AccessToken,
        playlist_id: &str,
    ) -> Result<Vec<FeatureVector>, SpotifyError>;

    /// Unauthenticated reachability check, returns the HTTP status seen
    async fn probe(&self) -> Result<u16, SpotifyError>;
}
