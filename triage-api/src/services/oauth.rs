//! Spotify authorization-code flow

use std::time::Duration;

use reqwest::Url;
use serde::Deserialize;
use triage_common::config::Settings;

use super::music_service::{error_for_status, SpotifyError};

/// Scopes requested at login
pub const SPOTIFY_SCOPES: [&str; 5] = [
    "playlist-read-private",
    "playlist-modify-public",
    "playlist-modify-private",
    "user-library-read",
    "user-read-private",
];

/// Token endpoint response
#[derive(Debug, Clone, Deserialize)]
pub struct TokenGrant {
    pub access_token: String,
    pub token_type: Option<String>,
    /// Lifetime of `access_token` in seconds
    pub expires_in: Option<u64>,
    pub refresh_token: Option<String>,
    pub scope: Option<String>,
}

/// OAuth client for the accounts service
pub struct OAuthClient {
    http_client: reqwest::Client,
    authorize_endpoint: Url,
    token_endpoint: Url,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
}

impl OAuthClient {
    pub fn new(settings: &Settings) -> Result<Self, SpotifyError> {
        let accounts = settings.spotify_accounts_base_url.trim_end_matches('/');
        let authorize_endpoint = Url::parse(&format!("{}/authorize", accounts))
            .map_err(|e| SpotifyError::InvalidUrl(format!("{}: {}", accounts, e)))?;
        let token_endpoint = Url::parse(&format!("{}/api/token", accounts))
            .map_err(|e| SpotifyError::InvalidUrl(format!("{}: {}", accounts, e)))?;

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.http_timeout_secs))
            .build()
            .map_err(|e| SpotifyError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            authorize_endpoint,
            token_endpoint,
            client_id: settings.spotify_client_id.clone(),
            client_secret: settings.spotify_client_secret.clone(),
            redirect_uri: settings.spotify_redirect_uri.clone(),
        })
    }

    /// Login URL the user is redirected to
    pub fn authorize_url(&self) -> Url {
        let mut url = self.authorize_endpoint.clone();
        url.query_pairs_mut()
            .append_pair("client_id", &self.client_id)
            .append_pair("response_type", "code")
            .append_pair("redirect_uri", &self.redirect_uri)
            .append_pair("scope", &SPOTIFY_SCOPES.join(" "))
            // Force the consent screen so users can switch accounts
            .append_pair("show_dialog", "true");
        url
    }

    /// Exchange an authorization code for tokens
    pub async fn exchange_code(&self, code: &str) -> Result<TokenGrant, SpotifyError> {
        tracing::debug!("Requesting tokens from Spotify");

        let form = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", self.redirect_uri.as_str()),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
        ];

        let response = self
            .http_client
            .post(self.token_endpoint.clone())
            .form(&form)
            .send()
            .await?;

        let grant: TokenGrant = error_for_status(response)
            .await?
            .json()
            .await
            .map_err(|e| SpotifyError::Parse(e.to_string()))?;

        tracing::info!("Successfully obtained tokens from Spotify");
        Ok(grant)
    }
}
