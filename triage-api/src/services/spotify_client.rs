//! Spotify Web API client
//!
//! Reads the user's library, playlists and audio features. Every paginated
//! endpoint is walked by following the absolute `next` URL the API hands back.

use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use triage_common::config::Settings;
use triage_common::matching::MIN_TRACKS_FOR_PROFILE;
use triage_common::FeatureVector;

use super::music_service::{error_for_status, MusicService, SpotifyError};
use crate::models::{AccessToken, Artist, PlaylistSummary, Track};

/// Largest id list accepted by the audio-features endpoint
pub const MAX_FEATURE_BATCH: usize = 100;

const PLAYLIST_PAGE_LIMIT: u32 = 50;
const SAVED_TRACKS_PAGE_LIMIT: u32 = 50;
const PLAYLIST_TRACKS_PAGE_LIMIT: u32 = 100;
const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// One page of a paginated listing
#[derive(Debug, Deserialize)]
struct Page {
    #[serde(default)]
    items: Vec<Value>,
    next: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PlaylistItem {
    track: Option<TrackRef>,
}

#[derive(Debug, Deserialize)]
struct TrackRef {
    id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SavedItem {
    track: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct RawTrack {
    id: String,
    name: String,
    uri: String,
    #[serde(default)]
    artists: Vec<Artist>,
}

#[derive(Debug, Deserialize)]
struct RawPlaylist {
    id: String,
    name: String,
    owner: Option<RawOwner>,
}

#[derive(Debug, Deserialize)]
struct RawOwner {
    id: Option<String>,
    display_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FeatureBatch {
    #[serde(default)]
    audio_features: Vec<Value>,
}

/// Spotify Web API client
#[derive(Clone)]
pub struct SpotifyClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl SpotifyClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, SpotifyError> {
        let http_client = reqwest::Client::builder()
            .user_agent(concat!("playlist-triage/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| SpotifyError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn from_settings(settings: &Settings) -> Result<Self, SpotifyError> {
        Self::new(
            settings.spotify_api_base_url.clone(),
            Duration::from_secs(settings.http_timeout_secs),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        token: &AccessToken,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T, SpotifyError> {
        tracing::debug!(url = %url, "Querying Spotify API");

        let response = self
            .http_client
            .get(url)
            .bearer_auth(token.as_str())
            .query(query)
            .send()
            .await?;

        let response = error_for_status(response).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| SpotifyError::Parse(e.to_string()))
    }

    /// Collect every item of a paginated listing
    async fn get_all_pages(
        &self,
        token: &AccessToken,
        url: String,
        limit: u32,
    ) -> Result<Vec<Value>, SpotifyError> {
        let mut items = Vec::new();
        let mut page: Page = self
            .get_json(token, &url, &[("limit", limit.to_string())])
            .await?;

        loop {
            items.append(&mut page.items);
            tracing::debug!(total = items.len(), "Retrieved page");

            match page.next.take() {
                Some(next) => page = self.get_json(token, &next, &[]).await?,
                None => break,
            }
        }

        Ok(items)
    }

    /// Ids of the tracks in a playlist, skipping local and unavailable entries
    pub async fn playlist_track_ids(
        &self,
        token: &AccessToken,
        playlist_id: &str,
    ) -> Result<Vec<String>, SpotifyError> {
        let url = format!("{}/playlists/{}/tracks", self.base_url, playlist_id);
        let items = self
            .get_all_pages(token, url, PLAYLIST_TRACKS_PAGE_LIMIT)
            .await?;

        Ok(items
            .into_iter()
            .filter_map(|item| serde_json::from_value::<PlaylistItem>(item).ok())
            .filter_map(|item| item.track.and_then(|t| t.id))
            .collect())
    }

    /// Audio features for a list of ids, `MAX_FEATURE_BATCH` at a time
    ///
    /// Tracks without analysis come back as `null` and are dropped.
    pub async fn features_for_ids(
        &self,
        token: &AccessToken,
        ids: &[String],
    ) -> Result<Vec<FeatureVector>, SpotifyError> {
        let url = format!("{}/audio-features", self.base_url);
        let mut vectors = Vec::with_capacity(ids.len());

        for batch in ids.chunks(MAX_FEATURE_BATCH) {
            let response: FeatureBatch = self
                .get_json(token, &url, &[("ids", batch.join(","))])
                .await?;

            for entry in response.audio_features.iter().filter(|v| !v.is_null()) {
                match FeatureVector::from_json(entry) {
                    Ok(vector) => vectors.push(vector),
                    Err(e) => tracing::warn!("Skipping malformed audio features: {}", e),
                }
            }
        }

        Ok(vectors)
    }

    async fn saved_tracks(&self, token: &AccessToken) -> Result<Vec<Track>, SpotifyError> {
        let url = format!("{}/me/tracks", self.base_url);
        let items = self.get_all_pages(token, url, SAVED_TRACKS_PAGE_LIMIT).await?;

        let mut tracks = Vec::with_capacity(items.len());
        for item in items {
            let Some(raw) = serde_json::from_value::<SavedItem>(item).ok().and_then(|i| i.track) else {
                continue;
            };
            if raw.get("id").and_then(Value::as_str).is_none() {
                continue;
            }

            match serde_json::from_value::<RawTrack>(raw.clone()) {
                Ok(t) => tracks.push(Track {
                    id: t.id,
                    name: t.name,
                    uri: t.uri,
                    artists: t.artists,
                }),
                Err(e) => {
                    tracing::warn!(track_id = ?raw.get("id"), "Failed to parse saved track: {}", e);
                }
            }
        }

        Ok(tracks)
    }
}

fn parse_playlist(item: Value) -> Option<PlaylistSummary> {
    match serde_json::from_value::<RawPlaylist>(item) {
        Ok(p) => {
            let owner = p
                .owner
                .and_then(|o| o.display_name.or(o.id))
                .unwrap_or_default();
            Some(PlaylistSummary { id: p.id, name: p.name, owner })
        }
        Err(e) => {
            tracing::warn!("Failed to parse playlist: {}", e);
            None
        }
    }
}

#[async_trait]
impl MusicService for SpotifyClient {
    async fn unassigned_saved_tracks(&self, token: &AccessToken) -> Result<Vec<Track>, SpotifyError> {
        tracing::info!("Fetching unassigned saved tracks");

        let playlists = self.user_playlists(token).await?;
        let mut assigned = HashSet::new();
        for playlist in &playlists {
            tracing::debug!(playlist_id = %playlist.id, "Fetching tracks for playlist: {}", playlist.name);
            assigned.extend(self.playlist_track_ids(token, &playlist.id).await?);
        }
        tracing::info!(
            "Found {} tracks across {} playlists",
            assigned.len(),
            playlists.len()
        );

        let unassigned: Vec<Track> = self
            .saved_tracks(token)
            .await?
            .into_iter()
            .filter(|t| !assigned.contains(&t.id))
            .collect();

        tracing::info!("Found {} unassigned tracks", unassigned.len());
        Ok(unassigned)
    }

    async fn user_playlists(&self, token: &AccessToken) -> Result<Vec<PlaylistSummary>, SpotifyError> {
        let url = format!("{}/me/playlists", self.base_url);
        let items = self.get_all_pages(token, url, PLAYLIST_PAGE_LIMIT).await?;
        Ok(items.into_iter().filter_map(parse_playlist).collect())
    }

    async fn track_features(&self, token: &AccessToken, track_id: &str) -> Result<FeatureVector, SpotifyError> {
        let url = format!("{}/audio-features/{}", self.base_url, track_id);
        let body: Value = self.get_json(token, &url, &[]).await?;
        FeatureVector::from_json(&body).map_err(|e| SpotifyError::Parse(e.to_string()))
    }

    async fn playlist_feature_vectors(
        &self,
        token: &AccessToken,
        playlist_id: &str,
    ) -> Result<Vec<FeatureVector>, SpotifyError> {
        let ids = self.playlist_track_ids(token, playlist_id).await?;

        if ids.len() < MIN_TRACKS_FOR_PROFILE {
            tracing::warn!(
                playlist_id = %playlist_id,
                "Playlist has only {} tracks, need at least {} for profile",
                ids.len(),
                MIN_TRACKS_FOR_PROFILE
            );
            return Ok(Vec::new());
        }

        let vectors = self.features_for_ids(token, &ids).await?;
        if vectors.is_empty() {
            tracing::warn!(playlist_id = %playlist_id, "No audio features found for playlist");
        }
        Ok(vectors)
    }

    async fn probe(&self) -> Result<u16, SpotifyError> {
        let url = format!("{}/browse/categories", self.base_url);
        let response = self
            .http_client
            .get(&url)
            .timeout(PROBE_TIMEOUT)
            .send()
            .await?;
        Ok(response.status().as_u16())
    }
}
