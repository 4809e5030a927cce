//! Test Helper Utilities
//!
//! Shared utilities for testing triage-api

#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::Response;
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use triage_api::models::{AccessToken, Artist, PlaylistSummary, Track};
use triage_api::services::{MusicService, SpotifyError};
use triage_api::{build_router, AppState};
use triage_common::config::{Settings, TomlConfig};
use triage_common::{Feature, FeatureVector};

/// Settings with test credentials plus any extra environment values
pub fn test_settings(extra: &[(&str, &str)]) -> Settings {
    let mut env: HashMap<String, String> = HashMap::new();
    env.insert("SPOTIFY_CLIENT_ID".into(), "test-client-id".into());
    env.insert("SPOTIFY_CLIENT_SECRET".into(), "test-client-secret".into());
    for (k, v) in extra {
        env.insert(k.to_string(), v.to_string());
    }
    Settings::resolve(TomlConfig::default(), |key| env.get(key).cloned()).unwrap()
}

/// In-memory music service
#[derive(Default, Clone)]
pub struct FakeMusicService {
    pub unassigned: Vec<Track>,
    pub playlists: Vec<PlaylistSummary>,
    pub track_features: FeatureVector,
    pub playlist_vectors: HashMap<String, Vec<FeatureVector>>,
    pub probe_status: Option<u16>,
}

#[async_trait]
impl MusicService for FakeMusicService {
    async fn unassigned_saved_tracks(&self, _: &AccessToken) -> Result<Vec<Track>, SpotifyError> {
        Ok(self.unassigned.clone())
    }

    async fn user_playlists(&self, _: &AccessToken) -> Result<Vec<PlaylistSummary>, SpotifyError> {
        Ok(self.playlists.clone())
    }

    async fn track_features(&self, _: &AccessToken, _: &str) -> Result<FeatureVector, SpotifyError> {
        Ok(self.track_features)
    }

    async fn playlist_feature_vectors(
        &self,
        _: &AccessToken,
        playlist_id: &str,
    ) -> Result<Vec<FeatureVector>, SpotifyError> {
        Ok(self.playlist_vectors.get(playlist_id).cloned().unwrap_or_default())
    }

    async fn probe(&self) -> Result<u16, SpotifyError> {
        self.probe_status
            .ok_or_else(|| SpotifyError::Network("connection refused".to_string()))
    }
}

impl FakeMusicService {
    pub fn with_playlist(mut self, id: &str, name: &str, vectors: Vec<FeatureVector>) -> Self {
        self.playlists.push(PlaylistSummary {
            id: id.to_string(),
            name: name.to_string(),
            owner: "tester".to_string(),
        });
        self.playlist_vectors.insert(id.to_string(), vectors);
        self
    }
}

pub fn track(id: &str, name: &str) -> Track {
    Track {
        id: id.to_string(),
        name: name.to_string(),
        uri: format!("spotify:track:{}", id),
        artists: vec![Artist { id: "artist1".to_string(), name: "Test Artist".to_string() }],
    }
}

/// `count` vectors spread slightly around the given energy and tempo
pub fn cluster(energy: f64, tempo: f64, count: usize) -> Vec<FeatureVector> {
    (0..count)
        .map(|i| {
            let jitter = i as f64 - (count as f64 - 1.0) / 2.0;
            FeatureVector::zeros()
                .with(Feature::Energy, energy + jitter * 0.02)
                .with(Feature::Danceability, 0.6)
                .with(Feature::Tempo, tempo + jitter * 2.0)
        })
        .collect()
}

pub fn app_with(music: FakeMusicService, settings: Settings) -> Router {
    let state = AppState::with_music_service(settings, Arc::new(music)).unwrap();
    build_router(state)
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Serve a router on an ephemeral local port
pub async fn spawn_mock(router: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

/// Like `spawn_mock`, but the router is built knowing its own address
pub async fn spawn_mock_with<F>(build: F) -> SocketAddr
where
    F: FnOnce(SocketAddr) -> Router,
{
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let router = build(addr);
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}
