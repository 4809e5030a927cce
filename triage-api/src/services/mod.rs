//! Collaborators behind the HTTP layer
//!
//! The music service trait and its Spotify implementation, the OAuth client,
//! and the triage flow that ties them to the matching engine.

pub mod music_service;
pub mod oauth;
pub mod spotify_client;
pub mod triage;

pub use music_service::{MusicService, SpotifyError};
pub use oauth::{OAuthClient, TokenGrant, SPOTIFY_SCOPES};
pub use spotify_client::{SpotifyClient, MAX_FEATURE_BATCH};
pub use triage::{next_song, TriageResponse, PLAYLIST_FETCH_CONCURRENCY};
