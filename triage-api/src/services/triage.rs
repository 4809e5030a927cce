//! Next-song triage orchestration
//!
//! Picks the first unassigned saved track and ranks the user's playlists
//! against it. Playlist feature lookups run with bounded concurrency; a
//! playlist whose lookup fails is logged and left out of the suggestions.

use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use triage_common::matching::{rank_playlists, PlaylistCandidate, PlaylistRef, PlaylistSuggestion};

use super::music_service::{MusicService, SpotifyError};
use crate::models::{AccessToken, Track};

/// Playlist feature lookups in flight at once
pub const PLAYLIST_FETCH_CONCURRENCY: usize = 4;

/// Song to sort plus ranked destinations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriageResponse {
    pub song_to_sort: Track,
    pub suggestions: Vec<PlaylistSuggestion>,
}

/// Build the next triage item, or `None` when every saved track is assigned
///
/// Authorization and rate-limit failures abort the whole request. Any other
/// failure while loading a single playlist only drops that playlist.
pub async fn next_song(
    music: &dyn MusicService,
    token: &AccessToken,
) -> Result<Option<TriageResponse>, SpotifyError> {
    let unassigned = music.unassigned_saved_tracks(token).await?;
    let Some(song) = unassigned.into_iter().next() else {
        tracing::info!("No unassigned songs found");
        return Ok(None);
    };

    tracing::info!(track_id = %song.id, "Processing song: {} by {}", song.name, song.artist_names());

    let playlists = music.user_playlists(token).await?;
    let track_features = music.track_features(token, &song.id).await?;

    let lookups: Vec<_> = stream::iter(playlists)
        .map(|playlist| async move {
            let result = music.playlist_feature_vectors(token, &playlist.id).await;
            (playlist, result)
        })
        .buffered(PLAYLIST_FETCH_CONCURRENCY)
        .collect()
        .await;

    let mut candidates = Vec::with_capacity(lookups.len());
    for (playlist, result) in lookups {
        match result {
            Ok(tracks) => candidates.push(PlaylistCandidate::new(
                PlaylistRef::new(playlist.id, playlist.name),
                tracks,
            )),
            Err(e) if e.is_request_fatal() => return Err(e),
            Err(e) => {
                tracing::warn!(
                    playlist_id = %playlist.id,
                    "Failed to process playlist {}: {}",
                    playlist.name,
                    e
                );
            }
        }
    }

    // Unscorable upstream features count as a bad payload
    let suggestions = rank_playlists(&track_features, candidates)
        .map_err(|e| SpotifyError::Parse(format!("track {}: {}", song.id, e)))?;
    tracing::info!("Generated {} playlist suggestions", suggestions.len());

    Ok(Some(TriageResponse {
        song_to_sort: song,
        suggestions,
    }))
}
