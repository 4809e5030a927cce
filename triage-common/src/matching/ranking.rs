//! Suggestion ranking
//!
//! Scores one candidate track against every playlist that has enough data
//! for a profile and returns the suggestions best-first. A playlist that
//! cannot be evaluated is logged and dropped. Only a broken candidate track
//! fails the pass.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::features::FeatureVector;
use super::profile::{build_profile, PlaylistProfile};
use super::scorer::score;
use super::tags::{generate_tags, MatchTag};
use super::MatchError;

/// Playlist identity as shown to the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistRef {
    pub id: String,
    pub name: String,
}

impl PlaylistRef {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// One playlist's raw input to a ranking pass
#[derive(Debug, Clone)]
pub struct PlaylistCandidate {
    pub playlist: PlaylistRef,
    /// Feature vectors of the playlist's tracks
    pub tracks: Vec<FeatureVector>,
}

impl PlaylistCandidate {
    pub fn new(playlist: PlaylistRef, tracks: Vec<FeatureVector>) -> Self {
        Self { playlist, tracks }
    }
}

/// Outcome of scoring one track against one profile
#[derive(Debug, Clone, PartialEq)]
pub struct MatchResult {
    /// Compatibility in `[0, 100]`
    pub score: f64,
    pub tags: Vec<MatchTag>,
}

/// Ranked suggestion, in the wire shape the API returns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaylistSuggestion {
    pub playlist_id: String,
    pub playlist_name: String,
    /// 0.0 to 100.0
    pub match_score: f64,
    pub matching_tags: Vec<MatchTag>,
}

impl PlaylistSuggestion {
    fn new(playlist: PlaylistRef, result: MatchResult) -> Self {
        Self {
            playlist_id: playlist.id,
            playlist_name: playlist.name,
            match_score: result.score,
            matching_tags: result.tags,
        }
    }
}

/// Score and tag a track against a built profile
///
/// Fails when the track, the profile or the resulting score is not finite.
pub fn evaluate(track: &FeatureVector, profile: &PlaylistProfile) -> Result<MatchResult, MatchError> {
    profile.validate()?;

    Ok(MatchResult {
        score: score(track, profile)?,
        tags: generate_tags(track, profile),
    })
}

/// Rank playlists for a candidate track
///
/// Playlists without a profile (too few tracks) and playlists whose evaluation
/// fails are skipped. The result is sorted by descending score; the sort is
/// stable so ties keep the input order.
///
/// A track with a non-finite attribute is rejected up front with
/// [`MatchError::NonFiniteTrack`].
pub fn rank_playlists<I>(
    track: &FeatureVector,
    candidates: I,
) -> Result<Vec<PlaylistSuggestion>, MatchError>
where
    I: IntoIterator<Item = PlaylistCandidate>,
{
    if let Some(feature) = track.first_non_finite() {
        return Err(MatchError::NonFiniteTrack { feature });
    }

    let mut suggestions: Vec<PlaylistSuggestion> = candidates
        .into_iter()
        .filter_map(|candidate| {
            let PlaylistCandidate { playlist, tracks } = candidate;

            let Some(profile) = build_profile(&tracks) else {
                debug!(
                    playlist_id = %playlist.id,
                    tracks = tracks.len(),
                    "Skipping playlist '{}' - insufficient tracks for profile",
                    playlist.name
                );
                return None;
            };

            match evaluate(track, &profile) {
                Ok(result) => Some(PlaylistSuggestion::new(playlist, result)),
                Err(e) => {
                    warn!(
                        playlist_id = %playlist.id,
                        "Failed to evaluate playlist '{}': {}",
                        playlist.name,
                        e
                    );
                    None
                }
            }
        })
        .collect();

    suggestions.sort_by(|a, b| b.match_score.total_cmp(&a.match_score));
    Ok(suggestions)
}
