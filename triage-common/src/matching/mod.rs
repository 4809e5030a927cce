//! Playlist matching engine
//!
//! Reduces a playlist's per-track audio features to a statistical profile,
//! scores a candidate track against that profile and derives descriptive
//! tags from the comparison.
//!
//! Everything in here is pure and synchronous. Callers hand in already-fetched
//! feature data; no I/O happens inside the engine.

pub mod features;
pub mod profile;
pub mod ranking;
pub mod scorer;
pub mod tags;

pub use features::{Feature, FeatureVector};
pub use profile::{build_profile, PlaylistProfile, MIN_TRACKS_FOR_PROFILE};
pub use ranking::{evaluate, rank_playlists, MatchResult, PlaylistCandidate, PlaylistRef, PlaylistSuggestion};
pub use scorer::{score, weighted_distance, DISTANCE_SCALE, WEIGHT_EPSILON};
pub use tags::{generate_tags, MatchTag};

use thiserror::Error;

/// Failure while scoring a track
///
/// Raised only for numerically broken data. A broken profile or score makes
/// the ranking pass log and skip that playlist; a broken track fails the
/// whole pass.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MatchError {
    #[error("Profile statistic for '{feature}' is not finite")]
    NonFiniteProfile { feature: Feature },

    #[error("Track feature '{feature}' is not finite")]
    NonFiniteTrack { feature: Feature },

    #[error("Match score is not finite (distance = {distance})")]
    NonFiniteScore { distance: f64 },
}
