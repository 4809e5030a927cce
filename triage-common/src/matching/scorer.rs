//! Track-to-playlist match scoring
//!
//! Weighted squared distance between a track and a playlist profile, mapped to
//! a bounded 0-100 score via exponential decay:
//!
//! ```text
//! weight_f  = 1 / max(stddev_f, WEIGHT_EPSILON)
//! distance  = Σ weight_f × (track_f − mean_f)²
//! score     = clamp(100 × exp(−distance / DISTANCE_SCALE), 0, 100)
//! ```
//!
//! Attributes a playlist is tight on get large weights, so a playlist with a
//! fixed tempo punishes tempo mismatches hard. Both constants must stay as they
//! are for scores to remain comparable with existing output.

use super::features::{Feature, FeatureVector};
use super::profile::PlaylistProfile;
use super::MatchError;

/// Floor for the weight denominator (zero-spread attributes)
pub const WEIGHT_EPSILON: f64 = 1e-6;

/// Divisor applied to the distance before exponential decay
pub const DISTANCE_SCALE: f64 = 10.0;

/// Upper bound of the score range
pub const MAX_SCORE: f64 = 100.0;

/// Weighted squared distance between a track and a profile's means
pub fn weighted_distance(track: &FeatureVector, profile: &PlaylistProfile) -> f64 {
    Feature::ALL
        .iter()
        .map(|&feature| {
            let weight = 1.0 / profile.stddev(feature).max(WEIGHT_EPSILON);
            let diff = track.get(feature) - profile.mean(feature);
            weight * diff * diff
        })
        .sum()
}

/// Compatibility score in `[0, 100]`; 100 means the track sits on the means
///
/// A track with a NaN or infinite attribute is rejected, as is any pairing
/// whose distance comes out NaN (`clamp` would pass NaN through).
pub fn score(track: &FeatureVector, profile: &PlaylistProfile) -> Result<f64, MatchError> {
    if let Some(feature) = track.first_non_finite() {
        return Err(MatchError::NonFiniteTrack { feature });
    }

    let distance = weighted_distance(track, profile);
    if distance.is_nan() {
        return Err(MatchError::NonFiniteScore { distance });
    }
    Ok(distance_to_score(distance))
}

/// Map a distance to the bounded score
pub fn distance_to_score(distance: f64) -> f64 {
    (MAX_SCORE * (-distance / DISTANCE_SCALE).exp()).clamp(0.0, MAX_SCORE)
}
