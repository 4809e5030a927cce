//! Playlist profiles
//!
//! A profile condenses the feature vectors of one playlist into a per-attribute
//! mean and population standard deviation. Playlists below
//! [`MIN_TRACKS_FOR_PROFILE`] tracks have no meaningful sonic identity and get
//! no profile at all.

use serde::Serialize;

use super::features::{Feature, FeatureVector};
use super::MatchError;

/// Minimum number of tracks with features before a profile is built
pub const MIN_TRACKS_FOR_PROFILE: usize = 5;

/// Statistical summary of a playlist's audio features
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaylistProfile {
    means: FeatureVector,
    stddevs: FeatureVector,
    sample_count: usize,
}

impl PlaylistProfile {
    /// Assemble a profile from precomputed statistics
    ///
    /// Intended for callers that already hold summary statistics (tests,
    /// diagnostics). Regular code goes through [`build_profile`].
    pub fn from_parts(means: FeatureVector, stddevs: FeatureVector, sample_count: usize) -> Self {
        Self {
            means,
            stddevs,
            sample_count,
        }
    }

    pub fn means(&self) -> &FeatureVector {
        &self.means
    }

    pub fn stddevs(&self) -> &FeatureVector {
        &self.stddevs
    }

    pub fn mean(&self, feature: Feature) -> f64 {
        self.means.get(feature)
    }

    pub fn stddev(&self, feature: Feature) -> f64 {
        self.stddevs.get(feature)
    }

    /// Number of tracks the profile was built from
    pub fn sample_count(&self) -> usize {
        self.sample_count
    }

    /// Check that every statistic is a finite number
    pub fn validate(&self) -> Result<(), MatchError> {
        for feature in Feature::ALL {
            if !self.mean(feature).is_finite() || !self.stddev(feature).is_finite() {
                return Err(MatchError::NonFiniteProfile { feature });
            }
        }
        Ok(())
    }
}

/// Build a profile from one playlist's track features
///
/// Returns `None` when fewer than [`MIN_TRACKS_FOR_PROFILE`] vectors are given.
/// Input order does not matter. Zero spread is not an error; the scorer floors
/// the weight denominator instead.
pub fn build_profile(vectors: &[FeatureVector]) -> Option<PlaylistProfile> {
    if vectors.len() < MIN_TRACKS_FOR_PROFILE {
        return None;
    }

    let n = vectors.len() as f64;
    let pivot = vectors[0];
    let mut means = FeatureVector::zeros();
    let mut stddevs = FeatureVector::zeros();

    for feature in Feature::ALL {
        // Shifted two-pass: deviations from the first sample keep identical
        // inputs exact (mean == value, stddev == 0).
        let shift = pivot[feature];
        let offset_sum: f64 = vectors.iter().map(|v| v[feature] - shift).sum();
        let mean = shift + offset_sum / n;

        let squared: f64 = vectors
            .iter()
            .map(|v| {
                let d = v[feature] - mean;
                d * d
            })
            .sum();

        means[feature] = mean;
        stddevs[feature] = (squared / n).sqrt();
    }

    Some(PlaylistProfile {
        means,
        stddevs,
        sample_count: vectors.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_vector(seed: f64) -> FeatureVector {
        FeatureVector::from_values([
            0.5 + seed * 0.01,
            0.6 - seed * 0.02,
            seed,
            0.4,
            0.1 * seed,
            0.0,
            0.12,
            0.05,
            100.0 + seed * 5.0,
        ])
    }

    #[test]
    fn test_too_few_tracks_yields_no_profile() {
        for len in 0..MIN_TRACKS_FOR_PROFILE {
            let vectors: Vec<_> = (0..len).map(|i| sample_vector(i as f64)).collect();
            assert!(build_profile(&vectors).is_none(), "len {} should not build", len);
        }
    }

    #[test]
    fn test_five_identical_vectors_build_with_zero_spread() {
        let v = sample_vector(3.0);
        let profile = build_profile(&[v; 5]).expect("five tracks should build");

        assert_eq!(profile.sample_count(), 5);
        assert_eq!(profile.means(), &v);
        for feature in Feature::ALL {
            assert_eq!(profile.stddev(feature), 0.0, "{} spread", feature);
        }
    }

    #[test]
    fn test_identical_vectors_exact_for_many_sizes() {
        let v = FeatureVector::from_values([0.1, 0.7, 11.0, 0.33, 0.9, 0.01, 0.3, 0.07, 173.123]);
        for n in [5, 6, 7, 13, 50, 101, 997] {
            let vectors = vec![v; n];
            let profile = build_profile(&vectors).unwrap();
            assert_eq!(profile.means(), &v, "mean drift at n = {}", n);
            assert!(profile.stddevs().values().iter().all(|&s| s == 0.0));
        }
    }

    #[test]
    fn test_population_standard_deviation() {
        // tempo values 2,4,4,4,5,5,7,9 -> mean 5, population stddev 2
        let tempos = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let vectors: Vec<_> = tempos
            .iter()
            .map(|&t| FeatureVector::zeros().with(Feature::Tempo, t))
            .collect();

        let profile = build_profile(&vectors).unwrap();
        assert!((profile.mean(Feature::Tempo) - 5.0).abs() < 1e-12);
        assert!((profile.stddev(Feature::Tempo) - 2.0).abs() < 1e-12);
        assert_eq!(profile.sample_count(), 8);
    }

    #[test]
    fn test_order_irrelevant() {
        let mut vectors: Vec<_> = (0..9).map(|i| sample_vector(i as f64)).collect();
        let forward = build_profile(&vectors).unwrap();
        vectors.reverse();
        let backward = build_profile(&vectors).unwrap();

        for feature in Feature::ALL {
            assert!((forward.mean(feature) - backward.mean(feature)).abs() < 1e-9);
            assert!((forward.stddev(feature) - backward.stddev(feature)).abs() < 1e-9);
        }
    }

    #[test]
    fn test_validate_flags_overflow() {
        let huge = FeatureVector::zeros().with(Feature::Tempo, f64::MAX);
        let vectors = vec![huge, FeatureVector::zeros(), huge, FeatureVector::zeros(), huge];
        let profile = build_profile(&vectors).unwrap();

        assert_eq!(
            profile.validate(),
            Err(MatchError::NonFiniteProfile {
                feature: Feature::Tempo
            })
        );
    }
}
