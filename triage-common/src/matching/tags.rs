//! Descriptive matching tags
//!
//! Threshold rules over the track's features and the playlist's spread.
//! Rules are evaluated in a fixed order so identical inputs always give the
//! same tag sequence.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::features::{Feature, FeatureVector};
use super::profile::PlaylistProfile;

const HIGH_ENERGY: f64 = 0.7;
const LOW_ENERGY: f64 = 0.3;
const VERY_DANCEABLE: f64 = 0.7;
const POSITIVE_MOOD: f64 = 0.7;
const MELANCHOLIC: f64 = 0.3;
const ACOUSTIC: f64 = 0.6;
const INSTRUMENTAL: f64 = 0.5;
/// Key spread (in pitch classes) below which a playlist counts as one-key
const CONSISTENT_KEY_STDDEV: f64 = 1.0;
/// Tempo spread (in BPM) below which a playlist counts as one-tempo
const CONSISTENT_TEMPO_STDDEV: f64 = 20.0;

/// Human-readable label attached to a suggestion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchTag {
    #[serde(rename = "High Energy")]
    HighEnergy,
    #[serde(rename = "Low Energy")]
    LowEnergy,
    #[serde(rename = "Very Danceable")]
    VeryDanceable,
    #[serde(rename = "Positive Mood")]
    PositiveMood,
    #[serde(rename = "Melancholic")]
    Melancholic,
    #[serde(rename = "Acoustic")]
    Acoustic,
    #[serde(rename = "Instrumental")]
    Instrumental,
    #[serde(rename = "Consistent Key")]
    ConsistentKey,
    #[serde(rename = "Consistent Tempo")]
    ConsistentTempo,
}

impl MatchTag {
    pub fn label(&self) -> &'static str {
        match self {
            MatchTag::HighEnergy => "High Energy",
            MatchTag::LowEnergy => "Low Energy",
            MatchTag::VeryDanceable => "Very Danceable",
            MatchTag::PositiveMood => "Positive Mood",
            MatchTag::Melancholic => "Melancholic",
            MatchTag::Acoustic => "Acoustic",
            MatchTag::Instrumental => "Instrumental",
            MatchTag::ConsistentKey => "Consistent Key",
            MatchTag::ConsistentTempo => "Consistent Tempo",
        }
    }
}

impl fmt::Display for MatchTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Derive tags for a track against one playlist profile
///
/// Energy and valence each yield at most one tag (high wins over low); every
/// other rule is independent.
pub fn generate_tags(track: &FeatureVector, profile: &PlaylistProfile) -> Vec<MatchTag> {
    let mut tags = Vec::new();

    let energy = track.get(Feature::Energy);
    if energy > HIGH_ENERGY {
        tags.push(MatchTag::HighEnergy);
    } else if energy < LOW_ENERGY {
        tags.push(MatchTag::LowEnergy);
    }

    if track.get(Feature::Danceability) > VERY_DANCEABLE {
        tags.push(MatchTag::VeryDanceable);
    }

    let valence = track.get(Feature::Valence);
    if valence > POSITIVE_MOOD {
        tags.push(MatchTag::PositiveMood);
    } else if valence < MELANCHOLIC {
        tags.push(MatchTag::Melancholic);
    }

    if track.get(Feature::Acousticness) > ACOUSTIC {
        tags.push(MatchTag::Acoustic);
    }

    if track.get(Feature::Instrumentalness) > INSTRUMENTAL {
        tags.push(MatchTag::Instrumental);
    }

    if profile.stddev(Feature::Key) < CONSISTENT_KEY_STDDEV {
        tags.push(MatchTag::ConsistentKey);
    }

    if profile.stddev(Feature::Tempo) < CONSISTENT_TEMPO_STDDEV {
        tags.push(MatchTag::ConsistentTempo);
    }

    tags
}
