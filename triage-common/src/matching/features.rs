//! Audio feature vectors
//!
//! A fixed, ordered set of nine audio attributes describing one track (or the
//! mean/spread of a playlist). Attribute order never changes, so vectors can
//! be compared slot by slot.

use std::collections::HashMap;
use std::fmt;
use std::ops::{Index, IndexMut};

use serde::de::{self, Deserializer};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{Error, Result};

/// Number of attributes in a feature vector
pub const FEATURE_COUNT: usize = 9;

/// Named audio attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    Danceability,
    Energy,
    /// Pitch class 0-11, treated as real-valued for statistics
    Key,
    Valence,
    Acousticness,
    Instrumentalness,
    Liveness,
    Speechiness,
    /// Beats per minute
    Tempo,
}

impl Feature {
    /// All attributes in canonical order
    pub const ALL: [Feature; FEATURE_COUNT] = [
        Feature::Danceability,
        Feature::Energy,
        Feature::Key,
        Feature::Valence,
        Feature::Acousticness,
        Feature::Instrumentalness,
        Feature::Liveness,
        Feature::Speechiness,
        Feature::Tempo,
    ];

    /// Attribute name as used by the music service
    pub fn as_str(&self) -> &'static str {
        match self {
            Feature::Danceability => "danceability",
            Feature::Energy => "energy",
            Feature::Key => "key",
            Feature::Valence => "valence",
            Feature::Acousticness => "acousticness",
            Feature::Instrumentalness => "instrumentalness",
            Feature::Liveness => "liveness",
            Feature::Speechiness => "speechiness",
            Feature::Tempo => "tempo",
        }
    }

    /// Look up an attribute by name; unknown names yield `None`
    pub fn from_name(name: &str) -> Option<Feature> {
        Feature::ALL.iter().copied().find(|f| f.as_str() == name)
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fixed-schema audio feature vector
///
/// Missing attributes are 0.0. Values are taken as-is; no range checks.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FeatureVector {
    values: [f64; FEATURE_COUNT],
}

impl FeatureVector {
    /// Vector with every attribute set to 0.0
    pub fn zeros() -> Self {
        Self::default()
    }

    /// Build from raw values in `Feature::ALL` order
    ///
    /// Unchecked; see [`FeatureVector::first_non_finite`].
    pub fn from_values(values: [f64; FEATURE_COUNT]) -> Self {
        Self { values }
    }

    /// Build from a name → value mapping
    ///
    /// Absent attributes default to 0.0 and unknown names are ignored.
    /// Non-finite values are rejected since they would silently poison every
    /// score computed against this vector.
    pub fn from_map<K: AsRef<str>>(map: &HashMap<K, f64>) -> Result<Self> {
        let mut vector = Self::zeros();
        for (name, value) in map {
            let Some(feature) = Feature::from_name(name.as_ref()) else {
                continue;
            };
            if !value.is_finite() {
                return Err(Error::InvalidInput(format!(
                    "feature '{}' is not a finite number: {}",
                    feature, value
                )));
            }
            vector.set(feature, *value);
        }
        Ok(vector)
    }

    /// Build from a JSON object such as a Spotify `audio_features` entry
    ///
    /// Keys that are not feature names (`id`, `uri`, `type`, ...) are ignored
    /// and `null` counts as absent. A feature key carrying anything other than
    /// a number is a contract violation.
    pub fn from_json(value: &Value) -> Result<Self> {
        let object = value.as_object().ok_or_else(|| {
            Error::InvalidInput(format!("audio features must be a JSON object, got {}", value))
        })?;

        let mut vector = Self::zeros();
        for (name, raw) in object {
            let Some(feature) = Feature::from_name(name) else {
                continue;
            };
            match raw {
                Value::Null => {}
                Value::Number(n) => {
                    let v = n.as_f64().ok_or_else(|| {
                        Error::InvalidInput(format!("feature '{}' is out of range", feature))
                    })?;
                    vector.set(feature, v);
                }
                other => {
                    return Err(Error::InvalidInput(format!(
                        "feature '{}' must be numeric, got {}",
                        feature, other
                    )));
                }
            }
        }
        Ok(vector)
    }

    /// First attribute holding NaN or an infinity, if any
    pub fn first_non_finite(&self) -> Option<Feature> {
        self.iter().find(|(_, v)| !v.is_finite()).map(|(f, _)| f)
    }

    pub fn get(&self, feature: Feature) -> f64 {
        self.values[feature.index()]
    }

    pub fn set(&mut self, feature: Feature, value: f64) {
        self.values[feature.index()] = value;
    }

    /// Builder-style setter
    pub fn with(mut self, feature: Feature, value: f64) -> Self {
        self.set(feature, value);
        self
    }

    /// Raw values in `Feature::ALL` order
    pub fn values(&self) -> &[f64; FEATURE_COUNT] {
        &self.values
    }

    /// Iterate `(feature, value)` pairs in canonical order
    pub fn iter(&self) -> impl Iterator<Item = (Feature, f64)> + '_ {
        Feature::ALL.iter().map(move |&f| (f, self.get(f)))
    }
}

impl Index<Feature> for FeatureVector {
    type Output = f64;

    fn index(&self, feature: Feature) -> &f64 {
        &self.values[feature.index()]
    }
}

impl IndexMut<Feature> for FeatureVector {
    fn index_mut(&mut self, feature: Feature) -> &mut f64 {
        &mut self.values[feature.index()]
    }
}

impl Serialize for FeatureVector {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(FEATURE_COUNT))?;
        for (feature, value) in self.iter() {
            map.serialize_entry(feature.as_str(), &value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for FeatureVector {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        FeatureVector::from_json(&value).map_err(de::Error::custom)
    }
}
