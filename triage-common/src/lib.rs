//! # Playlist Triage Common Library
//!
//! Shared code for the playlist triage service including:
//! - Error types
//! - Configuration loading
//! - The playlist matching engine (profiles, scoring, tags, ranking)

pub mod config;
pub mod error;
pub mod matching;

pub use error::{Error, Result};
pub use matching::{Feature, FeatureVector, PlaylistProfile};
