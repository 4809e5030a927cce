//! Health check endpoints
//!
//! `/health` answers without touching any dependency. `/health/detailed`
//! probes the music service and runs a matching engine self-check.

use std::collections::BTreeMap;
use std::time::Instant;

use axum::{extract::State, routing::get, Json, Router};
use chrono::Utc;
use serde::Serialize;
use serde_json::{json, Value};
use triage_common::matching::{build_profile, evaluate, MIN_TRACKS_FOR_PROFILE};
use triage_common::{Feature, FeatureVector};

use crate::AppState;

/// Status of a single dependency check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

/// Result of a single dependency check
#[derive(Debug, Clone, Serialize)]
pub struct ServiceCheck {
    pub status: CheckStatus,
    pub response_time_ms: u64,
    pub message: String,
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// "healthy", "degraded" or "unhealthy"
    pub status: String,
    pub timestamp: String,
    pub version: String,
    pub environment: String,
    /// Seconds since service started
    pub uptime_seconds: u64,
    pub checks: BTreeMap<String, ServiceCheck>,
}

impl HealthResponse {
    fn new(state: &AppState, status: &str, checks: BTreeMap<String, ServiceCheck>) -> Self {
        let uptime = Utc::now().signed_duration_since(state.startup_time);
        Self {
            status: status.to_string(),
            timestamp: Utc::now().to_rfc3339(),
            version: state.settings.app_version.clone(),
            environment: state.settings.environment.to_string(),
            uptime_seconds: uptime.num_seconds().max(0) as u64,
            checks,
        }
    }
}

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse::new(&state, "healthy", BTreeMap::new()))
}

/// GET /health/detailed
///
/// Any music service trouble degrades the service. A failing engine
/// self-check makes it unhealthy.
pub async fn detailed_health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    tracing::info!("Running detailed health check");

    let spotify = check_music_service(&state).await;
    let engine = check_matching_engine();

    let overall = if engine.status != CheckStatus::Healthy {
        "unhealthy"
    } else if spotify.status != CheckStatus::Healthy {
        "degraded"
    } else {
        "healthy"
    };

    tracing::info!("Health check completed with status: {}", overall);

    let mut checks = BTreeMap::new();
    checks.insert("spotify_api".to_string(), spotify);
    checks.insert("matching_engine".to_string(), engine);
    Json(HealthResponse::new(&state, overall, checks))
}

/// GET /health/ready
pub async fn readiness_check(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ready",
        "timestamp": Utc::now().to_rfc3339(),
        "environment": state.settings.environment.to_string(),
    }))
}

/// GET /health/live
pub async fn liveness_check() -> Json<Value> {
    Json(json!({
        "status": "alive",
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

async fn check_music_service(state: &AppState) -> ServiceCheck {
    let start = Instant::now();
    let result = state.music.probe().await;
    let response_time_ms = start.elapsed().as_millis() as u64;

    let (status, message) = match result {
        Ok(200) => (CheckStatus::Healthy, "Spotify API is fully accessible".to_string()),
        // Expected without credentials, still proves reachability
        Ok(401) => (CheckStatus::Healthy, "Spotify API is reachable".to_string()),
        Ok(code) => (
            CheckStatus::Degraded,
            format!("Spotify API returned status {}", code),
        ),
        Err(e) => (CheckStatus::Unhealthy, format!("Spotify API error: {}", e)),
    };

    ServiceCheck { status, response_time_ms, message }
}

/// Score a synthetic track against a profile built from copies of itself
pub fn check_matching_engine() -> ServiceCheck {
    let start = Instant::now();

    let probe = FeatureVector::zeros()
        .with(Feature::Danceability, 0.5)
        .with(Feature::Energy, 0.5)
        .with(Feature::Tempo, 120.0);
    let tracks = vec![probe; MIN_TRACKS_FOR_PROFILE];

    let outcome = build_profile(&tracks)
        .ok_or_else(|| "profile could not be built".to_string())
        .and_then(|profile| evaluate(&probe, &profile).map_err(|e| e.to_string()));

    let (status, message) = match outcome {
        Ok(result) if result.score == 100.0 => {
            (CheckStatus::Healthy, "Matching engine working".to_string())
        }
        Ok(result) => (
            CheckStatus::Unhealthy,
            format!("Matching engine self-check scored {}", result.score),
        ),
        Err(e) => (CheckStatus::Unhealthy, format!("Matching engine error: {}", e)),
    };

    ServiceCheck {
        status,
        response_time_ms: start.elapsed().as_millis() as u64,
        message,
    }
}

/// Build health check routes
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/health/detailed", get(detailed_health_check))
        .route("/health/ready", get(readiness_check))
        .route("/health/live", get(liveness_check))
}
