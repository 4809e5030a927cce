//! Service information endpoint

use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::{AppState, BuildInfo};

/// GET /
pub async fn root(State(state): State<AppState>) -> Json<Value> {
    let settings = &state.settings;
    Json(json!({
        "message": format!("Welcome to {}", settings.app_name),
        "version": settings.app_version,
        "environment": settings.environment.to_string(),
        "health_check": "/health",
        "build": BuildInfo::current(),
    }))
}
