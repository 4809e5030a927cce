//! Triage endpoint

use axum::{extract::State, routing::get, Json, Router};
use serde_json::json;

use crate::models::AccessToken;
use crate::services::{self, TriageResponse};
use crate::{ApiError, ApiResult, AppState};

/// GET /triage/next
///
/// Next unassigned saved song with playlist suggestions, best match first.
pub async fn next_song(
    State(state): State<AppState>,
    token: AccessToken,
) -> ApiResult<Json<TriageResponse>> {
    tracing::info!("Processing triage request for next song");

    match services::next_song(state.music.as_ref(), &token).await? {
        Some(response) => Ok(Json(response)),
        None => Err(ApiError::NotFound {
            message: "No unassigned songs found".to_string(),
            details: Some(json!({
                "message": "All your saved songs are already in playlists!"
            })),
        }),
    }
}

/// Build triage routes
pub fn triage_routes() -> Router<AppState> {
    Router::new().route("/triage/next", get(next_song))
}
