use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use super::error_response;
use crate::models::{ErrorResponse, ParticipantInfo};
use crate::AppState;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantsQuery {
    room_id: Option<String>,
}

/// Live roster of a room as the coordinator sees it. Unknown rooms yield an
/// empty list rather than an error; the registry only knows occupied rooms.
pub async fn list_participants(
    State(app_state): State<Arc<AppState>>,
    Query(query): Query<ParticipantsQuery>,
) -> Result<(StatusCode, Json<Vec<ParticipantInfo>>), (StatusCode, Json<ErrorResponse>)> {
    let Some(room_id) = query.room_id.filter(|id| !id.trim().is_empty()) else {
        return Err(error_response(
            StatusCode::BAD_REQUEST,
            "Room ID is required as a query parameter.",
        ));
    };

    let roster = app_state
        .coordinator
        .list_participants(&room_id)
        .await
        .unwrap_or_default();
    Ok((StatusCode::OK, Json(roster)))
}
