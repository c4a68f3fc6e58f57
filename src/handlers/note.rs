use axum::{extract::Path, http::StatusCode, Json};
use tracing::error;

use super::error_response;
use crate::coordinator::normalize_room_id;
use crate::db::store;
use crate::models::{ErrorResponse, NoteResponse, SaveNoteRequest};

fn to_response(row: store::NoteRow) -> NoteResponse {
    NoteResponse {
        room_id: row.room_id,
        feedback: row.feedback,
        updated_at: row.updated_at,
    }
}

/// Save (upsert) interviewer feedback for a room
pub async fn save_note(
    Json(request): Json<SaveNoteRequest>,
) -> Result<(StatusCode, Json<NoteResponse>), (StatusCode, Json<ErrorResponse>)> {
    if request.room_id.trim().is_empty() || request.feedback.trim().is_empty() {
        return Err(error_response(
            StatusCode::BAD_REQUEST,
            "Room ID and feedback are required.",
        ));
    }

    let db = store::get_db().ok_or_else(|| {
        error_response(StatusCode::SERVICE_UNAVAILABLE, "No database configured")
    })?;

    let room_id = normalize_room_id(&request.room_id);
    let row = db
        .upsert_note(&room_id, &request.feedback)
        .await
        .map_err(|e| {
            error!("Failed to save note for room '{}': {}", room_id, e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to save note.")
        })?;

    Ok((StatusCode::OK, Json(to_response(row))))
}

/// Fetch the feedback note for a room. Rooms without a note yield an empty
/// object, which is what the frontend expects.
pub async fn get_note(
    Path(room_id): Path<String>,
) -> Result<(StatusCode, Json<serde_json::Value>), (StatusCode, Json<ErrorResponse>)> {
    let db = store::get_db().ok_or_else(|| {
        error_response(StatusCode::SERVICE_UNAVAILABLE, "No database configured")
    })?;

    let room_id = normalize_room_id(&room_id);
    let row = db.find_note(&room_id).await.map_err(|e| {
        error!("Failed to fetch note for room '{}': {}", room_id, e);
        error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to fetch note.")
    })?;

    let body = match row {
        Some(row) => serde_json::to_value(to_response(row))
            .unwrap_or_else(|_| serde_json::json!({})),
        None => serde_json::json!({}),
    };
    Ok((StatusCode::OK, Json(body)))
}
