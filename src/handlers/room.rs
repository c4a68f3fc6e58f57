use axum::{extract::Path, http::StatusCode, Json};
use tracing::error;

use super::error_response;
use crate::coordinator::normalize_room_id;
use crate::db::store;
use crate::models::{CreateRoomRequest, CreateRoomResponse, ErrorResponse, RoomResponse};

fn to_response(row: store::RoomRow) -> RoomResponse {
    RoomResponse {
        room_id: row.room_id,
        room_name: row.room_name,
        language: row.language,
        duration: row.duration,
        created_at: row.created_at,
    }
}

/// Persist a new room record
pub async fn create_room(
    Json(request): Json<CreateRoomRequest>,
) -> Result<(StatusCode, Json<CreateRoomResponse>), (StatusCode, Json<ErrorResponse>)> {
    if request.room_id.trim().is_empty() {
        return Err(error_response(
            StatusCode::BAD_REQUEST,
            "Room ID is required.",
        ));
    }

    let db = store::get_db().ok_or_else(|| {
        error_response(StatusCode::SERVICE_UNAVAILABLE, "No database configured")
    })?;

    let room_id = normalize_room_id(&request.room_id);
    let row = db
        .insert_room(
            &room_id,
            &request.room_name,
            &request.language,
            &request.duration,
        )
        .await
        .map_err(|e| {
            error!("Failed to create room '{}': {}", room_id, e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to create room")
        })?;

    Ok((
        StatusCode::CREATED,
        Json(CreateRoomResponse {
            message: "Room saved".to_string(),
            room: to_response(row),
        }),
    ))
}

/// Look up a persisted room record by id
pub async fn get_room(
    Path(room_id): Path<String>,
) -> Result<(StatusCode, Json<RoomResponse>), (StatusCode, Json<ErrorResponse>)> {
    let db = store::get_db().ok_or_else(|| {
        error_response(StatusCode::SERVICE_UNAVAILABLE, "No database configured")
    })?;

    let room_id = normalize_room_id(&room_id);
    let row = db.find_room(&room_id).await.map_err(|e| {
        error!("Error fetching room '{}': {}", room_id, e);
        error_response(StatusCode::INTERNAL_SERVER_ERROR, "Server error")
    })?;

    match row {
        Some(row) => Ok((StatusCode::OK, Json(to_response(row)))),
        None => Err(error_response(StatusCode::NOT_FOUND, "Room not found")),
    }
}
