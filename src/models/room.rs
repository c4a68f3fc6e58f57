use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Request to persist a new interview room
#[derive(Serialize, Deserialize, Debug, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoomRequest {
    pub room_id: String,
    pub room_name: String,
    pub language: String,
    pub duration: String,
}

/// Persisted room record
#[derive(Serialize, Deserialize, Debug, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RoomResponse {
    pub room_id: String,
    pub room_name: String,
    pub language: String,
    pub duration: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Debug, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoomResponse {
    pub message: String,
    pub room: RoomResponse,
}
