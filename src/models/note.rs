use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Request to save interviewer feedback for a room
#[derive(Serialize, Deserialize, Debug, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaveNoteRequest {
    pub room_id: String,
    pub feedback: String,
}

/// Stored feedback note
#[derive(Serialize, Deserialize, Debug, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NoteResponse {
    pub room_id: String,
    pub feedback: String,
    pub updated_at: DateTime<Utc>,
}
