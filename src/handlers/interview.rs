use axum::{http::StatusCode, Json};
use tracing::error;

use super::error_response;
use crate::db::store;
use crate::models::{ErrorResponse, SaveInterviewRequest, SaveInterviewResponse};

/// Archive a finished interview session (participant names, feedback and
/// duration) in the document store.
pub async fn save_interview(
    Json(request): Json<SaveInterviewRequest>,
) -> Result<(StatusCode, Json<SaveInterviewResponse>), (StatusCode, Json<ErrorResponse>)> {
    let db = store::get_db().ok_or_else(|| {
        error_response(StatusCode::SERVICE_UNAVAILABLE, "No database configured")
    })?;

    db.insert_interview(&request.participants, &request.feedback, request.duration)
        .await
        .map_err(|e| {
            error!("Failed to save interview: {}", e);
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to save interview",
            )
        })?;

    Ok((
        StatusCode::CREATED,
        Json(SaveInterviewResponse {
            message: "Interview data saved".to_string(),
        }),
    ))
}
