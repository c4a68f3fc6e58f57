use axum::{http::StatusCode, Json};
use tracing::error;

use super::error_response;
use crate::clients::judge::{self, JudgeError};
use crate::models::{ErrorResponse, ExecuteRequest, ExecuteResponse};

/// Forward a code snippet to the remote execution service and wait for the
/// result. Purely request/response; the coordinator never sees this.
pub async fn execute_code(
    Json(request): Json<ExecuteRequest>,
) -> Result<(StatusCode, Json<ExecuteResponse>), (StatusCode, Json<ErrorResponse>)> {
    let client = judge::get_judge_client().ok_or_else(|| {
        error_response(
            StatusCode::SERVICE_UNAVAILABLE,
            "Execution service not configured",
        )
    })?;

    match client.run_code(&request).await {
        Ok(result) => Ok((StatusCode::OK, Json(result))),
        Err(JudgeError::UnsupportedLanguage(lang)) => Err(error_response(
            StatusCode::BAD_REQUEST,
            format!("Unsupported language: {lang}"),
        )),
        Err(e) => {
            error!("Judge error: {}", e);
            Err(error_response(
                StatusCode::BAD_GATEWAY,
                "Failed to compile/execute code",
            ))
        }
    }
}
