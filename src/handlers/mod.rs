pub mod diagnostics;
pub mod execute;
pub mod health;
pub mod interview;
pub mod note;
pub mod participants;
pub mod room;

pub use diagnostics::*;
pub use execute::*;
pub use health::*;
pub use interview::*;
pub use note::*;
pub use participants::*;
pub use room::*;

use axum::{http::StatusCode, Json};

use crate::models::ErrorResponse;

/// Build the shared error response tuple used by all handlers
pub(crate) fn error_response(
    status: StatusCode,
    error: impl Into<String>,
) -> (StatusCode, Json<ErrorResponse>) {
    (
        status,
        Json(ErrorResponse {
            code: status.as_u16(),
            status: status.to_string(),
            error: error.into(),
        }),
    )
}
