use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::handlers::{
    create_room, diagnostics, execute_code, get_note, get_room, health_check, list_participants,
    ready_check, save_interview, save_note,
};
use crate::AppState;

/// Create API routes
pub fn create_api_routes(app_state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/ready", get(ready_check))
        .route("/rooms/create", post(create_room))
        .route("/rooms/:room_id", get(get_room))
        .route("/notes/save", post(save_note))
        .route("/interview/save", post(save_interview))
        .route("/notes/:room_id", get(get_note))
        .route("/participants", get(list_participants))
        .route("/judge", post(execute_code))
        .route("/diagnostics", get(diagnostics))
        .with_state(app_state)
}
