use crate::models::*;
use utoipa::OpenApi;

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/api/health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    )
)]
#[allow(dead_code)]
pub async fn health_check_doc() {}

/// Create a new interview room
#[utoipa::path(
    post,
    path = "/api/rooms/create",
    request_body = CreateRoomRequest,
    responses(
        (status = 201, description = "Room created successfully", body = CreateRoomResponse),
        (status = 503, description = "No database configured", body = ErrorResponse)
    )
)]
#[allow(dead_code)]
pub async fn create_room_doc() {}

/// Look up a room record
#[utoipa::path(
    get,
    path = "/api/rooms/{room_id}",
    responses(
        (status = 200, description = "Room found", body = RoomResponse),
        (status = 404, description = "Room not found", body = ErrorResponse)
    )
)]
#[allow(dead_code)]
pub async fn get_room_doc() {}

/// Save interviewer feedback
#[utoipa::path(
    post,
    path = "/api/notes/save",
    request_body = SaveNoteRequest,
    responses(
        (status = 200, description = "Note saved", body = NoteResponse)
    )
)]
#[allow(dead_code)]
pub async fn save_note_doc() {}

/// Archive a finished interview session
#[utoipa::path(
    post,
    path = "/api/interview/save",
    request_body = SaveInterviewRequest,
    responses(
        (status = 201, description = "Interview data saved", body = SaveInterviewResponse),
        (status = 503, description = "No database configured", body = ErrorResponse)
    )
)]
#[allow(dead_code)]
pub async fn save_interview_doc() {}

/// Execute a code snippet via the remote execution service
#[utoipa::path(
    post,
    path = "/api/judge",
    request_body = ExecuteRequest,
    responses(
        (status = 200, description = "Execution finished", body = ExecuteResponse),
        (status = 400, description = "Unsupported language", body = ErrorResponse)
    )
)]
#[allow(dead_code)]
pub async fn execute_code_doc() {}

/// Coordinator and system diagnostics
#[utoipa::path(
    get,
    path = "/api/diagnostics",
    responses(
        (status = 200, description = "Diagnostics", body = DiagnosticsResponse)
    )
)]
#[allow(dead_code)]
pub async fn diagnostics_doc() {}

#[derive(OpenApi)]
#[openapi(
    paths(
        health_check_doc,
        create_room_doc,
        get_room_doc,
        save_note_doc,
        save_interview_doc,
        execute_code_doc,
        diagnostics_doc,
    ),
    components(
        schemas(
            HealthResponse,
            CreateRoomRequest,
            CreateRoomResponse,
            RoomResponse,
            SaveNoteRequest,
            NoteResponse,
            SaveInterviewRequest,
            SaveInterviewResponse,
            ExecuteRequest,
            ExecuteResponse,
            ExecutionStatus,
            DiagnosticsResponse,
            ErrorResponse
        )
    ),
    tags(
        (name = "api", description = "API endpoints")
    )
)]
pub struct ApiDoc;
