use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Request to archive a finished interview session
#[derive(Serialize, Deserialize, Debug, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaveInterviewRequest {
    pub participants: Vec<String>,
    pub feedback: String,
    pub duration: i64,
}

#[derive(Serialize, Deserialize, Debug, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaveInterviewResponse {
    pub message: String,
}
