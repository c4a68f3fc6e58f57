use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Request forwarded to the remote execution service
#[derive(Serialize, Deserialize, Debug, Clone, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteRequest {
    pub source_code: String,
    pub language: String,
    #[serde(default)]
    pub stdin: String,
}

/// Terminal state of one submission as reported by the execution service
#[derive(Serialize, Deserialize, Debug, Clone, ToSchema)]
pub struct ExecutionStatus {
    pub id: i32,
    pub description: String,
}

/// Result of a code execution
#[derive(Serialize, Deserialize, Debug, Clone, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteResponse {
    pub output: String,
    pub stderr: String,
    pub status: ExecutionStatus,
}
