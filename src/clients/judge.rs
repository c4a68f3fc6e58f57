use base64::{engine::general_purpose, Engine as _};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::error;

use crate::models::{ExecuteRequest, ExecuteResponse, ExecutionStatus};

static JUDGE_CLIENT: OnceCell<Arc<JudgeClient>> = OnceCell::const_new();

pub const DEFAULT_JUDGE_API_URL: &str =
    "https://judge0-ce.p.rapidapi.com/submissions?base64_encoded=true&wait=true";

/// Client for the Judge0 CE execution service.
#[derive(Debug)]
pub struct JudgeClient {
    client: Client,
    api_url: String,
    api_key: String,
}

#[derive(Debug)]
pub enum JudgeError {
    UnsupportedLanguage(String),
    Request(reqwest::Error),
    Decode(String),
}

impl std::fmt::Display for JudgeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JudgeError::UnsupportedLanguage(lang) => write!(f, "Unsupported language: {lang}"),
            JudgeError::Request(e) => write!(f, "Execution service request failed: {e}"),
            JudgeError::Decode(msg) => write!(f, "Invalid execution service response: {msg}"),
        }
    }
}

impl std::error::Error for JudgeError {}

#[derive(Serialize)]
struct Submission {
    source_code: String,
    language_id: u32,
    stdin: String,
}

#[derive(Deserialize)]
struct SubmissionResult {
    stdout: Option<String>,
    stderr: Option<String>,
    status: ExecutionStatus,
}

/// Judge0 CE language ids for the languages the editor offers.
fn language_id(language: &str) -> Option<u32> {
    match language.to_lowercase().as_str() {
        "javascript" => Some(63),
        "python" => Some(71),
        "java" => Some(62),
        "cpp" => Some(54),
        _ => None,
    }
}

impl JudgeClient {
    pub fn new(api_url: String, api_key: String) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .expect("Failed to build reqwest client");

        Self {
            client,
            api_url,
            api_key,
        }
    }

    /// Submit a source snippet and wait for the terminal result.
    pub async fn run_code(&self, request: &ExecuteRequest) -> Result<ExecuteResponse, JudgeError> {
        let language_id = language_id(&request.language)
            .ok_or_else(|| JudgeError::UnsupportedLanguage(request.language.clone()))?;

        // Judge0 base64 mode: source and stdin go up encoded, output comes
        // back encoded.
        let submission = Submission {
            source_code: general_purpose::STANDARD.encode(&request.source_code),
            language_id,
            stdin: general_purpose::STANDARD.encode(&request.stdin),
        };

        let result: SubmissionResult = self
            .client
            .post(&self.api_url)
            .header("content-type", "application/json")
            .header("X-RapidAPI-Key", &self.api_key)
            .header("X-RapidAPI-Host", "judge0-ce.p.rapidapi.com")
            .json(&submission)
            .send()
            .await
            .map_err(JudgeError::Request)?
            .error_for_status()
            .map_err(|e| {
                error!("Judge0 API error: {}", e);
                JudgeError::Request(e)
            })?
            .json()
            .await
            .map_err(JudgeError::Request)?;

        Ok(ExecuteResponse {
            output: decode_field(result.stdout)?,
            stderr: decode_field(result.stderr)?,
            status: result.status,
        })
    }
}

fn decode_field(field: Option<String>) -> Result<String, JudgeError> {
    let Some(encoded) = field else {
        return Ok(String::new());
    };
    // Judge0 wraps base64 output across lines
    let cleaned: String = encoded.split_whitespace().collect();
    let bytes = general_purpose::STANDARD
        .decode(cleaned)
        .map_err(|e| JudgeError::Decode(format!("base64: {e}")))?;
    String::from_utf8(bytes).map_err(|e| JudgeError::Decode(format!("utf8: {e}")))
}

/// Initialize the global JudgeClient
pub fn init_judge_client(api_url: String, api_key: String) -> Result<(), &'static str> {
    let client = JudgeClient::new(api_url, api_key);
    JUDGE_CLIENT
        .set(Arc::new(client))
        .map_err(|_| "JudgeClient already initialized")
}

/// Get the global JudgeClient instance
pub fn get_judge_client() -> Option<Arc<JudgeClient>> {
    JUDGE_CLIENT.get().cloned()
}
