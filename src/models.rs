use serde::{Deserialize, Serialize};

use crate::chat_workflow::extract::{ExtractedFilters, Intent};

/// Request payload for the chat endpoint
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,
}

/// Response payload for the chat endpoint
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    pub success: bool,
    pub bot_name: String,
    pub intent: Intent,
    /// Filters as extracted, echoed for client display
    pub filters: ExtractedFilters,
    pub matched_cars: usize,
    pub reply: String,
}

/// Response payload for the health check endpoint
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
}

impl HealthResponse {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            message: "Service is healthy".to_string(),
        }
    }
}

impl ChatRequest {
    /// Validates that the message is not empty or just whitespace
    pub fn is_valid(&self) -> bool {
        !self.message.trim().is_empty()
    }
}
