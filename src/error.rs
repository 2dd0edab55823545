use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::error;

use crate::chat_workflow::ChatError;
use crate::vin::VinError;

pub const RATE_LIMITED_MESSAGE: &str =
    "The assistant is temporarily unavailable due to high demand. Please try again in a minute.";
pub const CONFIGURATION_MESSAGE: &str =
    "The assistant is not configured correctly. Please contact the site administrator.";
pub const GENERIC_FAILURE_MESSAGE: &str =
    "Sorry, something went wrong while processing your message. Please try again later.";

/// Custom error type for the application
#[derive(Debug)]
pub enum AppError {
    ValidationError(String),
    NotFound(String),
    RateLimited,
    ConfigurationError,
    UpstreamFailure,
    BadGateway(String),
}

/// Error response structure
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match self {
            AppError::ValidationError(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg),
            AppError::RateLimited => (
                StatusCode::TOO_MANY_REQUESTS,
                "RATE_LIMITED",
                RATE_LIMITED_MESSAGE.to_string(),
            ),
            AppError::ConfigurationError => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "CONFIGURATION_ERROR",
                CONFIGURATION_MESSAGE.to_string(),
            ),
            AppError::UpstreamFailure => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_SERVER_ERROR",
                GENERIC_FAILURE_MESSAGE.to_string(),
            ),
            AppError::BadGateway(msg) => (StatusCode::BAD_GATEWAY, "BAD_GATEWAY", msg),
        };

        let body = Json(ErrorResponse {
            success: false,
            error: error_type.to_string(),
            message,
        });

        (status, body).into_response()
    }
}

fn mentions_credentials(detail: &str) -> bool {
    let lower = detail.to_lowercase();
    ["api key", "api_key", "credential", "permission_denied", "unauthenticated"]
        .iter()
        .any(|marker| lower.contains(marker))
}

// Details are logged for operators and never placed in the response body.
impl From<ChatError> for AppError {
    fn from(err: ChatError) -> Self {
        match err {
            ChatError::InvalidInput => {
                AppError::ValidationError("Message cannot be empty or only whitespace".to_string())
            }
            ChatError::RateLimited(detail) => {
                error!("Chat rate limited by model backend: {}", detail);
                AppError::RateLimited
            }
            ChatError::Configuration(detail) => {
                error!("Chat configuration error: {}", detail);
                AppError::ConfigurationError
            }
            other => {
                let detail = other.to_string();
                if mentions_credentials(&detail) {
                    error!("Chat configuration error: {}", detail);
                    AppError::ConfigurationError
                } else {
                    error!("Chat pipeline failed: {}", detail);
                    AppError::UpstreamFailure
                }
            }
        }
    }
}

impl From<VinError> for AppError {
    fn from(err: VinError) -> Self {
        match err {
            VinError::Invalid(msg) => AppError::ValidationError(msg),
            VinError::NotDecoded(msg) => AppError::NotFound(msg),
            VinError::Upstream(detail) => {
                error!("VIN decoding failed: {}", detail);
                AppError::BadGateway("VIN decoding service unavailable".to_string())
            }
        }
    }
}

/// Result type for application handlers
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_errors_map_to_fixed_outcomes() {
        assert!(matches!(
            AppError::from(ChatError::RateLimited("429".to_string())),
            AppError::RateLimited
        ));
        assert!(matches!(
            AppError::from(ChatError::Configuration("GEMINI_API_KEY not set".to_string())),
            AppError::ConfigurationError
        ));
        assert!(matches!(
            AppError::from(ChatError::Upstream("API key expired".to_string())),
            AppError::ConfigurationError
        ));
        assert!(matches!(
            AppError::from(ChatError::MalformedModelOutput("eof".to_string())),
            AppError::UpstreamFailure
        ));
        assert!(matches!(
            AppError::from(ChatError::Timeout("language model")),
            AppError::UpstreamFailure
        ));
        assert!(matches!(AppError::from(ChatError::InvalidInput), AppError::ValidationError(_)));
    }

    #[test]
    fn test_rate_limit_response_status() {
        let response = AppError::RateLimited.into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        let response = AppError::UpstreamFailure.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_client_and_gateway_errors_keep_their_status() {
        let cases = [
            (AppError::ValidationError("bad".to_string()), StatusCode::BAD_REQUEST),
            (AppError::NotFound("vin".to_string()), StatusCode::NOT_FOUND),
            (AppError::BadGateway("vpic".to_string()), StatusCode::BAD_GATEWAY),
            (AppError::ConfigurationError, StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (error, status) in cases {
            assert_eq!(error.into_response().status(), status);
        }
    }
}
