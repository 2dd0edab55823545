use std::sync::Arc;

use axum::{
    Extension,
    extract::{Json, Path},
    response::Json as ResponseJson,
};
use tracing::{debug, info};

use crate::chat_workflow::ChatAssistant;
use crate::error::{AppError, AppResult};
use crate::models::{ChatRequest, ChatResponse, HealthResponse};
use crate::vin::{VinDecoder, VinDetails};

/// Health check handler
/// Returns the service status and health information
pub async fn health_check() -> AppResult<ResponseJson<HealthResponse>> {
    debug!("Health check endpoint called");

    let response = HealthResponse::ok();

    info!("Health check successful");
    Ok(ResponseJson(response))
}

/// Chat handler
/// Runs the user's message through the assistant and returns its reply
pub async fn chat_handler(
    Extension(assistant): Extension<Arc<ChatAssistant>>,
    Json(payload): Json<ChatRequest>,
) -> AppResult<ResponseJson<ChatResponse>> {
    info!("Chat endpoint called ({} chars)", payload.message.len());

    if !payload.is_valid() {
        return Err(AppError::ValidationError(
            "Message cannot be empty or only whitespace".to_string(),
        ));
    }

    let response = assistant.handle(&payload.message).await?;

    info!(
        "Chat handled as {:?} with {} matched cars",
        response.intent, response.matched_cars
    );
    Ok(ResponseJson(response))
}

/// VIN decoding handler
pub async fn vin_handler(
    Extension(decoder): Extension<VinDecoder>,
    Path(vin): Path<String>,
) -> AppResult<ResponseJson<VinDetails>> {
    info!("VIN endpoint called");

    let details = decoder.decode(&vin).await?;

    info!("Decoded VIN as {} {:?}", details.make, details.model);
    Ok(ResponseJson(details))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat_workflow::AssistantSettings;
    use crate::error::RATE_LIMITED_MESSAGE;
    use crate::listings::testing::{RecordingStore, listing};
    use crate::llm::LlmError;
    use crate::llm::testing::ScriptedModel;
    use crate::routes::create_routes;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode};
    use serde_json::{Value, json};
    use std::time::Duration;
    use tower::ServiceExt;

    fn router(outcomes: Vec<Result<String, LlmError>>) -> axum::Router {
        let assistant = ChatAssistant::new(
            Arc::new(ScriptedModel::new(outcomes)),
            Arc::new(RecordingStore::new(vec![listing("Toyota", "Avanza", 250_000_000)])),
            AssistantSettings {
                bot_name: "CarBot".to_string(),
                model_candidates: vec!["primary".to_string()],
                currency: "IDR".to_string(),
                llm_timeout: Duration::from_secs(5),
                store_timeout: Duration::from_secs(5),
                diagnostics: false,
            },
        );
        create_routes()
            .layer(Extension(Arc::new(assistant)))
            .layer(Extension(VinDecoder::new("http://127.0.0.1:9").unwrap()))
    }

    async fn post_chat(router: axum::Router, body: Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri("/api/chat")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_health_check() {
        let result = health_check().await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_chat_returns_camel_case_response() {
        let router = router(vec![
            Ok(json!({"intent": "car_search", "filters": {"make": "Toyota"}}).to_string()),
            Ok("The Avanza is a solid family car.".to_string()),
        ]);
        let (status, body) = post_chat(router, json!({"message": "any toyota?"})).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], json!(true));
        assert_eq!(body["botName"], json!("CarBot"));
        assert_eq!(body["intent"], json!("car_search"));
        assert_eq!(body["matchedCars"], json!(1));
        assert_eq!(body["filters"]["make"], json!("Toyota"));
    }

    #[tokio::test]
    async fn test_chat_missing_or_blank_message_is_client_error() {
        for payload in [json!({}), json!({"message": "   "})] {
            let (status, body) = post_chat(router(vec![]), payload).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body["error"], json!("VALIDATION_ERROR"));
        }
    }

    #[tokio::test]
    async fn test_chat_rate_limit_is_distinct_from_generic_failure() {
        let (status, body) = post_chat(
            router(vec![Err(LlmError::RateLimited("RESOURCE_EXHAUSTED secret".to_string()))]),
            json!({"message": "find me an suv"}),
        )
        .await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(body["message"], json!(RATE_LIMITED_MESSAGE));

        let (status, body) = post_chat(
            router(vec![Err(LlmError::Other("socket hang up secret".to_string()))]),
            json!({"message": "find me an suv"}),
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_ne!(body["message"], json!(RATE_LIMITED_MESSAGE));
        assert!(!body.to_string().contains("secret"));
    }

    #[tokio::test]
    async fn test_invalid_vin_is_rejected_before_any_lookup() {
        let request = Request::builder()
            .uri("/api/vin/NOT-A-VIN")
            .body(Body::empty())
            .unwrap();
        let response = router(vec![]).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
