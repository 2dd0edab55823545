use async_trait::async_trait;
use rig::completion::Prompt;
use rig::providers::gemini;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Failure classes reported by a language-model backend
#[derive(Debug, Clone, Error, PartialEq)]
pub enum LlmError {
    /// The requested model id does not exist for this credential
    #[error("model not found: {0}")]
    NotFound(String),

    /// Quota exhausted; the quota is shared by every candidate model
    #[error("rate limited: {0}")]
    RateLimited(String),

    /// Missing or rejected credential
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("model backend error: {0}")]
    Other(String),
}

impl LlmError {
    /// Classifies a provider error message by the status markers it carries
    pub fn classify(message: String) -> Self {
        let lower = message.to_lowercase();
        if lower.contains("429")
            || lower.contains("resource_exhausted")
            || lower.contains("quota")
            || lower.contains("rate limit")
            || lower.contains("too many requests")
        {
            LlmError::RateLimited(message)
        } else if lower.contains("api key")
            || lower.contains("api_key")
            || lower.contains("permission_denied")
            || lower.contains("unauthenticated")
        {
            LlmError::Configuration(message)
        } else if lower.contains("404") || lower.contains("not_found") || lower.contains("not found")
        {
            LlmError::NotFound(message)
        } else {
            LlmError::Other(message)
        }
    }
}

/// Text generation capability consumed by the chat pipeline
#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn generate(&self, model_id: &str, prompt: &str) -> Result<String, LlmError>;
}

/// Gemini backend built on rig's provider client.
/// The client is created once at startup and shared across requests.
pub struct GeminiModel {
    client: Option<gemini::Client>,
}

impl GeminiModel {
    pub fn new(api_key: Option<&str>) -> Self {
        if api_key.is_none() {
            warn!("GEMINI_API_KEY not set; chat requests will report a configuration error");
        }
        Self {
            client: api_key.map(gemini::Client::new),
        }
    }
}

#[async_trait]
impl LanguageModel for GeminiModel {
    async fn generate(&self, model_id: &str, prompt: &str) -> Result<String, LlmError> {
        let client = self
            .client
            .as_ref()
            .ok_or_else(|| LlmError::Configuration("GEMINI_API_KEY not set".to_string()))?;

        let agent = client.agent(model_id).build();
        debug!("Prompting {} with {} chars", model_id, prompt.len());
        agent
            .prompt(prompt.to_string())
            .await
            .map_err(|e| LlmError::classify(e.to_string()))
    }
}

/// Tries each candidate model in order.
///
/// Not-found and generic failures fall through to the next candidate. Rate
/// limits and credential problems abort immediately since every candidate
/// shares them. Once the list is exhausted the last generic failure is
/// returned, or `NotFound` listing every candidate when none existed.
pub async fn generate_with_fallback(
    model: &dyn LanguageModel,
    candidates: &[String],
    prompt: &str,
) -> Result<String, LlmError> {
    let mut last_other: Option<LlmError> = None;

    for candidate in candidates {
        match model.generate(candidate, prompt).await {
            Ok(text) => {
                info!("Model {} answered", candidate);
                return Ok(text);
            }
            Err(LlmError::NotFound(msg)) => {
                warn!("Model {} not found, trying next candidate: {}", candidate, msg);
            }
            Err(e @ (LlmError::RateLimited(_) | LlmError::Configuration(_))) => {
                warn!("Model {} failed, aborting candidate list: {}", candidate, e);
                return Err(e);
            }
            Err(e) => {
                warn!("Model {} failed, trying next candidate: {}", candidate, e);
                last_other = Some(e);
            }
        }
    }

    Err(last_other.unwrap_or_else(|| LlmError::NotFound(candidates.join(", "))))
}


#[cfg(test)]
mod tests {
    use super::testing::ScriptedModel;
    use super::*;

    fn candidates() -> Vec<String> {
        vec!["first".to_string(), "second".to_string(), "third".to_string()]
    }

    #[test]
    fn test_classify_provider_messages() {
        assert!(matches!(
            LlmError::classify("429 Too Many Requests".to_string()),
            LlmError::RateLimited(_)
        ));
        assert!(matches!(
            LlmError::classify(r#"{"error":{"code":429,"status":"RESOURCE_EXHAUSTED"}}"#.to_string()),
            LlmError::RateLimited(_)
        ));
        assert!(matches!(
            LlmError::classify("models/gemini-x is not found for API version v1beta".to_string()),
            LlmError::NotFound(_)
        ));
        assert!(matches!(
            LlmError::classify("API key not valid. Please pass a valid API key.".to_string()),
            LlmError::Configuration(_)
        ));
        assert!(matches!(
            LlmError::classify("connection reset by peer".to_string()),
            LlmError::Other(_)
        ));
    }

    #[tokio::test]
    async fn test_not_found_falls_through_to_next_candidate() {
        let model = ScriptedModel::new(vec![
            Err(LlmError::NotFound("first".to_string())),
            Ok("hello".to_string()),
        ]);
        let text = generate_with_fallback(&model, &candidates(), "hi").await.unwrap();
        assert_eq!(text, "hello");
        assert_eq!(model.models_tried(), vec!["first", "second"]);
    }

    #[tokio::test]
    async fn test_rate_limit_aborts_candidate_list() {
        let model = ScriptedModel::new(vec![
            Err(LlmError::RateLimited("quota".to_string())),
            Ok("never".to_string()),
        ]);
        let err = generate_with_fallback(&model, &candidates(), "hi").await.unwrap_err();
        assert!(matches!(err, LlmError::RateLimited(_)));
        assert_eq!(model.calls(), 1);
    }

    #[tokio::test]
    async fn test_configuration_error_aborts_candidate_list() {
        let model = ScriptedModel::new(vec![Err(LlmError::Configuration("no key".to_string()))]);
        let err = generate_with_fallback(&model, &candidates(), "hi").await.unwrap_err();
        assert!(matches!(err, LlmError::Configuration(_)));
        assert_eq!(model.calls(), 1);
    }

    #[tokio::test]
    async fn test_all_not_found_reports_every_candidate() {
        let model = ScriptedModel::new(vec![
            Err(LlmError::NotFound("a".to_string())),
            Err(LlmError::NotFound("b".to_string())),
            Err(LlmError::NotFound("c".to_string())),
        ]);
        let err = generate_with_fallback(&model, &candidates(), "hi").await.unwrap_err();
        assert_eq!(err, LlmError::NotFound("first, second, third".to_string()));
    }

    #[tokio::test]
    async fn test_other_error_propagates_after_exhausting_list() {
        let model = ScriptedModel::new(vec![
            Err(LlmError::Other("boom".to_string())),
            Err(LlmError::NotFound("b".to_string())),
            Err(LlmError::NotFound("c".to_string())),
        ]);
        let err = generate_with_fallback(&model, &candidates(), "hi").await.unwrap_err();
        assert_eq!(err, LlmError::Other("boom".to_string()));
        assert_eq!(model.calls(), 3);
    }

    #[tokio::test]
    async fn test_missing_key_is_configuration_error() {
        let model = GeminiModel::new(None);
        let err = model.generate("gemini-2.0-flash", "hi").await.unwrap_err();
        assert!(matches!(err, LlmError::Configuration(_)));
    }
}
