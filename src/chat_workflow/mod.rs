pub mod brands;
pub mod extract;
pub mod reply;
pub mod safety;
pub mod sanitize;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::listings::{FindOptions, ListingStore};
use crate::llm::{LanguageModel, LlmError, generate_with_fallback};
use crate::models::ChatResponse;
use crate::reference::BUDGET_KEYWORDS;
use extract::{ExtractedFilters, ExtractedIntent, Intent, build_extraction_prompt, parse_extraction};
use sanitize::{SanitizedQuery, sanitize};

/// Most listings a single chat reply is built from
pub const MAX_MATCHES: usize = 5;

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("message cannot be empty")]
    InvalidInput,

    #[error("language model rate limited: {0}")]
    RateLimited(String),

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("no candidate model available, tried: {tried}")]
    ModelUnavailable { tried: String },

    #[error("model returned malformed JSON: {0}")]
    MalformedModelOutput(String),

    #[error("{0} timed out")]
    Timeout(&'static str),

    #[error("upstream failure: {0}")]
    Upstream(String),
}

impl From<LlmError> for ChatError {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::RateLimited(msg) => ChatError::RateLimited(msg),
            LlmError::Configuration(msg) => ChatError::Configuration(msg),
            LlmError::NotFound(tried) => ChatError::ModelUnavailable { tried },
            LlmError::Other(msg) => ChatError::Upstream(msg),
        }
    }
}

/// Per-deployment knobs of the assistant
#[derive(Debug, Clone)]
pub struct AssistantSettings {
    pub bot_name: String,
    pub model_candidates: Vec<String>,
    pub currency: String,
    pub llm_timeout: Duration,
    pub store_timeout: Duration,
    pub diagnostics: bool,
}

impl AssistantSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            bot_name: config.bot_name.clone(),
            model_candidates: config.model_candidates.clone(),
            currency: config.currency.clone(),
            llm_timeout: config.llm_timeout,
            store_timeout: config.store_timeout,
            diagnostics: config.diagnostics,
        }
    }
}

/// Turns free-text messages into car searches and replies.
/// Built once at startup; holds no per-request state.
pub struct ChatAssistant {
    model: Arc<dyn LanguageModel>,
    store: Arc<dyn ListingStore>,
    settings: AssistantSettings,
}

impl ChatAssistant {
    pub fn new(
        model: Arc<dyn LanguageModel>,
        store: Arc<dyn ListingStore>,
        settings: AssistantSettings,
    ) -> Self {
        Self {
            model,
            store,
            settings,
        }
    }

    pub fn bot_name(&self) -> &str {
        &self.settings.bot_name
    }

    pub async fn handle(&self, message: &str) -> Result<ChatResponse, ChatError> {
        let message = message.trim();
        if message.is_empty() {
            return Err(ChatError::InvalidInput);
        }

        if let Some(keyword) = safety::flagged_keyword(message) {
            warn!("Refusing chat message matching denylist entry '{}'", keyword);
            return Ok(self.respond(
                Intent::Inappropriate,
                ExtractedFilters::default(),
                0,
                reply::REFUSAL_REPLY.to_string(),
            ));
        }

        let ExtractedIntent {
            intent,
            mut filters,
        } = self.extract(message).await?;
        info!("Model classified message as {:?}", intent);

        // Clients get the filters as the model produced them.
        let raw_filters = filters.clone();
        if filters.text("make").is_none() {
            if let Some(brand) = brands::detect_brand(message) {
                info!("Brand fallback detected '{}'", brand);
                filters.set_text("make", brand);
            }
        }

        let query = sanitize(&filters);
        debug!("Sanitized query: {}", query.to_document());

        let intent = if query.make.is_some() || query.model.is_some() {
            Intent::CarSearch
        } else {
            intent
        };

        match intent {
            Intent::CarSearch => self.search(message, raw_filters, &query).await,
            Intent::Policy => {
                let text = self
                    .generate(&reply::policy_prompt(message, &self.settings.bot_name))
                    .await?;
                Ok(self.respond(intent, raw_filters, 0, text))
            }
            Intent::Troubleshooting => {
                let text = self
                    .generate(&reply::troubleshooting_prompt(message, &self.settings.bot_name))
                    .await?;
                Ok(self.respond(intent, raw_filters, 0, text))
            }
            Intent::General | Intent::Inappropriate => {
                let text = self
                    .generate(&reply::general_prompt(message, &self.settings.bot_name))
                    .await?;
                Ok(self.respond(Intent::General, raw_filters, 0, text))
            }
        }
    }

    async fn extract(&self, message: &str) -> Result<ExtractedIntent, ChatError> {
        let raw = self.generate(&build_extraction_prompt(message)).await?;
        debug!("Extraction reply: {}", raw);
        parse_extraction(&raw).map_err(|e| ChatError::MalformedModelOutput(e.to_string()))
    }

    async fn search(
        &self,
        message: &str,
        filters: ExtractedFilters,
        query: &SanitizedQuery,
    ) -> Result<ChatResponse, ChatError> {
        if is_budget_query(message) && !query.has_concrete_filter() {
            info!("Budget query without concrete filters, asking for details");
            return Ok(self.respond(
                Intent::CarSearch,
                filters,
                0,
                reply::BUDGET_CLARIFICATION_REPLY.to_string(),
            ));
        }

        let cars = with_timeout(
            self.settings.store_timeout,
            "listings query",
            self.store.find(query, FindOptions { limit: MAX_MATCHES }),
        )
        .await?
        .map_err(|e| ChatError::Upstream(format!("listings query failed: {:#}", e)))?;
        info!("Listings query matched {} cars", cars.len());

        if cars.is_empty() {
            if self.settings.diagnostics && query.make.is_some() {
                self.log_inventory_diagnostics().await;
            }
            let text = reply::no_results_reply(query, &self.settings.currency);
            return Ok(self.respond(Intent::CarSearch, filters, 0, text));
        }

        let prompt = reply::recommendation_prompt(
            message,
            &cars,
            &self.settings.currency,
            &self.settings.bot_name,
        );
        let text = self.generate(&prompt).await?;
        Ok(self.respond(
            Intent::CarSearch,
            filters,
            cars.len(),
            reply::single_paragraph(&text),
        ))
    }

    async fn generate(&self, prompt: &str) -> Result<String, ChatError> {
        let text = with_timeout(
            self.settings.llm_timeout,
            "language model",
            generate_with_fallback(self.model.as_ref(), &self.settings.model_candidates, prompt),
        )
        .await??;
        Ok(text)
    }

    // Operator aid only; failures here never affect the reply.
    async fn log_inventory_diagnostics(&self) {
        for (verified_only, label) in [(false, "all"), (true, "verified")] {
            let makes = with_timeout(
                self.settings.store_timeout,
                "inventory diagnostics",
                self.store.known_makes(verified_only),
            )
            .await;
            match makes {
                Ok(Ok(makes)) => debug!("Makes with {} listings: {:?}", label, makes),
                Ok(Err(e)) => debug!("Could not list {} makes: {:#}", label, e),
                Err(e) => debug!("Skipped {} makes: {}", label, e),
            }
        }
    }

    fn respond(
        &self,
        intent: Intent,
        filters: ExtractedFilters,
        matched_cars: usize,
        reply: String,
    ) -> ChatResponse {
        ChatResponse {
            success: true,
            bot_name: self.settings.bot_name.clone(),
            intent,
            filters,
            matched_cars,
            reply,
        }
    }
}

fn is_budget_query(message: &str) -> bool {
    let lower = message.to_lowercase();
    BUDGET_KEYWORDS.iter().any(|keyword| lower.contains(keyword))
}

async fn with_timeout<T>(
    limit: Duration,
    what: &'static str,
    fut: impl Future<Output = T>,
) -> Result<T, ChatError> {
    tokio::time::timeout(limit, fut)
        .await
        .map_err(|_| ChatError::Timeout(what))
}
