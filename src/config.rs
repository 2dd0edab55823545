use std::env;
use std::time::Duration;

use anyhow::{Context, bail};

pub const DEFAULT_MODEL_CANDIDATES: &str = "gemini-2.0-flash,gemini-1.5-flash,gemini-1.5-pro";
pub const DEFAULT_VIN_API_BASE: &str = "https://vpic.nhtsa.dot.gov/api/vehicles";

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub gemini_api_key: Option<String>,
    pub model_candidates: Vec<String>,
    pub bot_name: String,
    pub currency: String,
    pub llm_timeout: Duration,
    pub store_timeout: Duration,
    pub diagnostics: bool,
    pub listings_file: Option<String>,
    pub vin_api_base: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let port = env::var("PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse()
            .context("PORT must be a valid number")?;

        let model_candidates = parse_candidates(
            &env::var("CHAT_MODELS").unwrap_or_else(|_| DEFAULT_MODEL_CANDIDATES.to_string()),
        );
        if model_candidates.is_empty() {
            bail!("CHAT_MODELS must name at least one model");
        }

        Ok(Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port,
            log_level: env::var("RUST_LOG")
                .unwrap_or_else(|_| "car_chat_svc=info,tower_http=debug".to_string()),
            gemini_api_key: env::var("GEMINI_API_KEY")
                .ok()
                .filter(|key| !key.trim().is_empty()),
            model_candidates,
            bot_name: env::var("CHAT_BOT_NAME").unwrap_or_else(|_| "CarBot".to_string()),
            currency: env::var("CHAT_CURRENCY").unwrap_or_else(|_| "IDR".to_string()),
            llm_timeout: secs_var("CHAT_LLM_TIMEOUT_SECS", 30)?,
            store_timeout: secs_var("CHAT_STORE_TIMEOUT_SECS", 5)?,
            diagnostics: env::var("CHAT_DIAGNOSTICS")
                .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(false),
            listings_file: env::var("LISTINGS_FILE").ok(),
            vin_api_base: env::var("VIN_API_BASE")
                .unwrap_or_else(|_| DEFAULT_VIN_API_BASE.to_string()),
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

fn secs_var(name: &str, default: u64) -> anyhow::Result<Duration> {
    match env::var(name) {
        Ok(raw) => {
            let secs: u64 = raw
                .trim()
                .parse()
                .with_context(|| format!("{} must be a whole number of seconds", name))?;
            Ok(Duration::from_secs(secs))
        }
        Err(_) => Ok(Duration::from_secs(default)),
    }
}

/// Splits a comma separated model list, keeping order and skipping blanks
pub fn parse_candidates(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_candidates_keeps_order() {
        assert_eq!(
            parse_candidates(" gemini-2.0-flash, ,gemini-1.5-pro,"),
            vec!["gemini-2.0-flash".to_string(), "gemini-1.5-pro".to_string()]
        );
        assert!(parse_candidates(" , ").is_empty());
    }

    #[test]
    fn test_default_candidates_parse() {
        assert_eq!(parse_candidates(DEFAULT_MODEL_CANDIDATES).len(), 3);
    }
}
