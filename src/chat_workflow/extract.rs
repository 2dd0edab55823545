use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Coarse category of a user message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    CarSearch,
    Policy,
    Troubleshooting,
    General,
    Inappropriate,
}

impl Intent {
    /// Maps a model-supplied label; anything unrecognised is treated as general chat.
    /// The model can never claim `inappropriate`, that label belongs to the safety filter.
    pub fn from_model_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "car_search" => Intent::CarSearch,
            "policy" => Intent::Policy,
            "troubleshooting" => Intent::Troubleshooting,
            _ => Intent::General,
        }
    }
}

/// The untrusted filter bag exactly as the model produced it
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ExtractedFilters(Map<String, Value>);

impl ExtractedFilters {
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(map) => Self(map),
            _ => Self::default(),
        }
    }

    /// Non-null value for `key`
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key).filter(|v| !v.is_null())
    }

    /// Trimmed, non-empty string value for `key`
    pub fn text(&self, key: &str) -> Option<&str> {
        self.get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    pub fn set_text(&mut self, key: &str, value: &str) {
        self.0.insert(key.to_string(), Value::String(value.to_string()));
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedIntent {
    pub intent: Intent,
    pub filters: ExtractedFilters,
}

#[derive(Debug, Deserialize)]
struct RawExtraction {
    #[serde(default)]
    intent: Value,
    #[serde(default)]
    filters: Value,
}

pub fn build_extraction_prompt(message: &str) -> String {
    format!(
        r#"You are the assistant of a used and new car marketplace.
Classify the user message and extract search filters.

Return ONLY strict JSON, no prose, with exactly this shape:
{{
  "intent": "car_search" | "policy" | "troubleshooting" | "general",
  "filters": {{
    "body_type": one of "sedan","suv","hatchback","coupe","convertible","wagon","pickup","van" or null,
    "fuel_type": one of "petrol","diesel","electric","hybrid","cng" or null,
    "transmission": "automatic" | "manual" | null,
    "make": string or null,
    "model": string or null,
    "year": number or null,
    "maxPrice": number or null,
    "minPrice": number or null,
    "city": string or null,
    "minSeats": number or null,
    "minMPG": number or null
  }}
}}

Extraction rules:
- "fuel efficient", "economical" or similar phrasing means minMPG = 30 unless the user gives another number.
- "N-seater" or "N seats" means minSeats = N.
- If the user mentions any car brand, ALWAYS fill "make" with it.
- If the user mentions any car model name, ALWAYS fill "model" with it.
- Prices are plain numbers in the local currency: "500 million" is 500000000, "200 juta" is 200000000.
- Use null for anything the user did not say.

User message:
{}"#,
        message
    )
}

/// Removes a surrounding Markdown code fence, with or without a language tag
pub fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest
        .strip_prefix("json")
        .or_else(|| rest.strip_prefix("JSON"))
        .unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

/// Parses the extraction reply. Unparseable text is an error; no filters are guessed.
pub fn parse_extraction(raw: &str) -> Result<ExtractedIntent, serde_json::Error> {
    let parsed: RawExtraction = serde_json::from_str(strip_code_fences(raw))?;
    let intent = parsed
        .intent
        .as_str()
        .map(Intent::from_model_label)
        .unwrap_or(Intent::General);
    Ok(ExtractedIntent {
        intent,
        filters: ExtractedFilters::from_value(parsed.filters),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_strip_code_fences() {
        assert_eq!(strip_code_fences("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fences("```\n{\"a\":1}```"), "{\"a\":1}");
        assert_eq!(strip_code_fences("  {\"a\":1}  "), "{\"a\":1}");
    }

    #[test]
    fn test_parse_fenced_extraction() {
        let raw = "```json\n{\"intent\":\"car_search\",\"filters\":{\"make\":\"Honda\",\"maxPrice\":500000000,\"city\":null}}\n```";
        let parsed = parse_extraction(raw).unwrap();
        assert_eq!(parsed.intent, Intent::CarSearch);
        assert_eq!(parsed.filters.text("make"), Some("Honda"));
        assert_eq!(parsed.filters.get("maxPrice"), Some(&json!(500000000)));
        assert_eq!(parsed.filters.get("city"), None);
    }

    #[test]
    fn test_parse_rejects_prose() {
        assert!(parse_extraction("Sure! Here are some Hondas for you.").is_err());
    }

    #[test]
    fn test_unknown_or_missing_intent_is_general() {
        let parsed = parse_extraction(r#"{"intent":"inappropriate","filters":{}}"#).unwrap();
        assert_eq!(parsed.intent, Intent::General);
        let parsed = parse_extraction(r#"{"filters":"nope"}"#).unwrap();
        assert_eq!(parsed.intent, Intent::General);
        assert_eq!(parsed.filters, ExtractedFilters::default());
    }

    #[test]
    fn test_text_ignores_blank_and_non_string_values() {
        let filters = ExtractedFilters::from_value(json!({"make": "  ", "model": 42}));
        assert_eq!(filters.text("make"), None);
        assert_eq!(filters.text("model"), None);
    }

    #[test]
    fn test_prompt_embeds_message_and_rules() {
        let prompt = build_extraction_prompt("7-seater diesel");
        assert!(prompt.contains("7-seater diesel"));
        assert!(prompt.contains("minMPG = 30"));
        assert!(prompt.contains("minSeats = N"));
    }

    #[test]
    fn test_filters_serialize_as_received() {
        let filters = ExtractedFilters::from_value(json!({"make": null, "maxPrice": 1}));
        assert_eq!(
            serde_json::to_value(&filters).unwrap(),
            json!({"make": null, "maxPrice": 1})
        );
    }
}
