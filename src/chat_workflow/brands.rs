use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};

use crate::reference::KNOWN_BRANDS;

// Whole words plus plural endings: "Hondas" is Honda, "affordable" is not Ford.
static BRAND_PATTERNS: Lazy<Vec<(&'static str, Regex)>> = Lazy::new(|| {
    KNOWN_BRANDS
        .iter()
        .filter_map(|brand| {
            RegexBuilder::new(&format!(r"\b{}(?:e?s)?\b", regex::escape(brand)))
                .case_insensitive(true)
                .build()
                .ok()
                .map(|re| (*brand, re))
        })
        .collect()
});

/// First known brand mentioned in the message, in canonical casing
pub fn detect_brand(message: &str) -> Option<&'static str> {
    BRAND_PATTERNS
        .iter()
        .find(|(_, re)| re.is_match(message))
        .map(|(brand, _)| *brand)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detects_canonical_casing() {
        assert_eq!(detect_brand("Looking for a honda under 500 million"), Some("Honda"));
        assert_eq!(detect_brand("any BYD seal in stock?"), Some("BYD"));
        assert_eq!(detect_brand("a used land rover defender"), Some("Land Rover"));
    }

    #[test]
    fn test_first_listed_brand_wins() {
        assert_eq!(detect_brand("tesla or toyota?"), Some("Toyota"));
    }

    #[test]
    fn test_ignores_brand_inside_other_words() {
        assert_eq!(detect_brand("I want something affordable"), None);
        assert_eq!(detect_brand("a skiable mountain"), None);
        assert_eq!(detect_brand("good audio and a minimum of fuss"), None);
    }

    #[test]
    fn test_detects_plural_and_possessive_mentions() {
        assert_eq!(detect_brand("Any Hondas under 500 million?"), Some("Honda"));
        assert_eq!(detect_brand("used toyotas please"), Some("Toyota"));
        assert_eq!(detect_brand("compare BMWs"), Some("BMW"));
        assert_eq!(detect_brand("two lexuses"), Some("Lexus"));
        assert_eq!(detect_brand("Kia's warranty"), Some("Kia"));
    }

    #[test]
    fn test_all_brands_compile() {
        assert_eq!(BRAND_PATTERNS.len(), KNOWN_BRANDS.len());
    }
}
