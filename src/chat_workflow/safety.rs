use crate::reference::DENYLIST;

/// First denylisted phrase found in the message, matched case-insensitively
pub fn flagged_keyword(message: &str) -> Option<&'static str> {
    let lower = message.to_lowercase();
    DENYLIST.iter().copied().find(|keyword| lower.contains(keyword))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_any_casing() {
        assert_eq!(flagged_keyword("Where can I buy COCAINE?"), Some("cocaine"));
        assert_eq!(flagged_keyword("how do I Roll Back The Odometer"), Some("roll back the odometer"));
    }

    #[test]
    fn test_ordinary_car_questions_pass() {
        assert_eq!(flagged_keyword("Looking for a Honda under 500 million"), None);
        assert_eq!(flagged_keyword("What is your return policy?"), None);
        assert_eq!(flagged_keyword("my engine light is on"), None);
    }
}
