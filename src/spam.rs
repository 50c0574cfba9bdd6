//! Keyword-based content rejection.
//!
//! A cheap deterrent, not a security boundary.

/// Case-insensitive substring match against a keyword denylist.
#[derive(Debug, Clone)]
pub struct SpamFilter {
    keywords: Vec<String>,
}

impl Default for SpamFilter {
    fn default() -> Self {
        Self::new(Self::DEFAULT_KEYWORDS.iter().copied())
    }
}

impl SpamFilter {
    /// Solicitation and scam phrases rejected out of the box.
    pub const DEFAULT_KEYWORDS: [&'static str; 15] = [
        "viagra",
        "casino",
        "lottery",
        "winner",
        "congratulations",
        "click here",
        "free money",
        "urgent",
        "act now",
        "limited time",
        "make money",
        "work from home",
        "get rich",
        "bitcoin",
        "crypto",
    ];

    /// Build a filter from `keywords`. Blank entries are dropped, since they
    /// would match every message.
    pub fn new<'a>(keywords: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            keywords: keywords
                .into_iter()
                .map(|k| k.trim().to_lowercase())
                .filter(|k| !k.is_empty())
                .collect(),
        }
    }

    pub fn is_spam(&self, message: &str) -> bool {
        self.matched_keyword(message).is_some()
    }

    /// The first denylisted keyword found in `message`.
    pub fn matched_keyword(&self, message: &str) -> Option<&str> {
        let lower = message.to_lowercase();
        self.keywords
            .iter()
            .find(|k| lower.contains(k.as_str()))
            .map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_keyword_in_any_case() {
        let filter = SpamFilter::default();
        assert!(filter.is_spam("You won the LOTTERY!"));
        assert!(filter.is_spam("please Click Here for details"));
        assert_eq!(filter.matched_keyword("Buy BitCoin today"), Some("bitcoin"));
    }

    #[test]
    fn keyword_inside_word_still_matches() {
        let filter = SpamFilter::default();
        assert!(filter.is_spam("cryptography consulting"));
    }

    #[test]
    fn clean_message_passes() {
        let filter = SpamFilter::default();
        assert!(!filter.is_spam("I'd like to discuss a collaboration opportunity"));
    }

    #[test]
    fn custom_keywords_replace_defaults() {
        let filter = SpamFilter::new(["SEO services", "  ", ""]);
        assert!(filter.is_spam("We offer seo services"));
        assert!(!filter.is_spam("lottery"));
        assert!(!filter.is_spam("anything at all"));
    }
}
