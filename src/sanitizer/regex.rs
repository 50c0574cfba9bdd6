//! Regex-based sanitizer.

use regex::Regex;

use super::Sanitizer;

/// Script blocks, opening tag to the nearest closing tag.
const SCRIPT_BLOCK: &str = r"(?is)<script\b.*?</script\s*>";
const JAVASCRIPT_SCHEME: &str = r"(?i)javascript:";
/// Inline event-handler assignments such as `onclick=` or `onerror =`.
const EVENT_HANDLER: &str = r"(?i)on\w+\s*=";

/// Sanitizer that applies a series of regex find-and-replace rules.
///
/// Rules are applied in order; each rule operates on the output of the
/// previous one.
///
/// # Example
///
/// ```
/// use contact_pipeline::{RegexSanitizer, Sanitizer};
///
/// let sanitizer = RegexSanitizer::new(vec![
///     (r"\d{4}-\d{4}-\d{4}-\d{4}", "[CARD REDACTED]"),
/// ]);
/// let result = sanitizer.sanitize("Card: 4111-1111-1111-1111");
/// assert!(result.contains("[CARD REDACTED]"));
/// ```
pub struct RegexSanitizer {
    rules: Vec<(Regex, String)>,
}

impl RegexSanitizer {
    /// Create a new `RegexSanitizer` from a list of `(pattern, replacement)` pairs.
    ///
    /// # Panics
    ///
    /// Panics if any regex pattern is invalid. Use [`try_new`](Self::try_new)
    /// for a fallible alternative.
    pub fn new(rules: Vec<(&str, &str)>) -> Self {
        let rules = rules
            .into_iter()
            .map(|(pattern, replacement)| {
                (
                    Regex::new(pattern).expect("invalid regex pattern"),
                    replacement.to_string(),
                )
            })
            .collect();
        Self { rules }
    }

    /// Fallible constructor that returns a [`regex::Error`] for invalid patterns.
    pub fn try_new(rules: Vec<(&str, &str)>) -> Result<Self, regex::Error> {
        let rules = rules
            .into_iter()
            .map(|(pattern, replacement)| Ok((Regex::new(pattern)?, replacement.to_string())))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { rules })
    }

    /// Removes script blocks, `javascript:` fragments and inline event
    /// handlers, in that order. Does not trim.
    pub fn markup() -> Self {
        Self::new(vec![
            (SCRIPT_BLOCK, ""),
            (JAVASCRIPT_SCHEME, ""),
            (EVENT_HANDLER, ""),
        ])
    }
}

impl Sanitizer for RegexSanitizer {
    fn sanitize(&self, text: &str) -> String {
        self.rules
            .iter()
            .fold(text.to_string(), |acc, (re, replacement)| {
                re.replace_all(&acc, replacement.as_str()).into_owned()
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn markup_removes_multiline_script_block() {
        let s = RegexSanitizer::markup();
        let text = "before<script>\nvar a = '<b>';\nsend(a);\n</script>after";
        assert_eq!(s.sanitize(text), "beforeafter");
    }

    #[test]
    fn markup_script_match_is_non_greedy() {
        let s = RegexSanitizer::markup();
        let text = "<script>a()</script>keep me<script>b()</script>";
        assert_eq!(s.sanitize(text), "keep me");
    }

    #[test]
    fn markup_script_is_case_insensitive() {
        let s = RegexSanitizer::markup();
        assert_eq!(s.sanitize("x<ScRiPt src=evil.js></SCRIPT>y"), "xy");
    }

    #[test]
    fn markup_unclosed_script_left_alone() {
        let s = RegexSanitizer::markup();
        assert_eq!(s.sanitize("<script>never closed"), "<script>never closed");
    }

    #[test]
    fn markup_strips_javascript_scheme() {
        let s = RegexSanitizer::markup();
        assert_eq!(
            s.sanitize(r#"<a href="JavaScript:alert(1)">x</a>"#),
            r#"<a href="alert(1)">x</a>"#
        );
    }

    #[test]
    fn markup_strips_event_handlers() {
        let s = RegexSanitizer::markup();
        assert_eq!(
            s.sanitize(r#"<img src=x OnError = "steal()">"#),
            r#"<img src=x  "steal()">"#
        );
        assert_eq!(s.sanitize("<b onclick=go()>"), "<b go()>");
    }

    #[test]
    fn markup_does_not_trim() {
        let s = RegexSanitizer::markup();
        assert_eq!(s.sanitize("  hello  "), "  hello  ");
    }

    #[test]
    fn multiple_rules_applied_in_order() {
        let sanitizer = RegexSanitizer::new(vec![
            (r"\d{3}-\d{2}-\d{4}", "[SSN]"),
            (r"\[SSN\]", "***-**-****"),
        ]);
        let result = sanitizer.sanitize("SSN: 123-45-6789");
        assert_eq!(result, "SSN: ***-**-****");
    }

    #[test]
    fn no_rules_returns_original() {
        let sanitizer = RegexSanitizer::new(vec![]);
        assert_eq!(sanitizer.sanitize("<p>unchanged</p>"), "<p>unchanged</p>");
    }

    #[test]
    fn try_new_invalid_pattern() {
        assert!(RegexSanitizer::try_new(vec![("[invalid", "x")]).is_err());
    }
}
