//! Sanitizers that strip executable markup from free-text fields before
//! they leave the pipeline.
//!
//! Sanitizers implement the [`Sanitizer`] trait and are composed into a
//! [`SanitizerPipeline`] that runs them sequentially. The
//! [`standard`](SanitizerPipeline::standard) pipeline removes script blocks,
//! `javascript:` fragments and inline event-handler assignments, then trims
//! surrounding whitespace.

mod regex;

use std::sync::LazyLock;

pub use self::regex::RegexSanitizer;

/// Trait for text sanitizers.
///
/// Each sanitizer receives a string and returns a transformed version.
/// Implementations must be `Send + Sync` so the controller can be shared
/// across tasks.
pub trait Sanitizer: Send + Sync {
    /// Transform the given text, returning the sanitized result.
    fn sanitize(&self, text: &str) -> String;
}

/// Sanitizer that trims leading and trailing whitespace.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrimSanitizer;

impl Sanitizer for TrimSanitizer {
    fn sanitize(&self, text: &str) -> String {
        text.trim().to_string()
    }
}

/// An ordered chain of [`Sanitizer`] implementations applied sequentially.
///
/// Each sanitizer receives the output of the previous one. An empty pipeline
/// is a no-op.
pub struct SanitizerPipeline {
    sanitizers: Vec<Box<dyn Sanitizer>>,
}

impl SanitizerPipeline {
    /// Create an empty pipeline.
    pub fn new() -> Self {
        Self {
            sanitizers: Vec::new(),
        }
    }

    /// The markup-stripping pipeline applied to every dispatch-bound field.
    pub fn standard() -> Self {
        let mut pipeline = Self::new();
        pipeline.add(RegexSanitizer::markup());
        pipeline.add(TrimSanitizer);
        pipeline
    }

    /// Append a sanitizer to the end of the pipeline.
    pub fn add(&mut self, sanitizer: impl Sanitizer + 'static) {
        self.sanitizers.push(Box::new(sanitizer));
    }

    /// Append every sanitizer of `other`, preserving its order.
    pub fn extend(&mut self, other: SanitizerPipeline) {
        self.sanitizers.extend(other.sanitizers);
    }

    /// Run the full pipeline on the given text, returning the final result.
    pub fn sanitize(&self, text: &str) -> String {
        self.sanitizers
            .iter()
            .fold(text.to_string(), |acc, s| s.sanitize(&acc))
    }

    /// Returns `true` if no sanitizers have been added.
    pub fn is_empty(&self) -> bool {
        self.sanitizers.is_empty()
    }
}

impl Default for SanitizerPipeline {
    fn default() -> Self {
        Self::new()
    }
}

static STANDARD: LazyLock<SanitizerPipeline> = LazyLock::new(SanitizerPipeline::standard);

/// Run the [standard](SanitizerPipeline::standard) pipeline on `text`.
///
/// ```
/// assert_eq!(contact_pipeline::sanitize("<script>alert(1)</script>Hello"), "Hello");
/// ```
pub fn sanitize(text: &str) -> String {
    STANDARD.sanitize(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pipeline_empty_is_empty() {
        let pipeline = SanitizerPipeline::new();
        assert!(pipeline.is_empty());
        assert!(SanitizerPipeline::default().is_empty());
    }

    #[test]
    fn pipeline_with_no_sanitizers_returns_original() {
        let pipeline = SanitizerPipeline::new();
        let text = "  <p>original</p> ";
        assert_eq!(pipeline.sanitize(text), text);
    }

    #[test]
    fn script_block_removed_trailing_text_kept() {
        assert_eq!(sanitize("<script>alert(1)</script>Hello"), "Hello");
    }

    #[test]
    fn standard_pipeline_trims_after_stripping() {
        assert_eq!(
            sanitize("  Hi <SCRIPT type=\"text/javascript\">steal()</ScRiPt>  "),
            "Hi"
        );
    }

    #[test]
    fn plain_text_only_trimmed() {
        assert_eq!(
            sanitize("\n I'd like to discuss a collaboration opportunity \t"),
            "I'd like to discuss a collaboration opportunity"
        );
    }

    #[test]
    fn extend_appends_in_order() {
        let mut extra = SanitizerPipeline::new();
        extra.add(RegexSanitizer::new(vec![(r"\d{4}-\d{4}-\d{4}-\d{4}", "[CARD]")]));

        let mut pipeline = SanitizerPipeline::standard();
        pipeline.extend(extra);

        let result = pipeline.sanitize(" Card 4111-1111-1111-1111 <script>x()</script> ");
        assert_eq!(result, "Card [CARD]");
    }

    #[test]
    fn trim_sanitizer() {
        assert_eq!(TrimSanitizer.sanitize("\t x \n"), "x");
    }
}
