//! Pipeline configuration and the builder that turns it into a running
//! [`SubmissionController`].

use std::time::Duration;

use rand::RngCore;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Deserialize;

use crate::controller::SubmissionController;
use crate::dispatch::Dispatcher;
use crate::error::{ContactError, Result};
use crate::rate_limit::RateLimiter;
use crate::sanitizer::{Sanitizer, SanitizerPipeline};
use crate::spam::SpamFilter;
use crate::validator::FieldValidator;

/// Inclusive bounds on the trimmed character length of a text field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct LengthBounds {
    pub min: usize,
    pub max: usize,
}

impl LengthBounds {
    pub const fn new(min: usize, max: usize) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, len: usize) -> bool {
        (self.min..=self.max).contains(&len)
    }
}

/// What the controller shows when the dispatcher fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Log the failure locally and still report `Sent` to the user.
    #[default]
    DegradeToSent,
    /// Report the failure as a rejection the user can retry.
    Reject,
}

/// Every tunable the pipeline consumes.
///
/// Deserializes from any `serde` format; missing keys fall back to the
/// defaults below and durations are given in milliseconds.
///
/// ```
/// let config: contact_pipeline::PipelineConfig = serde_json::from_str(
///     r#"{ "recipient": "me@example.com", "max_per_window": 5, "window_ms": 30000 }"#,
/// ).unwrap();
/// assert_eq!(config.max_per_window, 5);
/// assert_eq!(config.subject.max, 100);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Address shown in the UI and used for `mailto:` fallback links.
    pub recipient: String,
    pub name: LengthBounds,
    pub subject: LengthBounds,
    pub message: LengthBounds,
    pub max_per_window: u32,
    #[serde(rename = "window_ms", with = "millis")]
    pub window: Duration,
    /// How long `Sent` stays visible before the form is cleared.
    #[serde(rename = "display_delay_ms", with = "millis")]
    pub display_delay: Duration,
    pub spam_keywords: Vec<String>,
    pub failure_policy: FailurePolicy,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            recipient: String::new(),
            name: LengthBounds::new(2, 50),
            subject: LengthBounds::new(5, 100),
            message: LengthBounds::new(10, 1000),
            max_per_window: 2,
            window: Duration::from_secs(60),
            display_delay: Duration::from_secs(3),
            spam_keywords: SpamFilter::DEFAULT_KEYWORDS
                .iter()
                .map(|k| k.to_string())
                .collect(),
            failure_policy: FailurePolicy::default(),
        }
    }
}

impl PipelineConfig {
    /// `mailto:` link for the surrounding UI.
    pub fn mailto_href(&self) -> String {
        format!("mailto:{}", self.recipient)
    }

    /// Check the configuration for values the pipeline cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.recipient.trim().is_empty() {
            return Err(ContactError::Config("recipient must not be empty".into()));
        }
        for (field, bounds) in [
            ("name", self.name),
            ("subject", self.subject),
            ("message", self.message),
        ] {
            if bounds.min > bounds.max {
                return Err(ContactError::Config(format!(
                    "{field} bounds are inverted: min {} > max {}",
                    bounds.min, bounds.max
                )));
            }
        }
        if self.max_per_window == 0 {
            return Err(ContactError::Config(
                "max_per_window must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

/// Builder for configuring and starting a [`SubmissionController`].
///
/// # Example
///
/// ```rust,no_run
/// use contact_pipeline::{ContactFormBuilder, FsOutbox};
/// use std::time::Duration;
///
/// # fn example() -> contact_pipeline::Result<()> {
/// let controller = ContactFormBuilder::new(FsOutbox::new("/var/spool/contact"))
///     .recipient("hello@example.com")
///     .max_per_window(3)
///     .window(Duration::from_secs(120))
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct ContactFormBuilder<D: Dispatcher> {
    dispatcher: D,
    config: PipelineConfig,
    rng: Option<Box<dyn RngCore + Send>>,
    extra_sanitizers: SanitizerPipeline,
}

impl<D: Dispatcher> ContactFormBuilder<D> {
    /// Create a builder around `dispatcher` with the default configuration.
    pub fn new(dispatcher: D) -> Self {
        Self {
            dispatcher,
            config: PipelineConfig::default(),
            rng: None,
            extra_sanitizers: SanitizerPipeline::new(),
        }
    }

    /// Replace the whole configuration, e.g. one loaded from a file.
    pub fn config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn recipient(mut self, recipient: impl Into<String>) -> Self {
        self.config.recipient = recipient.into();
        self
    }

    pub fn name_bounds(mut self, min: usize, max: usize) -> Self {
        self.config.name = LengthBounds::new(min, max);
        self
    }

    pub fn subject_bounds(mut self, min: usize, max: usize) -> Self {
        self.config.subject = LengthBounds::new(min, max);
        self
    }

    pub fn message_bounds(mut self, min: usize, max: usize) -> Self {
        self.config.message = LengthBounds::new(min, max);
        self
    }

    /// Maximum accepted submissions per rate-limit window.
    pub fn max_per_window(mut self, max: u32) -> Self {
        self.config.max_per_window = max;
        self
    }

    /// Length of the rate-limit window.
    pub fn window(mut self, window: Duration) -> Self {
        self.config.window = window;
        self
    }

    pub fn display_delay(mut self, delay: Duration) -> Self {
        self.config.display_delay = delay;
        self
    }

    /// Replace the spam keyword denylist.
    pub fn spam_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.spam_keywords = keywords.into_iter().map(Into::into).collect();
        self
    }

    pub fn failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.config.failure_policy = policy;
        self
    }

    /// Random source for captcha operands. Defaults to an entropy-seeded
    /// [`StdRng`].
    pub fn rng(mut self, rng: impl RngCore + Send + 'static) -> Self {
        self.rng = Some(Box::new(rng));
        self
    }

    /// Append a [`Sanitizer`] that runs after the built-in markup rules.
    pub fn add_sanitizer(mut self, sanitizer: impl Sanitizer + 'static) -> Self {
        self.extra_sanitizers.add(sanitizer);
        self
    }

    /// Validate the configuration and return a controller in the `Idle`
    /// state with a fresh captcha.
    pub fn build(self) -> Result<SubmissionController<D>> {
        self.config.validate()?;

        let mut sanitizers = SanitizerPipeline::standard();
        sanitizers.extend(self.extra_sanitizers);

        let validator =
            FieldValidator::new(self.config.name, self.config.subject, self.config.message);
        let spam = SpamFilter::new(self.config.spam_keywords.iter().map(String::as_str));
        let limiter = RateLimiter::new(self.config.max_per_window, self.config.window);
        let rng = self.rng.unwrap_or_else(|| Box::new(StdRng::from_entropy()));

        tracing::debug!(
            recipient = %self.config.recipient,
            max_per_window = self.config.max_per_window,
            "Contact pipeline configured"
        );

        Ok(SubmissionController::new(
            self.dispatcher,
            self.config,
            validator,
            sanitizers,
            spam,
            limiter,
            rng,
        ))
    }
}
