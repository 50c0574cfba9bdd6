//! Per-field acceptance rules and the reasons a submission can be rejected.

use std::sync::LazyLock;

use regex::Regex;

use crate::captcha::CaptchaChallenge;
use crate::config::LengthBounds;
use crate::form::FormData;

/// `local@domain.tld` shape: one `@`, no whitespace, a dot inside the domain.
static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("invalid email pattern"));

/// Why a submission was not dispatched.
///
/// Abuse signals and malformed input share this one channel so the
/// observable contract does not tell a bot which check it tripped.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RejectReason {
    #[error("Bot detected - submission blocked")]
    Honeypot,

    #[error("Too many submissions. Please wait a moment before trying again.")]
    RateLimited,

    #[error("Name must be {min}-{max} characters and contain only letters and spaces")]
    Name { min: usize, max: usize },

    #[error("Please enter a valid email address")]
    Email,

    #[error("Subject must be {min}-{max} characters")]
    Subject { min: usize, max: usize },

    #[error("Message must be {min}-{max} characters")]
    Message { min: usize, max: usize },

    #[error("Please solve the math problem correctly")]
    Captcha,

    #[error("Message contains suspicious content and cannot be sent")]
    Spam,

    #[error("Links are not allowed in messages for security reasons")]
    Link,

    /// Only produced under [`FailurePolicy::Reject`](crate::FailurePolicy::Reject).
    #[error("Your message could not be sent. Please try again later.")]
    DispatchFailed,
}

/// Ordered rejection reasons for one submission attempt. Empty means
/// accepted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationOutcome {
    reasons: Vec<RejectReason>,
}

impl ValidationOutcome {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_accepted(&self) -> bool {
        self.reasons.is_empty()
    }

    pub fn push(&mut self, reason: RejectReason) {
        self.reasons.push(reason);
    }

    /// Record `reason` when `failed` holds.
    pub fn check(&mut self, failed: bool, reason: RejectReason) {
        if failed {
            self.push(reason);
        }
    }

    pub fn reasons(&self) -> &[RejectReason] {
        &self.reasons
    }

    pub fn contains(&self, reason: &RejectReason) -> bool {
        self.reasons.contains(reason)
    }

    /// Human-readable text of every reason, in order.
    pub fn messages(&self) -> Vec<String> {
        self.reasons.iter().map(ToString::to_string).collect()
    }

    pub fn into_reasons(self) -> Vec<RejectReason> {
        self.reasons
    }
}

impl Extend<RejectReason> for ValidationOutcome {
    fn extend<T: IntoIterator<Item = RejectReason>>(&mut self, iter: T) {
        self.reasons.extend(iter);
    }
}

impl From<Vec<RejectReason>> for ValidationOutcome {
    fn from(reasons: Vec<RejectReason>) -> Self {
        Self { reasons }
    }
}

/// Stateless rule table for the visible form fields.
#[derive(Debug, Clone)]
pub struct FieldValidator {
    name: LengthBounds,
    subject: LengthBounds,
    message: LengthBounds,
}

impl Default for FieldValidator {
    fn default() -> Self {
        Self::new(
            LengthBounds::new(2, 50),
            LengthBounds::new(5, 100),
            LengthBounds::new(10, 1000),
        )
    }
}

impl FieldValidator {
    pub fn new(name: LengthBounds, subject: LengthBounds, message: LengthBounds) -> Self {
        Self {
            name,
            subject,
            message,
        }
    }

    /// Evaluate every rule and collect the failures in field order: name,
    /// email, subject, message, captcha.
    pub fn validate(&self, form: &FormData, challenge: &CaptchaChallenge) -> ValidationOutcome {
        let mut outcome = ValidationOutcome::new();
        outcome.check(
            !self.valid_name(&form.name),
            RejectReason::Name {
                min: self.name.min,
                max: self.name.max,
            },
        );
        outcome.check(!valid_email(&form.email), RejectReason::Email);
        outcome.check(
            !trimmed_len_within(&form.subject, self.subject),
            RejectReason::Subject {
                min: self.subject.min,
                max: self.subject.max,
            },
        );
        outcome.check(
            !trimmed_len_within(&form.message, self.message),
            RejectReason::Message {
                min: self.message.min,
                max: self.message.max,
            },
        );
        outcome.check(
            !challenge.verify(&form.captcha_answer),
            RejectReason::Captcha,
        );
        outcome
    }

    /// Letters and whitespace only, trimmed length within bounds.
    pub fn valid_name(&self, name: &str) -> bool {
        let trimmed = name.trim();
        trimmed_len_within(trimmed, self.name)
            && trimmed
                .chars()
                .all(|c| c.is_ascii_alphabetic() || c.is_whitespace())
    }
}

pub fn valid_email(email: &str) -> bool {
    EMAIL.is_match(email.trim())
}

fn trimmed_len_within(value: &str, bounds: LengthBounds) -> bool {
    bounds.contains(value.trim().chars().count())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_form(challenge: &CaptchaChallenge) -> FormData {
        FormData {
            name: "Jane Doe".into(),
            email: "jane@example.com".into(),
            subject: "Project inquiry".into(),
            message: "I'd like to discuss a collaboration opportunity".into(),
            honeypot: String::new(),
            captcha_answer: challenge.expected().to_string(),
        }
    }

    #[test]
    fn valid_form_is_accepted() {
        let challenge = CaptchaChallenge::from_operands(4, 5);
        let outcome = FieldValidator::default().validate(&valid_form(&challenge), &challenge);
        assert!(outcome.is_accepted());
        assert!(outcome.messages().is_empty());
    }

    #[test]
    fn names() {
        let v = FieldValidator::default();
        assert!(v.valid_name("Jo"));
        assert!(v.valid_name("  Mary Ann  "));
        assert!(v.valid_name(&"a".repeat(50)));
        assert!(!v.valid_name("J"));
        assert!(!v.valid_name("  J  "));
        assert!(!v.valid_name(&"a".repeat(51)));
        assert!(!v.valid_name("R2D2"));
        assert!(!v.valid_name("O'Brien"));
        assert!(!v.valid_name("Zoë"));
        assert!(!v.valid_name(""));
    }

    #[test]
    fn emails() {
        assert!(valid_email("jane@example.com"));
        assert!(valid_email(" jane.doe+tag@mail.example.co.uk "));
        assert!(!valid_email("jane@example"));
        assert!(!valid_email("jane.example.com"));
        assert!(!valid_email("jane@@example.com"));
        assert!(!valid_email("ja ne@example.com"));
        assert!(!valid_email("jane@example."));
        assert!(!valid_email(""));
    }

    #[test]
    fn every_failure_reported_in_field_order() {
        let challenge = CaptchaChallenge::from_operands(1, 1);
        let form = FormData {
            name: "X".into(),
            email: "nope".into(),
            subject: "Hi".into(),
            message: "short".into(),
            honeypot: String::new(),
            captcha_answer: "3".into(),
        };
        let outcome = FieldValidator::default().validate(&form, &challenge);
        assert_eq!(
            outcome.reasons(),
            &[
                RejectReason::Name { min: 2, max: 50 },
                RejectReason::Email,
                RejectReason::Subject { min: 5, max: 100 },
                RejectReason::Message { min: 10, max: 1000 },
                RejectReason::Captcha,
            ]
        );
    }

    #[test]
    fn length_checks_use_trimmed_value() {
        let challenge = CaptchaChallenge::from_operands(2, 2);
        let mut form = valid_form(&challenge);
        form.subject = "   Hey    ".into();
        form.message = format!("  {}  ", "m".repeat(1000));
        let outcome = FieldValidator::default().validate(&form, &challenge);
        assert_eq!(
            outcome.reasons(),
            &[RejectReason::Subject { min: 5, max: 100 }]
        );
    }

    #[test]
    fn custom_bounds_flow_into_messages() {
        let v = FieldValidator::new(
            LengthBounds::new(3, 20),
            LengthBounds::new(1, 10),
            LengthBounds::new(1, 10),
        );
        let challenge = CaptchaChallenge::from_operands(2, 2);
        let mut form = valid_form(&challenge);
        form.name = "Al".into();
        form.subject = "ok".into();
        form.message = "fine".into();
        let outcome = v.validate(&form, &challenge);
        assert_eq!(
            outcome.messages(),
            vec!["Name must be 3-20 characters and contain only letters and spaces"]
        );
    }

    #[test]
    fn reason_texts() {
        assert_eq!(
            RejectReason::Honeypot.to_string(),
            "Bot detected - submission blocked"
        );
        assert_eq!(
            RejectReason::Message { min: 10, max: 1000 }.to_string(),
            "Message must be 10-1000 characters"
        );
    }
}
