//! # contact_pipeline
//!
//! The decision logic behind a website contact form: turns raw form input
//! into either a dispatched message or a list of rejection reasons.
//!
//! ## Overview
//!
//! A [`SubmissionController`] owns one session's captcha and rate-limit
//! state. Each [`submit`](SubmissionController::submit) runs, in order and
//! without short-circuiting:
//!
//! 1. the honeypot check,
//! 2. the [`RateLimiter`],
//! 3. the [`FieldValidator`] rules (name, email, subject, message, captcha),
//! 4. the [`SpamFilter`] keyword denylist and the link check.
//!
//! Accepted input is passed through the [`SanitizerPipeline`] and handed to
//! a [`Dispatcher`]. The controller publishes a [`Snapshot`] on every
//! transition of the `Idle -> Sending -> Sent | Rejected -> Idle` machine.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use contact_pipeline::{ContactFormBuilder, FormData, FsOutbox, SubmitOutcome};
//!
//! # async fn example() -> contact_pipeline::Result<()> {
//! let controller = ContactFormBuilder::new(FsOutbox::new("/tmp/outbox"))
//!     .recipient("hello@example.com")
//!     .build()?;
//!
//! let mut form = FormData::default();
//! form.apply_input("name", "Jane Doe")?;
//! form.apply_input("email", "jane@example.com")?;
//! form.apply_input("subject", "Project inquiry")?;
//! form.apply_input("message", "I'd like to discuss a collaboration opportunity")?;
//! form.apply_input("captcha", controller.challenge().expected().to_string())?;
//!
//! match controller.submit(form).await {
//!     SubmitOutcome::Sent(_) => println!("thanks!"),
//!     SubmitOutcome::Rejected(outcome) => println!("{:?}", outcome.messages()),
//!     SubmitOutcome::Ignored => {}
//! }
//! # Ok(())
//! # }
//! ```
//!
//! All checks run client-side and are a deterrent only.

pub mod captcha;
pub mod config;
pub mod controller;
pub mod dispatch;
pub mod error;
pub mod form;
pub mod rate_limit;
pub mod sanitizer;
pub mod spam;
pub mod validator;
mod reset;

pub use captcha::CaptchaChallenge;
pub use config::{ContactFormBuilder, FailurePolicy, LengthBounds, PipelineConfig};
pub use controller::{Delivery, PipelineState, Snapshot, SubmissionController, SubmitOutcome};
pub use dispatch::{DispatchReply, Dispatcher, FsOutbox};
pub use error::{ContactError, Result};
pub use form::{ContactMessage, FormData, FormField};
pub use rate_limit::{RateLimiter, SubmissionWindow};
pub use sanitizer::{RegexSanitizer, Sanitizer, SanitizerPipeline, TrimSanitizer, sanitize};
pub use spam::SpamFilter;
pub use validator::{FieldValidator, RejectReason, ValidationOutcome};
