//! Raw form input as collected by the presentation layer, and the sanitized
//! message handed to a [`Dispatcher`](crate::Dispatcher).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ContactError;

/// The inputs of the contact form.
///
/// Parses from the HTML input names used by the form markup, so a generic
/// input-change handler can forward `(name, value)` pairs unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormField {
    Name,
    Email,
    Subject,
    Message,
    /// Hidden input that real users never see.
    Honeypot,
    CaptchaAnswer,
}

impl FormField {
    /// All fields, in form order.
    pub const ALL: [FormField; 6] = [
        FormField::Name,
        FormField::Email,
        FormField::Subject,
        FormField::Message,
        FormField::Honeypot,
        FormField::CaptchaAnswer,
    ];

    /// The HTML input name of this field.
    pub fn input_name(self) -> &'static str {
        match self {
            FormField::Name => "name",
            FormField::Email => "email",
            FormField::Subject => "subject",
            FormField::Message => "message",
            FormField::Honeypot => "honeypot",
            FormField::CaptchaAnswer => "captcha",
        }
    }
}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.input_name())
    }
}

impl FromStr for FormField {
    type Err = ContactError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FormField::ALL
            .into_iter()
            .find(|field| field.input_name() == s)
            .ok_or_else(|| ContactError::UnknownField(s.to_string()))
    }
}

/// Raw, unvalidated form values.
///
/// Owned by the presentation layer and passed by value into
/// [`SubmissionController::submit`](crate::SubmissionController::submit).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormData {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    pub honeypot: String,
    pub captcha_answer: String,
}

impl FormData {
    /// Replace the value of a single field.
    pub fn set(&mut self, field: FormField, value: impl Into<String>) {
        *self.slot_mut(field) = value.into();
    }

    /// Current value of a single field.
    pub fn get(&self, field: FormField) -> &str {
        match field {
            FormField::Name => &self.name,
            FormField::Email => &self.email,
            FormField::Subject => &self.subject,
            FormField::Message => &self.message,
            FormField::Honeypot => &self.honeypot,
            FormField::CaptchaAnswer => &self.captcha_answer,
        }
    }

    /// Apply an input-change event keyed by HTML input name.
    pub fn apply_input(&mut self, input_name: &str, value: impl Into<String>) -> crate::Result<()> {
        let field = input_name.parse::<FormField>()?;
        self.set(field, value);
        Ok(())
    }

    fn slot_mut(&mut self, field: FormField) -> &mut String {
        match field {
            FormField::Name => &mut self.name,
            FormField::Email => &mut self.email,
            FormField::Subject => &mut self.subject,
            FormField::Message => &mut self.message,
            FormField::Honeypot => &mut self.honeypot,
            FormField::CaptchaAnswer => &mut self.captcha_answer,
        }
    }
}

/// The sanitized fields that leave the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactMessage {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}
