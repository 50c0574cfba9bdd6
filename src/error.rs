//! Error types for the `contact_pipeline` crate.

/// All errors that can occur while configuring the pipeline or dispatching
/// a message.
///
/// Submission rejections are not errors; they are reported through
/// [`RejectReason`](crate::RejectReason).
#[derive(Debug, thiserror::Error)]
pub enum ContactError {
    /// A dispatch backend failed to deliver the message.
    #[error("Dispatch failed: {0}")]
    Dispatch(Box<dyn std::error::Error + Send + Sync>),

    /// The builder configuration is invalid.
    #[error("Config error: {0}")]
    Config(String),

    /// A form field name did not match any known input.
    #[error("Unknown form field: {0}")]
    UnknownField(String),
}

/// A type alias for `Result<T, ContactError>`.
pub type Result<T> = std::result::Result<T, ContactError>;
