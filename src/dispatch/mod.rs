//! Pluggable dispatch backends that deliver an accepted [`ContactMessage`].
//!
//! The crate ships with [`FsOutbox`], which drops each message into a local
//! directory. Implement the [`Dispatcher`] trait to hand messages to a
//! mail-sending provider or any other transport.

mod fs;

pub use fs::FsOutbox;

use std::future::Future;

use crate::error::Result;
use crate::form::ContactMessage;

/// Answer from a dispatch backend.
///
/// A reply with `success == false` is handled exactly like an `Err`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchReply {
    pub success: bool,
    pub message: String,
}

impl DispatchReply {
    pub fn delivered(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

/// Trait for backends that deliver sanitized contact messages.
///
/// Implementations must be `Send + Sync + 'static` so the controller can be
/// shared across tasks.
///
/// # Implementing a custom backend
///
/// ```rust,no_run
/// use contact_pipeline::{ContactMessage, DispatchReply, Dispatcher, Result};
///
/// struct Webhook;
///
/// impl Dispatcher for Webhook {
///     async fn send(&self, message: &ContactMessage) -> Result<DispatchReply> {
///         // post the message somewhere ...
///         Ok(DispatchReply::delivered(format!("queued mail from {}", message.email)))
///     }
/// }
/// ```
pub trait Dispatcher: Send + Sync + 'static {
    /// Deliver `message`. Called at most once per accepted submission.
    fn send(
        &self,
        message: &ContactMessage,
    ) -> impl Future<Output = Result<DispatchReply>> + Send;
}
