//! Filesystem outbox backend.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::dispatch::{DispatchReply, Dispatcher};
use crate::error::{ContactError, Result};
use crate::form::ContactMessage;

/// Dispatcher that writes each message as a pretty-printed JSON file.
///
/// The directory is created on first use. Files are named
/// `message-{unix_millis}-{seq}.json`, `seq` counting up per outbox so names
/// stay unique within one process.
///
/// # Example
///
/// ```rust,no_run
/// use contact_pipeline::FsOutbox;
///
/// let outbox = FsOutbox::new("/var/spool/contact");
/// ```
pub struct FsOutbox {
    dir: PathBuf,
    seq: AtomicU64,
}

impl FsOutbox {
    /// Create a new `FsOutbox` rooted at the given directory.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            seq: AtomicU64::new(0),
        }
    }

    fn next_file_name(&self) -> String {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or_default();
        let seq = self.seq.fetch_add(1, Ordering::Relaxed);
        format!("message-{millis}-{seq}.json")
    }
}

impl Dispatcher for FsOutbox {
    async fn send(&self, message: &ContactMessage) -> Result<DispatchReply> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| ContactError::Dispatch(Box::new(e)))?;

        let body =
            serde_json::to_vec_pretty(message).map_err(|e| ContactError::Dispatch(Box::new(e)))?;
        let path = self.dir.join(self.next_file_name());

        tokio::fs::write(&path, &body)
            .await
            .map_err(|e| ContactError::Dispatch(Box::new(e)))?;

        tracing::debug!("Wrote {} bytes to {}", body.len(), path.display());
        Ok(DispatchReply::delivered(format!(
            "Message stored at {}",
            path.display()
        )))
    }
}
