//! Scheduled return from `Sent` to `Idle`.
//!
//! This module is internal -- the task is owned and cancelled by
//! [`SubmissionController`](crate::SubmissionController).

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time;

use crate::controller::{PipelineState, Shared};

pub(crate) fn schedule(shared: Arc<Shared>, delay: Duration) -> JoinHandle<()> {
    tokio::spawn(run(shared, delay))
}

async fn run(shared: Arc<Shared>, delay: Duration) {
    time::sleep(delay).await;

    let mut session = shared.lock();
    // Superseded by a manual reset
    if session.state != PipelineState::Sent {
        return;
    }
    session.clear_after_sent();
    shared.publish(&session);
    tracing::debug!("Confirmation expired, form cleared");
}
