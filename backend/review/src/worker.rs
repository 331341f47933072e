//! Background review processing on a bounded queue.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::service::{ReviewProcessor, ReviewRequest};

/// Sending half of the review queue.
#[derive(Clone)]
pub struct ReviewQueue {
    tx: mpsc::Sender<ReviewRequest>,
}

impl ReviewQueue {
    /// Enqueue without waiting. Returns `false` if the job was dropped
    /// because the queue is full or the worker is gone.
    pub fn try_submit(&self, request: ReviewRequest) -> bool {
        match self.tx.try_send(request) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                warn!("Review queue full, dropping review");
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                warn!("Review worker stopped, dropping review");
                false
            }
        }
    }
}

/// Start the single worker draining the queue. It stops once every
/// [`ReviewQueue`] handle is dropped.
pub fn spawn_worker(processor: Arc<ReviewProcessor>, capacity: usize) -> (ReviewQueue, JoinHandle<()>) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    let handle = tokio::spawn(run(processor, rx));
    (ReviewQueue { tx }, handle)
}

async fn run(processor: Arc<ReviewProcessor>, mut rx: mpsc::Receiver<ReviewRequest>) {
    info!("Review worker started");
    while let Some(request) = rx.recv().await {
        let pathways = processor.process(request).await;
        debug!(pathways = pathways.len(), "Background review finished");
    }
    info!("Review worker stopped");
}
