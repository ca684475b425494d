//! Outbox for realtime mirror writes.
//!
//! [`MirrorOutbox`] is the [`ChangeFeed`] handed to services: publishing only
//! enqueues. [`MirrorDispatcher`] runs as its own task, draining the queue into
//! a [`RealtimeMirror`]. Each event gets one delivery attempt; failures are
//! logged and dropped.

use std::sync::Arc;

use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, warn};

use crate::domain::ports::{ChangeFeed, MirrorEvent, RealtimeMirror};

/// Default number of events buffered between services and the dispatcher.
pub const DEFAULT_QUEUE_CAPACITY: usize = 1024;

/// Enqueuing side of the mirror outbox.
#[derive(Debug, Clone)]
pub struct MirrorOutbox {
    sender: mpsc::Sender<MirrorEvent>,
}

impl MirrorOutbox {
    /// Create an outbox and the dispatcher draining it into `mirror`.
    ///
    /// A zero capacity is raised to one.
    pub fn channel(capacity: usize, mirror: Arc<dyn RealtimeMirror>) -> (Self, MirrorDispatcher) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        (Self { sender }, MirrorDispatcher { receiver, mirror })
    }
}

impl ChangeFeed for MirrorOutbox {
    fn publish(&self, event: MirrorEvent) {
        match self.sender.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(event)) => warn!(
                kind = event.kind(),
                poll_id = %event.poll_id(),
                "mirror queue full; dropping event"
            ),
            Err(TrySendError::Closed(event)) => warn!(
                kind = event.kind(),
                poll_id = %event.poll_id(),
                "mirror dispatcher stopped; dropping event"
            ),
        }
    }
}

/// Draining side of the mirror outbox.
pub struct MirrorDispatcher {
    receiver: mpsc::Receiver<MirrorEvent>,
    mirror: Arc<dyn RealtimeMirror>,
}

impl MirrorDispatcher {
    /// Deliver events until every [`MirrorOutbox`] handle is dropped.
    pub async fn run(mut self) {
        while let Some(event) = self.receiver.recv().await {
            match self.mirror.apply(&event).await {
                Ok(()) => debug!(
                    kind = event.kind(),
                    poll_id = %event.poll_id(),
                    "mirrored event"
                ),
                Err(error) => warn!(
                    kind = event.kind(),
                    poll_id = %event.poll_id(),
                    error = %error,
                    "mirror write failed; event dropped"
                ),
            }
        }
        debug!("mirror dispatcher stopped");
    }
}
