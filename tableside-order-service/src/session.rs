use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::events::OrderEvent;
use crate::hub::{Membership, SessionId};

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("transport write failed: {0}")]
    Write(String),
}

/// Outbound half of a subscriber's transport. Implementations serialize
/// the event however their wire format wants it.
#[async_trait]
pub trait EventSink: Send {
    async fn send(&mut self, event: &OrderEvent) -> Result<(), SessionError>;
}

/// Inbound half of a subscriber's transport. There is no inbound
/// application protocol; the only thing read from the peer is the fact
/// that it went away. `closed` resolves exactly once, when it does.
#[async_trait]
pub trait CloseWatch: Send {
    async fn closed(&mut self);
}

/// One live subscriber connection: the receiving half of the hub queue
/// plus the session's identity. Dropping the session unregisters it, so
/// every exit path out of [`run`](Self::run) detaches from the hub.
pub struct SubscriberSession {
    id: SessionId,
    members: Membership,
    events: tokio::sync::mpsc::Receiver<Arc<OrderEvent>>,
}

impl SubscriberSession {
    pub(crate) fn new(
        id: SessionId,
        members: Membership,
        events: tokio::sync::mpsc::Receiver<Arc<OrderEvent>>,
    ) -> Self {
        Self {
            id,
            members,
            events,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Next queued event, or `None` once the hub has dropped this session.
    /// Used directly by tests; live connections go through [`run`](Self::run).
    pub async fn next_event(&mut self) -> Option<Arc<OrderEvent>> {
        self.events.recv().await
    }

    /// Drive the session until it dies: drain the queue into `sink`, and
    /// watch for the peer hanging up. The first of write error, peer
    /// close, or hub-side disconnect (queue overflow) ends both duties.
    pub async fn run<S, W>(mut self, mut sink: S, mut watch: W)
    where
        S: EventSink,
        W: CloseWatch,
    {
        loop {
            tokio::select! {
                event = self.events.recv() => match event {
                    Some(event) => {
                        if let Err(err) = sink.send(&event).await {
                            tracing::debug!(session = self.id, error = %err, "subscriber write failed");
                            break;
                        }
                    }
                    // Queue closed: the hub already unregistered us.
                    None => break,
                },
                _ = watch.closed() => {
                    tracing::debug!(session = self.id, "subscriber closed the connection");
                    break;
                }
            }
        }
    }
}

impl Drop for SubscriberSession {
    fn drop(&mut self) {
        self.members.remove(self.id);
    }
}
