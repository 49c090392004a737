//! In-process transport for exercising subscriber sessions without a
//! network socket.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};

use crate::events::OrderEvent;
use crate::session::{CloseWatch, EventSink, SessionError};

/// Build a connected in-memory transport. The sink and watch go to
/// [`SubscriberSession::run`]; the handle stays with the test to observe
/// deliveries and to simulate the peer side.
///
/// [`SubscriberSession::run`]: crate::session::SubscriberSession::run
pub fn memory_transport() -> (MemorySink, MemoryCloseWatch, MemoryTransportHandle) {
    let (delivered_tx, delivered_rx) = mpsc::unbounded_channel();
    let (close_tx, close_rx) = oneshot::channel();
    let severed = Arc::new(AtomicBool::new(false));

    (
        MemorySink {
            delivered: delivered_tx,
            severed: Arc::clone(&severed),
        },
        MemoryCloseWatch { closed: close_rx },
        MemoryTransportHandle {
            delivered: delivered_rx,
            close: Some(close_tx),
            severed,
        },
    )
}

pub struct MemorySink {
    delivered: mpsc::UnboundedSender<OrderEvent>,
    severed: Arc<AtomicBool>,
}

#[async_trait]
impl EventSink for MemorySink {
    async fn send(&mut self, event: &OrderEvent) -> Result<(), SessionError> {
        if self.severed.load(Ordering::SeqCst) {
            return Err(SessionError::Write("connection reset".to_string()));
        }
        self.delivered
            .send(event.clone())
            .map_err(|_| SessionError::Write("peer gone".to_string()))
    }
}

pub struct MemoryCloseWatch {
    closed: oneshot::Receiver<()>,
}

#[async_trait]
impl CloseWatch for MemoryCloseWatch {
    async fn closed(&mut self) {
        // Resolves on an explicit close or when the handle is dropped.
        let _ = (&mut self.closed).await;
    }
}

/// Peer side of the in-memory transport.
pub struct MemoryTransportHandle {
    delivered: mpsc::UnboundedReceiver<OrderEvent>,
    close: Option<oneshot::Sender<()>>,
    severed: Arc<AtomicBool>,
}

impl MemoryTransportHandle {
    /// Next event the session wrote to its transport.
    pub async fn delivered(&mut self) -> Option<OrderEvent> {
        self.delivered.recv().await
    }

    /// Simulate the peer closing the connection.
    pub fn close(&mut self) {
        self.close.take();
    }

    /// Make every subsequent write fail, as a torn-down socket would.
    pub fn sever(&self) {
        self.severed.store(true, Ordering::SeqCst);
    }
}
