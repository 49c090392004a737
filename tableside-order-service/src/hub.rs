use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use uuid::Uuid;

use crate::events::OrderEvent;
use crate::session::SubscriberSession;
use crate::EVENT_QUEUE_CAPACITY;

pub type SessionId = u64;

/// One registered subscriber: its outbound queue and the restaurant set it
/// is entitled to, fixed when the subscription was created. Ownership
/// changes made after that are not reflected until the peer reconnects.
#[derive(Debug)]
struct Subscription {
    restaurant_ids: HashSet<Uuid>,
    queue: mpsc::Sender<Arc<OrderEvent>>,
}

/// Shared membership registry. Sessions keep a clone so they can detach
/// themselves when they die, wherever they die.
#[derive(Debug, Default, Clone)]
pub(crate) struct Membership {
    inner: Arc<Mutex<HashMap<SessionId, Subscription>>>,
}

impl Membership {
    /// Remove a session and close its queue. Safe to call for a session
    /// that is already gone.
    pub(crate) fn remove(&self, id: SessionId) {
        if self.inner.lock().remove(&id).is_some() {
            tracing::debug!(session = id, "subscriber unregistered");
        }
    }
}

/// In-process broker for order lifecycle events. Constructed once at
/// startup and handed to whoever publishes or subscribes; it has no global
/// instance.
///
/// Fan-out is synchronous and non-blocking: the membership lock is only
/// ever held across `try_send` calls, so a slow consumer can stall neither
/// the publisher nor its fellow subscribers. A subscriber whose queue is
/// full is unregistered on the spot and its queue closed.
#[derive(Debug)]
pub struct EventHub {
    capacity: usize,
    next_session_id: AtomicU64,
    members: Membership,
}

impl EventHub {
    pub fn new() -> Self {
        Self::with_capacity(EVENT_QUEUE_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            next_session_id: AtomicU64::new(1),
            members: Membership::default(),
        }
    }

    /// Register a subscriber entitled to events for `restaurant_ids`. The
    /// returned session owns the receiving half of a bounded queue and
    /// unregisters itself when dropped.
    pub fn subscribe(&self, restaurant_ids: HashSet<Uuid>) -> SubscriberSession {
        let id = self.next_session_id.fetch_add(1, Ordering::Relaxed);
        let (queue, events) = mpsc::channel(self.capacity);
        self.members.inner.lock().insert(
            id,
            Subscription {
                restaurant_ids,
                queue,
            },
        );
        tracing::debug!(session = id, "subscriber registered");
        SubscriberSession::new(id, self.members.clone(), events)
    }

    /// Remove a session and close its queue; idempotent.
    pub fn unregister(&self, id: SessionId) {
        self.members.remove(id);
    }

    /// Fan an event out to every session entitled to its restaurant.
    /// Never blocks; sessions that cannot take the event are dropped.
    pub fn publish(&self, event: OrderEvent) {
        let restaurant_id = event.restaurant_id();
        let event = Arc::new(event);

        let mut dropped = Vec::new();
        let mut members = self.members.inner.lock();
        for (id, subscription) in members.iter() {
            if !subscription.restaurant_ids.contains(&restaurant_id) {
                continue;
            }
            match subscription.queue.try_send(Arc::clone(&event)) {
                Ok(()) => {}
                Err(TrySendError::Full(_)) | Err(TrySendError::Closed(_)) => {
                    dropped.push(*id);
                }
            }
        }
        for id in dropped {
            members.remove(&id);
            tracing::warn!(session = id, "disconnecting subscriber that cannot keep up");
        }
    }

    pub fn session_count(&self) -> usize {
        self.members.inner.lock().len()
    }

    pub fn is_registered(&self, id: SessionId) -> bool {
        self.members.inner.lock().contains_key(&id)
    }
}

impl Default for EventHub {
    fn default() -> Self {
        Self::new()
    }
}
