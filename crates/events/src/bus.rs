//! Fan-out of battle events to any number of observers.
//!
//! Orchestrators and notifiers share one bus by cloning it. Observers that
//! fall more than the channel capacity behind see `RecvError::Lagged` and
//! skip ahead; the battle itself never waits on them.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;

use crate::types::{BattleEvent, EventEnvelope};

/// Envelopes kept for the slowest observer. A turn emits a handful of
/// phase, action and hook events, so this covers dozens of turns.
const DEFAULT_CAPACITY: usize = 1000;

/// Broadcast channel carrying [`EventEnvelope`]s for every battle session.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<EventEnvelope>,
    published: Arc<AtomicUsize>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// `capacity` bounds how far an observer may lag before losing envelopes.
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            published: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Send an already stamped envelope, returning how many observers got it.
    ///
    /// With nobody subscribed the envelope is counted and discarded.
    pub fn publish(&self, envelope: EventEnvelope) -> usize {
        self.published.fetch_add(1, Ordering::Relaxed);
        self.sender.send(envelope).unwrap_or(0)
    }

    /// Send `event` in an unsequenced envelope (sequence 0).
    pub fn emit(&self, event: BattleEvent) -> usize {
        self.publish(EventEnvelope::new(event))
    }

    /// Observe envelopes published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<EventEnvelope> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Envelopes handed to `publish` so far, observed or not.
    pub fn event_count(&self) -> usize {
        self.published.load(Ordering::Relaxed)
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriber_count", &self.subscriber_count())
            .field("event_count", &self.event_count())
            .finish()
    }
}
