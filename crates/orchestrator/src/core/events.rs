//! Ordered event emitter with sequence guarantees.
//!
//! Every envelope published through the emitter carries a sequence number that
//! is strictly increasing across all sessions of one orchestrator, so
//! subscribers can order events from a superseded session and its successor.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use events::{BattleEvent, EventBus, EventEnvelope};

/// Event emitter with sequence number guarantees.
#[derive(Clone)]
pub struct OrderedEventEmitter {
    bus: EventBus,
    sequence: Arc<AtomicU64>,
}

impl OrderedEventEmitter {
    /// Create a new ordered event emitter wrapping the given bus.
    pub fn new(bus: EventBus) -> Self {
        Self {
            bus,
            sequence: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Emit an event stamped with the next sequence number (starting at 1).
    pub fn emit(&self, event: BattleEvent) {
        let seq = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        self.bus.publish(EventEnvelope::new(event).with_sequence(seq));
    }

    /// Number of events emitted so far.
    pub fn current_sequence(&self) -> u64 {
        self.sequence.load(Ordering::SeqCst)
    }

    /// Get a reference to the underlying event bus.
    pub fn bus(&self) -> &EventBus {
        &self.bus
    }
}

impl std::fmt::Debug for OrderedEventEmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderedEventEmitter")
            .field("sequence", &self.current_sequence())
            .field("bus", &self.bus)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn turn_started(turn: u32) -> BattleEvent {
        BattleEvent::TurnStarted {
            session_id: None,
            turn,
        }
    }

    fn turn_ended(turn: u32) -> BattleEvent {
        BattleEvent::TurnEnded {
            session_id: None,
            turn,
        }
    }

    #[test]
    fn test_sequence_increments() {
        let emitter = OrderedEventEmitter::new(EventBus::new());

        assert_eq!(emitter.current_sequence(), 0);

        emitter.emit(turn_started(1));
        assert_eq!(emitter.current_sequence(), 1);

        emitter.emit(turn_ended(1));
        assert_eq!(emitter.current_sequence(), 2);
    }

    #[test]
    fn test_clone_shares_sequence() {
        let emitter1 = OrderedEventEmitter::new(EventBus::new());
        let emitter2 = emitter1.clone();

        emitter1.emit(turn_started(1));
        assert_eq!(emitter2.current_sequence(), 1);

        emitter2.emit(turn_started(2));
        assert_eq!(emitter1.current_sequence(), 2);
    }

    #[tokio::test]
    async fn test_envelopes_carry_sequence() {
        let emitter = OrderedEventEmitter::new(EventBus::new());
        let mut rx = emitter.bus().subscribe();

        emitter.emit(turn_started(1));
        emitter.emit(turn_ended(1));

        assert_eq!(rx.recv().await.unwrap().sequence, 1);
        assert_eq!(rx.recv().await.unwrap().sequence, 2);
    }
}
