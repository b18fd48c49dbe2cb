//! Stock [`EventNotifier`] implementations.

use async_trait::async_trait;
use battle_core::{BoxError, TurnContext};
use events::{BattleEvent, EventBus};
use tokio_util::sync::CancellationToken;

use crate::core::{EventNotifier, NoopNotifier};

/// Publishes `turn.started` / `turn.ended` to an [`EventBus`], optionally after
/// delegating to another notifier.
///
/// The event is published only once the inner hook succeeded. Events are
/// tagged with the context's session and go out unsequenced (sequence 0), so
/// subscribers order them against the orchestrator's events by session and
/// turn rather than by sequence.
pub struct BusNotifier<N = NoopNotifier> {
    bus: EventBus,
    inner: N,
}

impl BusNotifier {
    pub fn new(bus: EventBus) -> Self {
        Self {
            bus,
            inner: NoopNotifier,
        }
    }
}

impl<N> BusNotifier<N> {
    /// Run `inner`'s hooks first, then publish.
    pub fn wrapping(bus: EventBus, inner: N) -> Self {
        Self { bus, inner }
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }
}

#[async_trait]
impl<S, N> EventNotifier<S> for BusNotifier<N>
where
    S: Send + Sync + 'static,
    N: EventNotifier<S>,
{
    async fn on_turn_start(
        &self,
        ctx: &TurnContext<S>,
        cancel: &CancellationToken,
    ) -> Result<(), BoxError> {
        self.inner.on_turn_start(ctx, cancel).await?;
        self.bus.emit(BattleEvent::TurnStarted {
            session_id: ctx.session_id(),
            turn: ctx.turn(),
        });
        Ok(())
    }

    async fn on_turn_end(
        &self,
        ctx: &TurnContext<S>,
        cancel: &CancellationToken,
    ) -> Result<(), BoxError> {
        self.inner.on_turn_end(ctx, cancel).await?;
        self.bus.emit(BattleEvent::TurnEnded {
            session_id: ctx.session_id(),
            turn: ctx.turn(),
        });
        Ok(())
    }
}
