//! Collaborator traits the turn loop calls out to.
//!
//! The orchestrator owns no battle rules. Turn order, outcome evaluation and
//! lifecycle notifications are supplied through these traits; every call gets
//! the session's cancellation token so long-running work can cooperate.

use std::borrow::Cow;
use std::sync::Arc;

use async_trait::async_trait;
use battle_core::{BoxError, Outcome, TurnContext};
use futures::stream::{self, BoxStream, StreamExt};
use tokio_util::sync::CancellationToken;

/// One-shot, lazily produced sequence of actions for a single turn.
///
/// A failed item is reported as a turn order failure.
pub type ActionStream = BoxStream<'static, Result<Box<dyn Action>, BoxError>>;

/// Build an [`ActionStream`] from actions that are already known.
pub fn action_stream(actions: Vec<Box<dyn Action>>) -> ActionStream {
    stream::iter(actions.into_iter().map(Ok)).boxed()
}

/// A single battler's move within a turn.
#[async_trait]
pub trait Action: Send + Sync {
    /// Run the move. Implementations should check `cancel` if they can take long.
    async fn execute(&self, cancel: &CancellationToken) -> Result<(), BoxError>;

    /// Short name used in logs and events.
    fn label(&self) -> Cow<'_, str> {
        Cow::Borrowed("action")
    }
}

/// Decides who acts, and in what order, for a turn.
#[async_trait]
pub trait TurnOrderProvider<S: Send + Sync + 'static>: Send + Sync {
    async fn turn_order(
        &self,
        ctx: &TurnContext<S>,
        cancel: &CancellationToken,
    ) -> Result<ActionStream, BoxError>;
}

/// Decides whether the battle is over.
///
/// Called at every checkpoint of the loop, so it must not change battle state.
#[async_trait]
pub trait OutcomeEvaluator<S: Send + Sync + 'static, R: Send + 'static>: Send + Sync {
    async fn check_outcome(
        &self,
        ctx: &TurnContext<S>,
        cancel: &CancellationToken,
    ) -> Result<Option<Outcome<R>>, BoxError>;
}

/// Turn lifecycle hooks. Both default to doing nothing.
#[async_trait]
pub trait EventNotifier<S: Send + Sync + 'static>: Send + Sync {
    async fn on_turn_start(
        &self,
        _ctx: &TurnContext<S>,
        _cancel: &CancellationToken,
    ) -> Result<(), BoxError> {
        Ok(())
    }

    async fn on_turn_end(
        &self,
        _ctx: &TurnContext<S>,
        _cancel: &CancellationToken,
    ) -> Result<(), BoxError> {
        Ok(())
    }
}

/// Notifier with no side effects.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotifier;

#[async_trait]
impl<S: Send + Sync + 'static> EventNotifier<S> for NoopNotifier {}

#[async_trait]
impl<T: Action + ?Sized> Action for Arc<T> {
    async fn execute(&self, cancel: &CancellationToken) -> Result<(), BoxError> {
        (**self).execute(cancel).await
    }

    fn label(&self) -> Cow<'_, str> {
        (**self).label()
    }
}

#[async_trait]
impl<S, T> TurnOrderProvider<S> for Arc<T>
where
    S: Send + Sync + 'static,
    T: TurnOrderProvider<S> + ?Sized,
{
    async fn turn_order(
        &self,
        ctx: &TurnContext<S>,
        cancel: &CancellationToken,
    ) -> Result<ActionStream, BoxError> {
        (**self).turn_order(ctx, cancel).await
    }
}

#[async_trait]
impl<S, R, T> OutcomeEvaluator<S, R> for Arc<T>
where
    S: Send + Sync + 'static,
    R: Send + 'static,
    T: OutcomeEvaluator<S, R> + ?Sized,
{
    async fn check_outcome(
        &self,
        ctx: &TurnContext<S>,
        cancel: &CancellationToken,
    ) -> Result<Option<Outcome<R>>, BoxError> {
        (**self).check_outcome(ctx, cancel).await
    }
}

#[async_trait]
impl<S, T> EventNotifier<S> for Arc<T>
where
    S: Send + Sync + 'static,
    T: EventNotifier<S> + ?Sized,
{
    async fn on_turn_start(
        &self,
        ctx: &TurnContext<S>,
        cancel: &CancellationToken,
    ) -> Result<(), BoxError> {
        (**self).on_turn_start(ctx, cancel).await
    }

    async fn on_turn_end(
        &self,
        ctx: &TurnContext<S>,
        cancel: &CancellationToken,
    ) -> Result<(), BoxError> {
        (**self).on_turn_end(ctx, cancel).await
    }
}
