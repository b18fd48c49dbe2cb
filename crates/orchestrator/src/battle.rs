//! The turn loop.

use std::fmt::Debug;
use std::sync::Arc;

use battle_core::{BattlePhase, BattleResult, BoxError, Outcome, SessionId, TurnContext};
use events::{BattleEvent, EventBus, OutcomeSummary};
use futures::StreamExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, trace, warn};

use crate::config::OrchestratorConfig;
use crate::core::{EventNotifier, OrderedEventEmitter, OutcomeEvaluator, TurnOrderProvider};
use crate::error::{BattleError, Result, Stage};
use crate::resources::{ActiveSession, SessionGuard, SessionSlot};
use crate::state_machine::BattleStateMachine;

/// Runs battles one session at a time.
///
/// Starting a battle while another is still running on the same orchestrator
/// cancels the older one; its `start_battle` call then returns
/// [`Outcome::Aborted`] at its next checkpoint unless it already had a result.
pub struct BattleOrchestrator<S, R = BattleResult> {
    turn_order: Arc<dyn TurnOrderProvider<S>>,
    evaluator: Arc<dyn OutcomeEvaluator<S, R>>,
    notifier: Arc<dyn EventNotifier<S>>,
    slot: SessionSlot,
    config: OrchestratorConfig,
    emitter: Option<OrderedEventEmitter>,
}

impl<S, R> BattleOrchestrator<S, R>
where
    S: Send + Sync + 'static,
    R: Debug + Send + 'static,
{
    pub fn new(
        turn_order: impl TurnOrderProvider<S> + 'static,
        evaluator: impl OutcomeEvaluator<S, R> + 'static,
        notifier: impl EventNotifier<S> + 'static,
    ) -> Self {
        Self {
            turn_order: Arc::new(turn_order),
            evaluator: Arc::new(evaluator),
            notifier: Arc::new(notifier),
            slot: SessionSlot::new(),
            config: OrchestratorConfig::default(),
            emitter: None,
        }
    }

    pub fn with_config(mut self, config: OrchestratorConfig) -> Self {
        self.config = config;
        self
    }

    /// Publish session, phase and action events to `bus`.
    pub fn with_event_bus(mut self, bus: EventBus) -> Self {
        self.emitter = Some(OrderedEventEmitter::new(bus));
        self
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    pub fn event_bus(&self) -> Option<&EventBus> {
        self.emitter.as_ref().map(OrderedEventEmitter::bus)
    }

    /// Run a battle against `subject` until an outcome is decided or the
    /// session is cancelled.
    ///
    /// The session is cancelled by `external`, by a later `start_battle` on
    /// this orchestrator, or by [`abort`](Self::abort). Cancelling never
    /// propagates back to `external`. Cancellation is polled at checkpoints,
    /// so the turn start hook of turn 1 runs even when `external` is already
    /// cancelled.
    ///
    /// # Errors
    ///
    /// The first collaborator failure is returned as
    /// [`BattleError::Collaborator`]; the session is released either way.
    #[instrument(skip_all, fields(session_id = tracing::field::Empty))]
    pub async fn start_battle(
        &self,
        subject: Arc<S>,
        external: Option<&CancellationToken>,
    ) -> Result<Outcome<R>> {
        let cancel = external
            .map(CancellationToken::child_token)
            .unwrap_or_default();
        let session = ActiveSession::new(cancel.clone());
        let session_id = session.id;
        tracing::Span::current().record("session_id", tracing::field::display(session_id));

        if let Some(prior) = self.slot.install(session) {
            info!(superseded = %prior, "Superseding running battle");
            self.emit(BattleEvent::SessionSuperseded {
                session_id: prior,
                by: session_id,
            });
        }

        info!("Battle started");
        self.emit(BattleEvent::SessionStarted { session_id });

        let mut guard = SessionGuard::new(&self.slot, session_id);
        let mut run = BattleRun {
            orchestrator: self,
            session_id,
            cancel,
            phase: BattlePhase::Idle,
            ctx: TurnContext::first(subject).with_session(session_id),
        };

        match run.drive().await {
            Ok(outcome) => {
                guard.mark_terminal();
                Ok(outcome)
            }
            Err(e) => {
                guard.mark_failed();
                Err(e)
            }
        }
    }

    /// Cancel the running battle, if any, without starting another.
    pub fn abort(&self) -> bool {
        let aborted = self.slot.cancel_current();
        if aborted {
            info!(session_id = ?self.slot.current(), "Battle abort requested");
        }
        aborted
    }

    pub fn is_running(&self) -> bool {
        self.slot.current().is_some()
    }

    pub fn active_session(&self) -> Option<SessionId> {
        self.slot.current()
    }

    fn emit(&self, event: BattleEvent) {
        if let Some(emitter) = &self.emitter {
            emitter.emit(event);
        }
    }
}

impl<S, R> std::fmt::Debug for BattleOrchestrator<S, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BattleOrchestrator")
            .field("config", &self.config)
            .field("active_session", &self.slot.current())
            .field("emitter", &self.emitter)
            .finish_non_exhaustive()
    }
}

/// How the action sequence of a turn ended.
enum ActionsExit<R> {
    Exhausted,
    Decided(Outcome<R>),
    Cancelled,
}

/// State of one `start_battle` call.
struct BattleRun<'a, S, R> {
    orchestrator: &'a BattleOrchestrator<S, R>,
    session_id: SessionId,
    cancel: CancellationToken,
    phase: BattlePhase,
    ctx: TurnContext<S>,
}

impl<S, R> BattleRun<'_, S, R>
where
    S: Send + Sync + 'static,
    R: Debug + Send + 'static,
{
    async fn drive(&mut self) -> Result<Outcome<R>> {
        loop {
            let turn = self.ctx.turn();
            self.advance(BattlePhase::TurnStarting)?;
            debug!(turn, "Turn started");

            self.orchestrator
                .notifier
                .on_turn_start(&self.ctx, &self.cancel)
                .await
                .map_err(|e| self.fail(Stage::TurnStart, e))?;

            self.advance(BattlePhase::AwaitingOutcome)?;
            if let Some(outcome) = self.checkpoint(None).await? {
                return self.finish(outcome);
            }

            self.advance(BattlePhase::RunningActions)?;
            let latched = match self.run_actions().await? {
                ActionsExit::Cancelled => return self.finish(Outcome::Aborted),
                ActionsExit::Decided(outcome) => Some(outcome),
                ActionsExit::Exhausted => None,
            };

            // The end hook still runs for a turn decided mid-way.
            self.advance(BattlePhase::AwaitingOutcome)?;
            if latched.is_none() {
                if let Some(outcome) = self.checkpoint(None).await? {
                    return self.finish(outcome);
                }
            }

            self.advance(BattlePhase::TurnEnding)?;
            self.orchestrator
                .notifier
                .on_turn_end(&self.ctx, &self.cancel)
                .await
                .map_err(|e| self.fail(Stage::TurnEnd, e))?;

            self.advance(BattlePhase::AwaitingOutcome)?;
            if let Some(outcome) = self.checkpoint(latched).await? {
                return self.finish(outcome);
            }

            if self.orchestrator.config.is_last_turn(turn) {
                warn!(turn, "Turn limit reached without an outcome");
                return self.finish(Outcome::Aborted);
            }

            debug!(turn, "Turn ended");
            self.ctx = self.ctx.next();
        }
    }

    async fn run_actions(&self) -> Result<ActionsExit<R>> {
        let mut actions = self
            .orchestrator
            .turn_order
            .turn_order(&self.ctx, &self.cancel)
            .await
            .map_err(|e| self.fail(Stage::TurnOrder, e))?;

        // An exhausted sequence falls through to the post-actions checkpoint,
        // so cancellation is only polled once an item is in hand.
        let mut index = 0;
        loop {
            let Some(next) = actions.next().await else {
                break;
            };
            let action = next.map_err(|e| self.fail(Stage::TurnOrder, e))?;
            if self.cancel.is_cancelled() {
                debug!(turn = self.ctx.turn(), index, "Cancelled before action");
                return Ok(ActionsExit::Cancelled);
            }

            let label = action.label().into_owned();
            trace!(turn = self.ctx.turn(), index, action = %label, "Executing action");
            action
                .execute(&self.cancel)
                .await
                .map_err(|e| self.fail(Stage::Action, e))?;
            self.orchestrator.emit(BattleEvent::ActionExecuted {
                session_id: self.session_id,
                turn: self.ctx.turn(),
                index,
                label,
            });

            if let Some(outcome) = self.evaluate().await? {
                return Ok(ActionsExit::Decided(outcome));
            }
            index += 1;
        }

        Ok(ActionsExit::Exhausted)
    }

    /// Evaluate the outcome, then fall back to `latched`, then to cancellation.
    async fn checkpoint(&self, latched: Option<Outcome<R>>) -> Result<Option<Outcome<R>>> {
        if let Some(outcome) = self.evaluate().await? {
            return Ok(Some(outcome));
        }
        if latched.is_some() {
            return Ok(latched);
        }
        if self.cancel.is_cancelled() {
            debug!(turn = self.ctx.turn(), "Cancellation observed at checkpoint");
            return Ok(Some(Outcome::Aborted));
        }
        Ok(None)
    }

    async fn evaluate(&self) -> Result<Option<Outcome<R>>> {
        let outcome = self
            .orchestrator
            .evaluator
            .check_outcome(&self.ctx, &self.cancel)
            .await
            .map_err(|e| self.fail(Stage::OutcomeCheck, e))?;
        debug!(turn = self.ctx.turn(), decided = outcome.is_some(), "Outcome checked");
        Ok(outcome)
    }

    fn advance(&mut self, to: BattlePhase) -> Result<()> {
        BattleStateMachine::validate_transition(&self.phase, &to)?;
        trace!(turn = self.ctx.turn(), from = %self.phase, to = %to, "Phase changed");

        if self.orchestrator.config.emit_phase_events {
            self.orchestrator.emit(BattleEvent::PhaseChanged {
                session_id: self.session_id,
                turn: self.ctx.turn(),
                from: self.phase,
                to,
            });
        }
        self.phase = to;
        Ok(())
    }

    fn finish(&mut self, outcome: Outcome<R>) -> Result<Outcome<R>> {
        self.advance(BattlePhase::Terminal)?;
        let summary = OutcomeSummary::from_outcome(&outcome);
        info!(turns = self.ctx.turn(), outcome = ?summary, "Battle ended");
        self.orchestrator.emit(BattleEvent::SessionEnded {
            session_id: self.session_id,
            turns: self.ctx.turn(),
            outcome: summary,
        });
        Ok(outcome)
    }

    fn fail(&self, stage: Stage, source: BoxError) -> BattleError {
        let err = BattleError::collaborator(stage, self.ctx.turn(), source);
        error!(turn = self.ctx.turn(), %stage, error = %err, "Battle failed");
        self.orchestrator.emit(BattleEvent::SessionFailed {
            session_id: self.session_id,
            turn: self.ctx.turn(),
            error: err.to_string(),
        });
        err
    }
}
