//! Recording test doubles shared by the integration tests.
#![allow(dead_code)]

use std::borrow::Cow;
use std::sync::Arc;

use async_trait::async_trait;
use battle_core::{BattleResult, BoxError, Outcome, TurnContext};
use orchestrator::{
    action_stream, Action, ActionStream, BattleOrchestrator, EventNotifier, OutcomeEvaluator,
    TurnOrderProvider,
};
use parking_lot::Mutex;
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

/// Battle subject; its name prefixes every journal entry.
pub struct Arena {
    pub name: &'static str,
}

pub fn arena(name: &'static str) -> Arc<Arena> {
    Arc::new(Arena { name })
}

pub fn win() -> Outcome {
    Outcome::decided(BattleResult::Win)
}

/// Ordered log of every collaborator call, e.g. `A:check:1`.
#[derive(Default)]
pub struct Journal {
    entries: Mutex<Vec<String>>,
}

impl Journal {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn record(&self, entry: impl Into<String>) {
        self.entries.lock().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.entries.lock().clone()
    }

    pub fn contains(&self, entry: &str) -> bool {
        self.entries.lock().iter().any(|e| e == entry)
    }

    /// Entries recorded for one subject.
    pub fn of(&self, name: &str) -> Vec<String> {
        let prefix = format!("{}:", name);
        self.entries
            .lock()
            .iter()
            .filter(|e| e.starts_with(&prefix))
            .cloned()
            .collect()
    }
}

/// Lets a test park an action mid-turn and resume it later.
#[derive(Clone, Default)]
pub struct Gate {
    pub entered: Arc<Notify>,
    pub release: Arc<Notify>,
}

impl Gate {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Action that journals `entry` once it has run.
pub struct Step {
    journal: Arc<Journal>,
    entry: String,
    gate: Option<Gate>,
    until_cancelled: bool,
    cancels: Option<CancellationToken>,
    fails: bool,
}

impl Step {
    pub fn new(journal: &Arc<Journal>, entry: impl Into<String>) -> Self {
        Self {
            journal: Arc::clone(journal),
            entry: entry.into(),
            gate: None,
            until_cancelled: false,
            cancels: None,
            fails: false,
        }
    }

    /// Signal `gate.entered`, then wait for `gate.release`.
    pub fn gated(mut self, gate: &Gate) -> Self {
        self.gate = Some(gate.clone());
        self
    }

    /// Wait for the session's cancellation token instead of the gate release.
    pub fn until_cancelled(mut self) -> Self {
        self.until_cancelled = true;
        self
    }

    /// Cancel `token` while running, as an outside caller would.
    pub fn cancelling(mut self, token: &CancellationToken) -> Self {
        self.cancels = Some(token.clone());
        self
    }

    pub fn failing(mut self) -> Self {
        self.fails = true;
        self
    }

    pub fn boxed(self) -> Box<dyn Action> {
        Box::new(self)
    }
}

#[async_trait]
impl Action for Step {
    async fn execute(&self, cancel: &CancellationToken) -> Result<(), BoxError> {
        if let Some(gate) = &self.gate {
            gate.entered.notify_one();
            if !self.until_cancelled {
                gate.release.notified().await;
            }
        }
        if self.until_cancelled {
            cancel.cancelled().await;
        }

        if let Some(token) = &self.cancels {
            token.cancel();
        }

        self.journal.record(self.entry.clone());
        if self.fails {
            return Err(format!("{} exploded", self.entry).into());
        }
        Ok(())
    }

    fn label(&self) -> Cow<'_, str> {
        Cow::Borrowed(&self.entry)
    }
}

type OrderScript = dyn Fn(&TurnContext<Arena>) -> Result<Vec<Box<dyn Action>>, BoxError> + Send + Sync;

/// Turn order produced by a closure; journals `<name>:order:<turn>`.
pub struct ScriptedOrder {
    journal: Arc<Journal>,
    script: Box<OrderScript>,
}

impl ScriptedOrder {
    pub fn new<F>(journal: &Arc<Journal>, script: F) -> Self
    where
        F: Fn(&TurnContext<Arena>) -> Result<Vec<Box<dyn Action>>, BoxError> + Send + Sync + 'static,
    {
        Self {
            journal: Arc::clone(journal),
            script: Box::new(script),
        }
    }
}

#[async_trait]
impl TurnOrderProvider<Arena> for ScriptedOrder {
    async fn turn_order(
        &self,
        ctx: &TurnContext<Arena>,
        _cancel: &CancellationToken,
    ) -> Result<ActionStream, BoxError> {
        self.journal
            .record(format!("{}:order:{}", ctx.subject().name, ctx.turn()));
        let actions = (self.script)(ctx)?;
        Ok(action_stream(actions))
    }
}

type OutcomeScript = dyn Fn(&TurnContext<Arena>) -> Result<Option<Outcome>, BoxError> + Send + Sync;

/// Outcome decided by a closure; journals `<name>:check:<turn>` first.
pub struct ScriptedEvaluator {
    journal: Arc<Journal>,
    script: Box<OutcomeScript>,
}

impl ScriptedEvaluator {
    pub fn new<F>(journal: &Arc<Journal>, script: F) -> Self
    where
        F: Fn(&TurnContext<Arena>) -> Result<Option<Outcome>, BoxError> + Send + Sync + 'static,
    {
        Self {
            journal: Arc::clone(journal),
            script: Box::new(script),
        }
    }
}

#[async_trait]
impl OutcomeEvaluator<Arena, BattleResult> for ScriptedEvaluator {
    async fn check_outcome(
        &self,
        ctx: &TurnContext<Arena>,
        _cancel: &CancellationToken,
    ) -> Result<Option<Outcome>, BoxError> {
        self.journal
            .record(format!("{}:check:{}", ctx.subject().name, ctx.turn()));
        (self.script)(ctx)
    }
}

/// Journals `<name>:start:<turn>` / `<name>:end:<turn>`, failing on request.
pub struct RecordingNotifier {
    journal: Arc<Journal>,
    fail_start_on: Option<u32>,
    fail_end_on: Option<u32>,
}

impl RecordingNotifier {
    pub fn new(journal: &Arc<Journal>) -> Self {
        Self {
            journal: Arc::clone(journal),
            fail_start_on: None,
            fail_end_on: None,
        }
    }

    pub fn failing_start_on(mut self, turn: u32) -> Self {
        self.fail_start_on = Some(turn);
        self
    }

    pub fn failing_end_on(mut self, turn: u32) -> Self {
        self.fail_end_on = Some(turn);
        self
    }
}

#[async_trait]
impl EventNotifier<Arena> for RecordingNotifier {
    async fn on_turn_start(
        &self,
        ctx: &TurnContext<Arena>,
        _cancel: &CancellationToken,
    ) -> Result<(), BoxError> {
        self.journal
            .record(format!("{}:start:{}", ctx.subject().name, ctx.turn()));
        if self.fail_start_on == Some(ctx.turn()) {
            return Err("start hook refused".into());
        }
        Ok(())
    }

    async fn on_turn_end(
        &self,
        ctx: &TurnContext<Arena>,
        _cancel: &CancellationToken,
    ) -> Result<(), BoxError> {
        self.journal
            .record(format!("{}:end:{}", ctx.subject().name, ctx.turn()));
        if self.fail_end_on == Some(ctx.turn()) {
            return Err("end hook refused".into());
        }
        Ok(())
    }
}

pub fn orchestrator(
    order: ScriptedOrder,
    evaluator: ScriptedEvaluator,
    notifier: RecordingNotifier,
) -> BattleOrchestrator<Arena> {
    BattleOrchestrator::new(order, evaluator, notifier)
}
