//! Rule-light collaborators for the demo binary.
//!
//! Battlers act fastest first, each striking the first living foe in roster
//! order. A side loses once every one of its battlers is down.

use std::borrow::Cow;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use battle_core::{BattleResult, BoxError, Outcome, TurnContext};
use orchestrator::{
    action_stream, Action, ActionStream, EventNotifier, OutcomeEvaluator, TurnOrderProvider,
};
use serde_json::json;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::config::{BattlerConfig, Side, SimConfig};

pub struct Battler {
    pub name: String,
    pub side: Side,
    pub speed: u32,
    pub power: u32,
    hp: AtomicU32,
}

impl Battler {
    pub fn hp(&self) -> u32 {
        self.hp.load(Ordering::SeqCst)
    }

    pub fn is_down(&self) -> bool {
        self.hp() == 0
    }

    /// Apply `damage`, returning the remaining hp.
    fn take(&self, damage: u32) -> u32 {
        let before = self
            .hp
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |hp| {
                Some(hp.saturating_sub(damage))
            })
            .unwrap_or_default();
        before.saturating_sub(damage)
    }
}

impl From<&BattlerConfig> for Battler {
    fn from(config: &BattlerConfig) -> Self {
        Self {
            name: config.name.clone(),
            side: config.side,
            speed: config.speed,
            power: config.power,
            hp: AtomicU32::new(config.hp),
        }
    }
}

/// The battle subject: every battler on the field.
pub struct Roster {
    battlers: Vec<Battler>,
}

impl Roster {
    pub fn new(battlers: &[BattlerConfig]) -> Self {
        Self {
            battlers: battlers.iter().map(Battler::from).collect(),
        }
    }

    pub fn battlers(&self) -> &[Battler] {
        &self.battlers
    }

    pub fn side_down(&self, side: Side) -> bool {
        self.battlers
            .iter()
            .filter(|b| b.side == side)
            .all(Battler::is_down)
    }

    fn first_living(&self, side: Side) -> Option<&Battler> {
        self.battlers.iter().find(|b| b.side == side && !b.is_down())
    }

    pub fn summary(&self) -> String {
        self.battlers
            .iter()
            .map(|b| format!("{}={}", b.name, b.hp()))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// One battler's attack on the first living foe.
struct Strike {
    roster: Arc<Roster>,
    attacker: usize,
    pace: Duration,
}

#[async_trait]
impl Action for Strike {
    async fn execute(&self, cancel: &CancellationToken) -> Result<(), BoxError> {
        if !self.pace.is_zero() {
            tokio::select! {
                _ = cancel.cancelled() => return Ok(()),
                _ = tokio::time::sleep(self.pace) => {}
            }
        }

        let attacker = &self.roster.battlers[self.attacker];
        if attacker.is_down() {
            debug!(attacker = %attacker.name, "Knocked out before acting");
            return Ok(());
        }
        let Some(target) = self.roster.first_living(attacker.side.foe()) else {
            return Ok(());
        };

        let left = target.take(attacker.power);
        info!(
            attacker = %attacker.name,
            target = %target.name,
            damage = attacker.power,
            hp = left,
            "Strike"
        );
        Ok(())
    }

    fn label(&self) -> Cow<'_, str> {
        Cow::Owned(format!("{} strikes", self.roster.battlers[self.attacker].name))
    }
}

/// Living battlers act fastest first; ties keep roster order.
pub struct SpeedOrder {
    pace: Duration,
}

impl SpeedOrder {
    pub fn new(config: &SimConfig) -> Self {
        Self {
            pace: Duration::from_millis(config.pace_ms),
        }
    }
}

#[async_trait]
impl TurnOrderProvider<Roster> for SpeedOrder {
    async fn turn_order(
        &self,
        ctx: &TurnContext<Roster>,
        _cancel: &CancellationToken,
    ) -> Result<ActionStream, BoxError> {
        let roster = ctx.subject_arc();
        let mut order: Vec<usize> = (0..roster.battlers.len())
            .filter(|&i| !roster.battlers[i].is_down())
            .collect();
        order.sort_by_key(|&i| std::cmp::Reverse(roster.battlers[i].speed));

        let actions = order
            .into_iter()
            .map(|attacker| {
                Box::new(Strike {
                    roster: Arc::clone(&roster),
                    attacker,
                    pace: self.pace,
                }) as Box<dyn Action>
            })
            .collect();
        Ok(action_stream(actions))
    }
}

/// `Win` when every opponent is down, `Loss` when every player is.
pub struct KnockoutEvaluator;

#[async_trait]
impl OutcomeEvaluator<Roster, BattleResult> for KnockoutEvaluator {
    async fn check_outcome(
        &self,
        ctx: &TurnContext<Roster>,
        _cancel: &CancellationToken,
    ) -> Result<Option<Outcome>, BoxError> {
        let roster = ctx.subject();
        let result = if roster.side_down(Side::Opponent) {
            BattleResult::Win
        } else if roster.side_down(Side::Player) {
            BattleResult::Loss
        } else {
            return Ok(None);
        };

        let survivors: Vec<&str> = roster
            .battlers()
            .iter()
            .filter(|b| !b.is_down())
            .map(|b| b.name.as_str())
            .collect();
        Ok(Some(
            Outcome::decided(result).with_payload(json!({ "survivors": survivors })),
        ))
    }
}

/// Logs each turn boundary with the roster's hp.
pub struct TurnLogger;

#[async_trait]
impl EventNotifier<Roster> for TurnLogger {
    async fn on_turn_start(
        &self,
        ctx: &TurnContext<Roster>,
        _cancel: &CancellationToken,
    ) -> Result<(), BoxError> {
        info!(turn = ctx.turn(), roster = %ctx.subject().summary(), "Turn begins");
        Ok(())
    }

    async fn on_turn_end(
        &self,
        ctx: &TurnContext<Roster>,
        _cancel: &CancellationToken,
    ) -> Result<(), BoxError> {
        debug!(turn = ctx.turn(), roster = %ctx.subject().summary(), "Turn over");
        Ok(())
    }
}
