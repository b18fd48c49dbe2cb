use serde::{Deserialize, Serialize};

/// Tuning knobs for a [`BattleOrchestrator`](crate::BattleOrchestrator).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrchestratorConfig {
    /// Stop with `Outcome::Aborted` once this many turns complete undecided.
    pub max_turns: Option<u32>,
    /// Publish a `PhaseChanged` event on every loop transition.
    pub emit_phase_events: bool,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            max_turns: None,
            emit_phase_events: true,
        }
    }
}

impl OrchestratorConfig {
    pub fn with_max_turns(mut self, max: u32) -> Self {
        self.max_turns = Some(max);
        self
    }

    pub fn with_phase_events(mut self, emit: bool) -> Self {
        self.emit_phase_events = emit;
        self
    }

    /// Whether `turn` is the last one allowed to run.
    pub(crate) fn is_last_turn(&self, turn: u32) -> bool {
        self.max_turns.is_some_and(|max| turn >= max)
    }
}
