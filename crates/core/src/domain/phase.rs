use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Where a battle session currently is within its turn loop.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, Hash)]
#[serde(rename_all = "snake_case")]
pub enum BattlePhase {
    /// No session running.
    #[default]
    Idle,
    /// Turn-started hook in flight.
    TurnStarting,
    /// Evaluating whether the battle has been decided.
    AwaitingOutcome,
    /// Executing the actions yielded for this turn.
    RunningActions,
    /// Turn-ended hook in flight.
    TurnEnding,
    /// Session finished; an outcome has been produced or synthesized.
    Terminal,
}

impl BattlePhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::TurnStarting => "turn_starting",
            Self::AwaitingOutcome => "awaiting_outcome",
            Self::RunningActions => "running_actions",
            Self::TurnEnding => "turn_ending",
            Self::Terminal => "terminal",
        }
    }

    pub fn parse(s: &str) -> Result<Self, CoreError> {
        match s {
            "idle" => Ok(Self::Idle),
            "turn_starting" => Ok(Self::TurnStarting),
            "awaiting_outcome" => Ok(Self::AwaitingOutcome),
            "running_actions" => Ok(Self::RunningActions),
            "turn_ending" => Ok(Self::TurnEnding),
            "terminal" => Ok(Self::Terminal),
            other => Err(CoreError::InvalidPhase(other.to_string())),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Terminal)
    }
}

impl std::fmt::Display for BattlePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
