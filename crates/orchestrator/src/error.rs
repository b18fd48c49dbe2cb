use battle_core::{BattlePhase, BoxError};
use thiserror::Error;

/// Collaborator call that was in flight when a failure happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    TurnStart,
    OutcomeCheck,
    TurnOrder,
    Action,
    TurnEnd,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TurnStart => "turn start hook",
            Self::OutcomeCheck => "outcome check",
            Self::TurnOrder => "turn order",
            Self::Action => "action",
            Self::TurnEnd => "turn end hook",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum BattleError {
    #[error("{stage} failed on turn {turn}: {source}")]
    Collaborator {
        stage: Stage,
        turn: u32,
        #[source]
        source: BoxError,
    },

    #[error("Invalid battle phase transition from {from} to {to}")]
    InvalidTransition { from: BattlePhase, to: BattlePhase },
}

impl BattleError {
    /// Create a collaborator failure error.
    pub fn collaborator(stage: Stage, turn: u32, source: impl Into<BoxError>) -> Self {
        Self::Collaborator {
            stage,
            turn,
            source: source.into(),
        }
    }

    /// Stage of the failing collaborator call, if this is a collaborator failure.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            Self::Collaborator { stage, .. } => Some(*stage),
            Self::InvalidTransition { .. } => None,
        }
    }

    /// Turn on which the failure happened, if known.
    pub fn turn(&self) -> Option<u32> {
        match self {
            Self::Collaborator { turn, .. } => Some(*turn),
            Self::InvalidTransition { .. } => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, BattleError>;
