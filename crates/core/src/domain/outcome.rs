use serde::{Deserialize, Serialize};

/// Stock result kinds for battles whose collaborators have no richer type.
///
/// The orchestrator never inspects these; any `R` works as an outcome result.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum BattleResult {
    Win,
    Loss,
    Draw,
    Fled,
}

impl BattleResult {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Win => "win",
            Self::Loss => "loss",
            Self::Draw => "draw",
            Self::Fled => "fled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "win" => Some(Self::Win),
            "loss" => Some(Self::Loss),
            "draw" => Some(Self::Draw),
            "fled" => Some(Self::Fled),
            _ => None,
        }
    }
}

/// Terminal result of a battle session.
///
/// `Decided` carries whatever the outcome evaluator produced. `Aborted` is the
/// one value the orchestrator synthesizes itself, when the loop ends without
/// any evaluator-supplied outcome.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Outcome<R = BattleResult> {
    Decided {
        result: R,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        payload: Option<serde_json::Value>,
    },
    Aborted,
}

impl<R> Outcome<R> {
    pub fn decided(result: R) -> Self {
        Self::Decided {
            result,
            payload: None,
        }
    }

    /// Attach an auxiliary payload. No effect on `Aborted`.
    pub fn with_payload(self, value: serde_json::Value) -> Self {
        match self {
            Self::Decided { result, .. } => Self::Decided {
                result,
                payload: Some(value),
            },
            Self::Aborted => Self::Aborted,
        }
    }

    pub fn is_aborted(&self) -> bool {
        matches!(self, Self::Aborted)
    }

    pub fn result(&self) -> Option<&R> {
        match self {
            Self::Decided { result, .. } => Some(result),
            Self::Aborted => None,
        }
    }

    pub fn payload(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Decided { payload, .. } => payload.as_ref(),
            Self::Aborted => None,
        }
    }

    pub fn into_result(self) -> Option<R> {
        match self {
            Self::Decided { result, .. } => Some(result),
            Self::Aborted => None,
        }
    }
}
