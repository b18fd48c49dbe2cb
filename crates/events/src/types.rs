//! Event types for the battle event system

use battle_core::{BattlePhase, Outcome, SessionId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Envelope wrapping all events with metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope {
    /// Unique event ID
    pub id: Uuid,
    /// Position in the emitting orchestrator's stream (0 when unordered)
    pub sequence: u64,
    /// When the event occurred
    pub timestamp: DateTime<Utc>,
    /// The actual event
    pub event: BattleEvent,
}

impl EventEnvelope {
    /// Create a new event envelope with auto-generated ID and timestamp
    pub fn new(event: BattleEvent) -> Self {
        Self {
            id: Uuid::new_v4(),
            sequence: 0,
            timestamp: Utc::now(),
            event,
        }
    }

    pub fn with_sequence(mut self, sequence: u64) -> Self {
        self.sequence = sequence;
        self
    }
}

/// All events published while battles run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum BattleEvent {
    // Session events
    /// A `start_battle` call installed a new session
    #[serde(rename = "session.started")]
    SessionStarted { session_id: SessionId },

    /// A running session was cancelled because a newer one started
    #[serde(rename = "session.superseded")]
    SessionSuperseded { session_id: SessionId, by: SessionId },

    /// The session reached its terminal phase
    #[serde(rename = "session.ended")]
    SessionEnded {
        session_id: SessionId,
        turns: u32,
        outcome: OutcomeSummary,
    },

    /// A collaborator failed and the error propagated to the caller
    #[serde(rename = "session.failed")]
    SessionFailed {
        session_id: SessionId,
        turn: u32,
        error: String,
    },

    // Loop events
    /// The turn loop moved between phases
    #[serde(rename = "phase.changed")]
    PhaseChanged {
        session_id: SessionId,
        turn: u32,
        from: BattlePhase,
        to: BattlePhase,
    },

    /// An action yielded by the turn order finished executing
    #[serde(rename = "action.executed")]
    ActionExecuted {
        session_id: SessionId,
        turn: u32,
        index: usize,
        label: String,
    },

    // Notifier events. Published outside the orchestrator's emitter, so their
    // envelopes carry sequence 0.
    #[serde(rename = "turn.started")]
    TurnStarted {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        session_id: Option<SessionId>,
        turn: u32,
    },

    #[serde(rename = "turn.ended")]
    TurnEnded {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        session_id: Option<SessionId>,
        turn: u32,
    },
}

/// Outcome as rendered for subscribers, independent of the result type
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OutcomeSummary {
    Decided {
        result: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        payload: Option<serde_json::Value>,
    },
    Aborted,
}

impl OutcomeSummary {
    /// Summarize an outcome, rendering its result with `Debug`.
    pub fn from_outcome<R: std::fmt::Debug>(outcome: &Outcome<R>) -> Self {
        match outcome {
            Outcome::Decided { result, payload } => Self::Decided {
                result: format!("{:?}", result),
                payload: payload.clone(),
            },
            Outcome::Aborted => Self::Aborted,
        }
    }
}

impl BattleEvent {
    /// Get the session ID associated with this event, if any
    pub fn session_id(&self) -> Option<SessionId> {
        match self {
            BattleEvent::SessionStarted { session_id } => Some(*session_id),
            BattleEvent::SessionSuperseded { session_id, .. } => Some(*session_id),
            BattleEvent::SessionEnded { session_id, .. } => Some(*session_id),
            BattleEvent::SessionFailed { session_id, .. } => Some(*session_id),
            BattleEvent::PhaseChanged { session_id, .. } => Some(*session_id),
            BattleEvent::ActionExecuted { session_id, .. } => Some(*session_id),
            BattleEvent::TurnStarted { session_id, .. }
            | BattleEvent::TurnEnded { session_id, .. } => *session_id,
        }
    }

    /// Get the turn number this event refers to, if any
    pub fn turn(&self) -> Option<u32> {
        match self {
            BattleEvent::SessionFailed { turn, .. }
            | BattleEvent::PhaseChanged { turn, .. }
            | BattleEvent::ActionExecuted { turn, .. }
            | BattleEvent::TurnStarted { turn, .. }
            | BattleEvent::TurnEnded { turn, .. } => Some(*turn),
            BattleEvent::SessionEnded { turns, .. } => Some(*turns),
            BattleEvent::SessionStarted { .. } | BattleEvent::SessionSuperseded { .. } => None,
        }
    }
}
