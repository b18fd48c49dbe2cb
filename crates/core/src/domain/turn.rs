use std::sync::Arc;

use super::SessionId;
use crate::error::CoreError;

/// Immutable per-turn view handed to every collaborator call of that turn.
///
/// The subject is owned by the caller of `start_battle`; the context only
/// shares it.
#[derive(Debug)]
pub struct TurnContext<S> {
    subject: Arc<S>,
    turn: u32,
    session: Option<SessionId>,
}

impl<S> TurnContext<S> {
    /// Build a context for a 1-based turn number.
    pub fn try_new(subject: Arc<S>, turn: u32) -> Result<Self, CoreError> {
        if turn == 0 {
            return Err(CoreError::InvalidTurn(turn));
        }
        Ok(Self {
            subject,
            turn,
            session: None,
        })
    }

    /// Context for the first turn of a battle.
    pub fn first(subject: Arc<S>) -> Self {
        Self {
            subject,
            turn: 1,
            session: None,
        }
    }

    /// Tag the context with the session driving it. Carried by `next`.
    pub fn with_session(mut self, session_id: SessionId) -> Self {
        self.session = Some(session_id);
        self
    }

    /// Context for the turn after this one, sharing the same subject.
    pub fn next(&self) -> Self {
        Self {
            subject: Arc::clone(&self.subject),
            turn: self.turn + 1,
            session: self.session,
        }
    }

    pub fn subject(&self) -> &S {
        &self.subject
    }

    /// Shared handle to the subject, for collaborators that outlive the call.
    pub fn subject_arc(&self) -> Arc<S> {
        Arc::clone(&self.subject)
    }

    pub fn turn(&self) -> u32 {
        self.turn
    }

    /// Session this turn belongs to; `None` outside an orchestrated battle.
    pub fn session_id(&self) -> Option<SessionId> {
        self.session
    }
}

impl<S> Clone for TurnContext<S> {
    fn clone(&self) -> Self {
        Self {
            subject: Arc::clone(&self.subject),
            turn: self.turn,
            session: self.session,
        }
    }
}
