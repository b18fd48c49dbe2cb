//! RAII guard for session lifecycle management.
//!
//! The guard releases the orchestrator's session slot when it goes out of
//! scope, whichever way the battle loop exits.

use battle_core::SessionId;
use tracing::{debug, warn};

use super::SessionSlot;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Exit {
    Running,
    Terminal,
    Failed,
}

/// RAII guard for one battle session.
///
/// Dropping the guard always releases the slot. If the session was neither
/// marked terminal nor failed (the `start_battle` future was dropped, or a
/// collaborator panicked) the drop is logged at `warn`.
///
/// # Example
///
/// ```ignore
/// let prior = slot.install(session);
/// let mut guard = SessionGuard::new(&slot, session_id);
/// // ... run turns ...
/// guard.mark_terminal();
/// ```
pub struct SessionGuard<'a> {
    slot: &'a SessionSlot,
    session_id: SessionId,
    exit: Exit,
}

impl<'a> SessionGuard<'a> {
    pub fn new(slot: &'a SessionSlot, session_id: SessionId) -> Self {
        debug!(session_id = %session_id, "Session guard created");
        Self {
            slot,
            session_id,
            exit: Exit::Running,
        }
    }

    /// The loop reached `Terminal` with an outcome.
    pub fn mark_terminal(&mut self) {
        self.exit = Exit::Terminal;
    }

    /// The loop is returning a collaborator error.
    pub fn mark_failed(&mut self) {
        self.exit = Exit::Failed;
    }

    pub fn is_finished(&self) -> bool {
        self.exit != Exit::Running
    }

    pub fn session_id(&self) -> SessionId {
        self.session_id
    }
}

impl Drop for SessionGuard<'_> {
    fn drop(&mut self) {
        let released = self.slot.release(self.session_id);

        if self.exit == Exit::Running {
            warn!(
                session_id = %self.session_id,
                "Session guard dropped before the battle reached a terminal phase"
            );
        } else {
            debug!(
                session_id = %self.session_id,
                released,
                "Session guard released"
            );
        }
    }
}
