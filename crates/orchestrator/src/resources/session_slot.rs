//! The orchestrator's "current session" pointer.

use battle_core::SessionId;
use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Bookkeeping for one in-flight `start_battle` call.
#[derive(Debug, Clone)]
pub struct ActiveSession {
    pub id: SessionId,
    pub cancel: CancellationToken,
}

impl ActiveSession {
    pub fn new(cancel: CancellationToken) -> Self {
        Self {
            id: SessionId::new(),
            cancel,
        }
    }
}

/// Holds at most one active session.
///
/// The only write paths are [`install`](Self::install) and
/// [`release`](Self::release); both take the lock, so a caller can never see a
/// new session whose predecessor has not been cancelled yet.
#[derive(Debug, Default)]
pub struct SessionSlot {
    current: Mutex<Option<ActiveSession>>,
}

impl SessionSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `session` current, cancelling and returning the one it replaces.
    pub fn install(&self, session: ActiveSession) -> Option<SessionId> {
        let mut current = self.current.lock();
        let prior = current.take().map(|old| {
            old.cancel.cancel();
            old.id
        });
        debug!(session_id = %session.id, superseded = ?prior, "Session installed");
        *current = Some(session);
        prior
    }

    /// Clear the slot if it still holds `id`. Returns whether anything was cleared.
    pub fn release(&self, id: SessionId) -> bool {
        let mut current = self.current.lock();
        match current.as_ref() {
            Some(active) if active.id == id => {
                *current = None;
                true
            }
            _ => false,
        }
    }

    /// Cancel the current session without replacing it.
    pub fn cancel_current(&self) -> bool {
        match self.current.lock().as_ref() {
            Some(active) => {
                active.cancel.cancel();
                true
            }
            None => false,
        }
    }

    pub fn current(&self) -> Option<SessionId> {
        self.current.lock().as_ref().map(|active| active.id)
    }
}
