//! Session bookkeeping with guaranteed cleanup.
//!
//! - [`SessionSlot`] - The single "current session" pointer
//! - [`SessionGuard`] - Releases the slot on every exit path

mod session_guard;
mod session_slot;

pub use session_guard::SessionGuard;
pub use session_slot::{ActiveSession, SessionSlot};
