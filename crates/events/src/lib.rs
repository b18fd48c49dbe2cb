//! Event system for battle sessions
//!
//! This crate provides the broadcast bus and the event types published
//! while a battle runs, so UIs and loggers can follow along without being
//! collaborators of the turn loop.

mod bus;
mod types;

pub use bus::EventBus;
pub use types::*;
