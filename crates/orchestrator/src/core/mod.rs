//! Core abstractions for the battle turn loop.
//!
//! - [`Action`], [`TurnOrderProvider`], [`OutcomeEvaluator`], [`EventNotifier`] -
//!   collaborator contracts the loop calls out to
//! - [`OrderedEventEmitter`] - Event emitter with sequence guarantees

mod collaborators;
mod events;

pub use collaborators::{
    action_stream, Action, ActionStream, EventNotifier, NoopNotifier, OutcomeEvaluator,
    TurnOrderProvider,
};
pub use events::OrderedEventEmitter;
