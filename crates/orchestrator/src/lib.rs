mod battle;
pub mod config;
pub mod core;
pub mod error;
pub mod notifiers;
pub mod resources;
pub mod state_machine;

pub use battle::BattleOrchestrator;
pub use config::OrchestratorConfig;
pub use core::{
    action_stream, Action, ActionStream, EventNotifier, NoopNotifier, OrderedEventEmitter,
    OutcomeEvaluator, TurnOrderProvider,
};
pub use error::{BattleError, Result, Stage};
pub use notifiers::BusNotifier;
pub use state_machine::BattleStateMachine;
