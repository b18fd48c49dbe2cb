mod outcome;
mod phase;
mod session;
mod turn;

pub use outcome::{BattleResult, Outcome};
pub use phase::BattlePhase;
pub use session::SessionId;
pub use turn::TurnContext;
