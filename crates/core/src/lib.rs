//! Domain values shared by the battle orchestrator and its collaborators.

pub mod domain;
pub mod error;

pub use domain::*;
pub use error::{BoxError, CoreError};
