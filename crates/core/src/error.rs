use thiserror::Error;

/// Error type returned by collaborator calls.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Turn numbers start at 1, got {0}")]
    InvalidTurn(u32),

    #[error("Invalid battle phase: {0}")]
    InvalidPhase(String),
}
