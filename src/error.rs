//! Engine errors. Every failure is raised before any state is touched.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("invalid command: {0:?}")]
    InvalidCommand(String),
    #[error("column {0} does not exist in the field")]
    ColumnOutOfRange(String),
    #[error("invalid jewel: {0:?}")]
    InvalidJewel(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

pub type Result<T> = std::result::Result<T, GameError>;
