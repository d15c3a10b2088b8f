use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GameError {
    #[error("Unknown table: {0}")]
    UnknownTable(String),
    #[error("Invalid table definition: {0}")]
    InvalidTable(String),
    #[error("Insufficient bankroll: need {needed}, have {available}")]
    InsufficientBankroll { needed: u32, available: u32 },
}
