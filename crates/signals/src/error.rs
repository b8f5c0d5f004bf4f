// In crates/signals/src/error.rs

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Not enough data for {indicator}: have {have}, need {need}")]
    InsufficientData {
        indicator: &'static str,
        have: usize,
        need: usize,
    },

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

pub type Result<T> = std::result::Result<T, Error>;
