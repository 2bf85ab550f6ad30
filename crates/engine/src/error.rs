//! The module contains the error the engine can throw.
//!
//! The errors are:
//!
//! - [`Storage`] thrown when the backing file cannot be read or written.
//! - [`Malformed`] thrown when the backing file is not a valid list of expenses.
//! - [`Serialize`] thrown when the collection cannot be encoded.
//!
//!  [`Storage`]: EngineError::Storage
//!  [`Malformed`]: EngineError::Malformed
//!  [`Serialize`]: EngineError::Serialize
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("storage error: {0}")]
    Storage(#[from] std::io::Error),
    #[error("malformed expenses file: {0}")]
    Malformed(serde_json::Error),
    #[error("cannot encode expenses: {0}")]
    Serialize(serde_json::Error),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Storage(a), Self::Storage(b)) => a.kind() == b.kind(),
            (Self::Malformed(a), Self::Malformed(b)) => a.to_string() == b.to_string(),
            (Self::Serialize(a), Self::Serialize(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
