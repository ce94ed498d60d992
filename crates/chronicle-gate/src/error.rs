//! Gate error types

use thiserror::Error;

/// Errors that can occur during gate operations
#[derive(Error, Debug)]
pub enum GateError {
    /// Store error while loading or writing pipeline rows
    #[error("Store error: {0}")]
    Store(String),

    /// Referenced event absent; caller should skip, not retry
    #[error("Event not found: {0}")]
    NotFound(String),
}
