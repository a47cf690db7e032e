//! Error types for the matching library
//!
//! "No duplicates found" is never an error; it is an empty result.

use thiserror::Error;

/// Errors raised by record parsing, the matcher and the inventory store
#[derive(Error, Debug)]
pub enum MatchError {
    /// Input had the wrong shape (e.g. a candidate that is not an object)
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A record id that does not exist in the inventory
    #[error("record not found: {0}")]
    NotFound(String),

    /// Weights or threshold outside the 0-100 scale
    #[error("invalid match policy: {0}")]
    InvalidPolicy(String),
}

pub type Result<T> = std::result::Result<T, MatchError>;
