//! # Error Types
//!
//! Parsing errors for the shared value types.

use thiserror::Error;

/// Errors raised when parsing shared types from text (CLI, config files).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Role name not recognised.
    #[error("Unknown role: {0} (expected admin, notary or registrar)")]
    UnknownRole(String),

    /// Identity string was empty.
    #[error("Identity must not be empty")]
    EmptyIdentity,

    /// Property id was not a valid unsigned integer.
    #[error("Invalid property id: {0}")]
    InvalidPropertyId(String),
}
