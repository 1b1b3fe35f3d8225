//! # Core Domain Entities
//!
//! ## Clusters
//!
//! - **Principals**: [`Identity`], [`Role`]
//! - **Property**: [`PropertyId`]
//! - **References**: [`DocumentRef`], [`PaymentRef`]
//! - **Time**: [`Timestamp`]

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::ParseError;

/// Milliseconds since the UNIX epoch. Zero means "not set".
pub type Timestamp = u64;

/// Opaque content-addressed reference to an externally stored document.
pub type DocumentRef = String;

/// Opaque reference to an off-system payment, asserted by a registrar.
pub type PaymentRef = String;

// =============================================================================
// PRINCIPALS
// =============================================================================

/// A pre-authenticated principal.
///
/// Callers arrive with a stable identity; key management happens elsewhere.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identity(String);

impl Identity {
    /// Wraps a principal reference.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Identity {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl FromStr for Identity {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(ParseError::EmptyIdentity);
        }
        Ok(Self::new(trimmed))
    }
}

/// A capability grantable and revocable by an [`Role::Admin`].
///
/// Roles are independent flags: one identity may hold any combination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Assigns and removes roles.
    Admin,
    /// Verifies documents attached to a request.
    Notary,
    /// Confirms off-system payment and finalizes ownership changes.
    Registrar,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Admin, Role::Notary, Role::Registrar];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Notary => "notary",
            Role::Registrar => "registrar",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "notary" => Ok(Role::Notary),
            "registrar" => Ok(Role::Registrar),
            other => Err(ParseError::UnknownRole(other.to_string())),
        }
    }
}

// =============================================================================
// PROPERTY
// =============================================================================

/// Identifier of a registrable property.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct PropertyId(pub u64);

impl fmt::Display for PropertyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for PropertyId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl FromStr for PropertyId {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u64>()
            .map(PropertyId)
            .map_err(|_| ParseError::InvalidPropertyId(s.to_string()))
    }
}
