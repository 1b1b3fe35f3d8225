//! # Shared Types Crate
//!
//! Value types used across the deed registry workspace.
//!
//! ## Design Principles
//!
//! - **Opaque identities**: an [`Identity`] is a pre-authenticated principal
//!   reference. Nothing in the registry inspects its structure.
//! - **Capabilities, not hierarchies**: a [`Role`] is an independent flag.
//!   Holding one role never implies holding another.
//! - **Opaque references**: document and payment references are stored
//!   verbatim and never resolved.

pub mod entities;
pub mod errors;

pub use entities::*;
pub use errors::*;
