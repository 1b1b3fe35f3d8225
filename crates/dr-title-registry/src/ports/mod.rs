//! Ports layer for the title registry.
//!
//! - Inbound (Driving) port: the registry API offered to callers
//! - Outbound (Driven) ports: audit persistence and time

pub mod inbound;
pub mod outbound;

pub use inbound::*;
pub use outbound::*;
