//! # Domain Layer - Title Registry
//!
//! Pure business logic: state containers, transition rules and the audit
//! trail. No I/O happens here.
//!
//! ## Components
//!
//! - `roles`: RoleRegistry (identity → role set)
//! - `ledger`: PropertyLedger (property → owner)
//! - `requests`: RequestStore (property → live request)
//! - `audit`: AuditEvent, AuditRecord, AuditLog (hash-chained)
//! - `transitions`: `decide` guards and `evolve` effects
//! - `replay`: rebuild ledger + requests from the audit log
//! - `locks`: per-property mutex table

pub mod audit;
pub mod entities;
pub mod ledger;
pub mod locks;
pub mod replay;
pub mod requests;
pub mod roles;
pub mod transitions;
pub mod validation;


pub use audit::*;
pub use entities::*;
pub use ledger::*;
pub use locks::*;
pub use replay::*;
pub use requests::*;
pub use roles::*;
pub use transitions::*;
pub use validation::*;
