//! # Deed Registry Test Suite
//!
//! Unified test crate exercising the registry across crate boundaries.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── fixtures.rs          # Engine + identities shared by all suites
//! └── integration/
//!     ├── scenarios.rs     # Registration and transfer walkthroughs
//!     ├── guards.rs        # Rejections leave no trace
//!     ├── concurrency.rs   # Racing callers on one and many properties
//!     └── persistence.rs   # Data directory round trips and replay
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p deed-tests
//!
//! # By category
//! cargo test -p deed-tests integration::concurrency::
//! ```

pub mod fixtures;
pub mod integration;
