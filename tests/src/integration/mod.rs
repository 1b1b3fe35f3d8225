//! Cross-crate integration suites.

pub mod concurrency;
pub mod persistence;
pub mod scenarios;
