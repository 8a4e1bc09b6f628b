//! Core types for the userbase service.
//!
//! Pure data and pure functions: the storage contract, the schema registry
//! and user validation. No I/O happens in this crate.

pub mod schema;
pub mod storage;
pub mod user;
