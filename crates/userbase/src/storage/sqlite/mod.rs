//! SQLite storage backend implementation.
//!
//! This module provides the embedded adapter using `rusqlite` for synchronous
//! operations and `tokio-rusqlite` for async wrapping.

mod adapter;
mod conversions;
mod error;

pub use adapter::SqliteAdapter;
