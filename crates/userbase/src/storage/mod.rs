//! Storage backends and the process-wide adapter.
//!
//! Concrete engines live in [`sqlite`] (embedded) and [`d1`] (remote). Both
//! implement `userbase_core::storage::StorageEngine`; [`Adapter`] wraps one of
//! them and [`AdapterRegistry`] decides which, once per process.

pub mod adapter;
pub mod bootstrap;
pub mod d1;
pub mod registry;
pub mod selection;
pub mod sqlite;

pub use adapter::Adapter;
pub use registry::AdapterRegistry;
pub use selection::{Runtime, SelectionSignal};
