//! Shared application state.

use std::sync::Arc;

use userbase_core::storage::Result;

use crate::storage::{Adapter, AdapterRegistry, SelectionSignal};

/// Shared application state.
///
/// Cloned for each request handler. Handlers reach the database through the
/// registry, which resolves the adapter on first use.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<AdapterRegistry>,
    pub selection: Arc<SelectionSignal>,
}

impl AppState {
    pub fn new(registry: Arc<AdapterRegistry>, selection: SelectionSignal) -> Self {
        Self {
            registry,
            selection: Arc::new(selection),
        }
    }

    /// The adapter, constructing and bootstrapping it if this is the first use.
    pub async fn database(&self) -> Result<Arc<Adapter>> {
        self.registry.get_adapter(&self.selection).await
    }

    /// The adapter if it has already been resolved. Never constructs one.
    pub fn resolved_database(&self) -> Result<Arc<Adapter>> {
        self.registry.current()
    }
}
