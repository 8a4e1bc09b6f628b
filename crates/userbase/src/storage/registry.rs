//! Process-wide adapter registry.
//!
//! Holds at most one [`Adapter`]. The first caller of
//! [`AdapterRegistry::get_adapter`] decides which engine is built; everyone
//! after that gets the same instance and their selection signal is ignored.
//! Construction runs under a `tokio::sync::OnceCell`, so concurrent first
//! callers wait for a single construction instead of racing.

use std::sync::{Arc, LazyLock};

use async_trait::async_trait;
use tokio::sync::OnceCell;
use userbase_core::storage::{Result, StorageError};

use super::adapter::Adapter;
use super::selection::SelectionSignal;

/// Builds an adapter for a selection signal.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self, signal: &SelectionSignal) -> Result<Adapter>;
}

/// Connects with [`Adapter::connect`].
pub struct DefaultConnector;

#[async_trait]
impl Connector for DefaultConnector {
    async fn connect(&self, signal: &SelectionSignal) -> Result<Adapter> {
        Adapter::connect(signal).await
    }
}

static GLOBAL: LazyLock<Arc<AdapterRegistry>> = LazyLock::new(|| Arc::new(AdapterRegistry::new()));

pub struct AdapterRegistry {
    slot: OnceCell<Arc<Adapter>>,
    connector: Box<dyn Connector>,
}

impl Default for AdapterRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl AdapterRegistry {
    pub fn new() -> Self {
        Self::with_connector(DefaultConnector)
    }

    pub fn with_connector(connector: impl Connector + 'static) -> Self {
        Self {
            slot: OnceCell::new(),
            connector: Box::new(connector),
        }
    }

    /// The registry shared by the whole process.
    pub fn global() -> Arc<Self> {
        GLOBAL.clone()
    }

    /// Return the adapter, building it from `signal` if none exists yet.
    ///
    /// A failed construction leaves the slot empty; the next call tries again.
    pub async fn get_adapter(&self, signal: &SelectionSignal) -> Result<Arc<Adapter>> {
        self.slot
            .get_or_try_init(|| async {
                tracing::debug!(runtime = ?signal.runtime, "Resolving storage adapter");
                self.connector.connect(signal).await.map(Arc::new)
            })
            .await
            .cloned()
    }

    /// The adapter if one has been resolved.
    pub fn current(&self) -> Result<Arc<Adapter>> {
        self.slot.get().cloned().ok_or(StorageError::Uninitialized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::adapter::IN_MEMORY_PATH;
    use crate::storage::d1::fake::FakeD1;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::task::JoinSet;
    use userbase_core::storage::{AdapterKind, ExecutionErrorKind};

    /// Counts constructions and delays each one so callers overlap.
    struct CountingConnector {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl Connector for CountingConnector {
        async fn connect(&self, signal: &SelectionSignal) -> Result<Adapter> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            Adapter::connect(signal).await
        }
    }

    fn memory() -> SelectionSignal {
        SelectionSignal::embedded(IN_MEMORY_PATH)
    }

    #[tokio::test]
    async fn test_current_before_resolution_is_uninitialized() {
        let registry = AdapterRegistry::new();

        assert!(matches!(registry.current(), Err(StorageError::Uninitialized)));
    }

    #[tokio::test]
    async fn test_get_adapter_returns_same_instance() {
        let registry = AdapterRegistry::new();

        let first = registry.get_adapter(&memory()).await.unwrap();
        let second = registry.get_adapter(&memory()).await.unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert!(Arc::ptr_eq(&first, &registry.current().unwrap()));
    }

    #[tokio::test]
    async fn test_signal_is_ignored_after_first_resolution() {
        let fake = FakeD1::start().await;
        let registry = AdapterRegistry::new();

        let first = registry.get_adapter(&memory()).await.unwrap();
        let second = registry
            .get_adapter(&SelectionSignal::remote(fake.config()))
            .await
            .unwrap();

        assert_eq!(second.kind(), AdapterKind::Embedded);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(fake.request_count(), 0);
    }

    #[tokio::test]
    async fn test_remote_signal_selects_d1() {
        let fake = FakeD1::start().await;
        let registry = AdapterRegistry::new();

        let adapter = registry
            .get_adapter(&SelectionSignal::remote(fake.config()))
            .await
            .unwrap();

        assert_eq!(adapter.kind(), AdapterKind::Remote);
        // One CREATE TABLE per registered schema.
        assert_eq!(fake.request_count(), 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_first_calls_construct_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let registry = Arc::new(AdapterRegistry::with_connector(CountingConnector {
            calls: calls.clone(),
        }));

        let mut tasks = JoinSet::new();
        for _ in 0..16 {
            let registry = registry.clone();
            tasks.spawn(async move { registry.get_adapter(&memory()).await.unwrap() });
        }

        let mut adapters = Vec::new();
        while let Some(result) = tasks.join_next().await {
            adapters.push(result.unwrap());
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(adapters.iter().all(|a| Arc::ptr_eq(a, &adapters[0])));
    }

    #[tokio::test]
    async fn test_failed_construction_leaves_slot_empty() {
        let registry = AdapterRegistry::new();
        let unreachable = SelectionSignal::remote(crate::storage::d1::D1Config {
            account_id: "acct".to_string(),
            database_id: "db".to_string(),
            api_token: "token".to_string(),
            api_url: "http://127.0.0.1:9".to_string(),
        });

        let err = registry.get_adapter(&unreachable).await.unwrap_err();
        assert!(matches!(err, StorageError::Bootstrap { table: "users", .. }));
        assert_eq!(err.execution_kind(), Some(ExecutionErrorKind::Connection));
        assert!(registry.current().is_err());

        let adapter = registry.get_adapter(&memory()).await.unwrap();
        assert_eq!(adapter.kind(), AdapterKind::Embedded);
    }

    #[test]
    fn test_global_is_shared() {
        assert!(Arc::ptr_eq(
            &AdapterRegistry::global(),
            &AdapterRegistry::global()
        ));
    }
}
