//! Schema bootstrap.

use userbase_core::schema::SchemaEntry;
use userbase_core::storage::{Result, StorageError};

use super::adapter::Adapter;

/// Create every table in `schemas`, in slice order.
///
/// The statements use `IF NOT EXISTS`, so running this against a store that
/// already has the tables is a no-op. The first failure stops the sequence.
pub async fn initialize(adapter: &Adapter, schemas: &[SchemaEntry]) -> Result<()> {
    for entry in schemas {
        create_table(adapter, entry).await.map_err(|source| {
            tracing::error!(table = entry.name, error = %source, "Failed to create table");
            StorageError::Bootstrap {
                table: entry.name,
                source: Box::new(source),
            }
        })?;

        tracing::info!(table = entry.name, "Table ready");
    }

    tracing::info!(
        tables = schemas.len(),
        kind = %adapter.kind(),
        "Database initialization complete"
    );
    Ok(())
}

async fn create_table(adapter: &Adapter, entry: &SchemaEntry) -> Result<()> {
    adapter
        .prepare(entry.create_statement)
        .await?
        .bind(Vec::new())
        .run()
        .await
        .map(|_| ())
}
