//! The process-wide storage adapter.
//!
//! [`Adapter`] is a closed set of engines. Callers go through the fluent
//! `prepare -> bind -> first / all / run` chain and never look at which engine
//! sits underneath.

use std::fmt;
use std::path::Path;

use serde::de::DeserializeOwned;
use userbase_core::schema::SCHEMAS;
use userbase_core::storage::{
    AdapterKind, ExecutionErrorKind, ExecutionResult, Expect, MutationOutcome, Result, Row,
    RowSet, Statement, StorageEngine, StorageError, Value,
};

use super::bootstrap;
use super::d1::D1Adapter;
use super::selection::SelectionSignal;
use super::sqlite::SqliteAdapter;

/// Path that opens a private in-memory embedded database.
pub const IN_MEMORY_PATH: &str = ":memory:";

/// One physical storage engine.
pub enum Adapter {
    Embedded(SqliteAdapter),
    Remote(D1Adapter),
}

impl Adapter {
    /// Construct the adapter the signal asks for and bootstrap its schema.
    pub async fn connect(signal: &SelectionSignal) -> Result<Self> {
        let adapter = match signal.remote_handle() {
            Some(config) => {
                let adapter = D1Adapter::new(config);
                tracing::info!(endpoint = %adapter.endpoint(), "Using remote D1 adapter");
                Adapter::Remote(adapter)
            }
            None => {
                let adapter = open_embedded(&signal.sqlite_path).await?;
                tracing::info!(location = %adapter.location(), "Using embedded SQLite adapter");
                Adapter::Embedded(adapter)
            }
        };

        adapter.init().await?;
        Ok(adapter)
    }

    /// Create every registered table.
    pub async fn init(&self) -> Result<()> {
        bootstrap::initialize(self, SCHEMAS).await
    }

    pub fn kind(&self) -> AdapterKind {
        self.engine().kind()
    }

    fn engine(&self) -> &dyn StorageEngine {
        match self {
            Adapter::Embedded(adapter) => adapter,
            Adapter::Remote(adapter) => adapter,
        }
    }

    /// Parse `sql` for later binding. Nothing is executed.
    pub async fn prepare(&self, sql: &str) -> Result<PreparedStatement<'_>> {
        let statement = self.engine().parse(sql).await?;
        Ok(PreparedStatement {
            adapter: self,
            statement,
        })
    }
}

impl fmt::Debug for Adapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Adapter::Embedded(adapter) => f
                .debug_struct("Adapter::Embedded")
                .field("location", &adapter.location())
                .finish(),
            Adapter::Remote(adapter) => f
                .debug_struct("Adapter::Remote")
                .field("endpoint", &adapter.endpoint())
                .finish(),
        }
    }
}

async fn open_embedded(path: &Path) -> Result<SqliteAdapter> {
    if path.as_os_str() == IN_MEMORY_PATH {
        SqliteAdapter::open_in_memory().await
    } else {
        SqliteAdapter::open(path).await
    }
}

/// A parsed statement, reusable with different parameter sets.
#[derive(Clone)]
pub struct PreparedStatement<'a> {
    adapter: &'a Adapter,
    statement: Statement,
}

impl<'a> PreparedStatement<'a> {
    /// Attach positional parameters. Count and type mismatches surface when
    /// the statement executes.
    pub fn bind(&self, params: Vec<Value>) -> BoundStatement<'a> {
        BoundStatement {
            adapter: self.adapter,
            statement: self.statement.clone(),
            params,
        }
    }
}

/// A statement with its parameters, ready to execute.
pub struct BoundStatement<'a> {
    adapter: &'a Adapter,
    statement: Statement,
    params: Vec<Value>,
}

impl BoundStatement<'_> {
    pub async fn execute(&self, expect: Expect) -> Result<ExecutionResult> {
        self.adapter
            .engine()
            .execute(&self.statement, &self.params, expect)
            .await
    }

    /// The first row, or `None` when nothing matches.
    pub async fn first(&self) -> Result<Option<Row>> {
        Ok(self.execute(Expect::First).await?.into_row())
    }

    /// Every matching row. Empty when nothing matches.
    pub async fn all(&self) -> Result<RowSet> {
        Ok(self.execute(Expect::All).await?.into_rows())
    }

    pub async fn run(&self) -> Result<MutationOutcome> {
        self.execute(Expect::Run)
            .await?
            .into_mutation()
            .ok_or_else(|| {
                StorageError::execution(
                    ExecutionErrorKind::Other,
                    "engine returned rows for a mutation",
                )
            })
    }

    /// [`first`](Self::first), projected onto `T`.
    pub async fn first_as<T: DeserializeOwned>(&self) -> Result<Option<T>> {
        self.first()
            .await?
            .map(|row| row.decode().map_err(decode_error))
            .transpose()
    }

    /// [`all`](Self::all), projected onto `T`.
    pub async fn all_as<T: DeserializeOwned>(&self) -> Result<Vec<T>> {
        self.all().await?.decode().map_err(decode_error)
    }
}

fn decode_error(err: serde_json::Error) -> StorageError {
    StorageError::execution(
        ExecutionErrorKind::Other,
        format!("Cannot decode row: {err}"),
    )
}
