//! Remote D1 adapter.
//!
//! Talks to a Cloudflare D1 database through the HTTP query API. Each
//! execution is one request; the service answers with an envelope holding the
//! statement's rows and metadata.

use async_trait::async_trait;

use userbase_core::storage::{
    AdapterKind, Expect, ExecutionErrorKind, ExecutionResult, MutationOutcome, Result, RowSet,
    Statement, StorageEngine, StorageError, Value,
};

use super::error::{is_service_failure, map_message, map_status, map_transport_error};
use super::wire::{Envelope, QueryRequest, QueryResult};

/// Default base URL of the Cloudflare API.
pub const DEFAULT_API_URL: &str = "https://api.cloudflare.com/client/v4";

/// Connection settings for a D1 database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct D1Config {
    pub account_id: String,
    pub database_id: String,
    pub api_token: String,
    /// Base URL of the API (default: [`DEFAULT_API_URL`]).
    pub api_url: String,
}

impl D1Config {
    /// URL of the query endpoint.
    pub fn query_url(&self) -> String {
        format!(
            "{}/accounts/{}/d1/database/{}/query",
            self.api_url.trim_end_matches('/'),
            self.account_id,
            self.database_id
        )
    }
}

/// D1-based adapter.
///
/// `reqwest::Client` pools connections internally and is safe to share, so one
/// adapter serves all concurrent callers.
pub struct D1Adapter {
    client: reqwest::Client,
    endpoint: String,
    api_token: String,
}

impl D1Adapter {
    /// Creates a new adapter for the given database.
    pub fn new(config: &D1Config) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: config.query_url(),
            api_token: config.api_token.clone(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Send one statement and return its result.
    async fn query(&self, sql: &str, params: &[Value]) -> Result<QueryResult> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_token)
            .json(&QueryRequest { sql, params })
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.text().await.map_err(map_transport_error)?;

        let envelope: Envelope = match serde_json::from_str(&body) {
            Ok(envelope) => envelope,
            Err(_) if !status.is_success() => return Err(map_status(status, body)),
            Err(e) => {
                return Err(StorageError::execution(
                    ExecutionErrorKind::Other,
                    format!("Invalid D1 response: {e}"),
                ))
            }
        };

        if !envelope.success || !status.is_success() {
            let err = match envelope.errors.first() {
                Some(first) if !is_service_failure(status) => map_message(&first.message),
                _ => map_status(status, envelope.error_message()),
            };
            tracing::debug!(error = %err, %status, "D1 statement failed");
            return Err(err);
        }

        let result = envelope
            .result
            .and_then(|results| results.into_iter().next())
            .ok_or_else(|| {
                StorageError::execution(
                    ExecutionErrorKind::Other,
                    "D1 response contained no statement result",
                )
            })?;

        if !result.success {
            return Err(StorageError::execution(
                ExecutionErrorKind::Other,
                "D1 reported the statement as unsuccessful",
            ));
        }

        Ok(result)
    }
}

#[async_trait]
impl StorageEngine for D1Adapter {
    fn kind(&self) -> AdapterKind {
        AdapterKind::Remote
    }

    /// D1 has no separate prepare call; parser errors surface on execution.
    async fn parse(&self, sql: &str) -> Result<Statement> {
        Statement::new(sql)
    }

    async fn execute(
        &self,
        statement: &Statement,
        params: &[Value],
        expect: Expect,
    ) -> Result<ExecutionResult> {
        let result = self.query(statement.sql(), params).await?;

        Ok(match expect {
            Expect::First => ExecutionResult::Row(result.results.into_iter().next()),
            Expect::All => ExecutionResult::Rows(RowSet {
                results: result.results,
            }),
            Expect::Run => ExecutionResult::Mutation(MutationOutcome::completed(
                result.meta.last_row_id,
                result.meta.changes.unwrap_or(0),
            )),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::d1::fake::FakeD1;
    use userbase_core::storage::LAST_ROW_ID_SENTINEL;

    async fn adapter_with_table(fake: &FakeD1) -> D1Adapter {
        let adapter = D1Adapter::new(&fake.config());
        let create = adapter
            .parse("CREATE TABLE items (id INTEGER PRIMARY KEY AUTOINCREMENT, name TEXT NOT NULL UNIQUE)")
            .await
            .unwrap();
        adapter.execute(&create, &[], Expect::Run).await.unwrap();
        adapter
    }

    #[test]
    fn test_query_url() {
        let config = D1Config {
            account_id: "acct".to_string(),
            database_id: "db-1".to_string(),
            api_token: "token".to_string(),
            api_url: "https://api.cloudflare.com/client/v4/".to_string(),
        };

        assert_eq!(
            config.query_url(),
            "https://api.cloudflare.com/client/v4/accounts/acct/d1/database/db-1/query"
        );
    }

    #[tokio::test]
    async fn test_parse_does_not_contact_the_server() {
        let fake = FakeD1::start().await;
        let adapter = D1Adapter::new(&fake.config());

        adapter.parse("SELECT 1").await.unwrap();

        assert_eq!(fake.request_count(), 0);
    }

    #[tokio::test]
    async fn test_insert_reports_row_id_and_changes() {
        let fake = FakeD1::start().await;
        let adapter = adapter_with_table(&fake).await;
        let insert = adapter
            .parse("INSERT INTO items (name) VALUES (?)")
            .await
            .unwrap();

        let outcome = adapter
            .execute(&insert, &[Value::from("a")], Expect::Run)
            .await
            .unwrap()
            .into_mutation()
            .unwrap();

        assert!(outcome.success);
        assert_eq!(outcome.meta.last_row_id, 1);
        assert_eq!(outcome.meta.changes, 1);
    }

    #[tokio::test]
    async fn test_null_row_id_becomes_sentinel() {
        let fake = FakeD1::start().await;
        let adapter = adapter_with_table(&fake).await;
        let delete = adapter
            .parse("DELETE FROM items WHERE id = ?")
            .await
            .unwrap();

        let outcome = adapter
            .execute(&delete, &[Value::Integer(99)], Expect::Run)
            .await
            .unwrap()
            .into_mutation()
            .unwrap();

        assert!(outcome.success);
        assert_eq!(outcome.meta.last_row_id, LAST_ROW_ID_SENTINEL);
        assert_eq!(outcome.meta.changes, 0);
    }

    #[tokio::test]
    async fn test_first_and_all_on_empty_table() {
        let fake = FakeD1::start().await;
        let adapter = adapter_with_table(&fake).await;
        let select = adapter.parse("SELECT id, name FROM items").await.unwrap();

        let first = adapter.execute(&select, &[], Expect::First).await.unwrap();
        let all = adapter.execute(&select, &[], Expect::All).await.unwrap();

        assert_eq!(first, ExecutionResult::Row(None));
        assert_eq!(all, ExecutionResult::Rows(RowSet::default()));
    }

    #[tokio::test]
    async fn test_duplicate_insert_is_unique_violation() {
        let fake = FakeD1::start().await;
        let adapter = adapter_with_table(&fake).await;
        let insert = adapter
            .parse("INSERT INTO items (name) VALUES (?)")
            .await
            .unwrap();
        adapter
            .execute(&insert, &[Value::from("dup")], Expect::Run)
            .await
            .unwrap();

        let err = adapter
            .execute(&insert, &[Value::from("dup")], Expect::Run)
            .await
            .unwrap_err();

        assert!(err.is_unique_violation());
    }

    #[tokio::test]
    async fn test_syntax_error_surfaces_on_execution_as_statement_error() {
        let fake = FakeD1::start().await;
        let adapter = D1Adapter::new(&fake.config());
        let statement = adapter.parse("SELEC nothing").await.unwrap();

        let err = adapter
            .execute(&statement, &[], Expect::All)
            .await
            .unwrap_err();

        assert!(matches!(err, StorageError::Statement(_)));
    }

    #[tokio::test]
    async fn test_bad_token_is_connection_failure() {
        let fake = FakeD1::start().await;
        let mut config = fake.config();
        config.api_token = "wrong".to_string();
        let adapter = D1Adapter::new(&config);
        let statement = adapter.parse("SELECT 1").await.unwrap();

        let err = adapter
            .execute(&statement, &[], Expect::First)
            .await
            .unwrap_err();

        assert_eq!(err.execution_kind(), Some(ExecutionErrorKind::Connection));
    }

    #[tokio::test]
    async fn test_unreachable_server_is_connection_failure() {
        let config = D1Config {
            account_id: "acct".to_string(),
            database_id: "db".to_string(),
            api_token: "token".to_string(),
            api_url: "http://127.0.0.1:9".to_string(),
        };
        let adapter = D1Adapter::new(&config);
        let statement = adapter.parse("SELECT 1").await.unwrap();

        let err = adapter
            .execute(&statement, &[], Expect::First)
            .await
            .unwrap_err();

        assert_eq!(err.execution_kind(), Some(ExecutionErrorKind::Connection));
    }
}
