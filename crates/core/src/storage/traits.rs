use async_trait::async_trait;

use super::{AdapterKind, Expect, ExecutionResult, Result, Statement, Value};

/// A physical SQL engine behind the uniform prepare/bind/execute contract.
///
/// Every call may suspend while the engine performs I/O. Implementations must
/// be safe to share between concurrent callers.
#[async_trait]
pub trait StorageEngine: Send + Sync {
    /// Which engine family this is.
    fn kind(&self) -> AdapterKind;

    /// Parses SQL text for repeated execution without running it.
    ///
    /// Engines that only detect syntax errors at execution time may accept
    /// the text here and report the rejection when it is executed.
    async fn parse(&self, sql: &str) -> Result<Statement>;

    /// Executes a statement with positional parameters, producing the
    /// requested result shape.
    async fn execute(
        &self,
        statement: &Statement,
        params: &[Value],
        expect: Expect,
    ) -> Result<ExecutionResult>;
}
