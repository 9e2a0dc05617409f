/// Database Module
///
/// This module provides the database layer of sqlview, organized into focused
/// submodules.
///
/// ## Architecture
///
/// - **Sessions** (`mssql.rs`, `sqlite.rs`): one open connection each, behind
///   the [`Session`] trait
/// - **Connection** (`connection.rs`): picks and opens the configured backend
/// - **Dialect** (`dialect.rs`): catalog SQL per backend
/// - **Executor** (`executor.rs`): schema introspection and query execution
/// - **Query** (`query.rs`): result types
///
/// ## Ownership
///
/// There is no global connection. A session is opened once, handed to an
/// [`Executor`], and the executor is owned by the application for its whole
/// lifetime.
pub mod connection;
pub mod dialect;
pub mod executor;
pub mod mssql;
pub mod query;
pub mod sqlite;

pub use connection::{open_session, AnySession};
pub use dialect::Dialect;
pub use executor::Executor;
pub use query::{CommandResult, QueryOutcome, ResultSet, StatementType};

use crate::core::Result;

/// One open database session.
///
/// Implementations run every call to completion on the calling thread.
pub trait Session {
    /// SQL flavour spoken by this session
    fn dialect(&self) -> Dialect;

    /// Whether the session can still run statements
    fn is_connected(&self) -> bool;

    /// Runs a row-returning statement, binding `params` to its placeholders
    /// in order.
    fn query(&mut self, sql: &str, params: &[&str]) -> Result<ResultSet>;

    /// Runs a statement that returns no rows and reports the rows affected.
    fn execute(&mut self, sql: &str) -> Result<u64>;

    /// Runs text as a batch, discarding any rows.
    fn batch(&mut self, sql: &str) -> Result<()>;

    /// Commits the open transaction, if there is one.
    fn commit(&mut self) -> Result<()>;

    /// Closes the session. Later calls fail with a connection error.
    fn close(&mut self);
}
