/// Connection Module
///
/// Opens the backend named in the configuration and hands back a session the
/// rest of the application can use without knowing which one it got.

use super::dialect::Dialect;
use super::mssql::MssqlSession;
use super::query::ResultSet;
use super::sqlite::SqliteSession;
use super::Session;
use crate::config::{Backend, DatabaseConfig};
use crate::core::{Result, ViewerError};
use tracing::info;

/// A session over whichever backend was configured.
#[derive(Debug)]
pub enum AnySession {
    Mssql(MssqlSession),
    Sqlite(SqliteSession),
}

/// Opens a session for `settings`.
///
/// # Returns
///
/// The connected session, `ViewerError::Config` for incomplete settings, or
/// `ViewerError::Connection` when the database cannot be reached.
pub fn open_session(settings: &DatabaseConfig) -> Result<AnySession> {
    info!(backend = ?settings.backend, target = %settings.display_target(), "opening session");
    match settings.backend {
        Backend::Mssql => MssqlSession::connect(settings).map(AnySession::Mssql),
        Backend::Sqlite => {
            let path = settings
                .path
                .as_deref()
                .ok_or_else(|| ViewerError::Config("No SQLite database path configured".to_string()))?;
            SqliteSession::open(path).map(AnySession::Sqlite)
        }
    }
}

impl Session for AnySession {
    fn dialect(&self) -> Dialect {
        match self {
            AnySession::Mssql(s) => s.dialect(),
            AnySession::Sqlite(s) => s.dialect(),
        }
    }

    fn is_connected(&self) -> bool {
        match self {
            AnySession::Mssql(s) => s.is_connected(),
            AnySession::Sqlite(s) => s.is_connected(),
        }
    }

    fn query(&mut self, sql: &str, params: &[&str]) -> Result<ResultSet> {
        match self {
            AnySession::Mssql(s) => s.query(sql, params),
            AnySession::Sqlite(s) => s.query(sql, params),
        }
    }

    fn execute(&mut self, sql: &str) -> Result<u64> {
        match self {
            AnySession::Mssql(s) => s.execute(sql),
            AnySession::Sqlite(s) => s.execute(sql),
        }
    }

    fn batch(&mut self, sql: &str) -> Result<()> {
        match self {
            AnySession::Mssql(s) => s.batch(sql),
            AnySession::Sqlite(s) => s.batch(sql),
        }
    }

    fn commit(&mut self) -> Result<()> {
        match self {
            AnySession::Mssql(s) => s.commit(),
            AnySession::Sqlite(s) => s.commit(),
        }
    }

    fn close(&mut self) {
        match self {
            AnySession::Mssql(s) => s.close(),
            AnySession::Sqlite(s) => s.close(),
        }
    }
}
