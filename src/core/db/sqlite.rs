/// SQLite Session Module
///
/// A [`Session`] over a local SQLite file (or `:memory:`), used for local
/// databases and as the fixture backend in tests.

use super::dialect::Dialect;
use super::query::ResultSet;
use super::Session;
use crate::core::{Result, ViewerError};
use rusqlite::{params_from_iter, types::ValueRef, Connection};
use tracing::{debug, info};

#[derive(Debug)]
pub struct SqliteSession {
    /// Active database connection (None once closed)
    connection: Option<Connection>,
    /// Path to the database file (None for in-memory databases)
    path: Option<String>,
}

impl SqliteSession {
    /// Opens a SQLite database at the specified path
    ///
    /// # Arguments
    ///
    /// * `db_path` - Path to the SQLite database file, or ":memory:" for in-memory database
    ///
    /// # Returns
    ///
    /// The open session, or `ViewerError::Connection` when the file cannot be opened.
    pub fn open(db_path: &str) -> Result<Self> {
        let conn = Connection::open(db_path)
            .map_err(|e| ViewerError::Connection(format!("Failed to open '{}': {}", db_path, e)))?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        info!(path = db_path, "opened sqlite database");

        Ok(SqliteSession {
            connection: Some(conn),
            path: if db_path != ":memory:" {
                Some(db_path.to_string())
            } else {
                None
            },
        })
    }

    /// Wraps an already open connection.
    pub fn from_connection(connection: Connection) -> Self {
        SqliteSession {
            connection: Some(connection),
            path: None,
        }
    }

    /// Gets the database path (if any)
    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    fn conn(&self) -> Result<&Connection> {
        self.connection
            .as_ref()
            .ok_or_else(|| ViewerError::Connection("Session is not connected".to_string()))
    }
}

impl Session for SqliteSession {
    fn dialect(&self) -> Dialect {
        Dialect::Sqlite
    }

    fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    fn query(&mut self, sql: &str, params: &[&str]) -> Result<ResultSet> {
        let conn = self.conn()?;
        debug!(sql, "sqlite query");
        let mut stmt = conn
            .prepare(sql)
            .map_err(|e| ViewerError::Query(format!("Failed to prepare statement: {}", e)))?;

        let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
        let column_count = stmt.column_count();

        let rows = stmt
            .query_map(params_from_iter(params.iter()), |row| {
                let mut values = Vec::with_capacity(column_count);
                for i in 0..column_count {
                    values.push(format_value(row.get_ref(i)?));
                }
                Ok(values)
            })
            .map_err(|e| ViewerError::Query(format!("Query execution failed: {}", e)))?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| ViewerError::Query(format!("Result processing failed: {}", e)))?;

        Ok(ResultSet::new(columns, rows))
    }

    fn execute(&mut self, sql: &str) -> Result<u64> {
        let conn = self.conn()?;
        debug!(sql, "sqlite execute");
        let mut stmt = conn
            .prepare(sql)
            .map_err(|e| ViewerError::Query(e.to_string()))?;
        if stmt.column_count() == 0 {
            let changed = stmt.execute([]).map_err(|e| ViewerError::Query(e.to_string()))?;
            return Ok(changed as u64);
        }

        // Statements that yield rows (WITH ... SELECT, PRAGMA, RETURNING) are
        // stepped to completion and their rows discarded
        let readonly = stmt.readonly();
        let mut rows = stmt.query([]).map_err(|e| ViewerError::Query(e.to_string()))?;
        while rows
            .next()
            .map_err(|e| ViewerError::Query(e.to_string()))?
            .is_some()
        {}
        drop(rows);
        if readonly {
            return Ok(0);
        }
        let changed: i64 = conn
            .query_row("SELECT changes()", [], |row| row.get(0))
            .map_err(|e| ViewerError::Query(e.to_string()))?;
        Ok(changed as u64)
    }

    fn batch(&mut self, sql: &str) -> Result<()> {
        self.conn()?
            .execute_batch(sql)
            .map_err(|e| ViewerError::Query(e.to_string()))
    }

    fn commit(&mut self) -> Result<()> {
        let conn = self.conn()?;
        // Outside an explicit BEGIN every statement has already been committed
        if !conn.is_autocommit() {
            conn.execute_batch(Dialect::Sqlite.commit())
                .map_err(|e| ViewerError::Query(format!("Commit failed: {}", e)))?;
        }
        Ok(())
    }

    fn close(&mut self) {
        if self.connection.take().is_some() {
            info!(path = ?self.path, "closed sqlite database");
        }
    }
}

/// Formats a SQLite value for display
fn format_value(value: ValueRef) -> String {
    match value {
        ValueRef::Null => "NULL".to_string(),
        ValueRef::Integer(i) => i.to_string(),
        ValueRef::Real(f) => f.to_string(),
        ValueRef::Text(t) => String::from_utf8_lossy(t).to_string(),
        ValueRef::Blob(b) => format!("<BLOB: {} bytes>", b.len()),
    }
}
