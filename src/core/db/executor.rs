//! Query Executor Module
//!
//! Schema introspection and query execution on top of one owned [`Session`].

use super::query::{CommandResult, QueryOutcome, ResultSet, StatementType};
use super::Session;
use crate::core::{Result, ViewerError};
use tracing::{debug, info};

/// Query execution service that owns a database session
#[derive(Debug)]
pub struct Executor<S: Session> {
    session: S,
    /// Database selected by the last successful `use_database`
    current_database: Option<String>,
}

impl<S: Session> Executor<S> {
    /// Creates a new Executor that takes ownership of `session`
    pub fn new(session: S) -> Self {
        Executor {
            session,
            current_database: None,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.session.is_connected()
    }

    pub fn current_database(&self) -> Option<&str> {
        self.current_database.as_deref()
    }

    pub fn session(&self) -> &S {
        &self.session
    }

    pub fn close(&mut self) {
        self.session.close();
        self.current_database = None;
    }

    fn ensure_connected(&self) -> Result<()> {
        if self.session.is_connected() {
            Ok(())
        } else {
            Err(ViewerError::Connection(
                "Not connected to a database server".to_string(),
            ))
        }
    }

    /// Lists the user databases on the server, leaving out the system ones.
    ///
    /// # Errors
    ///
    /// Returns `ViewerError::Connection` if the session is not connected.
    pub fn list_databases(&mut self) -> Result<Vec<String>> {
        self.ensure_connected()?;
        let dialect = self.session.dialect();
        let catalog = dialect.list_databases();
        let names = self
            .session
            .query(&catalog.sql, &catalog.param_refs())?
            .first_column();
        let system = dialect.system_databases();
        Ok(names
            .into_iter()
            .filter(|name| !system.iter().any(|s| s.eq_ignore_ascii_case(name)))
            .collect())
    }

    /// Makes `database` the context for later statements.
    ///
    /// # Errors
    ///
    /// Returns `ViewerError::Query` if no database with that name exists.
    pub fn use_database(&mut self, database: &str) -> Result<()> {
        self.ensure_connected()?;
        let dialect = self.session.dialect();

        let exists = dialect.database_exists(database);
        if self
            .session
            .query(&exists.sql, &exists.param_refs())?
            .is_empty()
        {
            return Err(ViewerError::Query(format!(
                "Database '{}' does not exist or is not accessible",
                database
            )));
        }

        if let Some(use_sql) = dialect.use_database(database) {
            self.session.batch(&use_sql)?;
        }
        self.current_database = Some(database.to_string());
        info!(database, "switched database context");
        Ok(())
    }

    /// Switches to `database` and lists its base tables.
    ///
    /// The switch happens first and stands even if the listing then fails,
    /// so `current_database` always names the session's actual context.
    pub fn list_tables(&mut self, database: &str) -> Result<Vec<String>> {
        self.use_database(database)?;
        let tables = self.session.dialect().list_tables(Some(database));
        Ok(self
            .session
            .query(&tables.sql, &tables.param_refs())?
            .first_column())
    }

    /// Lists the columns of `table` in the current database.
    ///
    /// # Errors
    ///
    /// Returns `ViewerError::Query` if the table does not exist.
    pub fn list_columns(&mut self, table: &str) -> Result<Vec<String>> {
        self.ensure_connected()?;
        let catalog = self
            .session
            .dialect()
            .list_columns(table, self.current_database.as_deref());
        let columns = self
            .session
            .query(&catalog.sql, &catalog.param_refs())?
            .first_column();
        if columns.is_empty() {
            return Err(ViewerError::Query(format!(
                "Invalid object name '{}'",
                table
            )));
        }
        Ok(columns)
    }

    /// Reads every row of `table`. There is no row limit.
    pub fn fetch_all(&mut self, table: &str) -> Result<ResultSet> {
        // Confirms the name through a bound lookup before it is quoted into SQL
        self.list_columns(table)?;
        let sql = self
            .session
            .dialect()
            .select_all(table, self.current_database.as_deref());
        let result = self.session.query(&sql, &[])?;
        debug!(table, rows = result.row_count(), "fetched table");
        Ok(result)
    }

    /// Runs user-typed SQL.
    ///
    /// Text starting with `select` returns its rows and is never committed.
    /// Anything else is executed and committed once. The text reaches the
    /// server unmodified: whoever can type here can run any statement their
    /// login permits.
    pub fn run_query(&mut self, text: &str) -> Result<QueryOutcome> {
        self.ensure_connected()?;
        if text.trim().is_empty() {
            return Err(ViewerError::Query(
                "Cannot execute empty SQL query - please provide a valid SQL statement".to_string(),
            ));
        }

        match StatementType::classify(text) {
            StatementType::Select => {
                let result = self.session.query(text, &[])?;
                info!(rows = result.row_count(), columns = result.column_count(), "query returned rows");
                Ok(QueryOutcome::Rows(result))
            }
            StatementType::Command => {
                let rows_affected = self.session.execute(text)?;
                self.session.commit()?;
                info!(rows_affected, "statement committed");
                Ok(QueryOutcome::Command(CommandResult {
                    rows_affected,
                    success: true,
                }))
            }
        }
    }
}
