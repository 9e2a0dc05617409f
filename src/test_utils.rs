/// # Test Utilities Module
///
/// Testing infrastructure shared by the unit tests.
///
/// This module provides:
/// - An isolated in-memory database fixture with a sample schema
/// - A session wrapper that counts commits and can fail chosen queries
/// - ViewerError-specific assertion helpers

use crate::core::db::query::ResultSet;
use crate::core::db::sqlite::SqliteSession;
use crate::core::db::{Dialect, Session};
use crate::core::{Result, ViewerError};
use rusqlite::Connection;

/// Isolated database test fixture
pub struct DatabaseFixture {
    pub name: String,
    pub connection: Connection,
}

impl DatabaseFixture {
    /// Create a new empty in-memory test database
    pub fn new(name: &str) -> Result<Self> {
        let connection = Connection::open_in_memory()?;
        connection.execute_batch(
            "
            PRAGMA foreign_keys = ON;
            PRAGMA journal_mode = MEMORY;
        ",
        )?;

        Ok(DatabaseFixture {
            name: name.to_string(),
            connection,
        })
    }

    /// Create fixture with sample data schema
    pub fn with_sample_data(name: &str) -> Result<Self> {
        let mut fixture = Self::new(name)?;
        fixture.setup_standard_schema()?;
        fixture.populate_sample_data()?;
        Ok(fixture)
    }

    /// Set up standard test schema
    pub fn setup_standard_schema(&mut self) -> Result<()> {
        self.connection.execute_batch(
            "
            CREATE TABLE users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                username TEXT NOT NULL UNIQUE,
                email TEXT NOT NULL UNIQUE,
                active BOOLEAN DEFAULT TRUE,
                profile_data TEXT
            );

            CREATE TABLE posts (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                title TEXT NOT NULL,
                content TEXT,
                published BOOLEAN DEFAULT FALSE,
                FOREIGN KEY (user_id) REFERENCES users (id) ON DELETE CASCADE
            );

            CREATE TABLE categories (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL UNIQUE,
                description TEXT
            );

            CREATE TABLE post_categories (
                post_id INTEGER NOT NULL,
                category_id INTEGER NOT NULL,
                PRIMARY KEY (post_id, category_id),
                FOREIGN KEY (post_id) REFERENCES posts (id) ON DELETE CASCADE,
                FOREIGN KEY (category_id) REFERENCES categories (id) ON DELETE CASCADE
            );
        ",
        )?;
        Ok(())
    }

    /// Populate with sample data
    pub fn populate_sample_data(&mut self) -> Result<()> {
        let users = vec![
            ("alice", "alice@example.com", r#"{"location": "New York"}"#),
            ("bob", "bob@example.com", r#"{"location": "San Francisco"}"#),
            ("charlie", "charlie@example.com", r#"{"location": "London"}"#),
        ];
        for (username, email, profile) in users {
            self.connection.execute(
                "INSERT INTO users (username, email, profile_data) VALUES (?, ?, ?)",
                [username, email, profile],
            )?;
        }

        let categories = vec![
            ("Technology", "Posts about technology"),
            ("Travel", "Travel experiences"),
            ("Food", "Food and recipes"),
        ];
        for (name, desc) in categories {
            self.connection.execute(
                "INSERT INTO categories (name, description) VALUES (?, ?)",
                [name, desc],
            )?;
        }

        let posts = vec![
            (1, "Welcome to Rust", "Rust is a systems programming language...", true),
            (2, "My Trip to Paris", "Paris was amazing this summer...", false),
            (1, "Building Terminal UIs", "Creating TUIs with Ratatui is fun...", true),
        ];
        for (user_id, title, content, published) in posts {
            self.connection.execute(
                "INSERT INTO posts (user_id, title, content, published) VALUES (?, ?, ?, ?)",
                rusqlite::params![user_id, title, content, published],
            )?;
        }

        Ok(())
    }

    /// Turns the fixture into a session the executor can own
    pub fn into_session(self) -> SqliteSession {
        SqliteSession::from_connection(self.connection)
    }
}

/// Wraps a session and counts how often each entry point is used
#[derive(Debug)]
pub struct CountingSession<S: Session> {
    inner: S,
    commits: usize,
    executes: usize,
    queries: usize,
    /// Queries containing this text fail with a query error
    fail_on: Option<String>,
}

impl<S: Session> CountingSession<S> {
    pub fn new(inner: S) -> Self {
        CountingSession {
            inner,
            commits: 0,
            executes: 0,
            queries: 0,
            fail_on: None,
        }
    }

    /// Makes every query whose SQL contains `pattern` fail.
    pub fn failing_on(mut self, pattern: &str) -> Self {
        self.fail_on = Some(pattern.to_string());
        self
    }

    pub fn commits(&self) -> usize {
        self.commits
    }

    pub fn executes(&self) -> usize {
        self.executes
    }

    pub fn queries(&self) -> usize {
        self.queries
    }
}

impl<S: Session> Session for CountingSession<S> {
    fn dialect(&self) -> Dialect {
        self.inner.dialect()
    }

    fn is_connected(&self) -> bool {
        self.inner.is_connected()
    }

    fn query(&mut self, sql: &str, params: &[&str]) -> Result<ResultSet> {
        self.queries += 1;
        if let Some(pattern) = &self.fail_on {
            if sql.contains(pattern.as_str()) {
                return Err(ViewerError::Query(format!("Injected failure for '{}'", pattern)));
            }
        }
        self.inner.query(sql, params)
    }

    fn execute(&mut self, sql: &str) -> Result<u64> {
        self.executes += 1;
        self.inner.execute(sql)
    }

    fn batch(&mut self, sql: &str) -> Result<()> {
        self.inner.batch(sql)
    }

    fn commit(&mut self) -> Result<()> {
        self.commits += 1;
        self.inner.commit()
    }

    fn close(&mut self) {
        self.inner.close()
    }
}

/// Error testing utilities specific to ViewerError patterns
pub mod error_testing {
    /// Verify error message quality (contains helpful information)
    pub fn verify_error_message_quality<T, E>(result: &std::result::Result<T, E>, context: &str)
    where
        T: std::fmt::Debug,
        E: std::fmt::Display,
    {
        match result {
            Ok(value) => panic!("Expected error but got Ok({:?}) in {}", value, context),
            Err(error) => {
                let error_str = error.to_string();
                assert!(!error_str.is_empty(), "Error message should not be empty in {}", context);
                assert!(error_str.len() > 10, "Error message should be descriptive in {}", context);
                assert!(
                    error_str.to_lowercase().contains("error"),
                    "Error should name its category: '{}' in {}",
                    error_str,
                    context
                );
            }
        }
    }
}

#[macro_export]
macro_rules! assert_viewer_error {
    ($result:expr, $expected_type:ident, $context:expr) => {
        match $result {
            Err($crate::core::ViewerError::$expected_type(_)) => {}
            Ok(_) => panic!("Expected {} error but got Ok in {}", stringify!($expected_type), $context),
            Err(other) => panic!("Expected {} but got {:?} in {}", stringify!($expected_type), other, $context),
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_data_fixture() {
        let fixture = DatabaseFixture::with_sample_data("test_sample").unwrap();
        assert_eq!(fixture.name, "test_sample");

        let count: i64 = fixture
            .connection
            .query_row("SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'", [], |row| row.get(0))
            .expect("Failed to count tables");
        assert_eq!(count, 4);
    }

    #[test]
    fn test_counting_session() {
        let fixture = DatabaseFixture::with_sample_data("counting").unwrap();
        let mut session = CountingSession::new(fixture.into_session());
        session.query("SELECT 1", &[]).unwrap();
        session.execute("DELETE FROM post_categories").unwrap();
        session.commit().unwrap();
        assert_eq!((session.queries(), session.executes(), session.commits()), (1, 1, 1));
    }
}
