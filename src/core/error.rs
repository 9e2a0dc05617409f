/// sqlview Error Module
///
/// This module defines the error types for the sqlview application.
/// Every failure raised by the database layer ends up in one of these
/// variants and is shown to the user with its raw text.
use thiserror::Error;

/// Error type for the sqlview application.
///
/// The variants follow the failure classes the viewer distinguishes:
/// - Reaching or authenticating to a server
/// - Running SQL (syntax, missing objects, constraint violations)
/// - Loading and validating configuration
/// - Terminal and export problems
#[derive(Error, Debug)]
pub enum ViewerError {
    /// The server could not be reached, authentication failed, or the
    /// session has already been closed
    #[error("Connection error: {0}")]
    Connection(String),

    /// SQL errors (syntax, execution, missing tables, etc.)
    #[error("Query error: {0}")]
    Query(String),

    /// Errors raised by the SQLite driver outside of query execution
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Configuration loading and validation errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// UI-related errors (export formats, terminal setup)
    #[error("UI error: {0}")]
    Ui(String),

    /// File system and I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Malformed TOML in a configuration file
    #[error("Configuration error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl ViewerError {
    /// Short label used as the title of the error dialog.
    pub fn category(&self) -> &'static str {
        match self {
            ViewerError::Connection(_) => "Connection error",
            ViewerError::Query(_) | ViewerError::Database(_) => "Query error",
            ViewerError::Config(_) | ViewerError::Toml(_) => "Configuration error",
            ViewerError::Ui(_) => "UI error",
            ViewerError::Io(_) => "I/O error",
            ViewerError::Json(_) => "Export error",
        }
    }

    /// The error text without the category prefix.
    pub fn detail(&self) -> String {
        match self {
            ViewerError::Connection(msg)
            | ViewerError::Query(msg)
            | ViewerError::Config(msg)
            | ViewerError::Ui(msg) => msg.clone(),
            ViewerError::Database(e) => e.to_string(),
            ViewerError::Io(e) => e.to_string(),
            ViewerError::Json(e) => e.to_string(),
            ViewerError::Toml(e) => e.to_string(),
        }
    }
}

/// Type alias for Result to use ViewerError as the error type.
pub type Result<T> = std::result::Result<T, ViewerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let db_err = ViewerError::Database(rusqlite::Error::ExecuteReturnedResults);
        assert!(db_err.to_string().contains("Database error"));

        let query_err = ViewerError::Query("Syntax error".to_string());
        assert!(query_err.to_string().contains("Query error"));

        let conn_err = ViewerError::Connection("Login failed".to_string());
        assert!(conn_err.to_string().contains("Connection error"));

        let config_err = ViewerError::Config("Invalid config".to_string());
        assert!(config_err.to_string().contains("Configuration error"));
    }

    #[test]
    fn test_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: ViewerError = io_err.into();
        match err {
            ViewerError::Io(_) => {}
            _ => panic!("Expected IO error"),
        }

        let toml_err = toml::from_str::<toml::Value>("[ui\ntheme = ").unwrap_err();
        let err: ViewerError = toml_err.into();
        assert_eq!(err.category(), "Configuration error");
    }

    #[test]
    fn test_category_and_detail() {
        let err = ViewerError::Query("Invalid object name 'nope'.".to_string());
        assert_eq!(err.category(), "Query error");
        assert_eq!(err.detail(), "Invalid object name 'nope'.");

        let err = ViewerError::Connection("not connected".to_string());
        assert_eq!(err.category(), "Connection error");
    }
}
