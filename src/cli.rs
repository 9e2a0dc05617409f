//! Command-line argument parsing.
//!
//! Flags override values from the configuration file.

use crate::config::{Backend, Config, PASSWORD_ENV};
use crate::theme::ThemeName;
use clap::Parser;
use std::path::PathBuf;

/// Export formats accepted by `--format`.
pub const FORMATS: [&str; 4] = ["text", "csv", "json", "markdown"];

/// Browse SQL Server databases and tables, and run SQL against them.
#[derive(Parser, Debug)]
#[command(name = "sqlview")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Config file path
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// SQL Server host, optionally host\instance
    #[arg(short = 'S', long, value_name = "HOST")]
    pub server: Option<String>,

    /// SQL Server port
    #[arg(short, long, value_name = "PORT")]
    pub port: Option<u16>,

    /// Database to open
    #[arg(short, long, value_name = "DATABASE")]
    pub database: Option<String>,

    /// Table to show
    #[arg(short, long, value_name = "TABLE")]
    pub table: Option<String>,

    /// SQL login name
    #[arg(short = 'U', long, value_name = "USER")]
    pub user: Option<String>,

    /// SQL login password
    #[arg(long, env = PASSWORD_ENV, hide_env_values = true, value_name = "PASSWORD")]
    pub password: Option<String>,

    /// Open a SQLite database file instead of a server
    #[arg(long, value_name = "PATH")]
    pub sqlite: Option<String>,

    /// Color theme
    #[arg(long, value_name = "THEME")]
    pub theme: Option<ThemeName>,

    /// Run one statement, print the result and exit
    #[arg(short = 'e', long, value_name = "SQL")]
    pub execute: Option<String>,

    /// Output format for --execute
    #[arg(short, long, value_name = "FORMAT", default_value = "text", value_parser = FORMATS)]
    pub format: String,
}

impl Cli {
    /// Parses command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Returns true if a statement should run without the TUI.
    pub fn is_headless(&self) -> bool {
        self.execute.is_some()
    }

    /// Writes the flags that were given over `config`.
    pub fn apply(&self, config: &mut Config) {
        let db = &mut config.database;
        if let Some(path) = &self.sqlite {
            db.backend = Backend::Sqlite;
            db.path = Some(path.clone());
        }
        // A server or port flag addresses the server by fields, so a
        // connection string from the file no longer applies
        if let Some(server) = &self.server {
            db.backend = Backend::Mssql;
            db.server = Some(server.clone());
            db.connection_string = None;
        }
        if let Some(port) = self.port {
            db.port = port;
            db.connection_string = None;
        }
        if let Some(database) = &self.database {
            db.database = Some(database.clone());
        }
        if let Some(table) = &self.table {
            db.table = Some(table.clone());
        }
        if let Some(user) = &self.user {
            db.user = Some(user.clone());
        }
        if let Some(password) = &self.password {
            db.password = Some(password.clone());
        }
        if let Some(theme) = self.theme {
            config.ui.theme = theme;
        }
    }
}
