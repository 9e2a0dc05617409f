use crate::core::{Result, ViewerError};
use crate::theme::ThemeName;
use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Default TDS port.
pub const DEFAULT_MSSQL_PORT: u16 = 1433;

/// Environment variable consulted when no password is configured.
pub const PASSWORD_ENV: &str = "SQLVIEW_PASSWORD";

/// Top-level configuration structure parsed from a TOML file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub database: DatabaseConfig,
    pub ui: UIConfig,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    #[default]
    Mssql,
    Sqlite,
}

/// Connection settings, consumed as given.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub backend: Backend,
    /// Host name, optionally `host\instance`
    pub server: Option<String>,
    pub port: u16,
    /// ODBC driver name from existing configurations; the TDS client ignores it
    pub driver: Option<String>,
    /// Use Windows integrated authentication instead of a SQL login
    pub trusted_connection: bool,
    pub user: Option<String>,
    pub password: Option<String>,
    /// Database opened at startup
    pub database: Option<String>,
    /// Table shown at startup and by "view all records"
    pub table: Option<String>,
    /// Accept the server certificate without validation
    pub trust_cert: bool,
    /// ADO.NET style connection string. User, password and database set
    /// alongside it take precedence
    pub connection_string: Option<String>,
    /// SQLite database file
    pub path: Option<String>,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        DatabaseConfig {
            backend: Backend::Mssql,
            server: None,
            port: DEFAULT_MSSQL_PORT,
            driver: None,
            trusted_connection: false,
            user: None,
            password: None,
            database: None,
            table: None,
            trust_cert: false,
            connection_string: None,
            path: None,
        }
    }
}

// Hand-written so passwords never reach the logs.
impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("backend", &self.backend)
            .field("server", &self.server)
            .field("port", &self.port)
            .field("driver", &self.driver)
            .field("trusted_connection", &self.trusted_connection)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("database", &self.database)
            .field("table", &self.table)
            .field("trust_cert", &self.trust_cert)
            .field("connection_string", &self.connection_string.as_ref().map(|_| "***"))
            .field("path", &self.path)
            .finish()
    }
}

impl DatabaseConfig {
    /// Short description of where the session goes, without credentials.
    pub fn display_target(&self) -> String {
        match self.backend {
            Backend::Sqlite => self.path.clone().unwrap_or_else(|| "<no path>".to_string()),
            Backend::Mssql if self.connection_string.is_some() => "<connection string>".to_string(),
            Backend::Mssql => format!(
                "{}:{}",
                self.server.as_deref().unwrap_or("<no server>"),
                self.port
            ),
        }
    }

    /// Checks that the settings describe a connection that can be attempted.
    pub fn validate(&self) -> Result<()> {
        match self.backend {
            Backend::Sqlite if self.path.is_none() => Err(ViewerError::Config(
                "The sqlite backend needs a database path".to_string(),
            )),
            Backend::Mssql if self.server.is_none() && self.connection_string.is_none() => {
                Err(ViewerError::Config(
                    "No server configured; set database.server or database.connection_string".to_string(),
                ))
            }
            Backend::Mssql
                if self.connection_string.is_none()
                    && !self.trusted_connection
                    && self.user.is_none() =>
            {
                Err(ViewerError::Config(
                    "Set database.user or enable database.trusted_connection".to_string(),
                ))
            }
            _ => Ok(()),
        }
    }
}

/// UI-related configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UIConfig {
    pub theme: ThemeName,
    pub show_status_tips: bool,
}

impl Default for UIConfig {
    fn default() -> Self {
        UIConfig {
            theme: ThemeName::default(),
            show_status_tips: true,
        }
    }
}

/// Loads configuration from a TOML file at the given path.
///
/// # Example
///
/// ```no_run
/// let config = sqlview::config::load_config("config.toml").expect("Failed to load config");
/// println!("{:?}", config);
/// ```
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| {
        ViewerError::Config(format!("Could not read {}: {}", path.display(), e))
    })?;
    let config: Config = toml::from_str(&content)?;
    info!(path = %path.display(), "loaded configuration");
    Ok(config)
}

/// Loads the configuration for this run.
///
/// An explicit path must exist. Without one, the default location is used if
/// a file is there, and built-in defaults otherwise.
pub fn load_or_default(explicit: Option<&Path>) -> Result<Config> {
    if let Some(path) = explicit {
        return load_config(path);
    }
    match default_config_path() {
        Some(path) if path.exists() => load_config(path),
        other => {
            debug!(path = ?other, "no configuration file, using defaults");
            Ok(Config::default())
        }
    }
}

/// `<config dir>/sqlview/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("sqlview").join("config.toml"))
}
