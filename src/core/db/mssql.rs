/// SQL Server Session Module
///
/// A [`Session`] speaking TDS to SQL Server through `tiberius`. The driver is
/// async; the session owns a current-thread tokio runtime and blocks on every
/// call, so all work stays on the caller's thread.

use super::dialect::Dialect;
use super::query::ResultSet;
use super::Session;
use crate::config::DatabaseConfig;
use crate::core::{Result, ViewerError};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use tiberius::{AuthMethod, Client, ColumnData, Config, FromSql, ToSql};
use tokio::net::TcpStream;
use tokio::runtime::{Builder, Runtime};
use tokio_util::compat::{Compat, TokioAsyncWriteCompatExt};
use tracing::{debug, info, warn};

type TdsClient = Client<Compat<TcpStream>>;

pub struct MssqlSession {
    runtime: Runtime,
    client: Option<TdsClient>,
    server: String,
}

impl std::fmt::Debug for MssqlSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MssqlSession")
            .field("server", &self.server)
            .field("connected", &self.client.is_some())
            .finish()
    }
}

impl MssqlSession {
    /// Connects to the server described by `settings`.
    ///
    /// Returns `ViewerError::Config` when the settings cannot describe a
    /// connection and `ViewerError::Connection` when the server cannot be
    /// reached or refuses the login.
    pub fn connect(settings: &DatabaseConfig) -> Result<Self> {
        let config = tds_config(settings)?;
        let server = config.get_addr().to_string();
        if let Some(driver) = &settings.driver {
            debug!(driver = driver.as_str(), "ODBC driver name is not used by the TDS client");
        }

        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| ViewerError::Connection(format!("Failed to start I/O runtime: {}", e)))?;

        let client = runtime.block_on(async {
            let tcp = TcpStream::connect(config.get_addr())
                .await
                .map_err(|e| ViewerError::Connection(format!("Could not reach {}: {}", server, e)))?;
            tcp.set_nodelay(true)?;
            Client::connect(config, tcp.compat_write())
                .await
                .map_err(|e| ViewerError::Connection(e.to_string()))
        })?;
        info!(server = server.as_str(), "connected to SQL Server");

        Ok(MssqlSession {
            runtime,
            client: Some(client),
            server,
        })
    }

    fn parts(&mut self) -> Result<(&Runtime, &mut TdsClient)> {
        match self.client.as_mut() {
            Some(client) => Ok((&self.runtime, client)),
            None => Err(ViewerError::Connection("Session is not connected".to_string())),
        }
    }
}

impl Session for MssqlSession {
    fn dialect(&self) -> Dialect {
        Dialect::Mssql
    }

    fn is_connected(&self) -> bool {
        self.client.is_some()
    }

    fn query(&mut self, sql: &str, params: &[&str]) -> Result<ResultSet> {
        let (runtime, client) = self.parts()?;
        debug!(sql, params = params.len(), "mssql query");
        let bound: Vec<&dyn ToSql> = params.iter().map(|p| p as &dyn ToSql).collect();

        runtime.block_on(async {
            let mut stream = if bound.is_empty() {
                client.simple_query(sql).await
            } else {
                client.query(sql, &bound).await
            }
            .map_err(query_error)?;

            let columns: Vec<String> = stream
                .columns()
                .await
                .map_err(query_error)?
                .map(|cols| cols.iter().map(|c| c.name().to_string()).collect())
                .unwrap_or_default();

            let rows = stream
                .into_first_result()
                .await
                .map_err(query_error)?
                .into_iter()
                .map(|row| row.into_iter().map(|data| format_value(&data)).collect())
                .collect();

            Ok(ResultSet::new(columns, rows))
        })
    }

    fn execute(&mut self, sql: &str) -> Result<u64> {
        let (runtime, client) = self.parts()?;
        debug!(sql, "mssql execute");
        runtime.block_on(async {
            let result = client.execute(sql, &[]).await.map_err(query_error)?;
            Ok(result.total())
        })
    }

    fn batch(&mut self, sql: &str) -> Result<()> {
        let (runtime, client) = self.parts()?;
        debug!(sql, "mssql batch");
        // Sent as a plain batch so that context changes such as USE outlive the call
        runtime.block_on(async {
            client
                .simple_query(sql)
                .await
                .map_err(query_error)?
                .into_results()
                .await
                .map_err(query_error)?;
            Ok(())
        })
    }

    fn commit(&mut self) -> Result<()> {
        self.batch(Dialect::Mssql.commit())
    }

    fn close(&mut self) {
        if let Some(client) = self.client.take() {
            if let Err(e) = self.runtime.block_on(client.close()) {
                warn!(error = %e, "error while closing SQL Server session");
            }
            info!(server = self.server.as_str(), "closed SQL Server session");
        }
    }
}

impl Drop for MssqlSession {
    fn drop(&mut self) {
        self.close();
    }
}

/// Builds the TDS client configuration.
///
/// A configured connection string is used verbatim; otherwise the individual
/// fields are applied.
fn tds_config(settings: &DatabaseConfig) -> Result<Config> {
    if let Some(conn_str) = &settings.connection_string {
        let mut config = Config::from_ado_string(conn_str)
            .map_err(|e| ViewerError::Config(format!("Invalid connection string: {}", e)))?;
        // Explicit login and database settings win over the string
        if let Some(database) = &settings.database {
            config.database(database);
        }
        if settings.user.is_some() || settings.password.is_some() {
            let user = settings
                .user
                .clone()
                .or_else(|| ado_value(conn_str, &["user id", "uid", "user", "username"]));
            if let Some(user) = user {
                let password = settings
                    .password
                    .clone()
                    .or_else(|| ado_value(conn_str, &["password", "pwd"]))
                    .unwrap_or_default();
                config.authentication(AuthMethod::sql_server(user, password));
            }
        }
        return Ok(config);
    }

    let server = settings
        .server
        .as_deref()
        .ok_or_else(|| ViewerError::Config("No server configured".to_string()))?;

    let mut config = Config::new();
    // "host\instance" names a SQL Server named instance
    match server.split_once('\\') {
        Some((host, instance)) => {
            config.host(host);
            config.instance_name(instance);
        }
        None => {
            config.host(server);
        }
    }
    config.port(settings.port);
    if let Some(database) = &settings.database {
        config.database(database);
    }
    if settings.trust_cert {
        config.trust_cert();
    }
    config.authentication(auth_method(settings)?);
    Ok(config)
}

#[cfg(windows)]
fn auth_method(settings: &DatabaseConfig) -> Result<AuthMethod> {
    if settings.trusted_connection {
        return Ok(AuthMethod::Integrated);
    }
    sql_login(settings)
}

#[cfg(not(windows))]
fn auth_method(settings: &DatabaseConfig) -> Result<AuthMethod> {
    if settings.trusted_connection {
        return Err(ViewerError::Config(
            "Trusted connections are only supported on Windows; configure user and password".to_string(),
        ));
    }
    sql_login(settings)
}

/// Looks up the first of `keys` in an ADO.NET `key=value;` string.
fn ado_value(conn_str: &str, keys: &[&str]) -> Option<String> {
    conn_str.split(';').find_map(|pair| {
        let (key, value) = pair.split_once('=')?;
        let key = key.trim();
        keys.iter()
            .any(|k| k.eq_ignore_ascii_case(key))
            .then(|| value.trim().to_string())
    })
}

fn sql_login(settings: &DatabaseConfig) -> Result<AuthMethod> {
    let user = settings
        .user
        .as_deref()
        .ok_or_else(|| ViewerError::Config("No user configured for SQL Server login".to_string()))?;
    Ok(AuthMethod::sql_server(user, settings.password.as_deref().unwrap_or("")))
}

fn query_error(e: tiberius::error::Error) -> ViewerError {
    match e {
        tiberius::error::Error::Io { .. } | tiberius::error::Error::Tls(_) => {
            ViewerError::Connection(e.to_string())
        }
        other => ViewerError::Query(other.to_string()),
    }
}

fn from_sql<'a, T: FromSql<'a>>(data: &'a ColumnData<'static>) -> Option<T> {
    T::from_sql(data).ok().flatten()
}

fn or_null<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "NULL".to_string())
}

/// Formats a TDS value for display
fn format_value(data: &ColumnData<'static>) -> String {
    match data {
        ColumnData::U8(v) => or_null(*v),
        ColumnData::I16(v) => or_null(*v),
        ColumnData::I32(v) => or_null(*v),
        ColumnData::I64(v) => or_null(*v),
        ColumnData::F32(v) => or_null(*v),
        ColumnData::F64(v) => or_null(*v),
        ColumnData::Bit(v) => or_null(v.map(u8::from)),
        ColumnData::String(v) => or_null(v.as_deref()),
        ColumnData::Guid(v) => or_null(v.as_ref()),
        ColumnData::Numeric(v) => or_null(v.as_ref()),
        ColumnData::Binary(v) => v
            .as_ref()
            .map(|b| format!("<BLOB: {} bytes>", b.len()))
            .unwrap_or_else(|| "NULL".to_string()),
        ColumnData::Xml(v) => or_null(v.as_ref().map(|x| x.to_string())),
        ColumnData::DateTime(_) | ColumnData::SmallDateTime(_) | ColumnData::DateTime2(_) => {
            or_null(from_sql::<NaiveDateTime>(data))
        }
        ColumnData::Date(_) => or_null(from_sql::<NaiveDate>(data)),
        ColumnData::Time(_) => or_null(from_sql::<NaiveTime>(data)),
        ColumnData::DateTimeOffset(_) => or_null(from_sql::<DateTime<FixedOffset>>(data)),
        #[allow(unreachable_patterns)]
        _ => "?".to_string(),
    }
}
