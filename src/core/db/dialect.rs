/// SQL Dialect Module
///
/// Catalog SQL for each supported backend. Every lookup that takes user
/// supplied names binds them as parameters; the few statements that need an
/// identifier in the text (`USE`, `SELECT * FROM`) are only built after the
/// name has been confirmed through a parameterized lookup, and the name is
/// quoted.

/// Databases that are never offered in the database list.
pub const MSSQL_SYSTEM_DATABASES: [&str; 4] = ["master", "tempdb", "model", "msdb"];
pub const SQLITE_SYSTEM_DATABASES: [&str; 1] = ["temp"];

/// A catalog statement together with the values bound to its placeholders.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogQuery {
    pub sql: String,
    pub params: Vec<String>,
}

impl CatalogQuery {
    fn new(sql: impl Into<String>, params: Vec<String>) -> Self {
        CatalogQuery {
            sql: sql.into(),
            params,
        }
    }

    pub fn param_refs(&self) -> Vec<&str> {
        self.params.iter().map(String::as_str).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    /// SQL Server over TDS, placeholders are `@P1`, `@P2`, ...
    Mssql,
    /// SQLite, placeholders are `?1`, `?2`, ...
    Sqlite,
}

impl Dialect {
    pub fn system_databases(&self) -> &'static [&'static str] {
        match self {
            Dialect::Mssql => &MSSQL_SYSTEM_DATABASES,
            Dialect::Sqlite => &SQLITE_SYSTEM_DATABASES,
        }
    }

    /// Lists every database visible to the session.
    pub fn list_databases(&self) -> CatalogQuery {
        match self {
            Dialect::Mssql => CatalogQuery::new("SELECT name FROM sys.databases ORDER BY name", vec![]),
            Dialect::Sqlite => CatalogQuery::new("SELECT name FROM pragma_database_list ORDER BY seq", vec![]),
        }
    }

    /// Returns one row when `database` exists, none otherwise.
    pub fn database_exists(&self, database: &str) -> CatalogQuery {
        match self {
            Dialect::Mssql => CatalogQuery::new(
                "SELECT name FROM sys.databases WHERE name = @P1",
                vec![database.to_string()],
            ),
            Dialect::Sqlite => CatalogQuery::new(
                "SELECT name FROM pragma_database_list WHERE name = ?1",
                vec![database.to_string()],
            ),
        }
    }

    /// Statement that switches the session's database context.
    ///
    /// SQLite sessions address attached databases by schema prefix instead,
    /// so there is nothing to run.
    pub fn use_database(&self, database: &str) -> Option<String> {
        match self {
            Dialect::Mssql => Some(format!("USE {}", self.quote_identifier(database))),
            Dialect::Sqlite => None,
        }
    }

    /// Lists base tables of the current (or given, for SQLite) database.
    pub fn list_tables(&self, database: Option<&str>) -> CatalogQuery {
        match self {
            Dialect::Mssql => CatalogQuery::new(
                "SELECT TABLE_NAME FROM INFORMATION_SCHEMA.TABLES \
                 WHERE TABLE_TYPE = 'BASE TABLE' ORDER BY TABLE_NAME",
                vec![],
            ),
            Dialect::Sqlite => {
                let schema = self.quote_identifier(database.unwrap_or("main"));
                CatalogQuery::new(
                    format!(
                        "SELECT name FROM {}.sqlite_master \
                         WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
                        schema
                    ),
                    vec![],
                )
            }
        }
    }

    /// Lists the columns of `table` in ordinal order.
    pub fn list_columns(&self, table: &str, database: Option<&str>) -> CatalogQuery {
        match self {
            Dialect::Mssql => CatalogQuery::new(
                "SELECT COLUMN_NAME FROM INFORMATION_SCHEMA.COLUMNS \
                 WHERE TABLE_NAME = @P1 ORDER BY ORDINAL_POSITION",
                vec![table.to_string()],
            ),
            Dialect::Sqlite => CatalogQuery::new(
                "SELECT name FROM pragma_table_info(?1, ?2) ORDER BY cid",
                vec![table.to_string(), database.unwrap_or("main").to_string()],
            ),
        }
    }

    /// `SELECT *` over a table whose existence has already been checked.
    pub fn select_all(&self, table: &str, database: Option<&str>) -> String {
        match self {
            Dialect::Mssql => format!("SELECT * FROM {}", self.quote_identifier(table)),
            Dialect::Sqlite => format!(
                "SELECT * FROM {}.{}",
                self.quote_identifier(database.unwrap_or("main")),
                self.quote_identifier(table)
            ),
        }
    }

    /// Statement that commits any open transaction, or nothing when the
    /// session is in autocommit.
    pub fn commit(&self) -> &'static str {
        match self {
            Dialect::Mssql => "IF @@TRANCOUNT > 0 COMMIT TRANSACTION",
            Dialect::Sqlite => "COMMIT",
        }
    }

    pub fn quote_identifier(&self, name: &str) -> String {
        match self {
            Dialect::Mssql => format!("[{}]", name.replace(']', "]]")),
            Dialect::Sqlite => format!("\"{}\"", name.replace('"', "\"\"")),
        }
    }
}
