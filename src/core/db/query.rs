/// Query Result Module
///
/// Value types produced by query execution, and the statement classification
/// the executor dispatches on.

/// Header shown for a result column the server returned without a name.
pub const UNNAMED_COLUMN: &str = "(No column name)";

/// Rows and column names returned by a SELECT.
///
/// Column names are unique within a set; every cell is already rendered as
/// text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultSet {
    /// Column names from the query result
    pub columns: Vec<String>,
    /// Rows of data as string values
    pub rows: Vec<Vec<String>>,
}

impl ResultSet {
    /// Creates a new ResultSet, making the column names unique.
    ///
    /// Empty names become [`UNNAMED_COLUMN`]; a repeated name gets a `_2`,
    /// `_3`, ... suffix in order of appearance.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        ResultSet {
            columns: unique_column_names(columns),
            rows,
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Values of the first column, the shape of every catalog lookup.
    pub fn first_column(&self) -> Vec<String> {
        self.rows
            .iter()
            .filter_map(|row| row.first().cloned())
            .collect()
    }
}

/// Outcome of a statement that does not return rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandResult {
    /// Rows touched by the statement, as reported by the driver
    pub rows_affected: u64,
    /// Whether the statement ran and was committed
    pub success: bool,
}

/// What a user query produced.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutcome {
    Rows(ResultSet),
    Command(CommandResult),
}

/// Represents the two statement shapes the executor distinguishes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementType {
    /// Text that starts with `select`: rows are read back, nothing is committed
    Select,
    /// Everything else: executed, then committed
    Command,
}

impl StatementType {
    /// Classifies SQL text by its first characters.
    ///
    /// The check is a plain prefix match on the trimmed, lower-cased text, so
    /// `WITH ...` queries count as commands and `selected_rows` would count
    /// as a select.
    pub fn classify(sql: &str) -> Self {
        if sql.trim().to_lowercase().starts_with("select") {
            StatementType::Select
        } else {
            StatementType::Command
        }
    }
}

fn unique_column_names(columns: Vec<String>) -> Vec<String> {
    let mut seen: Vec<String> = Vec::with_capacity(columns.len());
    for name in columns {
        let base = if name.trim().is_empty() {
            UNNAMED_COLUMN.to_string()
        } else {
            name
        };
        let mut candidate = base.clone();
        let mut n = 2;
        while seen.contains(&candidate) {
            candidate = format!("{}_{}", base, n);
            n += 1;
        }
        seen.push(candidate);
    }
    seen
}
