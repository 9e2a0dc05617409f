//! Results Grid Module for sqlview
//!
//! The tabular view of the current result set: headers, rows, a scrolling
//! viewport with a selected row, and export to text formats.
//!
//! `populate` is the only way rows get in. It always starts from an empty
//! grid, so showing the same result twice leaves the grid in the same state.

use crate::core::{Result, ViewerError};
use std::collections::BTreeMap;

/// Default number of rows visible at once.
pub const DEFAULT_VIEWPORT_ROWS: usize = 10;

/// Represents a single cell in the grid.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub content: String,
}

/// Represents a row of cells in the grid.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub cells: Vec<Cell>,
    pub row_index: usize,
}

/// Represents the viewport for virtualized scrolling.
#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    pub start: usize,
    pub end: usize,
}

impl Viewport {
    pub fn new(start: usize, end: usize) -> Self {
        Viewport { start, end }
    }

    pub fn height(&self) -> usize {
        self.end - self.start
    }

    pub fn visible_rows<'a>(&self, rows: &'a [Row]) -> &'a [Row] {
        let start = self.start.min(rows.len());
        let end = self.end.min(rows.len());
        &rows[start..end]
    }

    pub fn scroll_down(&mut self, total_rows: usize) {
        if self.end < total_rows {
            self.start += 1;
            self.end += 1;
        }
    }

    pub fn scroll_up(&mut self) {
        if self.start > 0 {
            self.start -= 1;
            self.end -= 1;
        }
    }

    /// Moves the window the least distance that brings `row` into view.
    pub fn reveal(&mut self, row: usize) {
        let height = self.height();
        if row < self.start {
            self.start = row;
            self.end = row + height;
        } else if row >= self.end {
            self.end = row + 1;
            self.start = self.end - height;
        }
    }

    /// Changes the number of visible rows, keeping the top row.
    pub fn resize(&mut self, height: usize) {
        self.end = self.start + height.max(1);
    }
}

/// Represents the entire grid structure.
#[derive(Debug, Clone)]
pub struct ResultsGrid {
    pub headers: Vec<String>,
    pub rows: Vec<Row>,
    pub viewport: Viewport,
    /// Index of the highlighted row, if the grid has rows
    pub selected: Option<usize>,
}

impl Default for ResultsGrid {
    fn default() -> Self {
        Self::new()
    }
}

impl ResultsGrid {
    /// Creates a new, empty ResultsGrid.
    pub fn new() -> Self {
        ResultsGrid {
            headers: Vec::new(),
            rows: Vec::new(),
            viewport: Viewport::new(0, DEFAULT_VIEWPORT_ROWS),
            selected: None,
        }
    }

    /// Replaces everything shown with `rows` under `columns`.
    ///
    /// Cells are matched to columns by position. A row shorter than the
    /// column list is padded with empty cells, a longer one is cut.
    pub fn populate(&mut self, columns: &[String], rows: &[Vec<String>]) {
        self.clear();
        self.headers = columns.to_vec();
        let width = self.headers.len();
        for row in rows {
            let cells = (0..width)
                .map(|i| Cell {
                    content: row.get(i).cloned().unwrap_or_default(),
                })
                .collect();
            self.rows.push(Row {
                cells,
                row_index: self.rows.len(),
            });
        }
        if !self.rows.is_empty() {
            self.selected = Some(0);
        }
    }

    /// Removes headers and rows and scrolls back to the top.
    pub fn clear(&mut self) {
        self.headers.clear();
        self.rows.clear();
        self.selected = None;
        let height = self.viewport.height();
        self.viewport = Viewport::new(0, height);
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    /// Moves the selection by `delta` rows, clamped to the grid.
    pub fn move_selection(&mut self, delta: isize) {
        if self.rows.is_empty() {
            return;
        }
        let current = self.selected.unwrap_or(0) as isize;
        let last = self.rows.len() as isize - 1;
        let next = (current + delta).clamp(0, last) as usize;
        self.selected = Some(next);
        self.viewport.reveal(next);
    }

    pub fn select_first(&mut self) {
        if !self.rows.is_empty() {
            self.selected = Some(0);
            self.viewport.reveal(0);
        }
    }

    pub fn select_last(&mut self) {
        if let Some(last) = self.rows.len().checked_sub(1) {
            self.selected = Some(last);
            self.viewport.reveal(last);
        }
    }

    /// Text width of each column: the widest of header and cells.
    pub fn column_widths(&self) -> Vec<usize> {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.chars().count()).collect();
        for row in &self.rows {
            for (i, cell) in row.cells.iter().enumerate() {
                widths[i] = widths[i].max(cell.content.chars().count());
            }
        }
        widths
    }

    /// Renders the visible part of the grid as plain text.
    pub fn render(&self) -> String {
        self.render_rows(self.viewport.visible_rows(&self.rows))
    }

    /// Renders every row, ignoring the viewport.
    pub fn render_all(&self) -> String {
        self.render_rows(&self.rows)
    }

    fn render_rows(&self, rows: &[Row]) -> String {
        let mut output = String::new();
        if self.headers.is_empty() {
            return output;
        }
        let widths = self.column_widths();
        let pad = |text: &str, width: usize| format!("{:<width$}", text, width = width);

        let header: Vec<String> = self
            .headers
            .iter()
            .zip(&widths)
            .map(|(h, w)| pad(h, *w))
            .collect();
        output.push_str(header.join(" | ").trim_end());
        output.push('\n');
        let underline: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        output.push_str(&underline.join("-|-"));
        output.push('\n');

        for row in rows {
            let row_content: Vec<String> = row
                .cells
                .iter()
                .zip(&widths)
                .map(|(cell, w)| pad(&cell.content, *w))
                .collect();
            output.push_str(row_content.join(" | ").trim_end());
            output.push('\n');
        }
        output
    }

    /// Exports the grid data to a specified format.
    /// Supported formats: text, CSV, JSON, Markdown.
    pub fn export(&self, format: &str) -> Result<String> {
        match format.to_lowercase().as_str() {
            "text" => Ok(self.render_all()),
            "csv" => Ok(self.export_to_csv()),
            "json" => self.export_to_json(),
            "markdown" => Ok(self.export_to_markdown()),
            _ => Err(ViewerError::Ui(format!(
                "Unsupported export format: '{}'. Supported formats: text, csv, json, markdown",
                format
            ))),
        }
    }

    fn export_to_csv(&self) -> String {
        let mut output = String::new();
        if !self.headers.is_empty() {
            let headers: Vec<String> = self.headers.iter().map(|h| csv_field(h)).collect();
            output.push_str(&headers.join(","));
            output.push('\n');
        }
        for row in &self.rows {
            let row_content: Vec<String> = row.cells.iter().map(|cell| csv_field(&cell.content)).collect();
            output.push_str(&row_content.join(","));
            output.push('\n');
        }
        output
    }

    fn export_to_json(&self) -> Result<String> {
        let mut rows = Vec::new();
        for row in &self.rows {
            let mut row_map = BTreeMap::new();
            for (i, cell) in row.cells.iter().enumerate() {
                if let Some(header) = self.headers.get(i) {
                    row_map.insert(header.clone(), cell.content.clone());
                }
            }
            rows.push(row_map);
        }
        Ok(serde_json::to_string(&rows)?)
    }

    fn export_to_markdown(&self) -> String {
        let mut output = String::new();
        if !self.headers.is_empty() {
            output.push_str(&self.headers.join(" | "));
            output.push('\n');
            let underline: Vec<String> = self
                .headers
                .iter()
                .map(|h| "-".repeat(h.chars().count().max(3)))
                .collect();
            output.push_str(&underline.join(" | "));
            output.push('\n');
        }
        for row in &self.rows {
            let row_content: Vec<String> = row
                .cells
                .iter()
                .map(|cell| cell.content.replace('|', "\\|"))
                .collect();
            output.push_str(&row_content.join(" | "));
            output.push('\n');
        }
        output
    }
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    fn sample() -> ResultsGrid {
        let mut grid = ResultsGrid::new();
        grid.populate(
            &strings(&["ID", "Name"]),
            &[strings(&["1", "Alice"]), strings(&["2", "Bob"])],
        );
        grid
    }

    #[test]
    fn test_render_empty_grid() {
        let grid = ResultsGrid::new();
        assert_eq!(grid.render(), "");
    }

    #[test]
    fn test_populate_counts() {
        let grid = sample();
        assert_eq!(grid.row_count(), 2);
        assert_eq!(grid.column_count(), 2);
        assert_eq!(grid.selected, Some(0));
    }

    #[test]
    fn test_populate_replaces_previous_contents() {
        let mut grid = sample();
        grid.move_selection(1);
        grid.populate(&strings(&["x"]), &[strings(&["only"])]);
        assert_eq!(grid.headers, vec!["x"]);
        assert_eq!(grid.row_count(), 1);
        assert_eq!(grid.selected, Some(0));
        assert_eq!(grid.viewport.start, 0);
    }

    #[test]
    fn test_populate_pads_and_truncates_rows() {
        let mut grid = ResultsGrid::new();
        grid.populate(
            &strings(&["a", "b"]),
            &[strings(&["1"]), strings(&["1", "2", "3"])],
        );
        assert_eq!(grid.rows[0].cells.len(), 2);
        assert_eq!(grid.rows[0].cells[1].content, "");
        assert_eq!(grid.rows[1].cells.len(), 2);
    }

    #[test]
    fn test_populate_is_idempotent() {
        let columns = strings(&["ID", "Name"]);
        let rows = vec![strings(&["1", "Alice"]), strings(&["2", "Bob"])];
        let mut grid = ResultsGrid::new();
        grid.populate(&columns, &rows);
        let first = (grid.headers.clone(), grid.rows.clone());
        grid.populate(&columns, &rows);
        assert_eq!((grid.headers.clone(), grid.rows.clone()), first);
    }

    #[test]
    fn test_render_with_headers_and_rows() {
        let rendered = sample().render();
        assert!(rendered.contains("ID | Name"));
        assert!(rendered.contains("1  | Alice"));
        assert!(rendered.contains("2  | Bob"));
    }

    #[test]
    fn test_selection_moves_viewport() {
        let mut grid = ResultsGrid::new();
        let rows: Vec<Vec<String>> = (0..30).map(|i| vec![i.to_string()]).collect();
        grid.populate(&strings(&["n"]), &rows);
        grid.move_selection(15);
        assert_eq!(grid.selected, Some(15));
        assert_eq!(grid.viewport, Viewport::new(6, 16));
        grid.move_selection(-100);
        assert_eq!(grid.selected, Some(0));
        assert_eq!(grid.viewport, Viewport::new(0, 10));
        grid.select_last();
        assert_eq!(grid.selected, Some(29));
        assert_eq!(grid.viewport.end, 30);
    }

    #[test]
    fn test_export_to_csv_quotes_fields() {
        let mut grid = ResultsGrid::new();
        grid.populate(&strings(&["ID", "Name"]), &[strings(&["1", "Smith, \"Al\""])]);
        let csv = grid.export("csv").unwrap();
        assert_eq!(csv, "ID,Name\n1,\"Smith, \"\"Al\"\"\"\n");
    }

    #[test]
    fn test_export_to_json() {
        let json = sample().export("json").unwrap();
        assert!(json.contains(r#""ID":"1""#));
        assert!(json.contains(r#""Name":"Alice""#));
        assert!(json.contains(r#""Name":"Bob""#));
    }

    #[test]
    fn test_export_unsupported_format() {
        let result = ResultsGrid::new().export("xml");
        if let Err(ViewerError::Ui(msg)) = result {
            assert!(msg.contains("Unsupported export format"));
            assert!(msg.contains("xml"));
        } else {
            panic!("Expected UI error");
        }
    }

    #[test]
    fn test_export_to_markdown() {
        let markdown = sample().export("markdown").unwrap();
        let lines: Vec<&str> = markdown.trim().lines().collect();
        assert_eq!(lines, vec!["ID | Name", "--- | ----", "1 | Alice", "2 | Bob"]);
    }
}
