//! Application state and actions.
//!
//! `App` owns the executor (and through it the one database session), the
//! grid, the editor and everything else the screen shows. Every action runs
//! to completion on the caller's thread. A failed action leaves the grid as
//! it was and opens the error dialog with the raw error text.

use crate::config::Config;
use crate::core::db::{Executor, QueryOutcome, ResultSet, Session};
use crate::core::{Result, ViewerError};
use crate::query_editor::QueryEditor;
use crate::results_grid::ResultsGrid;
use crate::theme::Theme;
use chrono::Local;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::time::Instant;
use tracing::{error, info};

/// Rows moved by PageUp/PageDown in the grid.
const PAGE_ROWS: isize = 10;

/// Panel that receives key presses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Databases,
    Tables,
    Editor,
    Grid,
}

impl Focus {
    const ORDER: [Focus; 4] = [Focus::Databases, Focus::Tables, Focus::Editor, Focus::Grid];

    pub fn next(self) -> Self {
        let idx = Self::ORDER.iter().position(|f| *f == self).unwrap_or(0);
        Self::ORDER[(idx + 1) % Self::ORDER.len()]
    }

    pub fn previous(self) -> Self {
        let idx = Self::ORDER.iter().position(|f| *f == self).unwrap_or(0);
        Self::ORDER[(idx + Self::ORDER.len() - 1) % Self::ORDER.len()]
    }
}

/// A blocking message shown over the screen until dismissed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorDialog {
    pub title: String,
    pub message: String,
}

/// A list in the sidebar with its cursor.
#[derive(Debug, Clone, Default)]
pub struct PickList {
    pub items: Vec<String>,
    pub selected: usize,
}

impl PickList {
    pub fn set_items(&mut self, items: Vec<String>) {
        self.items = items;
        self.selected = 0;
    }

    pub fn current(&self) -> Option<&str> {
        self.items.get(self.selected).map(String::as_str)
    }

    pub fn select_named(&mut self, name: &str) {
        if let Some(idx) = self.items.iter().position(|i| i.eq_ignore_ascii_case(name)) {
            self.selected = idx;
        }
    }

    pub fn move_by(&mut self, delta: isize) {
        if self.items.is_empty() {
            return;
        }
        let last = self.items.len() as isize - 1;
        self.selected = (self.selected as isize + delta).clamp(0, last) as usize;
    }
}

pub struct App<S: Session> {
    executor: Option<Executor<S>>,
    pub grid: ResultsGrid,
    pub editor: QueryEditor,
    pub theme: Theme,
    pub databases: PickList,
    pub tables: PickList,
    pub focus: Focus,
    pub status: String,
    pub dialog: Option<ErrorDialog>,
    pub show_status_tips: bool,
    /// Table the grid currently shows
    pub current_table: Option<String>,
    /// Table from the configuration, re-read by "view all records"
    pub configured_table: Option<String>,
    pub running: bool,
}

impl<S: Session> App<S> {
    /// Creates the application around an open executor, or none when the
    /// startup connection failed.
    pub fn new(executor: Option<Executor<S>>, config: &Config) -> Self {
        let status = if executor.is_some() {
            format!("Connected to {}", config.database.display_target())
        } else {
            "Not connected".to_string()
        };
        App {
            executor,
            grid: ResultsGrid::new(),
            editor: QueryEditor::new(),
            theme: Theme::new(config.ui.theme),
            databases: PickList::default(),
            tables: PickList::default(),
            focus: Focus::Editor,
            status,
            dialog: None,
            show_status_tips: config.ui.show_status_tips,
            current_table: None,
            configured_table: config.database.table.clone(),
            running: true,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.executor.as_ref().map(|e| e.is_connected()).unwrap_or(false)
    }

    pub fn current_database(&self) -> Option<&str> {
        self.executor.as_ref().and_then(|e| e.current_database())
    }

    fn executor(&mut self) -> Result<&mut Executor<S>> {
        self.executor
            .as_mut()
            .ok_or_else(|| ViewerError::Connection("Not connected to a database server".to_string()))
    }

    /// Shows a failure in the error dialog.
    pub fn report(&mut self, err: ViewerError) {
        error!(category = err.category(), error = %err, "operation failed");
        self.status = format!("{} at {}", err.category(), timestamp());
        self.dialog = Some(ErrorDialog {
            title: err.category().to_string(),
            message: err.detail(),
        });
    }

    pub fn dismiss_dialog(&mut self) {
        self.dialog = None;
    }

    /// Loads the database list, then opens the configured database and table.
    ///
    /// Without a configured database the first one listed is opened.
    pub fn startup(&mut self, database: Option<&str>, table: Option<&str>) {
        if self.executor.is_none() {
            return;
        }
        if let Err(e) = self.refresh_databases() {
            self.report(e);
            return;
        }
        let database = database
            .map(str::to_string)
            .or_else(|| self.databases.current().map(str::to_string));
        if let Some(database) = database {
            if let Err(e) = self.select_database(&database) {
                self.report(e);
                return;
            }
        }
        if let Some(table) = table {
            if let Err(e) = self.select_table(table) {
                self.report(e);
            }
        }
    }

    pub fn refresh_databases(&mut self) -> Result<()> {
        let names = self.executor()?.list_databases()?;
        info!(count = names.len(), "listed databases");
        self.databases.set_items(names);
        Ok(())
    }

    /// Switches to `database` and lists its tables.
    pub fn select_database(&mut self, database: &str) -> Result<()> {
        let listed = self.executor()?.list_tables(database);
        // The context may have switched even when the listing failed
        if self.current_database() == Some(database) {
            self.databases.select_named(database);
            self.current_table = None;
            self.tables.set_items(Vec::new());
        }
        let tables = listed?;
        self.status = format!("{}: {} tables", database, tables.len());
        self.tables.set_items(tables);
        Ok(())
    }

    /// Shows every row of `table` in the grid.
    pub fn select_table(&mut self, table: &str) -> Result<()> {
        let started = Instant::now();
        let result = self.executor()?.fetch_all(table)?;
        self.tables.select_named(table);
        self.current_table = Some(table.to_string());
        self.show_result(&result);
        self.status = format!(
            "{}: {} rows, {} columns ({} ms) at {}",
            table,
            result.row_count(),
            result.column_count(),
            started.elapsed().as_millis(),
            timestamp()
        );
        Ok(())
    }

    /// Re-reads the configured table, or the last table picked when none
    /// is configured.
    pub fn view_all(&mut self) -> Result<()> {
        match self.configured_table.clone().or_else(|| self.current_table.clone()) {
            Some(table) => self.select_table(&table),
            None => Err(ViewerError::Query("No table selected".to_string())),
        }
    }

    /// Runs the editor text.
    pub fn run_editor_query(&mut self) -> Result<()> {
        let text = self.editor.get_query().to_string();
        let started = Instant::now();
        let outcome = self.executor()?.run_query(&text)?;
        let elapsed = started.elapsed().as_millis();
        match outcome {
            QueryOutcome::Rows(result) => {
                self.current_table = None;
                self.show_result(&result);
                self.status = format!(
                    "Query returned {} rows ({} ms) at {}",
                    result.row_count(),
                    elapsed,
                    timestamp()
                );
            }
            QueryOutcome::Command(result) => {
                self.status = format!(
                    "Statement committed, {} rows affected ({} ms) at {}",
                    result.rows_affected,
                    elapsed,
                    timestamp()
                );
            }
        }
        Ok(())
    }

    pub fn cycle_theme(&mut self) {
        self.theme = Theme::new(self.theme.name.next());
        self.status = format!("Theme: {}", self.theme.name);
    }

    fn show_result(&mut self, result: &ResultSet) {
        self.grid.populate(&result.columns, &result.rows);
    }

    pub fn quit(&mut self) {
        if let Some(executor) = self.executor.as_mut() {
            executor.close();
        }
        self.running = false;
    }

    /// Applies one key press.
    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.kind == KeyEventKind::Release {
            return;
        }
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        if self.dialog.is_some() {
            match key.code {
                KeyCode::Esc | KeyCode::Enter => self.dismiss_dialog(),
                KeyCode::Char('q') if ctrl => self.quit(),
                _ => {}
            }
            return;
        }

        let result = match key.code {
            KeyCode::Char('q') if ctrl => {
                self.quit();
                Ok(())
            }
            KeyCode::F(5) => self.run_editor_query(),
            KeyCode::Char('r') if ctrl => self.run_editor_query(),
            KeyCode::F(2) => self.view_all(),
            KeyCode::F(3) => self.refresh_databases(),
            KeyCode::Char('t') if ctrl => {
                self.cycle_theme();
                Ok(())
            }
            KeyCode::Char('l') if ctrl => {
                self.editor.clear();
                Ok(())
            }
            KeyCode::Tab => {
                self.focus = self.focus.next();
                Ok(())
            }
            KeyCode::BackTab => {
                self.focus = self.focus.previous();
                Ok(())
            }
            _ => self.handle_focused_key(key),
        };
        if let Err(e) = result {
            self.report(e);
        }
    }

    fn handle_focused_key(&mut self, key: KeyEvent) -> Result<()> {
        match self.focus {
            Focus::Databases => match key.code {
                KeyCode::Up => self.databases.move_by(-1),
                KeyCode::Down => self.databases.move_by(1),
                KeyCode::Enter => {
                    if let Some(db) = self.databases.current().map(str::to_string) {
                        self.select_database(&db)?;
                        self.focus = Focus::Tables;
                    }
                }
                _ => {}
            },
            Focus::Tables => match key.code {
                KeyCode::Up => self.tables.move_by(-1),
                KeyCode::Down => self.tables.move_by(1),
                KeyCode::Enter => {
                    if let Some(table) = self.tables.current().map(str::to_string) {
                        self.select_table(&table)?;
                    }
                }
                _ => {}
            },
            Focus::Editor => match key.code {
                KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                    self.editor.insert_char(c)
                }
                KeyCode::Enter => self.editor.insert_newline(),
                KeyCode::Backspace => self.editor.backspace(),
                KeyCode::Delete => self.editor.delete(),
                KeyCode::Left => self.editor.move_left(),
                KeyCode::Right => self.editor.move_right(),
                KeyCode::Up => self.editor.move_up(),
                KeyCode::Down => self.editor.move_down(),
                KeyCode::Home => self.editor.move_home(),
                KeyCode::End => self.editor.move_end(),
                _ => {}
            },
            Focus::Grid => match key.code {
                KeyCode::Up => self.grid.move_selection(-1),
                KeyCode::Down => self.grid.move_selection(1),
                KeyCode::PageUp => self.grid.move_selection(-PAGE_ROWS),
                KeyCode::PageDown => self.grid.move_selection(PAGE_ROWS),
                KeyCode::Home => self.grid.select_first(),
                KeyCode::End => self.grid.select_last(),
                _ => {}
            },
        }
        Ok(())
    }

    /// Key hints for the status line.
    pub fn tips(&self) -> &'static str {
        match self.focus {
            Focus::Databases | Focus::Tables => "Enter open  Tab focus  F5 run  F2 view all  ^T theme  ^Q quit",
            Focus::Editor => "F5/^R run  ^L clear  Tab focus  ^T theme  ^Q quit",
            Focus::Grid => "↑↓ PgUp PgDn scroll  F2 view all  Tab focus  ^Q quit",
        }
    }
}

fn timestamp() -> String {
    Local::now().format("%H:%M:%S").to_string()
}
