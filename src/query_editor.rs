// Query Editor Module for sqlview
//
// A multi-line text buffer with a character cursor. Every edit re-runs the
// highlighter over the whole buffer and keeps the resulting spans for drawing.

use crate::highlight::{HighlightSpan, Highlighter};

#[derive(Debug, Default)]
pub struct QueryEditor {
    query_buffer: String,
    /// Cursor position in characters from the start of the buffer
    cursor: usize,
    highlighter: Highlighter,
    spans: Vec<HighlightSpan>,
}

impl QueryEditor {
    /// Creates a new instance of QueryEditor.
    pub fn new() -> Self {
        QueryEditor::default()
    }

    /// Sets the query text in the editor and moves the cursor to its end.
    pub fn set_query(&mut self, query: &str) {
        self.query_buffer = query.to_string();
        self.cursor = self.char_len();
        self.rehighlight();
    }

    /// Returns the current query text.
    pub fn get_query(&self) -> &str {
        &self.query_buffer
    }

    /// Clears the query buffer.
    pub fn clear(&mut self) {
        self.query_buffer.clear();
        self.cursor = 0;
        self.rehighlight();
    }

    pub fn is_empty(&self) -> bool {
        self.query_buffer.trim().is_empty()
    }

    /// Spans for the current text.
    pub fn spans(&self) -> &[HighlightSpan] {
        &self.spans
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Cursor as (line, column), both zero based and counted in characters.
    pub fn cursor_line_col(&self) -> (usize, usize) {
        let before: String = self.query_buffer.chars().take(self.cursor).collect();
        let line = before.matches('\n').count();
        let col = before.rsplit('\n').next().map(|s| s.chars().count()).unwrap_or(0);
        (line, col)
    }

    pub fn insert_char(&mut self, c: char) {
        let at = self.byte_offset(self.cursor);
        self.query_buffer.insert(at, c);
        self.cursor += 1;
        self.rehighlight();
    }

    pub fn insert_newline(&mut self) {
        self.insert_char('\n');
    }

    /// Deletes the character before the cursor.
    pub fn backspace(&mut self) {
        if self.cursor == 0 {
            return;
        }
        self.cursor -= 1;
        let at = self.byte_offset(self.cursor);
        self.query_buffer.remove(at);
        self.rehighlight();
    }

    /// Deletes the character under the cursor.
    pub fn delete(&mut self) {
        if self.cursor >= self.char_len() {
            return;
        }
        let at = self.byte_offset(self.cursor);
        self.query_buffer.remove(at);
        self.rehighlight();
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.char_len());
    }

    pub fn move_home(&mut self) {
        let (line, _) = self.cursor_line_col();
        self.cursor = self.line_start(line);
    }

    pub fn move_end(&mut self) {
        let (line, _) = self.cursor_line_col();
        self.cursor = self.line_start(line) + self.line_len(line);
    }

    pub fn move_up(&mut self) {
        let (line, col) = self.cursor_line_col();
        if line > 0 {
            self.cursor = self.line_start(line - 1) + col.min(self.line_len(line - 1));
        }
    }

    pub fn move_down(&mut self) {
        let (line, col) = self.cursor_line_col();
        if line + 1 < self.line_count() {
            self.cursor = self.line_start(line + 1) + col.min(self.line_len(line + 1));
        }
    }

    fn rehighlight(&mut self) {
        self.spans = self.highlighter.highlight(&self.query_buffer);
    }

    fn char_len(&self) -> usize {
        self.query_buffer.chars().count()
    }

    fn byte_offset(&self, char_idx: usize) -> usize {
        self.query_buffer
            .char_indices()
            .nth(char_idx)
            .map(|(i, _)| i)
            .unwrap_or(self.query_buffer.len())
    }

    fn line_count(&self) -> usize {
        self.query_buffer.split('\n').count()
    }

    fn line_len(&self, line: usize) -> usize {
        self.query_buffer
            .split('\n')
            .nth(line)
            .map(|l| l.chars().count())
            .unwrap_or(0)
    }

    fn line_start(&self, line: usize) -> usize {
        self.query_buffer
            .split('\n')
            .take(line)
            .map(|l| l.chars().count() + 1)
            .sum()
    }
}
