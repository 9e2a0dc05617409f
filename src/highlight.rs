//! SQL syntax highlighting for the query editor.
//!
//! Four independent regex passes run over the whole text in a fixed order:
//! keywords, string literals, numeric literals, line comments. Each pass
//! reports its own spans; nothing stops a later pass from covering a region
//! an earlier pass already claimed (a keyword inside a string literal, a
//! number inside a comment). When spans are flattened for display the later
//! pass wins, so comments override everything and strings override keywords.
//!
//! The scan is linear in the length of the text and keeps no state between
//! calls, so it is simply re-run after every edit.

use once_cell::sync::Lazy;
use regex::Regex;
use std::ops::Range;

/// Reserved words styled as keywords. Matching ignores case.
pub const SQL_KEYWORDS: &[&str] = &[
    "ADD", "ALL", "ALTER", "AND", "ANY", "AS", "ASC", "BEGIN", "BETWEEN", "BY", "CASE", "CHECK",
    "COLUMN", "COMMIT", "CONSTRAINT", "CREATE", "CROSS", "DATABASE", "DECLARE", "DEFAULT",
    "DELETE", "DESC", "DISTINCT", "DROP", "ELSE", "END", "EXEC", "EXISTS", "FOREIGN", "FROM",
    "FULL", "GROUP", "HAVING", "IN", "INDEX", "INNER", "INSERT", "INTO", "IS", "JOIN", "KEY",
    "LEFT", "LIKE", "NOT", "NULL", "ON", "OR", "ORDER", "OUTER", "PRIMARY", "PROCEDURE",
    "REFERENCES", "RIGHT", "ROLLBACK", "SELECT", "SET", "TABLE", "THEN", "TOP", "TRANSACTION",
    "TRUNCATE", "UNION", "UNIQUE", "UPDATE", "USE", "VALUES", "VIEW", "WHEN", "WHERE", "WITH",
];

/// Lexical class of a highlighted span, in pass order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TokenClass {
    Keyword,
    String,
    Number,
    Comment,
}

impl TokenClass {
    /// Every class in the order its pass runs.
    pub const PASS_ORDER: [TokenClass; 4] = [
        TokenClass::Keyword,
        TokenClass::String,
        TokenClass::Number,
        TokenClass::Comment,
    ];
}

/// A styled region of the editor text.
///
/// `start` and `end` count characters from the start of the document; `end`
/// is exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HighlightSpan {
    pub class: TokenClass,
    pub start: usize,
    pub end: usize,
}

impl HighlightSpan {
    pub fn overlaps(&self, other: &HighlightSpan) -> bool {
        self.start < other.end && other.start < self.end
    }
}

static KEYWORD_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"(?i)\b(?:{})\b", SQL_KEYWORDS.join("|"))).expect("keyword pattern")
});
// No escape handling: a quote always ends the literal.
static STRING_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r#"'[^']*'|"[^"]*""#).expect("string pattern"));
static NUMBER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\d+(?:\.\d+)?\b").expect("number pattern"));
static COMMENT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"--[^\n]*").expect("comment pattern"));

fn pattern(class: TokenClass) -> &'static Regex {
    match class {
        TokenClass::Keyword => &KEYWORD_RE,
        TokenClass::String => &STRING_RE,
        TokenClass::Number => &NUMBER_RE,
        TokenClass::Comment => &COMMENT_RE,
    }
}

/// Maps byte offsets of one text to character offsets.
struct CharIndex {
    /// Byte offset of every char boundary, including the end of the text
    boundaries: Vec<usize>,
}

impl CharIndex {
    fn new(text: &str) -> Self {
        let mut boundaries: Vec<usize> = text.char_indices().map(|(i, _)| i).collect();
        boundaries.push(text.len());
        CharIndex { boundaries }
    }

    fn char_offset(&self, byte: usize) -> usize {
        // Regex matches always start and end on char boundaries
        self.boundaries.binary_search(&byte).unwrap_or_else(|i| i)
    }
}

/// Computes highlight spans for the query editor.
#[derive(Debug, Default, Clone, Copy)]
pub struct Highlighter;

impl Highlighter {
    pub fn new() -> Self {
        Highlighter
    }

    /// Runs every pass over `text` and returns all spans, grouped by pass in
    /// pass order and by position within a pass.
    ///
    /// The result replaces any spans computed for earlier text.
    pub fn highlight(&self, text: &str) -> Vec<HighlightSpan> {
        let index = CharIndex::new(text);
        let mut spans = Vec::new();
        for class in TokenClass::PASS_ORDER {
            spans.extend(pattern(class).find_iter(text).map(|m| HighlightSpan {
                class,
                start: index.char_offset(m.start()),
                end: index.char_offset(m.end()),
            }));
        }
        spans
    }

    /// Spans of a single class, in position order.
    pub fn spans_of(&self, text: &str, class: TokenClass) -> Vec<HighlightSpan> {
        self.highlight(text)
            .into_iter()
            .filter(|s| s.class == class)
            .collect()
    }
}

/// Flattens spans to one class per character of a text `len` chars long.
///
/// Spans are applied in the order given, so a later span overwrites the
/// class of any character an earlier span covered.
pub fn resolve(len: usize, spans: &[HighlightSpan]) -> Vec<Option<TokenClass>> {
    let mut classes = vec![None; len];
    for span in spans {
        let end = span.end.min(len);
        for slot in classes.iter_mut().take(end).skip(span.start) {
            *slot = Some(span.class);
        }
    }
    classes
}

/// Groups the characters of `text` into maximal runs sharing one class.
///
/// The ranges are character offsets and together cover the whole text.
pub fn styled_runs(text: &str, spans: &[HighlightSpan]) -> Vec<(Option<TokenClass>, Range<usize>)> {
    let classes = resolve(text.chars().count(), spans);
    let mut runs: Vec<(Option<TokenClass>, Range<usize>)> = Vec::new();
    for (i, class) in classes.into_iter().enumerate() {
        match runs.last_mut() {
            Some((current, range)) if *current == class => range.end = i + 1,
            _ => runs.push((class, i..i + 1)),
        }
    }
    runs
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(text: &str, spans: &[HighlightSpan]) -> Vec<String> {
        let chars: Vec<char> = text.chars().collect();
        spans
            .iter()
            .map(|s| chars[s.start..s.end].iter().collect())
            .collect()
    }

    #[test]
    fn test_keywords_and_comment_do_not_overlap() {
        let text = "SELECT * FROM foo -- comment";
        let spans = Highlighter::new().highlight(text);

        let keywords: Vec<_> = spans.iter().filter(|s| s.class == TokenClass::Keyword).copied().collect();
        let comments: Vec<_> = spans.iter().filter(|s| s.class == TokenClass::Comment).copied().collect();

        assert_eq!(texts(text, &keywords), vec!["SELECT", "FROM"]);
        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0].start, 18);
        assert_eq!(comments[0].end, text.chars().count());
        for k in &keywords {
            assert!(!k.overlaps(&comments[0]));
        }
    }

    #[test]
    fn test_keywords_are_case_insensitive_and_word_bounded() {
        let text = "select Name from selection where fromage = 1";
        let spans = Highlighter::new().spans_of(text, TokenClass::Keyword);
        assert_eq!(texts(text, &spans), vec!["select", "from", "where"]);
    }

    #[test]
    fn test_string_literals_without_escapes() {
        let text = r#"WHERE a = 'it''s' AND b = "x""#;
        let spans = Highlighter::new().spans_of(text, TokenClass::String);
        assert_eq!(texts(text, &spans), vec!["'it'", "'s'", "\"x\""]);
    }

    #[test]
    fn test_numbers() {
        let text = "TOP 10 WHERE price > 3.75 AND code = x42";
        let spans = Highlighter::new().spans_of(text, TokenClass::Number);
        assert_eq!(texts(text, &spans), vec!["10", "3.75"]);
    }

    #[test]
    fn test_comment_stops_at_end_of_line() {
        let text = "-- first\nSELECT 1";
        let spans = Highlighter::new().spans_of(text, TokenClass::Comment);
        assert_eq!(texts(text, &spans), vec!["-- first"]);
    }

    #[test]
    fn test_later_pass_wins() {
        // The keyword inside the string is still reported, but displays as a string
        let text = "'select' -- 42";
        let spans = Highlighter::new().highlight(text);
        assert!(spans.iter().any(|s| s.class == TokenClass::Keyword));
        assert!(spans.iter().any(|s| s.class == TokenClass::Number));

        let classes = resolve(text.chars().count(), &spans);
        assert_eq!(classes[1], Some(TokenClass::String));
        assert_eq!(classes[12], Some(TokenClass::Comment));
        assert_eq!(classes[8], None);
    }

    #[test]
    fn test_offsets_are_characters() {
        let text = "-- héllo\nSELECT 'ü'";
        let spans = Highlighter::new().highlight(text);
        let keyword = spans.iter().find(|s| s.class == TokenClass::Keyword).unwrap();
        assert_eq!((keyword.start, keyword.end), (9, 15));
        assert_eq!(texts(text, &spans[..1]), vec!["SELECT"]);
    }

    #[test]
    fn test_highlight_is_idempotent() {
        let h = Highlighter::new();
        let text = "UPDATE t SET a = 'x', b = 2 -- done";
        assert_eq!(h.highlight(text), h.highlight(text));
    }

    #[test]
    fn test_styled_runs_cover_text() {
        let text = "SELECT 1";
        let spans = Highlighter::new().highlight(text);
        let runs = styled_runs(text, &spans);
        assert_eq!(
            runs,
            vec![
                (Some(TokenClass::Keyword), 0..6),
                (None, 6..7),
                (Some(TokenClass::Number), 7..8),
            ]
        );
        assert!(styled_runs("", &[]).is_empty());
    }
}
