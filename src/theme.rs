//! Color themes for the viewer.

use crate::highlight::TokenClass;
use ratatui::style::{Color, Modifier, Style};
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeName {
    /// White text panels on a light blue background
    #[default]
    Classic,
    Dark,
    Light,
}

impl ThemeName {
    pub const ALL: [ThemeName; 3] = [ThemeName::Classic, ThemeName::Dark, ThemeName::Light];

    /// The theme after this one, wrapping around.
    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|t| *t == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ThemeName::Classic => "classic",
            ThemeName::Dark => "dark",
            ThemeName::Light => "light",
        }
    }
}

impl fmt::Display for ThemeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ThemeName {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "classic" => Ok(ThemeName::Classic),
            "dark" => Ok(ThemeName::Dark),
            "light" => Ok(ThemeName::Light),
            _ => Err(format!(
                "Unknown theme: '{}'. Expected: classic, dark, or light",
                s
            )),
        }
    }
}

/// Palette used by every widget.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Theme {
    pub name: ThemeName,
    pub background: Color,
    pub foreground: Color,
    pub border: Color,
    pub focused_border: Color,
    pub header: Style,
    pub selection: Style,
    pub status: Style,
    pub error: Color,
    pub keyword: Style,
    pub string: Style,
    pub number: Style,
    pub comment: Style,
}

impl Theme {
    pub fn new(name: ThemeName) -> Self {
        match name {
            ThemeName::Classic => Theme {
                name,
                background: Color::Rgb(173, 216, 230),
                foreground: Color::Black,
                border: Color::Rgb(70, 110, 140),
                focused_border: Color::Rgb(0, 100, 0),
                header: Style::default()
                    .fg(Color::White)
                    .bg(Color::Rgb(0, 128, 0))
                    .add_modifier(Modifier::BOLD),
                selection: Style::default().bg(Color::Rgb(0, 120, 215)).fg(Color::White),
                status: Style::default().fg(Color::Black).bg(Color::Rgb(200, 230, 240)),
                error: Color::Red,
                keyword: Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
                string: Style::default().fg(Color::Rgb(163, 21, 21)),
                number: Style::default().fg(Color::Rgb(9, 134, 88)),
                comment: Style::default()
                    .fg(Color::Rgb(0, 128, 0))
                    .add_modifier(Modifier::ITALIC),
            },
            ThemeName::Dark => Theme {
                name,
                background: Color::Rgb(30, 30, 30),
                foreground: Color::Rgb(212, 212, 212),
                border: Color::DarkGray,
                focused_border: Color::Cyan,
                header: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                selection: Style::default().bg(Color::Rgb(38, 79, 120)),
                status: Style::default().fg(Color::Gray).bg(Color::Rgb(0, 122, 204)),
                error: Color::LightRed,
                keyword: Style::default()
                    .fg(Color::Rgb(86, 156, 214))
                    .add_modifier(Modifier::BOLD),
                string: Style::default().fg(Color::Rgb(206, 145, 120)),
                number: Style::default().fg(Color::Rgb(181, 206, 168)),
                comment: Style::default()
                    .fg(Color::Rgb(106, 153, 85))
                    .add_modifier(Modifier::ITALIC),
            },
            ThemeName::Light => Theme {
                name,
                background: Color::White,
                foreground: Color::Black,
                border: Color::Gray,
                focused_border: Color::Blue,
                header: Style::default().fg(Color::Black).add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
                selection: Style::default().bg(Color::Rgb(173, 214, 255)),
                status: Style::default().fg(Color::White).bg(Color::DarkGray),
                error: Color::Red,
                keyword: Style::default().fg(Color::Rgb(0, 0, 255)),
                string: Style::default().fg(Color::Rgb(163, 21, 21)),
                number: Style::default().fg(Color::Rgb(9, 134, 88)),
                comment: Style::default().fg(Color::Rgb(0, 128, 0)),
            },
        }
    }

    /// Base style for panels.
    pub fn base(&self) -> Style {
        Style::default().fg(self.foreground).bg(self.background)
    }

    /// Style for a highlighted token, on top of the base style.
    pub fn token(&self, class: TokenClass) -> Style {
        let style = match class {
            TokenClass::Keyword => self.keyword,
            TokenClass::String => self.string,
            TokenClass::Number => self.number,
            TokenClass::Comment => self.comment,
        };
        self.base().patch(style)
    }
}

impl Default for Theme {
    fn default() -> Self {
        Theme::new(ThemeName::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_cycles_through_all_themes() {
        let mut name = ThemeName::Classic;
        let mut seen = vec![name];
        for _ in 0..ThemeName::ALL.len() - 1 {
            name = name.next();
            seen.push(name);
        }
        assert_eq!(seen, ThemeName::ALL.to_vec());
        assert_eq!(name.next(), ThemeName::Classic);
    }

    #[test]
    fn test_from_str() {
        assert_eq!("Dark".parse::<ThemeName>().unwrap(), ThemeName::Dark);
        let err = "neon".parse::<ThemeName>().unwrap_err();
        assert!(err.contains("neon"));
    }

    #[test]
    fn test_token_styles_differ() {
        let theme = Theme::new(ThemeName::Dark);
        assert_ne!(theme.token(TokenClass::Keyword), theme.token(TokenClass::Comment));
        assert_eq!(theme.token(TokenClass::String).bg, Some(theme.background));
    }
}
