// Core infrastructure modules
pub mod config;
pub mod core;
pub mod logging;

// Feature-specific modules
pub mod app;
pub mod cli;
pub mod highlight;
pub mod query_editor;
pub mod results_grid;
pub mod theme;
pub mod tui;

#[cfg(test)]
mod test_utils;
