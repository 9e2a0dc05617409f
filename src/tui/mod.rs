//! Terminal User Interface for sqlview.
//!
//! Provides the main loop using ratatui and crossterm. Everything, database
//! calls included, runs on this one thread: a slow query freezes the screen
//! until it returns.

mod events;
pub mod ui;

pub use events::{Event, EventHandler};

use crate::app::App;
use crate::core::db::Session;
use crate::core::{Result, ViewerError};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, Stdout};
use std::panic;
use tracing::{debug, info};

/// The main TUI application runner.
pub struct Tui {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    event_handler: EventHandler,
}

impl Tui {
    /// Creates a new TUI instance, initializing the terminal.
    pub fn new() -> Result<Self> {
        let terminal = Self::setup_terminal()?;
        Ok(Self {
            terminal,
            event_handler: EventHandler::new(),
        })
    }

    /// Sets up the terminal for TUI rendering.
    fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
        enable_raw_mode().map_err(|e| ViewerError::Ui(format!("Failed to enable raw mode: {e}")))?;

        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)
            .map_err(|e| ViewerError::Ui(format!("Failed to enter alternate screen: {e}")))?;

        Terminal::new(CrosstermBackend::new(stdout))
            .map_err(|e| ViewerError::Ui(format!("Failed to create terminal: {e}")))
    }

    /// Restores the terminal to its original state.
    fn restore_terminal(&mut self) -> Result<()> {
        disable_raw_mode().map_err(|e| ViewerError::Ui(format!("Failed to disable raw mode: {e}")))?;
        execute!(self.terminal.backend_mut(), LeaveAlternateScreen)
            .map_err(|e| ViewerError::Ui(format!("Failed to leave alternate screen: {e}")))?;
        self.terminal
            .show_cursor()
            .map_err(|e| ViewerError::Ui(format!("Failed to show cursor: {e}")))?;
        Ok(())
    }

    /// Runs the event loop until the app stops.
    pub fn run<S: Session>(&mut self, app: &mut App<S>) -> Result<()> {
        // Restore the terminal before the panic message is printed
        let original_hook = panic::take_hook();
        panic::set_hook(Box::new(move |panic_info| {
            let _ = disable_raw_mode();
            let _ = execute!(io::stdout(), LeaveAlternateScreen);
            original_hook(panic_info);
        }));

        info!("entering main loop");
        let outcome = self.event_loop(app);
        let restored = self.restore_terminal();
        info!("left main loop");
        outcome.and(restored)
    }

    fn event_loop<S: Session>(&mut self, app: &mut App<S>) -> Result<()> {
        while app.running {
            self.terminal
                .draw(|frame| ui::render(frame, app))
                .map_err(|e| ViewerError::Ui(format!("Failed to draw: {e}")))?;

            match self.event_handler.next()? {
                Event::Key(key) => app.handle_key(key),
                Event::Resize(width, height) => debug!(width, height, "terminal resized"),
                Event::Tick => {}
            }
        }
        Ok(())
    }
}
