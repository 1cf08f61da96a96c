//! Terminal host for modal components
//!
//! The demo application mounts a modal provider, renders whatever the
//! placeholder and creators decide to mount, and routes keys to the topmost
//! visible modal.

mod app;
mod dialogs;
mod events;
mod keys;
mod layout;

pub use app::App;
pub use dialogs::{AboutPanel, ConfirmDialog, InfoDialog};
pub use events::{Event, EventHandler};
pub use keys::KeyMap;
pub use layout::centered;

use crate::config::Config;
use anyhow::Result;
use crossterm::execute;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use std::io;
use std::time::Duration;

pub type Backend = CrosstermBackend<io::Stdout>;
pub type Frame<'a> = ratatui::Frame<'a>;

/// Initialize the terminal for TUI mode
pub fn init_terminal() -> Result<Terminal<Backend>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

/// Restore the terminal to normal mode
pub fn restore_terminal(terminal: &mut Terminal<Backend>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

/// Main TUI entry point
pub async fn run(config: &Config) -> Result<()> {
    let mut event_handler = EventHandler::new(Duration::from_millis(config.tui.tick_rate_ms));
    let mut app = App::new(config, event_handler.sender())?;
    let mut terminal = init_terminal()?;

    let result = run_app(&mut terminal, &mut app, &mut event_handler).await;

    restore_terminal(&mut terminal)?;
    result
}

/// Main application loop
async fn run_app(terminal: &mut Terminal<Backend>, app: &mut App, event_handler: &mut EventHandler) -> Result<()> {
    loop {
        terminal.draw(|frame| app.render(frame))?;

        if let Some(event) = event_handler.next().await {
            if app.handle_event(event).await? {
                break; // Exit requested
            }
        }
    }
    Ok(())
}
