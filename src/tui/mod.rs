pub mod app;
pub mod components;
pub mod events;
pub mod theme;

pub use app::App;
pub use events::{Event, EventHandler};
pub use theme::Theme;

use crossterm::{
    cursor::Show,
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::app::AppState;
use crate::error::Result;

/// Raw mode and alternate screen for as long as it lives.
struct TerminalGuard;

impl TerminalGuard {
    fn enter() -> Result<Self> {
        enable_raw_mode()?;
        execute!(io::stdout(), EnterAlternateScreen)?;
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), Show, LeaveAlternateScreen);
    }
}

/// Runs the landing page with its chat widget until the user quits.
pub async fn run(state: AppState) -> Result<()> {
    let manager = Arc::new(state.build_chat_manager()?);
    let tick_rate = Duration::from_millis(state.get_config().ui.tick_rate_ms);
    let mut events = EventHandler::new(tick_rate);
    let mut app = App::new(&state, manager, events.sender());

    let _guard = TerminalGuard::enter()?;
    let mut terminal = Terminal::new(CrosstermBackend::new(io::stdout()))?;
    terminal.clear()?;

    info!("TUI started");
    terminal.draw(|frame| app.render(frame))?;

    loop {
        let Some(event) = events.next().await else {
            continue;
        };
        app.handle_event(event);
        if app.should_quit() {
            break;
        }
        terminal.draw(|frame| app.render(frame))?;
    }

    info!("TUI stopped");
    Ok(())
}
