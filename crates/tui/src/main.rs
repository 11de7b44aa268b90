mod app;
mod config;
mod events;
mod logging;
mod strings;
mod terminal;
mod theme;
mod ui;

use anyhow::Result;
use terminal::TerminalGuard;

fn main() -> Result<()> {
    let _log_guard = logging::init()?;
    let config = config::load()?;
    let mut app = app::App::new(&config)?;
    let mut term = TerminalGuard::new()?;
    let result = events::run(&mut term.terminal, &mut app);
    if let Err(e) = &result {
        tracing::error!(target: "tui", error = %e, "event loop failed");
    }
    result
}
