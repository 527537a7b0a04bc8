use std::io::BufWriter;
use std::io::Result;
use std::io::Stdout;
use std::io::stdout;

use crossterm::cursor::MoveTo;
use crossterm::event::DisableBracketedPaste;
use crossterm::event::DisableFocusChange;
use crossterm::event::EnableBracketedPaste;
use crossterm::event::EnableFocusChange;
use crossterm::terminal::Clear;
use crossterm::terminal::ClearType;
use crossterm::terminal::EnterAlternateScreen;
use crossterm::terminal::LeaveAlternateScreen;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::crossterm::execute;
use ratatui::crossterm::terminal::disable_raw_mode;
use ratatui::crossterm::terminal::enable_raw_mode;

/// A type alias for the terminal type used in this application
pub type Tui = Terminal<CrosstermBackend<BufWriter<Stdout>>>;

/// Enter the alternate screen in raw mode with paste and focus reporting.
pub fn init() -> Result<Tui> {
    execute!(stdout(), EnableBracketedPaste)?;
    execute!(stdout(), EnterAlternateScreen)?;
    enable_raw_mode()?;
    // Not every terminal reports focus changes; Tab still blurs without it.
    let _ = execute!(stdout(), EnableFocusChange);
    set_panic_hook();
    execute!(stdout(), Clear(ClearType::All), MoveTo(0, 0))?;

    let backend = CrosstermBackend::new(BufWriter::new(stdout()));
    Terminal::new(backend)
}

fn set_panic_hook() {
    let hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = restore(); // ignore any errors as we are already failing
        hook(panic_info);
    }));
}

/// Restore the terminal to its original state
pub fn restore() -> Result<()> {
    let _ = execute!(stdout(), DisableFocusChange);
    execute!(stdout(), DisableBracketedPaste)?;
    disable_raw_mode()?;
    execute!(stdout(), LeaveAlternateScreen)?;
    Ok(())
}
