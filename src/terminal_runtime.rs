use std::io;
use std::panic;
use std::sync::Once;

use crossterm::cursor::{Hide, Show};
use crossterm::execute;
use crossterm::terminal::{
    self, EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

use crate::config::GridSize;
use crate::game::GameState;
use crate::renderer::{self, HudInfo};

type BoardTerminal = Terminal<CrosstermBackend<io::Stdout>>;

static PANIC_HOOK: Once = Once::new();

/// Raw-mode, alternate-screen terminal sized for one board.
///
/// The screen is handed back on drop and from the panic hook.
pub struct TerminalSession {
    terminal: BoardTerminal,
}

impl TerminalSession {
    /// Takes over the terminal for a `grid`-sized board.
    ///
    /// Fails before touching the screen when the window is too small for the board.
    pub fn enter(grid: GridSize) -> io::Result<Self> {
        ensure_fits(grid, terminal::size()?)?;
        install_restore_on_panic();

        enable_raw_mode()?;
        match open_board() {
            Ok(terminal) => Ok(Self { terminal }),
            Err(error) => {
                leave_board();
                Err(error)
            }
        }
    }

    /// Draws one frame of the board.
    pub fn draw(&mut self, state: &GameState, hud: HudInfo) -> io::Result<()> {
        self.terminal
            .draw(|frame| renderer::render(frame, state, hud))
            .map(|_| ())
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        leave_board();
    }
}

/// Columns and rows the renderer needs: the grid, its border, and the header line.
#[must_use]
pub fn board_footprint(grid: GridSize) -> (u16, u16) {
    (grid.cols.saturating_add(2), grid.rows.saturating_add(3))
}

fn ensure_fits(grid: GridSize, (width, height): (u16, u16)) -> io::Result<()> {
    let (needed_width, needed_height) = board_footprint(grid);
    if width < needed_width || height < needed_height {
        return Err(io::Error::other(format!(
            "terminal is {width}x{height}, a {}x{} board needs {needed_width}x{needed_height}",
            grid.cols, grid.rows
        )));
    }

    Ok(())
}

fn open_board() -> io::Result<BoardTerminal> {
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, Hide)?;
    Terminal::new(CrosstermBackend::new(stdout))
}

fn leave_board() {
    let _ = disable_raw_mode();
    let _ = execute!(io::stdout(), Show, LeaveAlternateScreen);
}

fn install_restore_on_panic() {
    PANIC_HOOK.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            leave_board();
            previous(info);
        }));
    });
}
