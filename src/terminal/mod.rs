use std::io::{self, Write};

use crossterm::{
    QueueableCommand,
    cursor::{Hide, MoveTo, Show},
    execute,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen},
};
use minesweeper_common::{
    models::{Cell, GRID_COLS, Pos},
    protocol::BoardView,
};
use tracing::debug;

/// Rows reserved for the HUD above the board.
pub const HUD_HEIGHT: u16 = 5;

const TITLE: &str = "MINESWEEPER";
const HELP: &str = "Move-(arrows)    Click-(enter)    Flag-(f)    Restart-(r)    Quit-(q)";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tone {
    Plain,
    Success,
    Danger,
}

/// A centered line of a full-screen message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Banner {
    pub text: String,
    pub tone: Tone,
}

impl Banner {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            tone: Tone::Plain,
        }
    }

    pub fn success(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            tone: Tone::Success,
        }
    }

    pub fn danger(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            tone: Tone::Danger,
        }
    }
}

/// Output side of the game. Implementations only draw; they never touch game state.
pub trait Renderer {
    /// Current `(columns, rows)` of the drawing surface.
    fn viewport(&self) -> io::Result<(u16, u16)>;
    fn draw_board(&mut self, view: &BoardView) -> io::Result<()>;
    fn draw_hud(&mut self, view: &BoardView) -> io::Result<()>;
    fn draw_message(&mut self, lines: &[Banner]) -> io::Result<()>;
    fn draw_prompt(&mut self, prompt: &str, input: &str) -> io::Result<()>;
}

/// Column where a string of `len` characters starts when centered in `width`.
fn centered(width: u16, len: usize) -> u16 {
    (width / 2).saturating_sub((len / 2) as u16)
}

/// Left edge of the board: two columns per tile, centered.
pub fn board_origin(width: u16) -> u16 {
    (width / 2).saturating_sub(GRID_COLS as u16)
}

fn glyph(cell: Cell, triggered: bool) -> (char, Color) {
    match cell {
        Cell::Hidden => ('-', Color::Reset),
        Cell::Flagged => ('F', Color::Blue),
        Cell::Revealed { adjacent } => (char::from(b'0' + adjacent), Color::Reset),
        Cell::Bomb if triggered => ('X', Color::Red),
        Cell::Bomb => ('X', Color::Reset),
    }
}

fn tone_color(tone: Tone) -> Color {
    match tone {
        Tone::Plain => Color::Reset,
        Tone::Success => Color::Green,
        Tone::Danger => Color::Red,
    }
}

/// Draws with crossterm commands onto any writer, normally stdout.
pub struct CrosstermRenderer<W: Write> {
    out: W,
}

impl<W: Write> CrosstermRenderer<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    fn print_at(&mut self, x: u16, y: u16, text: &str, color: Color) -> io::Result<()> {
        self.out
            .queue(MoveTo(x, y))?
            .queue(SetForegroundColor(color))?
            .queue(Print(text))?
            .queue(ResetColor)?;
        Ok(())
    }

    fn queue_hud(&mut self, view: &BoardView, width: u16) -> io::Result<()> {
        for y in 0..HUD_HEIGHT {
            self.out.queue(MoveTo(0, y))?.queue(Clear(ClearType::CurrentLine))?;
        }

        self.print_at(centered(width, TITLE.len()), 1, TITLE, Color::Reset)?;
        let hud = view.hud_line();
        self.print_at(centered(width, hud.len()), 3, &hud, Color::Reset)
    }

    fn place_cursor(&mut self, view: &BoardView, width: u16) -> io::Result<()> {
        let x = board_origin(width) + (view.cursor.x as u16) * 2;
        let y = HUD_HEIGHT + view.cursor.y as u16;
        self.out.queue(MoveTo(x, y))?.queue(Show)?;
        Ok(())
    }
}

impl<W: Write> Renderer for CrosstermRenderer<W> {
    fn viewport(&self) -> io::Result<(u16, u16)> {
        terminal::size()
    }

    fn draw_board(&mut self, view: &BoardView) -> io::Result<()> {
        let (width, _) = self.viewport()?;
        let origin = board_origin(width);

        self.out.queue(Clear(ClearType::All))?;
        self.queue_hud(view, width)?;

        for (y, row) in view.field.iter().enumerate() {
            for (x, &cell) in row.iter().enumerate() {
                let (glyph, color) = glyph(cell, view.is_triggered(Pos::new(x, y)));
                let column = origin + (x as u16) * 2;
                self.print_at(column, HUD_HEIGHT + y as u16, glyph.encode_utf8(&mut [0; 4]), color)?;
            }
        }

        let help_y = HUD_HEIGHT + view.field.len() as u16 + 1;
        self.print_at(centered(width, HELP.len()), help_y, HELP, Color::Reset)?;

        self.place_cursor(view, width)?;
        self.out.flush()
    }

    fn draw_hud(&mut self, view: &BoardView) -> io::Result<()> {
        let (width, _) = self.viewport()?;
        self.queue_hud(view, width)?;
        self.place_cursor(view, width)?;
        self.out.flush()
    }

    fn draw_message(&mut self, lines: &[Banner]) -> io::Result<()> {
        let (width, _) = self.viewport()?;

        self.out.queue(Clear(ClearType::All))?.queue(Hide)?;
        for (i, line) in lines.iter().enumerate() {
            let y = 1 + (i as u16) * 2;
            self.print_at(centered(width, line.text.len()), y, &line.text, tone_color(line.tone))?;
        }
        self.out.flush()
    }

    fn draw_prompt(&mut self, prompt: &str, input: &str) -> io::Result<()> {
        let (width, _) = self.viewport()?;
        let x = centered(width, prompt.len());

        self.out.queue(Clear(ClearType::All))?;
        self.print_at(x, 3, prompt, Color::Reset)?;
        self.print_at(x + prompt.len() as u16, 3, input, Color::Reset)?;
        self.out
            .queue(MoveTo(x + (prompt.len() + input.chars().count()) as u16, 3))?
            .queue(Show)?;
        self.out.flush()
    }
}

/// Puts the terminal in raw mode on the alternate screen and restores it on drop.
pub struct TerminalGuard {
    _private: (),
}

impl TerminalGuard {
    pub fn enter() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = terminal::disable_raw_mode();
            return Err(e);
        }
        debug!("Entered raw mode on alternate screen");
        Ok(Self { _private: () })
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = execute!(io::stdout(), Show, LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
        debug!("Restored terminal");
    }
}
