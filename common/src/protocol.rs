use crate::models::{Cell, Difficulty, Pos};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// Keys the game reacts to, already stripped of terminal specifics.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Key {
    Up,
    Down,
    Left,
    Right,
    Enter,
    Backspace,
    Esc,
    Interrupt,
    Char(char),
}

/// Everything the input source can produce.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputEvent {
    Key(Key),
    Resize { width: u16, height: u16 },
}

/// Player intent while a round is in progress.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    Move(Direction),
    Reveal,
    ToggleFlag,
    Restart,
    Quit,
}

impl Command {
    pub fn from_key(key: Key) -> Option<Self> {
        Some(match key {
            Key::Up | Key::Char('k') => Command::Move(Direction::Up),
            Key::Down | Key::Char('j') => Command::Move(Direction::Down),
            Key::Left | Key::Char('h') => Command::Move(Direction::Left),
            Key::Right | Key::Char('l') => Command::Move(Direction::Right),
            Key::Enter | Key::Char(' ') => Command::Reveal,
            Key::Char('f') => Command::ToggleFlag,
            Key::Char('r') => Command::Restart,
            Key::Char('q') | Key::Esc | Key::Interrupt => Command::Quit,
            _ => return None,
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameStatus {
    InProgress,
    Won,
    Lost,
}

impl GameStatus {
    pub const fn is_finished(self) -> bool {
        matches!(self, GameStatus::Won | GameStatus::Lost)
    }
}

/// Snapshot of a round handed to the renderer.
#[derive(Clone, Debug, PartialEq)]
pub struct BoardView {
    pub difficulty: Difficulty,
    pub bombs_remaining: i64,
    pub elapsed_secs: u32,
    pub cursor: Pos,
    pub status: GameStatus,
    /// The mine that ended a lost round.
    pub triggered_mine: Option<Pos>,
    pub field: Vec<Vec<Cell>>,
}

impl BoardView {
    pub fn is_triggered(&self, pos: Pos) -> bool {
        self.triggered_mine == Some(pos)
    }

    pub fn clock(&self) -> String {
        format_clock(self.elapsed_secs)
    }

    pub fn hud_line(&self) -> String {
        format!(
            "Difficulty: {}    Bombs Remaining: {}    Time: {}",
            self.difficulty.label(),
            self.bombs_remaining,
            self.clock()
        )
    }
}

/// Formats elapsed seconds as `MM:SS`.
pub fn format_clock(secs: u32) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}
