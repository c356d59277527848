use serde::{Deserialize, Serialize};

/// Board dimensions are fixed for every round.
pub const GRID_ROWS: usize = 10;
pub const GRID_COLS: usize = 10;

/// Longest player name kept in the score table.
pub const NAME_LENGTH: usize = 30;

/// Player-visible state of a single tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Cell {
    Hidden,
    Flagged,
    Revealed { adjacent: u8 },
    Bomb,
}

/// Board coordinates: `x` is the column, `y` is the row.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Pos {
    pub x: usize,
    pub y: usize,
}

impl Pos {
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    pub const fn in_bounds(&self) -> bool {
        self.x < GRID_COLS && self.y < GRID_ROWS
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Difficulty {
    Easy,
    Normal,
    Hard,
}

impl Difficulty {
    pub const fn mines(self) -> usize {
        match self {
            Difficulty::Easy => 5,
            Difficulty::Normal => 15,
            Difficulty::Hard => 25,
        }
    }

    /// Points a win is worth before elapsed seconds are subtracted.
    pub const fn base_score(self) -> i64 {
        match self {
            Difficulty::Easy => 250,
            Difficulty::Normal => 500,
            Difficulty::Hard => 1000,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Normal => "Normal",
            Difficulty::Hard => "Hard",
        }
    }
}

/// One row of the persisted high-score table.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct ScoreEntry {
    pub id: u64,
    pub name: String,
    pub score: i64,
}
