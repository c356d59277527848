use minesweeper_common::models::{GRID_COLS, GRID_ROWS, Pos};

pub const TOTAL_TILES: usize = GRID_ROWS * GRID_COLS;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Tile {
    pub is_mine: bool,
    pub is_flagged: bool,
    pub is_revealed: bool,
    /// Only meaningful for non-mine tiles once adjacency has been calculated.
    pub adjacent_mines: u8,
}

/// The grid for one round, owned by a single session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Board {
    pub tiles: [[Tile; GRID_COLS]; GRID_ROWS],
    pub mines: usize,
}

impl Default for Board {
    fn default() -> Self {
        Self {
            tiles: [[Tile::default(); GRID_COLS]; GRID_ROWS],
            mines: 0,
        }
    }
}

const DISPLACEMENTS: [(isize, isize); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// In-bounds Moore neighbours of a position; edges and corners yield fewer.
#[derive(Debug)]
pub struct Neighbors {
    center: Pos,
    index: usize,
}

impl Iterator for Neighbors {
    type Item = Pos;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(&(dx, dy)) = DISPLACEMENTS.get(self.index) {
            self.index += 1;

            let (Some(x), Some(y)) = (
                self.center.x.checked_add_signed(dx),
                self.center.y.checked_add_signed(dy),
            ) else {
                continue;
            };

            let pos = Pos { x, y };
            if pos.in_bounds() {
                return Some(pos);
            }
        }

        None
    }
}

pub fn neighbors(center: Pos) -> Neighbors {
    Neighbors { center, index: 0 }
}

/// Every board position in row-major order.
pub fn positions() -> impl Iterator<Item = Pos> {
    (0..GRID_ROWS).flat_map(|y| (0..GRID_COLS).map(move |x| Pos { x, y }))
}
