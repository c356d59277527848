use minesweeper_common::models::{Cell, GRID_COLS, GRID_ROWS, Pos};
use rand::Rng;
use tracing::{debug, trace};

use crate::{
    data::{Board, TOTAL_TILES, Tile, neighbors, positions},
    error::GameError,
};

pub mod session;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RevealOutcome {
    /// The tile is flagged and stays hidden.
    Ignored,
    /// Number of tiles that became visible, the target included.
    Revealed(usize),
    HitMine,
}

impl From<&Tile> for Cell {
    fn from(value: &Tile) -> Self {
        match (value.is_revealed, value.is_flagged) {
            (true, _) if value.is_mine => Self::Bomb,
            (true, _) => Self::Revealed {
                adjacent: value.adjacent_mines,
            },
            (false, true) => Self::Flagged,
            (false, false) => Self::Hidden,
        }
    }
}

fn check_capacity(requested: usize) -> Result<(), GameError> {
    if requested >= TOTAL_TILES {
        return Err(GameError::TooManyMines {
            requested,
            capacity: TOTAL_TILES,
        });
    }
    Ok(())
}

impl Board {
    /// Builds a fresh board with `mines` randomly placed mines and adjacency counts filled in.
    pub fn generate<R: Rng + ?Sized>(mines: usize, rng: &mut R) -> Result<Self, GameError> {
        let mut board = Board::default();
        board.place_mines(mines, rng)?;
        board.calculate_adjacency();
        Ok(board)
    }

    /// Builds a board from a fixed mine layout. Duplicate positions count once.
    pub fn with_mines(mines: &[Pos]) -> Result<Self, GameError> {
        let mut board = Board::default();
        for &pos in mines {
            let tile = board.tile_mut(pos)?;
            if !tile.is_mine {
                tile.is_mine = true;
                board.mines += 1;
            }
        }
        check_capacity(board.mines)?;
        board.calculate_adjacency();
        Ok(board)
    }

    /// Places `count` mines on distinct random tiles by rejection sampling.
    ///
    /// Expects a board without mines; a full board would never terminate, so
    /// `count` must leave at least one safe tile.
    pub fn place_mines<R: Rng + ?Sized>(&mut self, count: usize, rng: &mut R) -> Result<(), GameError> {
        check_capacity(self.mines + count)?;

        let mut placed = 0;
        let mut rejected = 0;
        while placed < count {
            let tile = &mut self.tiles[rng.random_range(0..GRID_ROWS)][rng.random_range(0..GRID_COLS)];
            if tile.is_mine {
                rejected += 1;
                continue;
            }
            tile.is_mine = true;
            placed += 1;
        }
        self.mines += placed;

        debug!("Placed {} mines ({} resamples)", placed, rejected);
        Ok(())
    }

    /// Fills in `adjacent_mines` for every non-mine tile. Mines keep 0.
    pub fn calculate_adjacency(&mut self) {
        for pos in positions() {
            let count = if self.tiles[pos.y][pos.x].is_mine {
                0
            } else {
                neighbors(pos)
                    .filter(|n| self.tiles[n.y][n.x].is_mine)
                    .count() as u8
            };
            self.tiles[pos.y][pos.x].adjacent_mines = count;
        }
    }

    pub fn tile(&self, pos: Pos) -> Result<&Tile, GameError> {
        self.tiles
            .get(pos.y)
            .and_then(|row| row.get(pos.x))
            .ok_or(GameError::OutOfBounds(pos))
    }

    pub fn tile_mut(&mut self, pos: Pos) -> Result<&mut Tile, GameError> {
        self.tiles
            .get_mut(pos.y)
            .and_then(|row| row.get_mut(pos.x))
            .ok_or(GameError::OutOfBounds(pos))
    }

    /// Reveals a tile and, when it has no adjacent mines, the connected
    /// zero region plus its numbered border. Flagged tiles bound the cascade.
    pub fn reveal(&mut self, pos: Pos) -> Result<RevealOutcome, GameError> {
        let tile = self.tile_mut(pos)?;
        if tile.is_flagged {
            return Ok(RevealOutcome::Ignored);
        }

        let mut revealed = usize::from(!tile.is_revealed);
        tile.is_revealed = true;

        if tile.is_mine {
            return Ok(RevealOutcome::HitMine);
        }

        if tile.adjacent_mines == 0 {
            let mut pending: Vec<Pos> = neighbors(pos).collect();
            while let Some(next) = pending.pop() {
                let tile = &mut self.tiles[next.y][next.x];
                if tile.is_revealed || tile.is_mine || tile.is_flagged {
                    continue;
                }

                tile.is_revealed = true;
                revealed += 1;

                if tile.adjacent_mines == 0 {
                    pending.extend(neighbors(next));
                }
            }
        }

        trace!("Reveal at ({}, {}) opened {} tiles", pos.x, pos.y, revealed);
        Ok(RevealOutcome::Revealed(revealed))
    }

    pub fn all_safe_revealed(&self) -> bool {
        self.tiles
            .iter()
            .flatten()
            .all(|tile| tile.is_mine || tile.is_revealed)
    }

    pub fn revealed_count(&self) -> usize {
        self.tiles.iter().flatten().filter(|tile| tile.is_revealed).count()
    }

    pub fn cells(&self) -> Vec<Vec<Cell>> {
        self.tiles
            .iter()
            .map(|row| row.iter().map(Cell::from).collect())
            .collect()
    }
}
