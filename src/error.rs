use std::io;

use minesweeper_common::models::Pos;
use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameError {
    #[error("position ({}, {}) is outside the board", .0.x, .0.y)]
    OutOfBounds(Pos),
    #[error("cannot place {requested} mines on a board of {capacity} tiles")]
    TooManyMines { requested: usize, capacity: usize },
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("score store I/O failed: {0}")]
    Io(#[from] io::Error),
    #[error("score store is corrupt: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Game(#[from] GameError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("terminal error: {0}")]
    Terminal(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
