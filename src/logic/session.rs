use minesweeper_common::{
    models::{Difficulty, GRID_COLS, GRID_ROWS, Pos},
    protocol::{BoardView, Direction, GameStatus},
};
use rand::Rng;
use tracing::{debug, info, instrument};

use crate::{
    data::{Board, TOTAL_TILES},
    error::{GameError, StoreError},
    logic::RevealOutcome,
    scores::ScoreStore,
};

/// Size of the persisted high-score table.
pub const HIGH_SCORE_SLOTS: usize = 10;

const _: () = assert!(Difficulty::Hard.mines() < TOTAL_TILES);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FlagOutcome {
    NoChange,
    Flagged,
    Unflagged,
}

/// Final score of a won round. Slow wins go negative.
pub fn score_for(difficulty: Difficulty, elapsed_secs: u32) -> i64 {
    difficulty.base_score() - i64::from(elapsed_secs)
}

/// One played round.
#[derive(Debug)]
pub struct Session {
    difficulty: Difficulty,
    board: Board,
    cursor: Pos,
    bombs_remaining: i64,
    correctly_flagged: usize,
    status: GameStatus,
    triggered_mine: Option<Pos>,
    score: Option<i64>,
}

impl Session {
    pub fn new(difficulty: Difficulty) -> Result<Self, GameError> {
        Self::with_rng(difficulty, &mut rand::rng())
    }

    #[instrument(level = "trace", skip(rng))]
    pub fn with_rng<R: Rng + ?Sized>(difficulty: Difficulty, rng: &mut R) -> Result<Self, GameError> {
        let board = Board::generate(difficulty.mines(), rng)?;
        info!(
            "Starting {} round: {}x{} with {} mines",
            difficulty.label(),
            GRID_COLS,
            GRID_ROWS,
            board.mines
        );
        Ok(Self::from_board(difficulty, board))
    }

    /// Starts a round on a prepared board, e.g. a fixed layout.
    pub fn from_board(difficulty: Difficulty, board: Board) -> Self {
        Self {
            difficulty,
            bombs_remaining: board.mines as i64,
            board,
            cursor: Pos::default(),
            correctly_flagged: 0,
            status: GameStatus::InProgress,
            triggered_mine: None,
            score: None,
        }
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn is_finished(&self) -> bool {
        self.status.is_finished()
    }

    pub fn cursor(&self) -> Pos {
        self.cursor
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Mines minus flags placed; negative once the player over-flags.
    pub fn bombs_remaining(&self) -> i64 {
        self.bombs_remaining
    }

    pub fn correctly_flagged(&self) -> usize {
        self.correctly_flagged
    }

    pub fn triggered_mine(&self) -> Option<Pos> {
        self.triggered_mine
    }

    pub fn score(&self) -> Option<i64> {
        self.score
    }

    /// Moves the cursor one tile, staying on the board. Returns whether it moved.
    pub fn move_cursor(&mut self, direction: Direction) -> bool {
        let Pos { x, y } = self.cursor;
        let next = match direction {
            Direction::Up => Pos::new(x, y.saturating_sub(1)),
            Direction::Down => Pos::new(x, (y + 1).min(GRID_ROWS - 1)),
            Direction::Left => Pos::new(x.saturating_sub(1), y),
            Direction::Right => Pos::new((x + 1).min(GRID_COLS - 1), y),
        };

        let moved = next != self.cursor;
        self.cursor = next;
        moved
    }

    /// Reveals the tile under the cursor.
    #[instrument(level = "trace", skip(self), fields(x = self.cursor.x, y = self.cursor.y))]
    pub fn reveal(&mut self) -> Result<RevealOutcome, GameError> {
        if self.is_finished() {
            debug!("Ignoring reveal on finished round");
            return Ok(RevealOutcome::Ignored);
        }

        let outcome = self.board.reveal(self.cursor)?;
        match outcome {
            RevealOutcome::HitMine => {
                info!("Mine hit at ({}, {}), round lost", self.cursor.x, self.cursor.y);
                self.triggered_mine = Some(self.cursor);
                self.status = GameStatus::Lost;
            }
            RevealOutcome::Revealed(count) => {
                debug!("Revealed {} tiles, {} open", count, self.board.revealed_count());
                if self.board.all_safe_revealed() {
                    info!("All safe tiles revealed, round won");
                    self.status = GameStatus::Won;
                }
            }
            RevealOutcome::Ignored => debug!("Ignoring reveal on flagged tile"),
        }

        Ok(outcome)
    }

    /// Flags or unflags the tile under the cursor. Revealed tiles cannot be flagged.
    #[instrument(level = "trace", skip(self), fields(x = self.cursor.x, y = self.cursor.y))]
    pub fn toggle_flag(&mut self) -> Result<FlagOutcome, GameError> {
        if self.is_finished() {
            return Ok(FlagOutcome::NoChange);
        }

        let tile = self.board.tile_mut(self.cursor)?;
        if tile.is_revealed {
            debug!("Ignoring flag on revealed tile");
            return Ok(FlagOutcome::NoChange);
        }

        tile.is_flagged = !tile.is_flagged;
        let outcome = if tile.is_flagged {
            self.bombs_remaining -= 1;
            if tile.is_mine {
                self.correctly_flagged += 1;
            }
            FlagOutcome::Flagged
        } else {
            self.bombs_remaining += 1;
            if tile.is_mine {
                self.correctly_flagged -= 1;
            }
            FlagOutcome::Unflagged
        };

        if self.correctly_flagged == self.board.mines {
            info!("Every mine flagged, round won");
            self.status = GameStatus::Won;
        }

        Ok(outcome)
    }

    /// Computes the final score of a won round once; later calls return the same value.
    pub fn settle(&mut self, elapsed_secs: u32) -> Option<i64> {
        if self.status != GameStatus::Won {
            return None;
        }

        let difficulty = self.difficulty;
        let score = *self
            .score
            .get_or_insert_with(|| score_for(difficulty, elapsed_secs));
        info!("Round settled after {}s with score {}", elapsed_secs, score);
        Some(score)
    }

    pub fn view(&self, elapsed_secs: u32) -> BoardView {
        BoardView {
            difficulty: self.difficulty,
            bombs_remaining: self.bombs_remaining,
            elapsed_secs,
            cursor: self.cursor,
            status: self.status,
            triggered_mine: self.triggered_mine,
            field: self.board.cells(),
        }
    }
}

/// Whether `score` would enter the top table.
pub fn qualifies<S: ScoreStore + ?Sized>(store: &S, score: i64) -> Result<bool, StoreError> {
    if store.count()? < HIGH_SCORE_SLOTS {
        return Ok(true);
    }
    Ok(store.min_score()?.is_none_or(|min| score > min))
}

/// Applies the top-10 retention policy. Returns whether the score was stored.
pub fn submit_score<S: ScoreStore + ?Sized>(
    store: &mut S,
    name: &str,
    score: i64,
) -> Result<bool, StoreError> {
    if store.count()? >= HIGH_SCORE_SLOTS {
        match store.min_score()? {
            Some(min) if score > min => {
                debug!("Evicting lowest score {}", min);
                store.delete_by_score(min)?;
            }
            Some(_) => {
                debug!("Score {} does not beat the table minimum", score);
                return Ok(false);
            }
            None => {}
        }
    }

    store.insert(name, score)?;
    info!("Stored score {} for {}", score, name);
    Ok(true)
}

#[cfg(test)]
mod tests {
    use minesweeper_common::models::Cell;

    use super::*;
    use crate::scores::MemoryScoreStore;

    fn session_with(mines: &[Pos]) -> Session {
        Session::from_board(Difficulty::Easy, Board::with_mines(mines).unwrap())
    }

    fn move_to(session: &mut Session, target: Pos) {
        while session.cursor().x < target.x {
            session.move_cursor(Direction::Right);
        }
        while session.cursor().y < target.y {
            session.move_cursor(Direction::Down);
        }
        while session.cursor().x > target.x {
            session.move_cursor(Direction::Left);
        }
        while session.cursor().y > target.y {
            session.move_cursor(Direction::Up);
        }
    }

    #[test]
    fn cursor_is_clamped_to_board() {
        let mut session = session_with(&[]);
        assert!(!session.move_cursor(Direction::Up));
        assert!(!session.move_cursor(Direction::Left));
        assert_eq!(session.cursor(), Pos::new(0, 0));

        for _ in 0..20 {
            session.move_cursor(Direction::Right);
            session.move_cursor(Direction::Down);
        }
        assert_eq!(session.cursor(), Pos::new(GRID_COLS - 1, GRID_ROWS - 1));
    }

    #[test]
    fn revealing_a_mine_loses() {
        let mut session = session_with(&[Pos::new(2, 1)]);
        move_to(&mut session, Pos::new(2, 1));

        assert_eq!(session.reveal().unwrap(), RevealOutcome::HitMine);
        assert_eq!(session.status(), GameStatus::Lost);
        assert_eq!(session.triggered_mine(), Some(Pos::new(2, 1)));
        assert_eq!(session.settle(10), None);

        let view = session.view(10);
        assert!(view.is_triggered(Pos::new(2, 1)));
        assert!(!view.is_triggered(Pos::new(0, 0)));
        assert_eq!(view.field[1][2], Cell::Bomb);
    }

    #[test]
    fn corner_reveal_opens_region_and_keeps_playing() {
        let mines = [
            Pos::new(6, 2),
            Pos::new(8, 8),
            Pos::new(2, 7),
            Pos::new(9, 0),
            Pos::new(5, 5),
        ];
        let mut session = session_with(&mines);

        assert_eq!(session.reveal().unwrap(), RevealOutcome::Revealed(92));
        assert_eq!(session.status(), GameStatus::InProgress);
        assert_eq!(session.bombs_remaining(), 5);

        // Only the pocket behind (8, 8) stays closed besides the mines.
        let pocket = [Pos::new(9, 8), Pos::new(8, 9), Pos::new(9, 9)];
        let hidden: Vec<Pos> = crate::data::positions()
            .filter(|&pos| !session.board().tiles[pos.y][pos.x].is_revealed)
            .filter(|pos| !mines.contains(pos))
            .collect();
        assert_eq!(hidden, pocket);
        assert!(mines.iter().all(|pos| !session.board().tiles[pos.y][pos.x].is_revealed));
        assert_eq!(session.board().tiles[9][7].adjacent_mines, 1);
    }

    #[test]
    fn revealing_every_safe_tile_wins() {
        // The corner tile is walled in by mines, so the cascade cannot reach it.
        let mines = [Pos::new(1, 0), Pos::new(0, 1), Pos::new(1, 1)];
        let mut session = session_with(&mines);

        move_to(&mut session, Pos::new(5, 5));
        session.reveal().unwrap();
        assert_eq!(session.status(), GameStatus::InProgress);
        assert!(!session.board().tiles[0][0].is_revealed);

        move_to(&mut session, Pos::new(0, 0));
        assert_eq!(session.reveal().unwrap(), RevealOutcome::Revealed(1));
        assert_eq!(session.status(), GameStatus::Won);
    }

    #[test]
    fn flagging_every_mine_wins_with_tiles_hidden() {
        let mines = [Pos::new(3, 3), Pos::new(7, 2)];
        let mut session = session_with(&mines);

        move_to(&mut session, mines[0]);
        assert_eq!(session.toggle_flag().unwrap(), FlagOutcome::Flagged);
        assert_eq!(session.status(), GameStatus::InProgress);
        assert_eq!(session.bombs_remaining(), 1);

        move_to(&mut session, mines[1]);
        session.toggle_flag().unwrap();

        assert_eq!(session.status(), GameStatus::Won);
        assert_eq!(session.correctly_flagged(), 2);
        assert_eq!(session.bombs_remaining(), 0);
        assert_eq!(session.board().revealed_count(), 0);
    }

    #[test]
    fn unflagging_restores_counters() {
        let mut session = session_with(&[Pos::new(0, 0), Pos::new(5, 5)]);

        session.toggle_flag().unwrap();
        assert_eq!(session.correctly_flagged(), 1);
        assert_eq!(session.toggle_flag().unwrap(), FlagOutcome::Unflagged);
        assert_eq!(session.correctly_flagged(), 0);
        assert_eq!(session.bombs_remaining(), 2);

        move_to(&mut session, Pos::new(2, 2));
        session.toggle_flag().unwrap();
        assert_eq!(session.bombs_remaining(), 1);
        assert_eq!(session.correctly_flagged(), 0);
    }

    #[test]
    fn revealed_tiles_cannot_be_flagged() {
        let mut session = session_with(&[Pos::new(0, 0)]);
        move_to(&mut session, Pos::new(1, 1));
        session.reveal().unwrap();

        assert_eq!(session.toggle_flag().unwrap(), FlagOutcome::NoChange);
        assert_eq!(session.bombs_remaining(), 1);
        assert!(!session.board().tiles[1][1].is_flagged);
    }

    #[test]
    fn flagged_tile_under_cursor_is_not_revealed() {
        let mut session = session_with(&[Pos::new(4, 4), Pos::new(6, 6)]);
        move_to(&mut session, Pos::new(4, 4));
        session.toggle_flag().unwrap();

        assert_eq!(session.reveal().unwrap(), RevealOutcome::Ignored);
        assert_eq!(session.status(), GameStatus::InProgress);
        assert!(!session.board().tiles[4][4].is_revealed);
    }

    #[test]
    fn finished_rounds_ignore_actions() {
        let mut session = session_with(&[Pos::new(0, 0)]);
        session.reveal().unwrap();
        assert_eq!(session.status(), GameStatus::Lost);

        move_to(&mut session, Pos::new(5, 5));
        assert_eq!(session.reveal().unwrap(), RevealOutcome::Ignored);
        assert_eq!(session.toggle_flag().unwrap(), FlagOutcome::NoChange);
        assert_eq!(session.status(), GameStatus::Lost);
    }

    #[test]
    fn score_subtracts_elapsed_seconds() {
        assert_eq!(score_for(Difficulty::Easy, 40), 210);
        assert_eq!(score_for(Difficulty::Normal, 0), 500);
        assert_eq!(score_for(Difficulty::Hard, 1), 999);
        assert_eq!(score_for(Difficulty::Easy, 300), -50);
    }

    #[test]
    fn settle_is_computed_once() {
        let mut session = session_with(&[Pos::new(0, 0)]);
        session.toggle_flag().unwrap();

        assert_eq!(session.settle(40), Some(210));
        assert_eq!(session.settle(90), Some(210));
        assert_eq!(session.score(), Some(210));
    }

    #[test]
    fn view_reports_hud_fields() {
        let mut session = session_with(&[Pos::new(0, 0), Pos::new(1, 0)]);
        session.toggle_flag().unwrap();
        session.move_cursor(Direction::Down);

        let view = session.view(65);
        assert_eq!(view.bombs_remaining, 1);
        assert_eq!(view.cursor, Pos::new(0, 1));
        assert_eq!(view.clock(), "01:05");
        assert_eq!(
            view.hud_line(),
            "Difficulty: Easy    Bombs Remaining: 1    Time: 01:05"
        );
        assert_eq!(view.field.len(), GRID_ROWS);
    }

    #[test]
    fn random_sessions_use_difficulty_mine_count() {
        use rand::{SeedableRng, rngs::StdRng};

        let mut rng = StdRng::seed_from_u64(11);
        for difficulty in [Difficulty::Easy, Difficulty::Normal, Difficulty::Hard] {
            let session = Session::with_rng(difficulty, &mut rng).unwrap();
            assert_eq!(session.board().mines, difficulty.mines());
            assert_eq!(session.bombs_remaining(), difficulty.mines() as i64);
        }
    }

    fn full_store(min: i64) -> MemoryScoreStore {
        let mut store = MemoryScoreStore::default();
        for i in 0..HIGH_SCORE_SLOTS as i64 {
            store.insert(&format!("p{i}"), min + i * 10).unwrap();
        }
        store
    }

    #[test]
    fn full_table_rejects_lower_score() {
        let mut store = full_store(50);
        let before = store.list_all_descending().unwrap();

        assert!(!qualifies(&store, 40).unwrap());
        assert!(!submit_score(&mut store, "late", 40).unwrap());
        assert_eq!(store.list_all_descending().unwrap(), before);
    }

    #[test]
    fn full_table_rejects_tie_with_minimum() {
        let mut store = full_store(50);
        assert!(!qualifies(&store, 50).unwrap());
        assert!(!submit_score(&mut store, "tie", 50).unwrap());
        assert_eq!(store.count().unwrap(), HIGH_SCORE_SLOTS);
    }

    #[test]
    fn full_table_evicts_minimum_for_higher_score() {
        let mut store = full_store(50);

        assert!(submit_score(&mut store, "fast", 75).unwrap());

        assert_eq!(store.count().unwrap(), HIGH_SCORE_SLOTS);
        assert_eq!(store.min_score().unwrap(), Some(60));
        let names: Vec<_> = store
            .list_all_descending()
            .unwrap()
            .into_iter()
            .map(|entry| entry.name)
            .collect();
        assert!(names.contains(&"fast".to_string()));
        assert!(!names.contains(&"p0".to_string()));
    }

    #[test]
    fn partial_table_accepts_any_score() {
        let mut store = MemoryScoreStore::default();
        for i in 0..9 {
            store.insert("p", 100 + i).unwrap();
        }

        assert!(qualifies(&store, 0).unwrap());
        assert!(submit_score(&mut store, "zero", 0).unwrap());
        assert_eq!(store.count().unwrap(), 10);
        assert_eq!(store.min_score().unwrap(), Some(0));

        let mut empty = MemoryScoreStore::default();
        assert!(submit_score(&mut empty, "slow", -120).unwrap());
    }
}
