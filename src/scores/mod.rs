use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

use minesweeper_common::models::{NAME_LENGTH, ScoreEntry};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::StoreError;

/// Backing table for high scores: rows of (id, name, score).
pub trait ScoreStore {
    fn count(&self) -> Result<usize, StoreError>;
    fn min_score(&self) -> Result<Option<i64>, StoreError>;
    fn insert(&mut self, name: &str, score: i64) -> Result<(), StoreError>;
    /// Removes the oldest row holding `score`, if any.
    fn delete_by_score(&mut self, score: i64) -> Result<(), StoreError>;
    fn list_all_descending(&self) -> Result<Vec<ScoreEntry>, StoreError>;
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
struct ScoreTable {
    next_id: u64,
    scores: Vec<ScoreEntry>,
}

impl ScoreTable {
    fn min_score(&self) -> Option<i64> {
        self.scores.iter().map(|entry| entry.score).min()
    }

    fn insert(&mut self, name: &str, score: i64) {
        self.next_id += 1;
        self.scores.push(ScoreEntry {
            id: self.next_id,
            name: name.to_string(),
            score,
        });
    }

    fn delete_by_score(&mut self, score: i64) -> bool {
        let oldest = self
            .scores
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.score == score)
            .min_by_key(|(_, entry)| entry.id)
            .map(|(index, _)| index);

        match oldest {
            Some(index) => {
                self.scores.remove(index);
                true
            }
            None => false,
        }
    }

    fn descending(&self) -> Vec<ScoreEntry> {
        let mut scores = self.scores.clone();
        scores.sort_by(|a, b| b.score.cmp(&a.score).then(a.id.cmp(&b.id)));
        scores
    }
}

/// Score table kept in memory only.
#[derive(Debug, Default)]
pub struct MemoryScoreStore {
    table: ScoreTable,
}

impl ScoreStore for MemoryScoreStore {
    fn count(&self) -> Result<usize, StoreError> {
        Ok(self.table.scores.len())
    }

    fn min_score(&self) -> Result<Option<i64>, StoreError> {
        Ok(self.table.min_score())
    }

    fn insert(&mut self, name: &str, score: i64) -> Result<(), StoreError> {
        self.table.insert(name, score);
        Ok(())
    }

    fn delete_by_score(&mut self, score: i64) -> Result<(), StoreError> {
        self.table.delete_by_score(score);
        Ok(())
    }

    fn list_all_descending(&self) -> Result<Vec<ScoreEntry>, StoreError> {
        Ok(self.table.descending())
    }
}

/// Score table persisted as a JSON document, rewritten on every change.
#[derive(Debug)]
pub struct JsonScoreStore {
    path: PathBuf,
    table: ScoreTable,
}

impl JsonScoreStore {
    /// Opens the table at `path`, creating an empty one if the file does not exist.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();

        let store = match fs::read_to_string(&path) {
            Ok(text) => {
                let table: ScoreTable = serde_json::from_str(&text)?;
                debug!("Loaded {} scores from {}", table.scores.len(), path.display());
                Self { path, table }
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                let store = Self {
                    path,
                    table: ScoreTable::default(),
                };
                store.persist()?;
                info!("Created score table at {}", store.path.display());
                store
            }
            Err(e) => return Err(e.into()),
        };

        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self) -> Result<(), StoreError> {
        let text = serde_json::to_string_pretty(&self.table)?;
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        fs::write(&tmp, text)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl ScoreStore for JsonScoreStore {
    fn count(&self) -> Result<usize, StoreError> {
        Ok(self.table.scores.len())
    }

    fn min_score(&self) -> Result<Option<i64>, StoreError> {
        Ok(self.table.min_score())
    }

    fn insert(&mut self, name: &str, score: i64) -> Result<(), StoreError> {
        let before = self.table.clone();
        self.table.insert(name, score);
        self.persist().inspect_err(|_| self.table = before)
    }

    fn delete_by_score(&mut self, score: i64) -> Result<(), StoreError> {
        let before = self.table.clone();
        if self.table.delete_by_score(score) {
            self.persist().inspect_err(|_| self.table = before)?;
        }
        Ok(())
    }

    fn list_all_descending(&self) -> Result<Vec<ScoreEntry>, StoreError> {
        Ok(self.table.descending())
    }
}

/// Trims a typed name and caps it at `NAME_LENGTH` characters.
pub fn normalize_name(raw: &str) -> String {
    let name: String = raw.trim().chars().take(NAME_LENGTH).collect();
    if name.is_empty() {
        "anonymous".to_string()
    } else {
        name
    }
}

/// Writes the score table in descending order.
pub fn print_table<S: ScoreStore + ?Sized, W: Write>(store: &S, out: &mut W) -> Result<(), StoreError> {
    let scores = store.list_all_descending()?;

    writeln!(out, "High Scores:")?;
    writeln!(out, "------------")?;

    if scores.is_empty() {
        writeln!(out, "No scores yet. Play a game and add one!")?;
    }

    for entry in scores {
        writeln!(out, "{:<10} {}", entry.name, entry.score)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;
    use crate::logic::session::submit_score;

    #[test]
    fn memory_store_tracks_minimum_and_order() {
        let mut store = MemoryScoreStore::default();
        assert_eq!(store.min_score().unwrap(), None);

        store.insert("a", 30).unwrap();
        store.insert("b", 10).unwrap();
        store.insert("c", 20).unwrap();

        assert_eq!(store.count().unwrap(), 3);
        assert_eq!(store.min_score().unwrap(), Some(10));
        let scores: Vec<_> = store
            .list_all_descending()
            .unwrap()
            .into_iter()
            .map(|entry| entry.score)
            .collect();
        assert_eq!(scores, vec![30, 20, 10]);
    }

    #[test]
    fn delete_by_score_removes_oldest_match_only() {
        let mut store = MemoryScoreStore::default();
        store.insert("first", 10).unwrap();
        store.insert("second", 10).unwrap();
        store.insert("other", 50).unwrap();

        store.delete_by_score(10).unwrap();
        store.delete_by_score(999).unwrap();

        let names: Vec<_> = store
            .list_all_descending()
            .unwrap()
            .into_iter()
            .map(|entry| entry.name)
            .collect();
        assert_eq!(names, vec!["other", "second"]);
    }

    #[test]
    fn json_store_persists_between_opens() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("scores.json");

        {
            let mut store = JsonScoreStore::open(&path).unwrap();
            assert_eq!(store.count().unwrap(), 0);
            store.insert("alice", 120).unwrap();
            store.insert("bob", 80).unwrap();
            store.delete_by_score(80).unwrap();
            store.insert("carol", 95).unwrap();
        }

        let store = JsonScoreStore::open(&path).unwrap();
        let entries = store.list_all_descending().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].name, "alice");
        assert_eq!(entries[1].name, "carol");
        assert_eq!(entries[1].id, 3);
    }

    #[test]
    fn json_store_reports_corrupt_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("scores.json");
        fs::write(&path, "not json").unwrap();

        assert!(matches!(JsonScoreStore::open(&path), Err(StoreError::Json(_))));
    }

    #[test]
    fn failed_write_leaves_table_unchanged() {
        let dir = tempdir().unwrap();
        let table_dir = dir.path().join("table");
        fs::create_dir(&table_dir).unwrap();

        let mut store = JsonScoreStore::open(table_dir.join("scores.json")).unwrap();
        for score in (50..150).step_by(10) {
            store.insert("player", score).unwrap();
        }
        fs::remove_dir_all(&table_dir).unwrap();

        assert!(submit_score(&mut store, "late", 999).is_err());
        assert_eq!(store.count().unwrap(), 10);
        assert_eq!(store.min_score().unwrap(), Some(50));

        assert!(store.insert("late", 999).is_err());
        assert_eq!(store.count().unwrap(), 10);
        assert!(store.list_all_descending().unwrap().iter().all(|entry| entry.name == "player"));
    }

    #[test]
    fn names_are_trimmed_and_bounded() {
        assert_eq!(normalize_name("  ada  "), "ada");
        assert_eq!(normalize_name("   "), "anonymous");
        assert_eq!(normalize_name(&"x".repeat(80)).chars().count(), NAME_LENGTH);
    }

    #[test]
    fn table_prints_rows_or_placeholder() {
        let mut store = MemoryScoreStore::default();
        let mut out = Vec::new();
        print_table(&store, &mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "High Scores:\n------------\nNo scores yet. Play a game and add one!\n"
        );

        store.insert("ada", 210).unwrap();
        store.insert("grace", 480).unwrap();
        let mut out = Vec::new();
        print_table(&store, &mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "High Scores:\n------------\ngrace      480\nada        210\n"
        );
    }
}
