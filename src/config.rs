use std::{env, path::PathBuf, time::Duration};

/// Runtime settings taken from the environment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub scores_path: PathBuf,
    pub log_file: Option<PathBuf>,
    pub loss_delay: Duration,
    pub saved_delay: Duration,
    pub tick: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            scores_path: PathBuf::from("scores.json"),
            log_file: None,
            loss_delay: Duration::from_millis(750),
            saved_delay: Duration::from_millis(2000),
            tick: Duration::from_secs(1),
        }
    }
}

fn millis(name: &str, default: u64) -> Duration {
    let value: u64 = env::var(name)
        .unwrap_or_else(|_| default.to_string())
        .parse()
        .unwrap_or(default);
    Duration::from_millis(value)
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            scores_path: env::var("MINESWEEPER_SCORES_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("scores.json")),
            log_file: env::var("MINESWEEPER_LOG_FILE")
                .ok()
                .filter(|path| !path.is_empty())
                .map(PathBuf::from),
            loss_delay: millis("MINESWEEPER_LOSS_DELAY_MS", 750),
            saved_delay: millis("MINESWEEPER_SAVED_DELAY_MS", 2000),
            tick: millis("MINESWEEPER_TICK_MS", 1000).max(Duration::from_millis(1)),
        }
    }
}
