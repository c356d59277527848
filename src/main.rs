use std::{io, process::ExitCode};

use clap::Parser;
use minesweeper_common::models::Difficulty;
use minesweeper_tui::{
    Error, Result,
    app::Game,
    cli::{Cli, Mode},
    config::Config,
    input::terminal_events,
    scores::{JsonScoreStore, print_table},
    telemetry,
    terminal::{CrosstermRenderer, TerminalGuard},
};
use tracing::{debug, error, info};

#[tokio::main]
async fn main() -> ExitCode {
    let mode = Cli::parse().mode();
    let config = Config::from_env();

    let default_filter = match mode {
        Mode::Play(_) => "off",
        Mode::ViewScores => "warn",
    };
    if let Err(e) = telemetry::init(config.log_file.as_deref(), default_filter) {
        eprintln!("Can't set up logging: {e}");
        return ExitCode::FAILURE;
    }
    debug!("Loaded configuration: {:?}", config);

    let store = match JsonScoreStore::open(config.scores_path.clone()) {
        Ok(store) => {
            debug!("Using score table at {}", store.path().display());
            store
        }
        Err(e) => {
            error!("Failed to open score table {}: {}", config.scores_path.display(), e);
            eprintln!("Can't open score table {}: {e}", config.scores_path.display());
            return ExitCode::FAILURE;
        }
    };

    let result = match mode {
        Mode::ViewScores => print_table(&store, &mut io::stdout().lock()).map_err(Error::from),
        Mode::Play(difficulty) => play(config, store, difficulty).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Exiting with error: {}", e);
            eprintln!("minesweeper: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn play(config: Config, store: JsonScoreStore, difficulty: Difficulty) -> Result<()> {
    info!("Starting {} game", difficulty.label());
    let _terminal = TerminalGuard::enter()?;
    let renderer = CrosstermRenderer::new(io::stdout());
    let mut game = Game::new(renderer, terminal_events(), store, config);
    game.run(difficulty).await
}
