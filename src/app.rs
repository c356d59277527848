use std::io;

use futures_util::{Stream, StreamExt};
use minesweeper_common::{
    models::Difficulty,
    protocol::{Command, GameStatus, InputEvent},
};
use rand::{SeedableRng, rngs::StdRng};
use tokio::{sync::mpsc, time};
use tracing::{debug, info, instrument, warn};

use crate::{
    config::Config,
    error::Result,
    input::{NameEdit, NameEntry},
    logic::session::{Session, qualifies, submit_score},
    scores::{ScoreStore, normalize_name},
    terminal::{Banner, Renderer},
    timer::{Tick, Timer},
};

pub const NAME_PROMPT: &str = "Please enter name: ";
pub const PLAY_AGAIN: &str = "Press (r) to play again or (q) to quit";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RoundEnd {
    Restart,
    Quit,
}

/// The outer play loop: one session per round, restarted until the player quits.
pub struct Game<R, I, S> {
    renderer: R,
    input: I,
    store: S,
    config: Config,
    rng: StdRng,
}

impl<R, I, S> Game<R, I, S>
where
    R: Renderer,
    I: Stream<Item = io::Result<InputEvent>> + Unpin,
    S: ScoreStore,
{
    pub fn new(renderer: R, input: I, store: S, config: Config) -> Self {
        Self {
            renderer,
            input,
            store,
            config,
            rng: StdRng::from_os_rng(),
        }
    }

    /// Replaces the board generator's random source, e.g. with a seeded one.
    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub async fn run(&mut self, difficulty: Difficulty) -> Result<()> {
        let mut rounds = 0;
        loop {
            rounds += 1;
            match self.play_round(difficulty).await? {
                RoundEnd::Restart => debug!("Restarting after round {}", rounds),
                RoundEnd::Quit => {
                    info!("Player quit after {} rounds", rounds);
                    return Ok(());
                }
            }
        }
    }

    async fn next_event(&mut self) -> Result<Option<InputEvent>> {
        Ok(self.input.next().await.transpose()?)
    }

    #[instrument(level = "trace", skip(self))]
    pub async fn play_round(&mut self, difficulty: Difficulty) -> Result<RoundEnd> {
        let mut session = Session::with_rng(difficulty, &mut self.rng)?;
        let (tick_tx, mut ticks) = mpsc::unbounded_channel();
        let mut timer = Timer::start(self.config.tick, tick_tx);

        self.renderer.draw_board(&session.view(timer.elapsed()))?;

        while !session.is_finished() {
            tokio::select! {
                Some(Tick(_)) = ticks.recv() => {
                    self.renderer.draw_hud(&session.view(timer.elapsed()))?;
                }
                event = self.input.next() => {
                    let Some(event) = event.transpose()? else {
                        debug!("Input closed mid-round");
                        return Ok(RoundEnd::Quit);
                    };

                    match event {
                        InputEvent::Resize { width, height } => {
                            debug!("Terminal resized to {}x{}", width, height);
                        }
                        InputEvent::Key(key) => match Command::from_key(key) {
                            None => continue,
                            Some(Command::Quit) => return Ok(RoundEnd::Quit),
                            Some(Command::Restart) => return Ok(RoundEnd::Restart),
                            Some(Command::Move(direction)) => {
                                session.move_cursor(direction);
                            }
                            Some(Command::Reveal) => {
                                session.reveal()?;
                            }
                            Some(Command::ToggleFlag) => {
                                session.toggle_flag()?;
                            }
                        }
                    }

                    self.renderer.draw_board(&session.view(timer.elapsed()))?;
                }
            }
        }

        let elapsed = timer.stop();
        match session.status() {
            GameStatus::Won => self.finish_won(&mut session, elapsed).await,
            _ => self.finish_lost(&session, elapsed).await,
        }
    }

    async fn finish_lost(&mut self, session: &Session, elapsed: u32) -> Result<RoundEnd> {
        self.renderer.draw_board(&session.view(elapsed))?;
        time::sleep(self.config.loss_delay).await;

        let lines = [Banner::danger("Game Over"), Banner::plain(PLAY_AGAIN)];
        self.renderer.draw_message(&lines)?;
        self.await_restart_or_quit(&lines).await
    }

    async fn finish_won(&mut self, session: &mut Session, elapsed: u32) -> Result<RoundEnd> {
        let score = session.settle(elapsed).unwrap_or_default();
        let won = [
            Banner::success("You Won!"),
            Banner::plain(format!("Your score was {score}")),
        ];
        self.renderer.draw_message(&won)?;

        match qualifies(&self.store, score) {
            Ok(true) => {
                if !self.record_high_score(score).await? {
                    return Ok(RoundEnd::Quit);
                }
            }
            Ok(false) => debug!("Score {} does not make the table", score),
            Err(e) => {
                warn!("Could not read score table: {}", e);
                self.show_briefly(&[Banner::danger(format!("Could not read high scores: {e}"))])
                    .await?;
            }
        }

        let lines = [won[0].clone(), won[1].clone(), Banner::plain(PLAY_AGAIN)];
        self.renderer.draw_message(&lines)?;
        self.await_restart_or_quit(&lines).await
    }

    /// Prompts for a name and stores the score. Returns `false` when input ran out.
    async fn record_high_score(&mut self, score: i64) -> Result<bool> {
        let mut entry = NameEntry::default();
        self.renderer.draw_prompt(NAME_PROMPT, entry.text())?;

        loop {
            let Some(event) = self.next_event().await? else {
                return Ok(false);
            };

            let InputEvent::Key(key) = event else {
                self.renderer.draw_prompt(NAME_PROMPT, entry.text())?;
                continue;
            };

            match entry.apply(key) {
                NameEdit::Editing => self.renderer.draw_prompt(NAME_PROMPT, entry.text())?,
                NameEdit::Cancelled => {
                    debug!("Name entry cancelled, score not saved");
                    return Ok(true);
                }
                NameEdit::Submitted => break,
            }
        }

        let name = normalize_name(entry.text());
        let notice = match submit_score(&mut self.store, &name, score) {
            Ok(true) => Banner::success("Your score has been saved"),
            Ok(false) => Banner::plain("Your score did not make the table"),
            Err(e) => {
                warn!("Could not save score {} for {}: {}", score, name, e);
                Banner::danger(format!("Could not save your score: {e}"))
            }
        };
        self.show_briefly(&[notice]).await?;
        Ok(true)
    }

    async fn show_briefly(&mut self, lines: &[Banner]) -> Result<()> {
        self.renderer.draw_message(lines)?;
        time::sleep(self.config.saved_delay).await;
        Ok(())
    }

    async fn await_restart_or_quit(&mut self, lines: &[Banner]) -> Result<RoundEnd> {
        loop {
            match self.next_event().await? {
                None => return Ok(RoundEnd::Quit),
                Some(InputEvent::Resize { width, height }) => {
                    debug!("Terminal resized to {}x{}, redrawing prompt", width, height);
                    self.renderer.draw_message(lines)?;
                }
                Some(InputEvent::Key(key)) => match Command::from_key(key) {
                    Some(Command::Restart) => return Ok(RoundEnd::Restart),
                    Some(Command::Quit) => return Ok(RoundEnd::Quit),
                    _ => {}
                },
            }
        }
    }
}
