use clap::{ArgAction, Args, Parser};
use minesweeper_common::models::Difficulty;

#[derive(Parser, Debug)]
#[command(
    name = "minesweeper",
    version,
    about = "Terminal minesweeper on a 10x10 board",
    disable_help_flag = true
)]
pub struct Cli {
    #[command(flatten)]
    mode: ModeArgs,

    /// Print help
    #[arg(long, action = ArgAction::Help)]
    help: Option<bool>,
}

#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
struct ModeArgs {
    /// Easy: 5 mines
    #[arg(short, long)]
    easy: bool,
    /// Normal: 15 mines
    #[arg(short, long)]
    normal: bool,
    /// Hard: 25 mines
    #[arg(short = 'h', long)]
    hard: bool,
    /// View high scores
    #[arg(short, long)]
    scores: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    Play(Difficulty),
    ViewScores,
}

impl Cli {
    pub fn mode(&self) -> Mode {
        let ModeArgs {
            easy,
            normal,
            hard,
            scores,
        } = self.mode;

        match (easy, normal, hard, scores) {
            (true, ..) => Mode::Play(Difficulty::Easy),
            (_, true, ..) => Mode::Play(Difficulty::Normal),
            (_, _, true, _) => Mode::Play(Difficulty::Hard),
            _ => Mode::ViewScores,
        }
    }
}
