pub mod app;
pub mod cli;
pub mod config;
pub mod data;
pub mod error;
pub mod input;
pub mod logic;
pub mod scores;
pub mod telemetry;
pub mod terminal;
pub mod timer;

pub use error::{Error, Result};
