//! Gameplay state machines for the typing game.
//!
//! [`WordGame`] and [`QuizGame`] own all session state and process one
//! [`GameEvent`] at a time, returning a [`GameResponse`] that tells the host
//! which timers to (re)schedule and which sounds to play. Time is read from an
//! injected [`Clock`](type_core::clock::Clock), so both machines run headless.

mod error;
pub mod host;
mod quiz_game;
mod types;
mod word_game;

#[cfg(test)]
mod tests;

pub use error::GameError;
pub use quiz_game::QuizGame;
pub use types::{
    BonusEvent, DisplaySnapshot, GameEvent, GameResponse, GameStatus, PoolRequest, QuizFeedback,
    QuizSnapshot, SideEffects, SoundCue, WordGameConfig,
};
pub use word_game::WordGame;
