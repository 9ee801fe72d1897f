//! Kana typing game engine.
//!
//! The game state machines live in `type-session` and the romaji matcher,
//! timers and scoring in `type-core`. This crate adds what a host needs
//! around them: HTTP item sources, leaderboard submission, background
//! loading and trace output.

pub mod async_worker;
pub mod ranking;
pub mod source;
pub mod trace_init;

pub use type_core::{clock, item, pool, romaji, settings, stats, timer};
pub use type_session::{
    host, BonusEvent, DisplaySnapshot, GameError, GameEvent, GameResponse, GameStatus,
    PoolRequest, QuizFeedback, QuizGame, QuizSnapshot, SideEffects, SoundCue, WordGame,
    WordGameConfig,
};
