mod quiz;
mod simulator;

use std::sync::Arc;

use type_core::clock::ManualClock;
use type_core::item::{Difficulty, Member, Word};
use type_core::settings::{settings, Settings};

use crate::{GameEvent, GameResponse, QuizGame, WordGame, WordGameConfig};

pub(super) fn test_settings() -> Settings {
    settings().clone()
}

/// A one-word pool, so every item is "した" (limit 4000 ms on easy).
pub(super) fn shita() -> Vec<Word> {
    vec![Word::new("下", "した")]
}

pub(super) fn make_word_game(words: Vec<Word>, difficulty: Difficulty) -> (WordGame, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(0));
    let mut game = WordGame::with_seed(test_settings(), clock.clone(), 7);
    game.initialize(WordGameConfig::new(difficulty), words)
        .expect("non-empty pool");
    (game, clock)
}

pub(super) fn members(names: &[&str]) -> Vec<Member> {
    names.iter().map(|n| Member::new(*n, format!("{n}-reading"))).collect()
}

pub(super) fn make_quiz(members: Vec<Member>) -> (QuizGame, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(0));
    let mut game = QuizGame::with_seed(test_settings(), clock.clone(), 11);
    game.initialize(members).expect("non-empty pool");
    (game, clock)
}

// Helper: feed a string one character at a time
pub(super) fn type_string(game: &mut WordGame, s: &str) -> Vec<GameResponse> {
    s.chars().map(|c| game.handle(GameEvent::Key(c))).collect()
}
