use serde::Serialize;

use type_core::item::{Difficulty, QuestionTarget};
use type_core::timer::{TimerCommand, TimerToken};

/// Lifecycle shared by both game modes. `Finished` only leaves through re-initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GameStatus {
    Idle,
    Ready,
    Playing,
    Finished,
}

/// Input to a game machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEvent {
    Start,
    /// One typed character (word mode).
    Key(char),
    /// A submitted free-text answer (quiz mode).
    Answer(String),
    /// A host timer fired.
    Tick(TimerToken),
    Quit,
}

/// Abstract sound the host should play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SoundCue {
    Type,
    Correct,
    Miss,
    Bonus,
    GameEnd,
}

/// Bonus time granted for reaching a combo multiple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BonusEvent {
    pub combo: u32,
    pub seconds: u32,
}

/// What catching the countdowns up to the clock did before an event is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Synced {
    /// Nothing expired; the event applies to the item on screen.
    Steady,
    /// The item or feedback on screen was replaced. The triggering input
    /// belongs to the old one and must not be judged.
    Advanced,
    Finished,
}

/// Orthogonal side-effects that accompany a response.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SideEffects {
    /// Scheduler commands, in order. A `Cancel` always precedes the `Start`
    /// that replaces it.
    pub timers: Vec<TimerCommand>,
    pub sounds: Vec<SoundCue>,
    pub bonus: Option<BonusEvent>,
    /// The game moved to `Finished` while handling this event.
    pub finished: bool,
}

/// Response from `handle`, returned to the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameResponse {
    pub consumed: bool,
    pub effects: SideEffects,
}

impl GameResponse {
    pub fn not_consumed() -> Self {
        Self {
            consumed: false,
            effects: SideEffects::default(),
        }
    }

    pub fn consumed() -> Self {
        Self {
            consumed: true,
            ..Self::not_consumed()
        }
    }
}

/// What the word view needs to draw the current item.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplaySnapshot {
    pub text: String,
    /// Keystrokes accepted so far on this item.
    pub typed: String,
    /// Romaji still to type, following the spelling the player has started.
    pub remaining: String,
    pub item_time_fraction: f64,
}

impl Default for DisplaySnapshot {
    fn default() -> Self {
        Self {
            text: String::new(),
            typed: String::new(),
            remaining: String::new(),
            item_time_fraction: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuizFeedback {
    pub correct: bool,
    pub revealed_answer: String,
    pub member_name: String,
}

/// What the quiz view needs to draw the current question.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuizSnapshot {
    pub photo_reference: String,
    pub target: Option<QuestionTarget>,
    pub question_time_fraction: f64,
    pub feedback: Option<QuizFeedback>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordGameConfig {
    pub difficulty: Difficulty,
    /// Restrict the pool to one category; `None` plays every word.
    pub category: Option<String>,
}

impl WordGameConfig {
    pub fn new(difficulty: Difficulty) -> Self {
        Self {
            difficulty,
            category: None,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }
}

/// Pool fetch the host must perform before calling `receive_pool`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolRequest {
    pub generation: u64,
    pub difficulty: Difficulty,
    pub category: Option<String>,
}
