//! Scoring, combo bonuses and end-of-game statistics shared by both game modes.

use serde::Serialize;

use crate::settings::{DifficultySettings, QuizSettings, ScoringSettings};

/// Per-mode multipliers applied on top of [`ScoringSettings`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Multipliers {
    pub score: f64,
    pub time_bonus: f64,
}

impl From<&DifficultySettings> for Multipliers {
    fn from(d: &DifficultySettings) -> Self {
        Self {
            score: d.score_multiplier,
            time_bonus: d.time_bonus_multiplier,
        }
    }
}

impl From<&QuizSettings> for Multipliers {
    fn from(q: &QuizSettings) -> Self {
        Self {
            score: q.score_multiplier,
            time_bonus: q.time_bonus_multiplier,
        }
    }
}

/// Points for one completed item: a base award plus a bonus proportional to
/// the share of item time left.
pub fn item_score(
    scoring: &ScoringSettings,
    multipliers: Multipliers,
    remaining_ms: u64,
    limit_ms: u64,
) -> u64 {
    let base = scoring.base_score * multipliers.score;
    let time_bonus = if limit_ms == 0 {
        0.0
    } else {
        let share = remaining_ms.min(limit_ms) as f64 / limit_ms as f64;
        (share * scoring.time_bonus_points * multipliers.time_bonus).floor()
    };
    (base + time_bonus).ceil().max(0.0) as u64
}

/// Bonus seconds granted when the combo reaches a multiple of a threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComboBonus {
    /// Flat `seconds` at every multiple.
    Every { threshold: u32, seconds: u32 },
    /// `min(combo / threshold, cap)` at every multiple.
    CappedLevel { threshold: u32, cap: u32 },
}

impl ComboBonus {
    pub fn threshold(&self) -> u32 {
        match *self {
            Self::Every { threshold, .. } | Self::CappedLevel { threshold, .. } => threshold,
        }
    }

    /// Seconds to add for reaching `combo`, or `None` when no bonus fires.
    pub fn seconds_for(&self, combo: u32) -> Option<u32> {
        let threshold = self.threshold();
        if threshold == 0 || combo == 0 || combo % threshold != 0 {
            return None;
        }
        let secs = match *self {
            Self::Every { seconds, .. } => seconds,
            Self::CappedLevel { cap, .. } => (combo / threshold).min(cap),
        };
        (secs > 0).then_some(secs)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Counters {
    pub score: u64,
    pub correct: u32,
    pub miss: u32,
    pub completed: u32,
    pub skipped: u32,
    pub combo: u32,
    pub total_bonus_secs: u32,
}

impl Counters {
    pub fn accuracy(&self) -> f64 {
        let total = self.correct + self.miss;
        if total == 0 {
            0.0
        } else {
            self.correct as f64 / total as f64 * 100.0
        }
    }
}

/// Final statistics, frozen when the game finishes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameResult {
    pub score: u64,
    pub correct_count: u32,
    pub miss_count: u32,
    pub total_completed: u32,
    pub skipped_count: u32,
    pub accuracy: f64,
    pub rate_per_minute: f64,
    pub elapsed_secs: f64,
}

impl GameResult {
    pub fn from_counters(counters: &Counters, elapsed_ms: u64) -> Self {
        let elapsed_secs = elapsed_ms as f64 / 1000.0;
        let rate_per_minute = if elapsed_ms == 0 {
            0.0
        } else {
            counters.completed as f64 / elapsed_secs * 60.0
        };
        Self {
            score: counters.score,
            correct_count: counters.correct,
            miss_count: counters.miss,
            total_completed: counters.completed,
            skipped_count: counters.skipped,
            accuracy: counters.accuracy(),
            rate_per_minute,
            elapsed_secs,
        }
    }
}
