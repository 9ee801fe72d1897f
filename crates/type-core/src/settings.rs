//! Game tuning loaded from TOML, following the same OnceLock pattern as the romaji table.
//!
//! - `init_custom(toml_content)` sets a custom TOML before first `settings()` call
//! - `settings()` returns `&'static Settings` (lazy-init singleton)
//! - Default values are embedded via `include_str!("default_settings.toml")`

use std::sync::OnceLock;

use serde::Deserialize;

use crate::item::Difficulty;

pub const DEFAULT_SETTINGS_TOML: &str = include_str!("default_settings.toml");

static CUSTOM_TOML: OnceLock<String> = OnceLock::new();

/// Set custom TOML before first `settings()` call.
pub fn init_custom(toml_content: String) -> Result<(), SettingsError> {
    parse_settings_toml(&toml_content)?;
    CUSTOM_TOML
        .set(toml_content)
        .map_err(|_| SettingsError::AlreadyInitialized)
}

/// Get or initialize the global settings singleton.
pub fn settings() -> &'static Settings {
    static INSTANCE: OnceLock<Settings> = OnceLock::new();
    INSTANCE.get_or_init(|| {
        let toml_str = CUSTOM_TOML
            .get()
            .map(|s| s.as_str())
            .unwrap_or(DEFAULT_SETTINGS_TOML);
        parse_settings_toml(toml_str).expect("settings TOML must be valid")
    })
}

/// Returns the embedded default settings TOML content.
pub fn default_toml() -> &'static str {
    DEFAULT_SETTINGS_TOML
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("TOML parse error: {0}")]
    Parse(String),
    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
    #[error("settings already initialized")]
    AlreadyInitialized,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub scoring: ScoringSettings,
    pub timers: TimerSettings,
    pub pool: PoolSettings,
    pub difficulty: DifficultyTable,
    pub quiz: QuizSettings,
}

impl Settings {
    pub fn for_difficulty(&self, difficulty: Difficulty) -> &DifficultySettings {
        match difficulty {
            Difficulty::Easy => &self.difficulty.easy,
            Difficulty::Normal => &self.difficulty.normal,
            Difficulty::Hard => &self.difficulty.hard,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScoringSettings {
    pub base_score: f64,
    pub time_bonus_points: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TimerSettings {
    pub session_tick_ms: u64,
    pub item_tick_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PoolSettings {
    pub max_deck_len: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DifficultyTable {
    pub easy: DifficultySettings,
    pub normal: DifficultySettings,
    pub hard: DifficultySettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DifficultySettings {
    pub time_limit_secs: u64,
    pub score_multiplier: f64,
    pub time_bonus_multiplier: f64,
    /// Per romaji character of the canonical spelling.
    pub base_word_time_ms: u64,
    pub min_word_time_ms: u64,
    pub max_word_time_ms: u64,
    pub combo_threshold: u32,
    pub combo_bonus_secs: u32,
}

impl DifficultySettings {
    /// Item time for a word whose canonical romanization is `romaji_len` chars long.
    pub fn word_time_ms(&self, romaji_len: usize) -> u64 {
        (romaji_len as u64)
            .saturating_mul(self.base_word_time_ms)
            .clamp(self.min_word_time_ms, self.max_word_time_ms)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuizSettings {
    pub time_limit_secs: u64,
    pub question_time_ms: u64,
    pub score_multiplier: f64,
    pub time_bonus_multiplier: f64,
    pub combo_bonus_cap_secs: u32,
    pub feedback_correct_ms: u64,
    pub feedback_wrong_ms: u64,
}

pub fn parse_settings_toml(toml_str: &str) -> Result<Settings, SettingsError> {
    let s: Settings = toml::from_str(toml_str).map_err(|e| SettingsError::Parse(e.to_string()))?;
    validate(&s)?;
    Ok(s)
}

fn invalid(field: String, reason: &str) -> SettingsError {
    SettingsError::InvalidValue {
        field,
        reason: reason.to_string(),
    }
}

fn validate(s: &Settings) -> Result<(), SettingsError> {
    macro_rules! check_positive_int {
        ($($path:ident).+) => {
            if s.$($path).+ == 0 {
                return Err(invalid(stringify!($($path).+).replace(' ', ""), "must be positive"));
            }
        };
    }
    macro_rules! check_positive_float {
        ($($path:ident).+) => {
            if s.$($path).+ <= 0.0 {
                return Err(invalid(stringify!($($path).+).replace(' ', ""), "must be positive"));
            }
        };
    }
    macro_rules! check_non_negative {
        ($($path:ident).+) => {
            if s.$($path).+ < 0.0 {
                return Err(invalid(stringify!($($path).+).replace(' ', ""), "must be non-negative"));
            }
        };
    }

    check_positive_float!(scoring.base_score);
    check_non_negative!(scoring.time_bonus_points);
    check_positive_int!(timers.session_tick_ms);
    check_positive_int!(timers.item_tick_ms);
    check_positive_int!(pool.max_deck_len);

    for difficulty in Difficulty::ALL {
        let d = s.for_difficulty(difficulty);
        let field = |name: &str| format!("difficulty.{difficulty}.{name}");
        if d.time_limit_secs == 0 {
            return Err(invalid(field("time_limit_secs"), "must be positive"));
        }
        if d.score_multiplier <= 0.0 {
            return Err(invalid(field("score_multiplier"), "must be positive"));
        }
        if d.time_bonus_multiplier < 0.0 {
            return Err(invalid(field("time_bonus_multiplier"), "must be non-negative"));
        }
        if d.min_word_time_ms == 0 {
            return Err(invalid(field("min_word_time_ms"), "must be positive"));
        }
        if d.min_word_time_ms > d.max_word_time_ms {
            return Err(invalid(
                field("max_word_time_ms"),
                "must be at least min_word_time_ms",
            ));
        }
        if d.combo_threshold == 0 {
            return Err(invalid(field("combo_threshold"), "must be positive"));
        }
    }

    check_positive_int!(quiz.time_limit_secs);
    check_positive_int!(quiz.question_time_ms);
    check_positive_float!(quiz.score_multiplier);
    check_non_negative!(quiz.time_bonus_multiplier);
    check_positive_int!(quiz.feedback_correct_ms);
    check_positive_int!(quiz.feedback_wrong_ms);

    Ok(())
}
