//! Kana-to-romaji pattern matching for the typing game.
//!
//! A reading such as "きって" is expanded into a sequence of phoneme units,
//! each holding every accepted spelling. Keystrokes are then validated
//! against the sequence one character at a time, so "si", "shi" and "ci"
//! are all accepted for し.

mod config;
mod matcher;
mod pattern;
mod table;

pub use config::{parse_romaji_toml, RomajiConfigError};
pub use matcher::{match_keystroke, KeystrokeResult};
pub use pattern::{literal_sequence, PatternSequence, PhonemeUnit};

use std::collections::HashMap;
use std::sync::OnceLock;

use table::DEFAULT_TOML;

static CUSTOM_TOML: OnceLock<String> = OnceLock::new();

/// Returns the embedded default romaji table TOML.
pub fn default_toml() -> &'static str {
    DEFAULT_TOML
}

pub struct RomajiTable {
    units: HashMap<String, PhonemeUnit>,
}

impl RomajiTable {
    /// Set custom TOML before first `global()` call.
    pub fn init_custom(toml_content: String) -> Result<(), RomajiConfigError> {
        // Validate eagerly
        parse_romaji_toml(&toml_content)?;
        CUSTOM_TOML
            .set(toml_content)
            .map_err(|_| RomajiConfigError::AlreadyInitialized)
    }

    /// Get or initialize the global singleton.
    pub fn global() -> &'static RomajiTable {
        static INSTANCE: OnceLock<RomajiTable> = OnceLock::new();
        INSTANCE.get_or_init(|| {
            let toml_str = CUSTOM_TOML
                .get()
                .map(|s| s.as_str())
                .unwrap_or(DEFAULT_TOML);
            RomajiTable::from_toml(toml_str).expect("romaji TOML must be valid")
        })
    }

    /// Build a standalone table, bypassing the global singleton.
    pub fn from_toml(toml_str: &str) -> Result<Self, RomajiConfigError> {
        let map = parse_romaji_toml(toml_str)?;
        let units = map
            .into_iter()
            .map(|(kana, choices)| (kana, PhonemeUnit::new(choices)))
            .collect();
        Ok(Self { units })
    }

    pub fn lookup(&self, kana: &str) -> Option<&PhonemeUnit> {
        self.units.get(kana)
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

/// Expand a kana reading into its phoneme units using the global table.
pub fn to_pattern_sequence(reading: &str) -> PatternSequence {
    PatternSequence::from_reading(RomajiTable::global(), reading)
}

/// Canonical romanization of a reading ("きって" → "kitte").
pub fn default_romanization(reading: &str) -> String {
    to_pattern_sequence(reading).default_romanization()
}
