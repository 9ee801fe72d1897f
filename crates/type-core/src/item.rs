//! Typing targets: words for the typing mode, members for the photo quiz.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::romaji::{literal_sequence, to_pattern_sequence, PatternSequence};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Normal,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Normal, Difficulty::Hard];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Normal => "normal",
            Self::Hard => "hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown difficulty: {0}")]
pub struct ParseDifficultyError(String);

impl FromStr for Difficulty {
    type Err = ParseDifficultyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "easy" => Ok(Self::Easy),
            "normal" => Ok(Self::Normal),
            "hard" => Ok(Self::Hard),
            _ => Err(ParseDifficultyError(s.to_string())),
        }
    }
}

/// How a word's reading is typed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum InputType {
    /// Kana reading typed as romaji.
    #[default]
    #[serde(rename = "hiragana", alias = "phonetic")]
    Phonetic,
    /// Reading typed character for character.
    #[serde(rename = "alphabet", alias = "literal")]
    Literal,
}

/// Relative pick frequency per difficulty. Zero excludes the word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Weights {
    pub easy: u32,
    pub normal: u32,
    pub hard: u32,
}

impl Default for Weights {
    fn default() -> Self {
        Self {
            easy: 1,
            normal: 1,
            hard: 1,
        }
    }
}

impl Weights {
    pub fn get(&self, difficulty: Difficulty) -> u32 {
        match difficulty {
            Difficulty::Easy => self.easy,
            Difficulty::Normal => self.normal,
            Difficulty::Hard => self.hard,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Word {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub text: String,
    pub reading: String,
    #[serde(default)]
    pub input_type: InputType,
    #[serde(default)]
    pub category_id: String,
    #[serde(default)]
    pub weights: Weights,
}

impl Word {
    pub fn new(text: impl Into<String>, reading: impl Into<String>) -> Self {
        Self {
            id: None,
            text: text.into(),
            reading: reading.into(),
            input_type: InputType::Phonetic,
            category_id: String::new(),
            weights: Weights::default(),
        }
    }

    pub fn literal(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            reading: text.clone(),
            input_type: InputType::Literal,
            ..Self::new(text, String::new())
        }
    }

    pub fn with_weights(mut self, easy: u32, normal: u32, hard: u32) -> Self {
        self.weights = Weights { easy, normal, hard };
        self
    }

    pub fn patterns(&self) -> PatternSequence {
        match self.input_type {
            InputType::Phonetic => to_pattern_sequence(&self.reading),
            InputType::Literal => literal_sequence(&self.reading),
        }
    }
}

/// Which of a member's names a quiz question asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionTarget {
    Name,
    Nickname,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub name_reading: String,
    #[serde(default)]
    pub nickname: Option<String>,
    #[serde(default)]
    pub nickname_reading: Option<String>,
    #[serde(default, alias = "photoData")]
    pub photo_reference: String,
}

impl Member {
    pub fn new(name: impl Into<String>, name_reading: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            name_reading: name_reading.into(),
            nickname: None,
            nickname_reading: None,
            photo_reference: String::new(),
        }
    }

    pub fn with_nickname(mut self, nickname: impl Into<String>, reading: impl Into<String>) -> Self {
        self.nickname = Some(nickname.into());
        self.nickname_reading = Some(reading.into());
        self
    }

    /// Nickname, if present and not blank.
    pub fn nickname(&self) -> Option<&str> {
        self.nickname.as_deref().filter(|n| !n.trim().is_empty())
    }

    /// Accepted answers for `target`, non-blank only.
    pub fn answers(&self, target: QuestionTarget) -> Vec<&str> {
        let pair = match target {
            QuestionTarget::Name => [Some(self.name.as_str()), Some(self.name_reading.as_str())],
            QuestionTarget::Nickname => [self.nickname.as_deref(), self.nickname_reading.as_deref()],
        };
        pair.into_iter()
            .flatten()
            .filter(|s| !s.trim().is_empty())
            .collect()
    }

    /// Answer shown to the player after the question closes.
    pub fn revealed_answer(&self, target: QuestionTarget) -> &str {
        match target {
            QuestionTarget::Nickname => self.nickname().unwrap_or(&self.name),
            QuestionTarget::Name => &self.name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_difficulty_parse() {
        assert_eq!("Hard".parse::<Difficulty>().unwrap(), Difficulty::Hard);
        assert!("brutal".parse::<Difficulty>().is_err());
        assert_eq!(Difficulty::Normal.to_string(), "normal");
    }

    #[test]
    fn test_word_wire_format() {
        let json = r#"{
            "id": "w1",
            "text": "container",
            "reading": "container",
            "inputType": "alphabet",
            "categoryId": "it",
            "weights": { "easy": 0, "normal": 1, "hard": 2 }
        }"#;
        let word: Word = serde_json::from_str(json).unwrap();
        assert_eq!(word.input_type, InputType::Literal);
        assert_eq!(word.weights.get(Difficulty::Hard), 2);
        assert_eq!(word.patterns().default_romanization(), "container");
    }

    #[test]
    fn test_word_defaults() {
        let word: Word = serde_json::from_str(r#"{"text":"寿司","reading":"すし"}"#).unwrap();
        assert_eq!(word.input_type, InputType::Phonetic);
        assert_eq!(word.weights, Weights::default());
        assert_eq!(word.patterns().default_romanization(), "susi");
    }

    #[test]
    fn test_member_answers() {
        let m = Member::new("山田太郎", "やまだたろう").with_nickname("タロ", "たろ");
        assert_eq!(m.answers(QuestionTarget::Name), vec!["山田太郎", "やまだたろう"]);
        assert_eq!(m.answers(QuestionTarget::Nickname), vec!["タロ", "たろ"]);
        assert_eq!(m.revealed_answer(QuestionTarget::Nickname), "タロ");
    }

    #[test]
    fn test_blank_nickname_is_absent() {
        let mut m = Member::new("佐藤", "さとう");
        m.nickname = Some("  ".into());
        assert!(m.nickname().is_none());
        assert_eq!(m.revealed_answer(QuestionTarget::Nickname), "佐藤");
    }

    #[test]
    fn test_member_photo_alias() {
        let m: Member = serde_json::from_str(
            r#"{"name":"a","nameReading":"あ","nickname":null,"photoData":"data:image/png"}"#,
        )
        .unwrap();
        assert_eq!(m.photo_reference, "data:image/png");
    }
}
