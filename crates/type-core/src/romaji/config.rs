use std::collections::BTreeMap;

use serde::Deserialize;

#[derive(Deserialize)]
struct RomajiConfig {
    units: BTreeMap<String, Vec<String>>,
}

#[derive(Debug, thiserror::Error)]
pub enum RomajiConfigError {
    #[error("TOML parse error: {0}")]
    Parse(String),
    #[error("[units] table is empty")]
    Empty,
    #[error("key must be one or two characters: {0:?}")]
    BadKey(String),
    #[error("no spellings for key: {0}")]
    EmptyChoices(String),
    #[error("spelling for {key} must be non-empty ASCII: {choice:?}")]
    BadChoice { key: String, choice: String },
    #[error("romaji table already initialized")]
    AlreadyInitialized,
}

/// Parse TOML text into a sorted `BTreeMap<kana, spellings>`.
///
/// Spelling order is preserved; the first entry of each list is canonical.
pub fn parse_romaji_toml(
    toml_str: &str,
) -> Result<BTreeMap<String, Vec<String>>, RomajiConfigError> {
    let config: RomajiConfig =
        toml::from_str(toml_str).map_err(|e| RomajiConfigError::Parse(e.to_string()))?;

    if config.units.is_empty() {
        return Err(RomajiConfigError::Empty);
    }

    for (key, choices) in &config.units {
        let len = key.chars().count();
        if len == 0 || len > 2 {
            return Err(RomajiConfigError::BadKey(key.clone()));
        }
        if choices.is_empty() {
            return Err(RomajiConfigError::EmptyChoices(key.clone()));
        }
        if let Some(bad) = choices.iter().find(|c| c.is_empty() || !c.is_ascii()) {
            return Err(RomajiConfigError::BadChoice {
                key: key.clone(),
                choice: bad.clone(),
            });
        }
    }

    Ok(config.units)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_valid_toml() {
        let toml = r#"
[units]
"あ" = ["a"]
"し" = ["si", "shi"]
"#;
        let map = parse_romaji_toml(toml).unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map["し"], vec!["si".to_string(), "shi".to_string()]);
    }

    #[test]
    fn parse_default_toml() {
        let map = parse_romaji_toml(super::super::table::DEFAULT_TOML).unwrap();
        assert!(map.len() > 100, "expected 100+ units, got {}", map.len());
        assert_eq!(map["し"], vec!["si", "shi", "ci"]);
        assert_eq!(map["ん"][0], "n");
    }

    #[test]
    fn error_empty_units() {
        let err = parse_romaji_toml("[units]\n").unwrap_err();
        assert!(matches!(err, RomajiConfigError::Empty));
    }

    #[test]
    fn error_long_key() {
        let toml = r#"
[units]
"きゃあ" = ["kyaa"]
"#;
        let err = parse_romaji_toml(toml).unwrap_err();
        assert!(matches!(err, RomajiConfigError::BadKey(_)));
    }

    #[test]
    fn error_empty_choices() {
        let toml = r#"
[units]
"あ" = []
"#;
        let err = parse_romaji_toml(toml).unwrap_err();
        assert!(matches!(err, RomajiConfigError::EmptyChoices(_)));
    }

    #[test]
    fn error_non_ascii_choice() {
        let toml = r#"
[units]
"あ" = ["ａ"]
"#;
        let err = parse_romaji_toml(toml).unwrap_err();
        assert!(matches!(err, RomajiConfigError::BadChoice { .. }));
    }

    #[test]
    fn error_invalid_toml() {
        let err = parse_romaji_toml("not valid toml {{{").unwrap_err();
        assert!(matches!(err, RomajiConfigError::Parse(_)));
    }
}
