use super::RomajiTable;

/// Consonants that may be doubled to spell a geminate (っ).
const GEMINATE_CONSONANTS: &str = "kstcnhmyrwgzdbpfjvlq";

const SOKUON: &str = "っ";

/// One position in a reading: every spelling accepted for it, canonical first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhonemeUnit {
    choices: Vec<String>,
}

impl PhonemeUnit {
    pub(super) fn new(choices: Vec<String>) -> Self {
        debug_assert!(!choices.is_empty());
        Self { choices }
    }

    fn literal(ch: char) -> Self {
        Self {
            choices: vec![ch.to_string()],
        }
    }

    pub fn choices(&self) -> &[String] {
        &self.choices
    }

    pub fn canonical(&self) -> &str {
        &self.choices[0]
    }

    pub fn accepts(&self, spelling: &str) -> bool {
        self.choices.iter().any(|c| c == spelling)
    }
}

/// Ordered phoneme units for one reading.
///
/// Picking any one choice per unit and concatenating them in order yields a
/// complete, valid input for the reading.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PatternSequence {
    units: Vec<PhonemeUnit>,
}

impl PatternSequence {
    /// Scan left to right, preferring two-kana units (きゃ) over single kana.
    /// Katakana is read as the matching hiragana. Unmapped characters become
    /// singleton units holding the character itself.
    pub fn from_reading(table: &RomajiTable, reading: &str) -> Self {
        let chars: Vec<char> = reading.chars().map(to_hiragana).collect();
        let mut units = Vec::with_capacity(chars.len());
        let mut i = 0;

        while i < chars.len() {
            if i + 1 < chars.len() {
                let pair: String = chars[i..i + 2].iter().collect();
                if let Some(unit) = table.lookup(&pair) {
                    units.push(unit.clone());
                    i += 2;
                    continue;
                }
            }

            if chars[i] == 'っ' && i + 1 < chars.len() {
                if let Some(unit) = geminate_unit(table, &chars[i + 1..]) {
                    units.push(unit);
                    i += 1;
                    continue;
                }
            }

            let single = chars[i].to_string();
            match table.lookup(&single) {
                Some(unit) => units.push(unit.clone()),
                None => units.push(PhonemeUnit::literal(chars[i])),
            }
            i += 1;
        }

        Self { units }
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn unit(&self, index: usize) -> Option<&PhonemeUnit> {
        self.units.get(index)
    }

    pub fn units(&self) -> &[PhonemeUnit] {
        &self.units
    }

    pub fn default_romanization(&self) -> String {
        self.units.iter().map(PhonemeUnit::canonical).collect()
    }

    /// What is left to type when `partial` has been typed into unit `unit`.
    ///
    /// The current unit contributes the tail of its first spelling that extends
    /// `partial`; later units contribute their canonical spelling.
    pub fn remaining_from(&self, unit: usize, partial: &str) -> String {
        let Some(current) = self.units.get(unit) else {
            return String::new();
        };
        let mut out = current
            .choices
            .iter()
            .find(|c| c.starts_with(partial))
            .map(|c| c[partial.len()..].to_string())
            .unwrap_or_default();
        for later in &self.units[unit + 1..] {
            out.push_str(later.canonical());
        }
        out
    }
}

/// Unit for a っ followed by `rest`: the leading consonants of the next unit's
/// spellings, then っ's own spellings. Returns `None` if the next unit is unmapped.
fn geminate_unit(table: &RomajiTable, rest: &[char]) -> Option<PhonemeUnit> {
    let next = if rest.len() >= 2 {
        let pair: String = rest[..2].iter().collect();
        table.lookup(&pair)
    } else {
        None
    };
    let next = next.or_else(|| table.lookup(&rest[0].to_string()))?;

    let mut choices: Vec<String> = Vec::new();
    for spelling in next.choices() {
        let Some(first) = spelling.chars().next() else {
            continue;
        };
        if GEMINATE_CONSONANTS.contains(first) {
            let doubled = first.to_string();
            if !choices.contains(&doubled) {
                choices.push(doubled);
            }
        }
    }
    if let Some(own) = table.lookup(SOKUON) {
        for spelling in own.choices() {
            if !choices.contains(spelling) {
                choices.push(spelling.clone());
            }
        }
    }
    if choices.is_empty() {
        return None;
    }
    Some(PhonemeUnit::new(choices))
}

/// Sequence for words typed as written (alphabet words): one lowercase unit per char.
pub fn literal_sequence(text: &str) -> PatternSequence {
    PatternSequence {
        units: text
            .chars()
            .flat_map(char::to_lowercase)
            .map(PhonemeUnit::literal)
            .collect(),
    }
}

fn to_hiragana(c: char) -> char {
    if ('\u{30A1}'..='\u{30F6}').contains(&c) {
        char::from_u32(c as u32 - 0x60).unwrap_or(c)
    } else {
        c
    }
}

#[cfg(test)]
mod tests {
    use super::super::to_pattern_sequence;
    use super::*;

    fn choices(seq: &PatternSequence) -> Vec<Vec<&str>> {
        seq.units()
            .iter()
            .map(|u| u.choices().iter().map(String::as_str).collect())
            .collect()
    }

    #[test]
    fn test_shita_units() {
        let seq = to_pattern_sequence("した");
        assert_eq!(choices(&seq), vec![vec!["si", "shi", "ci"], vec!["ta"]]);
    }

    #[test]
    fn test_katakana_reads_as_hiragana() {
        assert_eq!(to_pattern_sequence("シャシン"), to_pattern_sequence("しゃしん"));
        assert_eq!(to_pattern_sequence("カード").default_romanization(), "ka-do");
    }

    #[test]
    fn test_youon_prefers_pair() {
        let seq = to_pattern_sequence("しゃしん");
        assert_eq!(seq.len(), 3);
        assert_eq!(seq.unit(0).unwrap().choices(), ["sya", "sha"]);
    }

    #[test]
    fn test_geminate_before_te() {
        let seq = to_pattern_sequence("きって");
        assert_eq!(
            choices(&seq),
            vec![
                vec!["ki"],
                vec!["t", "xtu", "ltu", "xtsu", "ltsu"],
                vec!["te"]
            ]
        );
    }

    #[test]
    fn test_geminate_before_youon() {
        let seq = to_pattern_sequence("まっちゃ");
        assert_eq!(
            seq.unit(1).unwrap().choices(),
            ["t", "c", "xtu", "ltu", "xtsu", "ltsu"]
        );
        assert_eq!(seq.default_romanization(), "mattya");
    }

    #[test]
    fn test_geminate_before_vowel_has_only_own_spellings() {
        let seq = to_pattern_sequence("っあ");
        assert_eq!(seq.unit(0).unwrap().choices(), ["xtu", "ltu", "xtsu", "ltsu"]);
    }

    #[test]
    fn test_trailing_geminate() {
        let seq = to_pattern_sequence("あっ");
        assert_eq!(seq.unit(1).unwrap().canonical(), "xtu");
    }

    #[test]
    fn test_unknown_passthrough() {
        let seq = to_pattern_sequence("漢じ");
        assert_eq!(choices(&seq), vec![vec!["漢"], vec!["zi", "ji"]]);
    }

    #[test]
    fn test_literal_sequence_lowercases() {
        let seq = literal_sequence("Rust");
        assert_eq!(seq.default_romanization(), "rust");
        assert_eq!(seq.len(), 4);
    }

    #[test]
    fn test_remaining_follows_partial_choice() {
        let seq = to_pattern_sequence("した");
        assert_eq!(seq.remaining_from(0, ""), "sita");
        assert_eq!(seq.remaining_from(0, "sh"), "ita");
        assert_eq!(seq.remaining_from(1, ""), "ta");
        assert_eq!(seq.remaining_from(2, ""), "");
    }

    #[test]
    fn test_empty_reading() {
        let seq = to_pattern_sequence("");
        assert!(seq.is_empty());
        assert_eq!(seq.default_romanization(), "");
    }
}
