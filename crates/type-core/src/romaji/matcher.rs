use super::pattern::PatternSequence;

/// Leading characters after which a bare "n" cannot stand for ん on its own.
const NASAL_BLOCKERS: [char; 7] = ['a', 'i', 'u', 'e', 'o', 'y', 'n'];

/// Outcome of feeding one keystroke to a pattern sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeystrokeResult {
    /// The keystroke was accepted.
    pub matched: bool,
    /// Unit `unit` was completed by this keystroke.
    pub advance: bool,
    /// Input typed so far into the unit the caller should be on next.
    pub partial: String,
    /// Unit this outcome refers to. Can be past the input unit when a bare
    /// "n" was resolved as ん before the keystroke was applied.
    pub unit: usize,
}

impl KeystrokeResult {
    fn rejected(unit: usize, partial: &str) -> Self {
        Self {
            matched: false,
            advance: false,
            partial: partial.to_string(),
            unit,
        }
    }

    /// Unit index the caller should sit on after applying this result.
    pub fn next_unit(&self) -> usize {
        if self.advance {
            self.unit + 1
        } else {
            self.unit
        }
    }
}

/// Validate `key` typed after `partial` at unit `unit`.
///
/// An exact spelling completes the unit; a strict prefix keeps it open.
/// A pending bare "n" is resolved as ん when the next unit cannot continue it
/// (no spelling starts with a vowel, y or n), and `key` is retried on that
/// next unit. Anything else is rejected with the state unchanged.
pub fn match_keystroke(
    seq: &PatternSequence,
    unit: usize,
    partial: &str,
    key: char,
) -> KeystrokeResult {
    let Some(current) = seq.unit(unit) else {
        return KeystrokeResult::rejected(unit, partial);
    };

    let mut test = String::with_capacity(partial.len() + key.len_utf8());
    test.push_str(partial);
    test.push(key);

    if current.choices().iter().any(|c| *c == test) {
        return KeystrokeResult {
            matched: true,
            advance: true,
            partial: String::new(),
            unit,
        };
    }

    if current
        .choices()
        .iter()
        .any(|c| c.len() > test.len() && c.starts_with(&test))
    {
        return KeystrokeResult {
            matched: true,
            advance: false,
            partial: test,
            unit,
        };
    }

    if current.accepts("n") && partial == "n" {
        if let Some(next) = seq.unit(unit + 1) {
            let continues_nasal = next.choices().iter().any(|c| {
                c.chars()
                    .next()
                    .is_some_and(|first| NASAL_BLOCKERS.contains(&first))
            });
            if !continues_nasal {
                let retried = match_keystroke(seq, unit + 1, "", key);
                if retried.matched {
                    return retried;
                }
            }
        }
    }

    KeystrokeResult::rejected(unit, partial)
}
