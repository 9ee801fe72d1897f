//! Collaborator seams for fetching item pools. Implementations live outside
//! the core (HTTP in the root crate, fixtures in tests).

use crate::item::{Member, Word};

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("request failed: {0}")]
    Http(String),
    #[error("malformed response: {0}")]
    Decode(String),
}

pub trait WordSource: Send + Sync {
    /// Words for `category`, or every word when `None`.
    fn fetch_words(&self, category: Option<&str>) -> Result<Vec<Word>, SourceError>;
}

pub trait MemberSource: Send + Sync {
    fn fetch_members(&self) -> Result<Vec<Member>, SourceError>;
}

/// In-memory source, handy for offline play and tests.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    pub words: Vec<Word>,
    pub members: Vec<Member>,
}

impl WordSource for StaticCatalog {
    fn fetch_words(&self, category: Option<&str>) -> Result<Vec<Word>, SourceError> {
        Ok(match category {
            None => self.words.clone(),
            Some(c) => self
                .words
                .iter()
                .filter(|w| w.category_id == c)
                .cloned()
                .collect(),
        })
    }
}

impl MemberSource for StaticCatalog {
    fn fetch_members(&self) -> Result<Vec<Member>, SourceError> {
        Ok(self.members.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_catalog_filters_category() {
        let mut a = Word::new("猫", "ねこ");
        a.category_id = "animal".into();
        let b = Word::new("水", "みず");
        let catalog = StaticCatalog {
            words: vec![a, b],
            members: Vec::new(),
        };
        assert_eq!(catalog.fetch_words(None).unwrap().len(), 2);
        let animals = catalog.fetch_words(Some("animal")).unwrap();
        assert_eq!(animals.len(), 1);
        assert_eq!(animals[0].reading, "ねこ");
    }
}
