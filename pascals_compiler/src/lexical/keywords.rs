//! Reserved word lookup

use crate::config::constants::language::DEFAULT_KEYWORDS;
use std::collections::HashSet;

/// Case-insensitive set of reserved words
#[derive(Debug, Clone)]
pub struct KeywordSet {
    words: HashSet<String>,
}

impl KeywordSet {
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            words: words
                .into_iter()
                .map(|w| w.as_ref().to_lowercase())
                .collect(),
        }
    }

    /// Default list plus any extra words
    pub fn with_extras(extra: &[String]) -> Self {
        let mut set = Self::default();
        set.words.extend(extra.iter().map(|w| w.to_lowercase()));
        set
    }

    pub fn contains(&self, lexeme: &str) -> bool {
        self.words.contains(&lexeme.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

impl Default for KeywordSet {
    fn default() -> Self {
        Self::new(DEFAULT_KEYWORDS.iter())
    }
}
