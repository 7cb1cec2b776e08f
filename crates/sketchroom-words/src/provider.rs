//! Word providers: where drawing candidates come from.

use std::collections::{BTreeMap, HashSet};

use rand::seq::SliceRandom;
use sketchroom_protocol::WordChoice;
use tracing::{debug, warn};

use crate::WordError;
use crate::builtin::CATEGORIES;

/// Source of candidate words for the drawer.
///
/// `used` holds the lowercase form of every word already played in the
/// session; implementations must not return any of them. An empty result
/// means the pool is exhausted.
pub trait WordProvider: Send + Sync + 'static {
    fn batch(
        &self,
        category: Option<&str>,
        count: usize,
        used: &HashSet<String>,
    ) -> Vec<WordChoice>;
}

// ---------------------------------------------------------------------------
// WordBank
// ---------------------------------------------------------------------------

/// Categorised word lists, sampled uniformly at random.
#[derive(Debug, Clone)]
pub struct WordBank {
    categories: BTreeMap<String, Vec<String>>,
}

impl WordBank {
    /// The built-in Animals / Sports / Random lists.
    pub fn builtin() -> Self {
        let categories = CATEGORIES
            .iter()
            .map(|(name, words)| {
                let words = words.iter().map(|w| (*w).to_owned()).collect();
                ((*name).to_owned(), words)
            })
            .collect();
        Self { categories }
    }

    /// Parses `{ "Category": ["word", ...], ... }`.
    ///
    /// Blank entries are dropped and duplicates within a category are
    /// collapsed case-insensitively. Categories left empty are skipped.
    pub fn from_json(json: &str) -> Result<Self, WordError> {
        let raw: BTreeMap<String, Vec<String>> = serde_json::from_str(json)?;
        Self::from_categories(raw)
    }

    pub fn from_categories(raw: BTreeMap<String, Vec<String>>) -> Result<Self, WordError> {
        let mut categories = BTreeMap::new();
        for (name, words) in raw {
            let mut seen = HashSet::new();
            let words: Vec<String> = words
                .into_iter()
                .map(|w| w.trim().to_owned())
                .filter(|w| !w.is_empty() && seen.insert(w.to_lowercase()))
                .collect();
            if words.is_empty() {
                warn!(category = %name, "word category is empty, skipping");
                continue;
            }
            categories.insert(name, words);
        }
        if categories.is_empty() {
            return Err(WordError::Empty);
        }
        Ok(Self { categories })
    }

    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.categories.keys().map(String::as_str)
    }

    /// Total number of words across all categories.
    pub fn len(&self) -> usize {
        self.categories.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

impl Default for WordBank {
    fn default() -> Self {
        Self::builtin()
    }
}

impl WordProvider for WordBank {
    fn batch(
        &self,
        category: Option<&str>,
        count: usize,
        used: &HashSet<String>,
    ) -> Vec<WordChoice> {
        let selected: Vec<(&String, &Vec<String>)> = match category {
            Some(name) => match self.categories.get_key_value(name) {
                Some(entry) => vec![entry],
                None => {
                    debug!(category = name, "unknown category, drawing from all");
                    self.categories.iter().collect()
                }
            },
            None => self.categories.iter().collect(),
        };

        let mut pool: Vec<WordChoice> = selected
            .into_iter()
            .flat_map(|(name, words)| {
                words
                    .iter()
                    .filter(|w| !used.contains(&w.to_lowercase()))
                    .map(move |w| WordChoice::new(w.clone(), name.clone()))
            })
            .collect();

        pool.shuffle(&mut rand::rng());
        // A word listed under several categories is offered once.
        let mut seen = HashSet::new();
        pool.retain(|choice| seen.insert(choice.word.to_lowercase()));
        pool.truncate(count);
        pool
    }
}

// ---------------------------------------------------------------------------
// FixedWords
// ---------------------------------------------------------------------------

/// A provider that always offers its words in the order given.
///
/// Makes word selection deterministic in tests and scripted demos.
#[derive(Debug, Clone)]
pub struct FixedWords {
    category: String,
    words: Vec<String>,
}

impl FixedWords {
    pub fn new<I, S>(category: impl Into<String>, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            category: category.into(),
            words: words.into_iter().map(Into::into).collect(),
        }
    }
}

impl WordProvider for FixedWords {
    fn batch(
        &self,
        _category: Option<&str>,
        count: usize,
        used: &HashSet<String>,
    ) -> Vec<WordChoice> {
        self.words
            .iter()
            .filter(|w| !used.contains(&w.to_lowercase()))
            .take(count)
            .map(|w| WordChoice::new(w.clone(), self.category.clone()))
            .collect()
    }
}
