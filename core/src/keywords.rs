//! Campaign keyword list

use serde::{Deserialize, Serialize};

/// Ordered, deduplicated keyword list.
///
/// # Invariants
/// - Entries are trimmed and lowercased
/// - No duplicates
/// - Insertion order is kept
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeywordSet(Vec<String>);

impl KeywordSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a keyword. Returns `false` if it was blank or already present.
    pub fn add(&mut self, raw: &str) -> bool {
        let keyword = raw.trim().to_lowercase();
        if keyword.is_empty() || self.0.contains(&keyword) {
            return false;
        }
        self.0.push(keyword);
        true
    }

    /// Remove a keyword (matched after normalisation)
    pub fn remove(&mut self, raw: &str) -> bool {
        let keyword = raw.trim().to_lowercase();
        let before = self.0.len();
        self.0.retain(|k| *k != keyword);
        self.0.len() != before
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Keywords in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}

impl<S: AsRef<str>> FromIterator<S> for KeywordSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = KeywordSet::new();
        for keyword in iter {
            set.add(keyword.as_ref());
        }
        set
    }
}
