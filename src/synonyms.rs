//! Synonym resolver
//!
//! The table maps a canonical word to its synonyms. Lookups are
//! case-insensitive; everything the resolver returns from the table is lowercase.

use crate::dataset::Source;
use crate::error::LoadError;
use crate::types::SynonymConflictPolicy;
use indexmap::{IndexMap, IndexSet};
use std::collections::HashMap;

/// Canonical word -> synonyms, in document order
#[derive(Debug, Clone, Default)]
pub struct SynonymTable {
    groups: IndexMap<String, Vec<String>>,
    /// Lowercase word (canonical or synonym) -> lowercase canonical
    canonical: HashMap<String, String>,
}

impl SynonymTable {
    /// Build the table, checking that no word sits under two canonical entries.
    ///
    /// With `Warn` every conflict is logged and the first entry keeps the word.
    pub fn new(
        raw: IndexMap<String, Vec<String>>,
        policy: SynonymConflictPolicy,
    ) -> Result<Self, LoadError> {
        let mut groups: IndexMap<String, Vec<String>> = IndexMap::new();
        let mut canonical: HashMap<String, String> = HashMap::new();

        for (key, synonyms) in raw {
            let key = key.to_lowercase();
            let synonyms: Vec<String> = synonyms.iter().map(|s| s.to_lowercase()).collect();

            for word in std::iter::once(&key).chain(synonyms.iter()) {
                match canonical.get(word) {
                    Some(existing) if *existing != key => match policy {
                        SynonymConflictPolicy::Fail => {
                            return Err(LoadError::SynonymConflict {
                                word: word.clone(),
                                first: existing.clone(),
                                second: key.clone(),
                            });
                        }
                        SynonymConflictPolicy::Warn => {
                            tracing::warn!(
                                "Synonym '{}' listed under '{}' and '{}'; keeping '{}'",
                                word,
                                existing,
                                key,
                                existing
                            );
                        }
                    },
                    Some(_) => {}
                    None => {
                        canonical.insert(word.clone(), key.clone());
                    }
                }
            }

            groups.entry(key).or_default().extend(synonyms);
        }

        Ok(Self { groups, canonical })
    }

    /// Parse the synonym JSON object
    pub fn from_json(
        source_name: &str,
        json: &str,
        policy: SynonymConflictPolicy,
    ) -> Result<Self, LoadError> {
        let raw: IndexMap<String, Vec<String>> =
            serde_json::from_str(json).map_err(|e| LoadError::parse(source_name, e))?;
        Self::new(raw, policy)
    }

    /// Fetch and parse the synonym table
    pub async fn load(source: &Source, policy: SynonymConflictPolicy) -> Result<Self, LoadError> {
        let text = source.read_text().await?;
        let table = Self::from_json(&source.to_string(), &text, policy)?;
        tracing::info!(
            "Loaded {} synonym groups ({} words) from {}",
            table.groups.len(),
            table.canonical.len(),
            source
        );
        Ok(table)
    }

    /// Canonical key for `word`, if it is a canonical word or one of its synonyms
    pub fn canonical_of(&self, word: &str) -> Option<&str> {
        self.canonical.get(&word.to_lowercase()).map(|s| s.as_str())
    }

    /// The canonical word plus all its synonyms, or just `word` itself when unknown
    pub fn synonyms_of(&self, word: &str) -> IndexSet<String> {
        match self.canonical_of(word) {
            Some(canonical) => {
                let mut set = IndexSet::new();
                set.insert(canonical.to_string());
                if let Some(synonyms) = self.groups.get(canonical) {
                    set.extend(synonyms.iter().cloned());
                }
                set
            }
            None => IndexSet::from([word.to_string()]),
        }
    }

    /// Every canonical word and synonym, lowercase, in table order
    pub fn words(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().flat_map(|(key, synonyms)| {
            std::iter::once(key.as_str()).chain(synonyms.iter().map(|s| s.as_str()))
        })
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(json: &str) -> SynonymTable {
        SynonymTable::from_json("synonyms", json, SynonymConflictPolicy::Fail).unwrap()
    }

    #[test]
    fn test_canonical_of_key_and_synonym() {
        let t = table(r#"{"anxious": ["worried", "Nervous"]}"#);
        assert_eq!(t.canonical_of("anxious"), Some("anxious"));
        assert_eq!(t.canonical_of("WORRIED"), Some("anxious"));
        assert_eq!(t.canonical_of("nervous"), Some("anxious"));
        assert_eq!(t.canonical_of("calm"), None);
    }

    #[test]
    fn test_synonyms_of_known_word_is_lowercase_group() {
        let t = table(r#"{"Anxious": ["worried", "Nervous"]}"#);
        let set: Vec<String> = t.synonyms_of("Worried").into_iter().collect();
        assert_eq!(set, vec!["anxious", "worried", "nervous"]);
    }

    #[test]
    fn test_synonyms_of_unknown_word_keeps_case() {
        let t = table(r#"{"anxious": ["worried"]}"#);
        let set: Vec<String> = t.synonyms_of("Content").into_iter().collect();
        assert_eq!(set, vec!["Content"]);
    }

    #[test]
    fn test_words_in_table_order() {
        let t = table(r#"{"sad": ["down"], "angry": ["mad", "furious"]}"#);
        let words: Vec<&str> = t.words().collect();
        assert_eq!(words, vec!["sad", "down", "angry", "mad", "furious"]);
    }

    #[test]
    fn test_conflict_fails_by_default() {
        let err = SynonymTable::from_json(
            "synonyms",
            r#"{"anxious": ["uneasy"], "nervous": ["uneasy"]}"#,
            SynonymConflictPolicy::Fail,
        )
        .unwrap_err();
        match err {
            LoadError::SynonymConflict { word, first, second } => {
                assert_eq!(word, "uneasy");
                assert_eq!(first, "anxious");
                assert_eq!(second, "nervous");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_conflict_warn_keeps_first_entry() {
        let t = SynonymTable::from_json(
            "synonyms",
            r#"{"anxious": ["uneasy"], "nervous": ["Uneasy"]}"#,
            SynonymConflictPolicy::Warn,
        )
        .unwrap();
        assert_eq!(t.canonical_of("uneasy"), Some("anxious"));
        assert_eq!(t.len(), 2);
    }

    #[test]
    fn test_word_repeated_in_own_group_is_not_a_conflict() {
        let t = table(r#"{"tired": ["tired", "weary"]}"#);
        assert_eq!(t.canonical_of("weary"), Some("tired"));
    }

    #[test]
    fn test_empty_table() {
        let t = SynonymTable::default();
        assert!(t.is_empty());
        assert_eq!(t.synonyms_of("x").len(), 1);
    }
}
