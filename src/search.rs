//! Search and ranking
//!
//! Two independent channels per query:
//! - faux feelings whose label contains the query (unranked, dataset order)
//! - feelings, ranked in four tiers:
//!   1. prefix match
//!   2. synonym of a prefix match
//!   3. substring match
//!   4. synonym of a substring match
//!
//! A word is reported once, in its best tier. Feelings that equal a selected
//! faux feeling are promoted and never reported.

use crate::dataset::Dataset;
use crate::synonyms::SynonymTable;
use crate::types::SearchResults;
use indexmap::IndexSet;

/// Whether a faux feeling label matches a query: non-blank, case-insensitive substring
pub fn query_matches(label: &str, query: &str) -> bool {
    !query.trim().is_empty() && label.to_lowercase().contains(&query.to_lowercase())
}

/// Lowercased candidate pool: all dataset feelings, then all synonym words
#[derive(Debug, Clone, Default)]
pub struct FeelingIndex {
    candidates: IndexSet<String>,
}

impl FeelingIndex {
    pub fn build(dataset: &Dataset, synonyms: &SynonymTable) -> Self {
        let candidates = dataset
            .feelings()
            .chain(synonyms.words())
            .map(|w| w.to_lowercase())
            .collect();
        Self { candidates }
    }

    /// Case-insensitive membership
    pub fn contains(&self, word: &str) -> bool {
        self.candidates.contains(&word.to_lowercase())
    }

    pub fn candidates(&self) -> impl Iterator<Item = &str> {
        self.candidates.iter().map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

/// Borrowing search engine over the loaded stores
pub struct SearchEngine<'a> {
    dataset: &'a Dataset,
    synonyms: &'a SynonymTable,
    index: &'a FeelingIndex,
}

impl<'a> SearchEngine<'a> {
    pub fn new(dataset: &'a Dataset, synonyms: &'a SynonymTable, index: &'a FeelingIndex) -> Self {
        Self {
            dataset,
            synonyms,
            index,
        }
    }

    /// Run both channels. A blank query returns empty results.
    pub fn search<'s, I>(&self, query: &str, selected_faux: I) -> SearchResults
    where
        I: IntoIterator<Item = &'s String>,
    {
        if query.trim().is_empty() {
            return SearchResults::default();
        }

        let promoted: IndexSet<String> = selected_faux
            .into_iter()
            .map(|s| s.to_lowercase())
            .collect();
        let ranked_feelings = self
            .rank_feelings(query)
            .into_iter()
            .filter(|f| !promoted.contains(&f.to_lowercase()))
            .collect();

        SearchResults {
            ranked_feelings,
            matching_faux_feelings: self.matching_faux_feelings(query),
        }
    }

    /// Faux feeling labels containing the query, case-insensitive
    pub fn matching_faux_feelings(&self, query: &str) -> Vec<String> {
        let matches: IndexSet<String> = self
            .dataset
            .records()
            .iter()
            .filter(|r| query_matches(&r.faux_feeling, query))
            .map(|r| r.faux_feeling.clone())
            .collect();
        matches.into_iter().collect()
    }

    /// Four-tier ranking over the candidate pool, without promotion filtering
    pub fn rank_feelings(&self, query: &str) -> Vec<String> {
        if query.trim().is_empty() {
            return Vec::new();
        }
        let q = query.to_lowercase();

        let mut prefix: IndexSet<String> = IndexSet::new();
        let mut substring: IndexSet<String> = IndexSet::new();
        for candidate in self.index.candidates() {
            if candidate.starts_with(&q) {
                prefix.insert(candidate.to_string());
            } else if candidate.contains(&q) {
                substring.insert(candidate.to_string());
            }
        }

        let mut prefix_synonyms: IndexSet<String> = IndexSet::new();
        for word in &prefix {
            for synonym in self.synonyms.synonyms_of(word) {
                if !prefix.contains(&synonym) {
                    prefix_synonyms.insert(synonym);
                }
            }
        }

        // A substring match that is also a prefix synonym keeps the better tier
        substring.retain(|w| !prefix_synonyms.contains(w));

        let mut substring_synonyms: IndexSet<String> = IndexSet::new();
        for word in &substring {
            for synonym in self.synonyms.synonyms_of(word) {
                if !prefix.contains(&synonym)
                    && !prefix_synonyms.contains(&synonym)
                    && !substring.contains(&synonym)
                {
                    substring_synonyms.insert(synonym);
                }
            }
        }

        tracing::debug!(
            "Search '{}': {} prefix, {} prefix synonyms, {} substring, {} substring synonyms",
            query,
            prefix.len(),
            prefix_synonyms.len(),
            substring.len(),
            substring_synonyms.len()
        );

        prefix
            .into_iter()
            .chain(prefix_synonyms)
            .chain(substring)
            .chain(substring_synonyms)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{FauxFeelingRecord, SynonymConflictPolicy};

    fn stores(
        records: Vec<FauxFeelingRecord>,
        synonyms: &str,
    ) -> (Dataset, SynonymTable, FeelingIndex) {
        let dataset = Dataset::new(records);
        let synonyms =
            SynonymTable::from_json("synonyms", synonyms, SynonymConflictPolicy::Fail).unwrap();
        let index = FeelingIndex::build(&dataset, &synonyms);
        (dataset, synonyms, index)
    }

    fn overwhelmed() -> (Dataset, SynonymTable, FeelingIndex) {
        stores(
            vec![FauxFeelingRecord::new(
                "Overwhelmed",
                &["anxious", "stressed", "not-anxious"],
                &["rest"],
            )],
            r#"{"anxious": ["worried", "nervous"]}"#,
        )
    }

    #[test]
    fn test_rank_prefix_then_synonym_then_substring() {
        let (dataset, synonyms, index) = overwhelmed();
        let engine = SearchEngine::new(&dataset, &synonyms, &index);

        let results = engine.search("anx", &IndexSet::<String>::new());
        assert_eq!(
            results.ranked_feelings,
            vec!["anxious", "worried", "nervous", "not-anxious"]
        );
    }

    #[test]
    fn test_synonym_group_follows_its_match() {
        let (dataset, synonyms, index) = stores(
            vec![FauxFeelingRecord::new("Overwhelmed", &["anxious", "stressed"], &[])],
            r#"{"anxious": ["worried", "nervous"]}"#,
        );
        let engine = SearchEngine::new(&dataset, &synonyms, &index);

        let ranked = engine.rank_feelings("ner");
        assert_eq!(ranked, vec!["nervous", "anxious", "worried"]);

        // anxious and nervous are substring matches, worried only a synonym
        let ranked = engine.rank_feelings("ous");
        assert_eq!(ranked, vec!["anxious", "nervous", "worried"]);
    }

    #[test]
    fn test_word_reported_once_in_best_tier() {
        let (dataset, synonyms, index) = stores(
            vec![FauxFeelingRecord::new("Attacked", &["scared", "unsafe"], &[])],
            r#"{"scared": ["afraid", "unscared"]}"#,
        );
        let engine = SearchEngine::new(&dataset, &synonyms, &index);

        // "unscared" is a substring match but also a synonym of the prefix match "scared"
        let ranked = engine.rank_feelings("scar");
        assert_eq!(ranked, vec!["scared", "afraid", "unscared"]);
        let unique: IndexSet<&String> = ranked.iter().collect();
        assert_eq!(unique.len(), ranked.len());
    }

    #[test]
    fn test_substring_synonyms_come_last() {
        let (dataset, synonyms, index) = stores(
            vec![FauxFeelingRecord::new("Bullied", &["hurt", "unsettled"], &[])],
            r#"{"unsettled": ["shaky"]}"#,
        );
        let engine = SearchEngine::new(&dataset, &synonyms, &index);
        assert_eq!(engine.rank_feelings("settle"), vec!["unsettled", "shaky"]);
    }

    #[test]
    fn test_query_is_case_insensitive() {
        let (dataset, synonyms, index) = stores(
            vec![FauxFeelingRecord::new("Rejected", &["Lonely", "hurt"], &[])],
            "{}",
        );
        let engine = SearchEngine::new(&dataset, &synonyms, &index);
        assert_eq!(engine.rank_feelings("LON"), vec!["lonely"]);
    }

    #[test]
    fn test_empty_query_returns_nothing() {
        let (dataset, synonyms, index) = overwhelmed();
        let engine = SearchEngine::new(&dataset, &synonyms, &index);
        let selected: IndexSet<String> = IndexSet::from(["Overwhelmed".to_string()]);

        assert!(engine.search("", &selected).is_empty());
        assert!(engine.search("   ", &IndexSet::<String>::new()).is_empty());
    }

    #[test]
    fn test_promoted_feeling_is_filtered() {
        let (dataset, synonyms, index) = stores(
            vec![
                FauxFeelingRecord::new("Lonely", &["sad"], &[]),
                FauxFeelingRecord::new("Abandoned", &["lonely", "scared"], &[]),
            ],
            "{}",
        );
        let engine = SearchEngine::new(&dataset, &synonyms, &index);

        let before = engine.search("lon", &IndexSet::<String>::new());
        assert_eq!(before.ranked_feelings, vec!["lonely"]);

        let selected: IndexSet<String> = IndexSet::from(["Lonely".to_string()]);
        let after = engine.search("lon", &selected);
        assert!(after.ranked_feelings.is_empty());
        assert_eq!(after.matching_faux_feelings, vec!["Lonely"]);
    }

    #[test]
    fn test_faux_matches_in_dataset_order() {
        let (dataset, synonyms, index) = stores(
            vec![
                FauxFeelingRecord::new("Unappreciated", &[], &[]),
                FauxFeelingRecord::new("Numb", &[], &[]),
                FauxFeelingRecord::new("Unheard", &[], &[]),
            ],
            "{}",
        );
        let engine = SearchEngine::new(&dataset, &synonyms, &index);
        assert_eq!(
            engine.matching_faux_feelings("UN"),
            vec!["Unappreciated", "Unheard"]
        );
    }

    #[test]
    fn test_duplicate_label_matched_once() {
        let (dataset, synonyms, index) = stores(
            vec![
                FauxFeelingRecord::new("Used", &["hurt"], &[]),
                FauxFeelingRecord::new("Used", &["angry"], &[]),
            ],
            "{}",
        );
        let engine = SearchEngine::new(&dataset, &synonyms, &index);
        let results = engine.search("us", &IndexSet::<String>::new());
        assert_eq!(results.matching_faux_feelings, vec!["Used"]);
    }

    #[test]
    fn test_query_matches() {
        assert!(query_matches("Overwhelmed", "WHELM"));
        assert!(!query_matches("Overwhelmed", "  "));
        assert!(!query_matches("Numb", "numbed"));
    }

    #[test]
    fn test_numb_scenario() {
        let (dataset, synonyms, index) = stores(
            vec![FauxFeelingRecord::new("Numb", &["empty"], &["rest"])],
            "{}",
        );
        let engine = SearchEngine::new(&dataset, &synonyms, &index);
        let results = engine.search("num", &IndexSet::<String>::new());
        assert_eq!(results.matching_faux_feelings, vec!["Numb"]);
        assert!(results.ranked_feelings.is_empty());
    }

    #[test]
    fn test_no_synonym_table_skips_expansion() {
        let (dataset, _, _) = overwhelmed();
        let synonyms = SynonymTable::default();
        let index = FeelingIndex::build(&dataset, &synonyms);
        let engine = SearchEngine::new(&dataset, &synonyms, &index);
        assert_eq!(engine.rank_feelings("anx"), vec!["anxious", "not-anxious"]);
    }

    #[test]
    fn test_index_contains_synonym_words() {
        let (_, _, index) = overwhelmed();
        assert!(index.contains("Worried"));
        assert!(index.contains("stressed"));
        assert!(!index.contains("calm"));
    }
}
