//! Selection state and the toggle protocol
//!
//! All mutation goes through [`SelectionState::apply`], one [`Action`] per
//! user gesture. Unknown labels are ignored rather than reported.

use crate::dataset::Dataset;
use crate::search::{query_matches, FeelingIndex};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

/// A single user gesture
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "label", rename_all = "snake_case")]
pub enum Action {
    SetQuery(String),
    ClearQuery,
    ToggleFauxFeeling(String),
    ToggleFeeling(String),
    ToggleNeed(String),
    ClearSelections,
}

/// What the user has picked so far. Never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionState {
    pub query: String,
    /// Exact labels, in selection order
    pub selected_faux_feelings: IndexSet<String>,
    /// Lowercase feelings
    pub selected_feelings: IndexSet<String>,
    /// Needs exactly as written in the dataset
    pub selected_needs: IndexSet<String>,
    /// Faux feelings matching the query that are not selected
    pub unselected_matching_faux_feelings: IndexSet<String>,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one action. Returns whether anything changed.
    pub fn apply(&mut self, action: Action, dataset: &Dataset, index: &FeelingIndex) -> bool {
        let before = self.clone();
        match action {
            Action::SetQuery(query) => self.set_query(query, dataset),
            Action::ClearQuery => self.set_query(String::new(), dataset),
            Action::ToggleFauxFeeling(label) => self.toggle_faux_feeling(&label, dataset),
            Action::ToggleFeeling(label) => self.toggle_feeling(&label, index),
            Action::ToggleNeed(label) => self.toggle_need(&label, dataset),
            Action::ClearSelections => {
                self.selected_faux_feelings.clear();
                self.selected_feelings.clear();
                self.selected_needs.clear();
                let query = std::mem::take(&mut self.query);
                self.set_query(query, dataset);
            }
        }
        *self != before
    }

    /// Whether a feeling equals a selected faux feeling (case-insensitive)
    pub fn is_promoted(&self, feeling: &str) -> bool {
        let feeling = feeling.to_lowercase();
        self.selected_faux_feelings
            .iter()
            .any(|f| f.to_lowercase() == feeling)
    }

    fn set_query(&mut self, query: String, dataset: &Dataset) {
        self.unselected_matching_faux_feelings = dataset
            .records()
            .iter()
            .map(|r| &r.faux_feeling)
            .filter(|label| query_matches(label, &query))
            .filter(|label| !self.selected_faux_feelings.contains(*label))
            .cloned()
            .collect();
        self.query = query;
    }

    fn toggle_faux_feeling(&mut self, label: &str, dataset: &Dataset) {
        if !dataset.contains(label) {
            tracing::debug!("Ignoring toggle of unknown faux feeling '{}'", label);
            return;
        }

        if self.selected_faux_feelings.shift_remove(label) {
            let query = std::mem::take(&mut self.query);
            self.set_query(query, dataset);
        } else {
            self.selected_faux_feelings.insert(label.to_string());
            self.unselected_matching_faux_feelings.shift_remove(label);
            let promoted = label.to_lowercase();
            self.selected_feelings.retain(|f| *f != promoted);
        }
    }

    fn toggle_feeling(&mut self, label: &str, index: &FeelingIndex) {
        if !index.contains(label) {
            tracing::debug!("Ignoring toggle of unknown feeling '{}'", label);
            return;
        }
        if self.is_promoted(label) {
            tracing::debug!("Ignoring toggle of promoted feeling '{}'", label);
            return;
        }

        let feeling = label.to_lowercase();
        if !self.selected_feelings.shift_remove(&feeling) {
            self.selected_feelings.insert(feeling);
        }
    }

    fn toggle_need(&mut self, label: &str, dataset: &Dataset) {
        if !dataset.has_need(label) {
            tracing::debug!("Ignoring toggle of unknown need '{}'", label);
            return;
        }
        if !self.selected_needs.shift_remove(label) {
            self.selected_needs.insert(label.to_string());
        }
    }
}
