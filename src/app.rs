//! Application controller
//!
//! `IcebergApp` owns the loaded stores and the selection state. Adapters send
//! it one [`Action`] per user gesture and re-read the derived [`ViewModel`].
//!
//! ```rust,ignore
//! let config = Config::load(&args)?;
//! let mut app = IcebergApp::load(&config).await?;
//!
//! app.dispatch(Action::SetQuery("num".into()));
//! app.toggle_faux_feeling("Numb");
//! assert_eq!(app.get_selected_needs(), vec!["rest"]);
//! ```

use crate::categories::{Categories, CategoryView};
use crate::config::Config;
use crate::dataset::{Dataset, Source};
use crate::derive::{build_graph, derive_needs};
use crate::error::LoadError;
use crate::search::{FeelingIndex, SearchEngine};
use crate::selection::{Action, SelectionState};
use crate::synonyms::SynonymTable;
use crate::types::{
    Category, GraphGatingMode, IcebergGraph, SearchResults, SynonymConflictPolicy, ViewModel,
};

pub struct IcebergApp {
    dataset: Dataset,
    synonyms: SynonymTable,
    categories: Categories,
    index: FeelingIndex,
    state: SelectionState,
    gating: GraphGatingMode,
}

impl IcebergApp {
    pub fn new(
        dataset: Dataset,
        synonyms: SynonymTable,
        categories: Categories,
        gating: GraphGatingMode,
    ) -> Self {
        let index = FeelingIndex::build(&dataset, &synonyms);
        Self {
            dataset,
            synonyms,
            categories,
            index,
            state: SelectionState::new(),
            gating,
        }
    }

    /// Load every source named by the config.
    ///
    /// A dataset failure is fatal. A synonym or category failure is logged and
    /// leaves that store empty, except a synonym conflict under the `fail` policy.
    pub async fn load(config: &Config) -> Result<Self, LoadError> {
        let dataset = Dataset::load(&config.dataset_source()).await?;

        let synonyms = match config.synonyms_source() {
            Some(source) => load_synonyms(&source, config.synonym_conflicts).await?,
            None => SynonymTable::default(),
        };

        let categories = match config.categories_source() {
            Some(source) if source.exists() => match Categories::load(&source).await {
                Ok(categories) => categories,
                Err(e) => {
                    tracing::warn!("Categories unavailable: {}", e);
                    Categories::default()
                }
            },
            Some(source) => {
                tracing::debug!("No categories at {}", source);
                Categories::default()
            }
            None => Categories::default(),
        };

        let app = Self::new(dataset, synonyms, categories, config.graph_gating);
        tracing::info!(
            "Ready: {} faux feelings, {} searchable feelings, graph gating {}",
            app.dataset.len(),
            app.index.len(),
            app.gating
        );
        Ok(app)
    }

    /// Apply one action and derive the full view model
    pub fn dispatch(&mut self, action: Action) -> ViewModel {
        tracing::debug!("Dispatch {:?}", action);
        self.state.apply(action, &self.dataset, &self.index);
        self.view()
    }

    /// Derive everything the presentation layer shows from the current state
    pub fn view(&self) -> ViewModel {
        ViewModel {
            query: self.state.query.clone(),
            search: self.search(&self.state.query),
            selected_faux_feelings: self.state.selected_faux_feelings.clone(),
            unselected_matching_faux_feelings: self.state.unselected_matching_faux_feelings.clone(),
            selected_feelings: self.state.selected_feelings.clone(),
            selected_needs: self.state.selected_needs.clone(),
            needs: self.get_selected_needs(),
            graph: self.get_graph(),
        }
    }

    /// Ranked feelings and matching faux feelings for `query`, given the current selection
    pub fn search(&self, query: &str) -> SearchResults {
        SearchEngine::new(&self.dataset, &self.synonyms, &self.index)
            .search(query, &self.state.selected_faux_feelings)
    }

    pub fn toggle_faux_feeling(&mut self, label: &str) {
        self.dispatch(Action::ToggleFauxFeeling(label.to_string()));
    }

    pub fn toggle_feeling(&mut self, label: &str) {
        self.dispatch(Action::ToggleFeeling(label.to_string()));
    }

    pub fn toggle_need(&mut self, label: &str) {
        self.dispatch(Action::ToggleNeed(label.to_string()));
    }

    /// Needs underneath the selected faux feelings
    pub fn get_selected_needs(&self) -> Vec<String> {
        derive_needs(&self.dataset, &self.state)
    }

    pub fn get_graph(&self) -> IcebergGraph {
        build_graph(&self.dataset, &self.state, self.gating)
    }

    pub fn categories(&self) -> &[Category] {
        self.categories.all()
    }

    pub fn category_view(&self, id: &str) -> Option<CategoryView> {
        self.categories.view(id, &self.state)
    }

    /// Pick a feeling from a category page. Feelings outside the category are ignored.
    pub fn toggle_category_feeling(&mut self, category_id: &str, feeling: &str) {
        if !self.categories.contains_feeling(category_id, feeling) {
            tracing::debug!("'{}' is not in category '{}'", feeling, category_id);
            return;
        }
        self.toggle_feeling(feeling);
    }

    pub fn state(&self) -> &SelectionState {
        &self.state
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn synonyms(&self) -> &SynonymTable {
        &self.synonyms
    }

    pub fn gating(&self) -> GraphGatingMode {
        self.gating
    }

    pub fn set_gating(&mut self, gating: GraphGatingMode) {
        self.gating = gating;
    }
}

async fn load_synonyms(
    source: &Source,
    policy: SynonymConflictPolicy,
) -> Result<SynonymTable, LoadError> {
    if !source.exists() {
        tracing::warn!("No synonym table at {}; synonym expansion disabled", source);
        return Ok(SynonymTable::default());
    }
    match SynonymTable::load(source, policy).await {
        Ok(table) => Ok(table),
        Err(e @ LoadError::SynonymConflict { .. }) => Err(e),
        Err(e) => {
            tracing::warn!("Synonyms unavailable, expansion disabled: {}", e);
            Ok(SynonymTable::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FauxFeelingRecord;

    fn numb_app() -> IcebergApp {
        IcebergApp::new(
            Dataset::new(vec![FauxFeelingRecord::new("Numb", &["empty"], &["rest"])]),
            SynonymTable::default(),
            Categories::default(),
            GraphGatingMode::FauxOnly,
        )
    }

    fn write_data_dir(worksheet: &str, synonyms: Option<&str>) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(crate::config::DATASET_FILE), worksheet).unwrap();
        if let Some(synonyms) = synonyms {
            std::fs::write(dir.path().join(crate::config::SYNONYMS_FILE), synonyms).unwrap();
        }
        dir
    }

    #[test]
    fn test_numb_scenario() {
        let mut app = numb_app();

        let results = app.search("num");
        assert_eq!(results.matching_faux_feelings, vec!["Numb"]);
        assert!(results.ranked_feelings.is_empty());

        app.toggle_faux_feeling("Numb");
        assert_eq!(app.get_selected_needs(), vec!["rest"]);
    }

    #[test]
    fn test_dispatch_returns_fresh_view() {
        let mut app = numb_app();
        let view = app.dispatch(Action::SetQuery("num".to_string()));
        assert_eq!(view.search.matching_faux_feelings, vec!["Numb"]);
        assert!(view.unselected_matching_faux_feelings.contains("Numb"));
        assert!(view.graph.is_empty());

        let view = app.dispatch(Action::ToggleFauxFeeling("Numb".to_string()));
        assert!(view.unselected_matching_faux_feelings.is_empty());
        assert_eq!(view.needs, vec!["rest"]);
        assert_eq!(view.graph.nodes.len(), 3);
        assert_eq!(view.graph.links.len(), 2);
    }

    #[test]
    fn test_empty_query_ignores_selection() {
        let mut app = numb_app();
        app.toggle_faux_feeling("Numb");
        assert!(app.search("").is_empty());
    }

    #[test]
    fn test_search_suppresses_selected_faux_feelings() {
        let mut app = IcebergApp::new(
            Dataset::new(vec![
                FauxFeelingRecord::new("Lonely", &["sad"], &["connection"]),
                FauxFeelingRecord::new("Abandoned", &["lonely"], &["safety"]),
            ]),
            SynonymTable::default(),
            Categories::default(),
            GraphGatingMode::FauxOnly,
        );
        assert_eq!(app.search("lone").ranked_feelings, vec!["lonely"]);
        app.toggle_faux_feeling("Lonely");
        assert!(app.search("lone").ranked_feelings.is_empty());
    }

    #[test]
    fn test_category_feeling_uses_feeling_toggle() {
        let categories = Categories::new(vec![Category {
            id: "sadness".to_string(),
            label: "Sadness".to_string(),
            description: String::new(),
            color: "#3182ce".to_string(),
            feelings: vec!["Empty".to_string()],
        }]);
        let mut app = IcebergApp::new(
            Dataset::new(vec![FauxFeelingRecord::new("Numb", &["empty"], &["rest"])]),
            SynonymTable::default(),
            categories,
            GraphGatingMode::FauxOnly,
        );

        app.toggle_category_feeling("sadness", "Empty");
        assert!(app.state().selected_feelings.contains("empty"));
        assert!(app.category_view("sadness").unwrap().feelings[0].selected);

        app.toggle_category_feeling("anger", "Empty");
        assert!(app.state().selected_feelings.contains("empty"));
    }

    #[test]
    fn test_gating_switch_changes_graph() {
        let mut app = numb_app();
        app.toggle_faux_feeling("Numb");
        assert!(!app.get_graph().is_empty());

        app.set_gating(GraphGatingMode::AllDimensions);
        assert!(app.get_graph().is_empty());

        app.toggle_feeling("empty");
        app.toggle_need("rest");
        assert_eq!(app.get_graph().links.len(), 2);
    }

    #[test]
    fn test_load_from_data_dir() {
        let dir = write_data_dir(
            r#"[{"fauxFeeling": "Overwhelmed", "feelings": ["anxious", "stressed"], "needs": ["rest"]}]"#,
            Some(r#"{"anxious": ["worried", "nervous"]}"#),
        );
        let config = Config::with_data_dir(dir.path());
        let app = tokio_test::block_on(IcebergApp::load(&config)).unwrap();

        assert_eq!(
            app.search("anx").ranked_feelings,
            vec!["anxious", "worried", "nervous"]
        );
        assert!(app.categories().is_empty());
    }

    #[test]
    fn test_load_missing_dataset_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::with_data_dir(dir.path());
        let result = tokio_test::block_on(IcebergApp::load(&config));
        assert!(matches!(result, Err(LoadError::Read { .. })));
    }

    #[test]
    fn test_broken_synonyms_degrade_gracefully() {
        let dir = write_data_dir(
            r#"[{"fauxFeeling": "Overwhelmed", "feelings": ["anxious"]}]"#,
            Some("{broken"),
        );
        let config = Config::with_data_dir(dir.path());
        let app = tokio_test::block_on(IcebergApp::load(&config)).unwrap();
        assert!(app.synonyms().is_empty());
        assert_eq!(app.search("anx").ranked_feelings, vec!["anxious"]);
    }

    #[test]
    fn test_synonym_conflict_policy() {
        let dir = write_data_dir(
            r#"[{"fauxFeeling": "Overwhelmed", "feelings": ["anxious"]}]"#,
            Some(r#"{"anxious": ["uneasy"], "nervous": ["uneasy"]}"#),
        );
        let mut config = Config::with_data_dir(dir.path());
        let result = tokio_test::block_on(IcebergApp::load(&config));
        assert!(matches!(result, Err(LoadError::SynonymConflict { .. })));

        config.synonym_conflicts = SynonymConflictPolicy::Warn;
        let app = tokio_test::block_on(IcebergApp::load(&config)).unwrap();
        assert_eq!(app.synonyms().canonical_of("uneasy"), Some("anxious"));
    }
}
