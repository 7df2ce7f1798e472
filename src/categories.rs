//! Browse-by-category landing view
//!
//! Categories are just another way in: picking a feeling here goes through the
//! same feeling toggle as picking it from search results.

use crate::dataset::Source;
use crate::error::LoadError;
use crate::selection::SelectionState;
use crate::types::Category;
use serde::{Deserialize, Serialize};

/// One feeling chip on a category page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryFeeling {
    pub feeling: String,
    pub selected: bool,
}

/// A category with the selection state of each of its feelings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryView {
    pub category: Category,
    pub feelings: Vec<CategoryFeeling>,
}

#[derive(Debug, Clone, Default)]
pub struct Categories {
    categories: Vec<Category>,
}

impl Categories {
    pub fn new(categories: Vec<Category>) -> Self {
        Self { categories }
    }

    pub fn from_json(source_name: &str, json: &str) -> Result<Self, LoadError> {
        let categories: Vec<Category> =
            serde_json::from_str(json).map_err(|e| LoadError::parse(source_name, e))?;
        Ok(Self::new(categories))
    }

    pub async fn load(source: &Source) -> Result<Self, LoadError> {
        let text = source.read_text().await?;
        let categories = Self::from_json(&source.to_string(), &text)?;
        tracing::info!("Loaded {} categories from {}", categories.len(), source);
        Ok(categories)
    }

    pub fn all(&self) -> &[Category] {
        &self.categories
    }

    pub fn get(&self, id: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == id)
    }

    /// Whether `feeling` (case-insensitive) is listed under category `id`
    pub fn contains_feeling(&self, id: &str, feeling: &str) -> bool {
        let feeling = feeling.to_lowercase();
        self.get(id)
            .map(|c| c.feelings.iter().any(|f| f.to_lowercase() == feeling))
            .unwrap_or(false)
    }

    /// The category page; promoted feelings are left out
    pub fn view(&self, id: &str, state: &SelectionState) -> Option<CategoryView> {
        let category = self.get(id)?;
        let feelings = category
            .feelings
            .iter()
            .filter(|f| !state.is_promoted(f))
            .map(|f| CategoryFeeling {
                feeling: f.clone(),
                selected: state.selected_feelings.contains(&f.to_lowercase()),
            })
            .collect();
        Some(CategoryView {
            category: category.clone(),
            feelings,
        })
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}
