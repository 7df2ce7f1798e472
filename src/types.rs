//! Core types for the feelings iceberg
//!
//! Three layers, top to bottom:
//! - Faux feelings: what people say ("overwhelmed")
//! - Feelings: what they actually feel ("anxious")
//! - Needs: what is missing underneath ("safety")

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One row of the faux feelings worksheet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FauxFeelingRecord {
    pub faux_feeling: String,
    #[serde(default)]
    pub feelings: Vec<String>,
    #[serde(default)]
    pub needs: Vec<String>,
}

impl FauxFeelingRecord {
    pub fn new(faux_feeling: &str, feelings: &[&str], needs: &[&str]) -> Self {
        Self {
            faux_feeling: faux_feeling.to_string(),
            feelings: feelings.iter().map(|s| s.to_string()).collect(),
            needs: needs.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// A browse-by-category entry for the landing view
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub feelings: Vec<String>,
}

/// Which selections must be present before the iceberg graph has any data
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GraphGatingMode {
    /// A selected faux feeling is enough; all its feelings and needs are drawn
    #[default]
    FauxOnly,
    /// Faux feelings, feelings and needs must all be selected; only selected
    /// feelings and needs are drawn
    AllDimensions,
}

impl FromStr for GraphGatingMode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "faux-only" => Ok(Self::FauxOnly),
            "all-dimensions" => Ok(Self::AllDimensions),
            other => Err(format!(
                "invalid graph gating mode '{}' (expected faux-only or all-dimensions)",
                other
            )),
        }
    }
}

impl fmt::Display for GraphGatingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FauxOnly => f.write_str("faux-only"),
            Self::AllDimensions => f.write_str("all-dimensions"),
        }
    }
}

/// What to do when a synonym is listed under more than one canonical word
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SynonymConflictPolicy {
    /// Refuse to load the table
    #[default]
    Fail,
    /// Log every conflict and let the first canonical entry win
    Warn,
}

impl FromStr for SynonymConflictPolicy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "fail" => Ok(Self::Fail),
            "warn" => Ok(Self::Warn),
            other => Err(format!(
                "invalid synonym conflict policy '{}' (expected fail or warn)",
                other
            )),
        }
    }
}

/// Output of a single search
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResults {
    /// Lowercased feelings: prefix, synonym-of-prefix, substring, synonym-of-substring
    pub ranked_feelings: Vec<String>,
    /// Faux feeling labels containing the query, in dataset order
    pub matching_faux_feelings: Vec<String>,
}

impl SearchResults {
    pub fn is_empty(&self) -> bool {
        self.ranked_feelings.is_empty() && self.matching_faux_feelings.is_empty()
    }
}

/// Layer a graph node belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Faux,
    Feeling,
    Need,
}

impl NodeKind {
    /// Prefix that keeps ids unique across layers
    pub fn prefix(&self) -> &'static str {
        match self {
            NodeKind::Faux => "faux-",
            NodeKind::Feeling => "feeling-",
            NodeKind::Need => "need-",
        }
    }

    pub fn node_id(&self, label: &str) -> String {
        format!("{}{}", self.prefix(), label)
    }

    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Faux => "FAUX FEELINGS",
            NodeKind::Feeling => "FEELINGS",
            NodeKind::Need => "NEEDS",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: String,
    pub label: String,
    pub kind: NodeKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphLink {
    pub source: String,
    pub target: String,
    /// Number of record-level co-occurrences producing this link
    pub value: u32,
}

/// Node/link input for the iceberg (Sankey) layout
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IcebergGraph {
    pub nodes: Vec<GraphNode>,
    pub links: Vec<GraphLink>,
}

impl IcebergGraph {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.links.is_empty()
    }

    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn link(&self, source: &str, target: &str) -> Option<&GraphLink> {
        self.links
            .iter()
            .find(|l| l.source == source && l.target == target)
    }
}

/// Everything a presentation adapter needs, derived from scratch after each action
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewModel {
    pub query: String,
    pub search: SearchResults,
    pub selected_faux_feelings: IndexSet<String>,
    pub unselected_matching_faux_feelings: IndexSet<String>,
    pub selected_feelings: IndexSet<String>,
    pub selected_needs: IndexSet<String>,
    /// Union of the needs of every selected faux feeling
    pub needs: Vec<String>,
    pub graph: IcebergGraph,
}
