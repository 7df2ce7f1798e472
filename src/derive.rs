//! Derived views: the needs underneath the current selection and the
//! faux -> feeling -> need graph for the iceberg diagram.
//!
//! Both are rebuilt from scratch on every state change.

use crate::dataset::Dataset;
use crate::selection::SelectionState;
use crate::types::{GraphGatingMode, GraphLink, GraphNode, IcebergGraph, NodeKind};
use indexmap::{IndexMap, IndexSet};

/// Union of the needs of every selected faux feeling, first discovery order
pub fn derive_needs(dataset: &Dataset, state: &SelectionState) -> Vec<String> {
    let mut needs: IndexSet<String> = IndexSet::new();
    for label in &state.selected_faux_feelings {
        if let Some(record) = dataset.find(label) {
            needs.extend(record.needs.iter().cloned());
        }
    }
    needs.into_iter().collect()
}

/// Whether the selection carries enough to draw anything
pub fn graph_gate_open(state: &SelectionState, mode: GraphGatingMode) -> bool {
    match mode {
        GraphGatingMode::FauxOnly => !state.selected_faux_feelings.is_empty(),
        GraphGatingMode::AllDimensions => {
            !state.selected_faux_feelings.is_empty()
                && !state.selected_feelings.is_empty()
                && !state.selected_needs.is_empty()
        }
    }
}

/// Build the node/link graph for the current selection
pub fn build_graph(
    dataset: &Dataset,
    state: &SelectionState,
    mode: GraphGatingMode,
) -> IcebergGraph {
    if !graph_gate_open(state, mode) {
        return IcebergGraph::default();
    }

    let mut builder = GraphBuilder::default();

    for label in &state.selected_faux_feelings {
        let Some(record) = dataset.find(label) else {
            continue;
        };
        let faux_id = builder.node(NodeKind::Faux, &record.faux_feeling);

        let mut feeling_ids: IndexSet<String> = IndexSet::new();
        for feeling in &record.feelings {
            let feeling = feeling.to_lowercase();
            if state.is_promoted(&feeling) {
                continue;
            }
            if mode == GraphGatingMode::AllDimensions
                && !state.selected_feelings.contains(&feeling)
            {
                continue;
            }
            let feeling_id = builder.node(NodeKind::Feeling, &feeling);
            // A record listing a feeling twice still co-occurs once
            if feeling_ids.insert(feeling_id.clone()) {
                builder.link(&faux_id, &feeling_id);
            }
        }

        let mut need_ids: IndexSet<String> = IndexSet::new();
        for need in &record.needs {
            if mode == GraphGatingMode::AllDimensions && !state.selected_needs.contains(need) {
                continue;
            }
            if feeling_ids.is_empty() {
                break;
            }
            let need_id = builder.node(NodeKind::Need, need);
            if need_ids.insert(need_id.clone()) {
                for feeling_id in &feeling_ids {
                    builder.link(feeling_id, &need_id);
                }
            }
        }
    }

    builder.finish()
}

#[derive(Default)]
struct GraphBuilder {
    nodes: IndexMap<String, GraphNode>,
    /// "source|target" -> co-occurrence count
    counts: IndexMap<String, (String, String, u32)>,
}

impl GraphBuilder {
    fn node(&mut self, kind: NodeKind, label: &str) -> String {
        let id = kind.node_id(label);
        self.nodes.entry(id.clone()).or_insert_with(|| GraphNode {
            id: id.clone(),
            label: label.to_string(),
            kind,
        });
        id
    }

    fn link(&mut self, source: &str, target: &str) {
        let key = format!("{}|{}", source, target);
        self.counts
            .entry(key)
            .or_insert_with(|| (source.to_string(), target.to_string(), 0))
            .2 += 1;
    }

    /// Keep only nodes that some link touches
    fn finish(self) -> IcebergGraph {
        let linked: IndexSet<&str> = self
            .counts
            .values()
            .flat_map(|(s, t, _)| [s.as_str(), t.as_str()])
            .collect();

        let nodes = self
            .nodes
            .values()
            .filter(|n| linked.contains(n.id.as_str()))
            .cloned()
            .collect();

        let links = self
            .counts
            .into_values()
            .map(|(source, target, value)| GraphLink {
                source,
                target,
                value,
            })
            .collect();

        IcebergGraph { nodes, links }
    }
}
