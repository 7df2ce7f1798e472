//! Terminal rendering of the view model
//!
//! Pure string building; the REPL prints whatever comes out of here.

use crate::types::{IcebergGraph, NodeKind, ViewModel};
use std::collections::HashMap;
use std::fmt::Write;

pub const HINT_START_TYPING: &str = "Start typing to search for feelings...";
pub const HINT_NO_MATCHES: &str = "No matching feelings found. Try a different search.";
pub const NEEDS_TITLE: &str = "Underlying Needs:";
pub const NO_NEEDS: &str = "No needs data available for selected feelings.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chip {
    pub label: String,
    pub selected: bool,
}

/// Selected faux feelings first, then unselected search matches
pub fn chips(view: &ViewModel) -> Vec<Chip> {
    let selected = view.selected_faux_feelings.iter().map(|label| Chip {
        label: label.clone(),
        selected: true,
    });
    let matching = view
        .search
        .matching_faux_feelings
        .iter()
        .filter(|label| !view.selected_faux_feelings.contains(*label))
        .map(|label| Chip {
            label: label.clone(),
            selected: false,
        });
    selected.chain(matching).collect()
}

/// Placeholder shown when there are no chips at all
pub fn empty_hint(view: &ViewModel) -> Option<&'static str> {
    if !chips(view).is_empty() {
        return None;
    }
    if view.query.trim().is_empty() {
        Some(HINT_START_TYPING)
    } else {
        Some(HINT_NO_MATCHES)
    }
}

/// Needs panel, hidden while nothing is selected
pub fn needs_panel(view: &ViewModel) -> Option<String> {
    if view.selected_faux_feelings.is_empty() {
        return None;
    }
    let mut out = format!("{}\n", NEEDS_TITLE);
    if view.needs.is_empty() {
        out.push_str(&format!("  {}\n", NO_NEEDS));
    } else {
        out.push_str(&format!("  {}\n", view.needs.join(" · ")));
    }
    Some(out)
}

/// A node placed in its layer with its throughput
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacedNode {
    pub id: String,
    pub label: String,
    /// max(incoming weight, outgoing weight)
    pub value: u32,
}

/// Three-column iceberg layout: faux feelings, feelings, needs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IcebergLayout {
    pub faux: Vec<PlacedNode>,
    pub feelings: Vec<PlacedNode>,
    pub needs: Vec<PlacedNode>,
}

impl IcebergLayout {
    pub fn from_graph(graph: &IcebergGraph) -> Self {
        let mut incoming: HashMap<&str, u32> = HashMap::new();
        let mut outgoing: HashMap<&str, u32> = HashMap::new();
        for link in &graph.links {
            *outgoing.entry(link.source.as_str()).or_default() += link.value;
            *incoming.entry(link.target.as_str()).or_default() += link.value;
        }

        let mut layout = Self::default();
        for node in &graph.nodes {
            let id = node.id.as_str();
            let placed = PlacedNode {
                id: node.id.clone(),
                label: node.label.clone(),
                value: incoming
                    .get(id)
                    .copied()
                    .unwrap_or(0)
                    .max(outgoing.get(id).copied().unwrap_or(0)),
            };
            match node.kind {
                NodeKind::Faux => layout.faux.push(placed),
                NodeKind::Feeling => layout.feelings.push(placed),
                NodeKind::Need => layout.needs.push(placed),
            }
        }
        layout
    }

    fn columns(&self) -> [(NodeKind, &[PlacedNode]); 3] {
        [
            (NodeKind::Faux, self.faux.as_slice()),
            (NodeKind::Feeling, self.feelings.as_slice()),
            (NodeKind::Need, self.needs.as_slice()),
        ]
    }
}

/// Columns of nodes followed by the weighted links
pub fn render_graph(graph: &IcebergGraph) -> String {
    if graph.is_empty() {
        return "(iceberg is empty - select a faux feeling)\n".to_string();
    }

    let layout = IcebergLayout::from_graph(graph);
    let mut out = String::new();
    for (kind, nodes) in layout.columns() {
        let _ = writeln!(out, "{}", kind.name());
        for node in nodes {
            let _ = writeln!(out, "  {:<24} {}", node.label, "▇".repeat(node.value as usize));
        }
    }

    let labels: HashMap<&str, &str> = graph
        .nodes
        .iter()
        .map(|n| (n.id.as_str(), n.label.as_str()))
        .collect();
    let _ = writeln!(out, "FLOWS");
    for link in &graph.links {
        let _ = writeln!(
            out,
            "  {} → {} ({})",
            labels.get(link.source.as_str()).copied().unwrap_or(link.source.as_str()),
            labels.get(link.target.as_str()).copied().unwrap_or(link.target.as_str()),
            link.value
        );
    }
    out
}

/// Full screen: chips, ranked feelings, needs, graph
pub fn render_view(view: &ViewModel) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "Search: {}", view.query);
    match empty_hint(view) {
        Some(hint) => {
            let _ = writeln!(out, "  {}", hint);
        }
        None => {
            let chips: Vec<String> = chips(view)
                .into_iter()
                .map(|c| {
                    if c.selected {
                        format!("[✓ {}]", c.label)
                    } else {
                        format!("[{}]", c.label)
                    }
                })
                .collect();
            let _ = writeln!(out, "  {}", chips.join(" "));
        }
    }

    if !view.search.ranked_feelings.is_empty() {
        let feelings: Vec<String> = view
            .search
            .ranked_feelings
            .iter()
            .map(|f| {
                if view.selected_feelings.contains(f) {
                    format!("{}*", f)
                } else {
                    f.clone()
                }
            })
            .collect();
        let _ = writeln!(out, "Feelings: {}", feelings.join(", "));
    }

    if let Some(panel) = needs_panel(view) {
        out.push('\n');
        out.push_str(&panel);
    }

    if !view.graph.is_empty() {
        out.push('\n');
        out.push_str(&render_graph(&view.graph));
    }
    out
}
