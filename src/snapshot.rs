//! Read-only graph snapshot handed to the visualization renderer
//!
//! The renderer consumes community group, color and size per node and weight
//! per edge. Nothing else leaves the core.

use crate::analysis::{FALLBACK_COLOR, MIN_NODE_SIZE};
use crate::graph::InteractionGraph;
use serde::Serialize;
use std::collections::BTreeMap;

/// A character as the renderer sees it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VizNode {
    pub id: String,
    /// Community index
    pub group: usize,
    pub color: String,
    pub size: f64,
}

/// A relationship as the renderer sees it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VizEdge {
    pub source: String,
    pub target: String,
    pub weight: u32,
}

/// Legend swatch for one community
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LegendEntry {
    pub community: usize,
    pub label: String,
    pub color: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct VisualizationSnapshot {
    pub nodes: Vec<VizNode>,
    pub edges: Vec<VizEdge>,
    /// Empty unless there is more than one community
    pub legend: Vec<LegendEntry>,
}

impl VisualizationSnapshot {
    /// Capture nodes and edges in graph order.
    ///
    /// Nodes of an unannotated graph land in community 0 with the fallback
    /// color and minimum size.
    pub fn capture(graph: &InteractionGraph) -> Self {
        let nodes: Vec<VizNode> = graph
            .nodes()
            .map(|name| match graph.annotation(name) {
                Some(annotation) => VizNode {
                    id: name.to_string(),
                    group: annotation.community,
                    color: annotation.color.clone(),
                    size: annotation.size,
                },
                None => VizNode {
                    id: name.to_string(),
                    group: 0,
                    color: FALLBACK_COLOR.to_string(),
                    size: MIN_NODE_SIZE,
                },
            })
            .collect();

        let edges = graph
            .edges()
            .iter()
            .map(|edge| VizEdge {
                source: edge.key().first().to_string(),
                target: edge.key().second().to_string(),
                weight: edge.weight(),
            })
            .collect();

        let colors: BTreeMap<usize, &str> = nodes.iter().map(|n| (n.group, n.color.as_str())).collect();
        let legend = if colors.len() > 1 {
            colors
                .into_iter()
                .map(|(community, color)| LegendEntry {
                    community,
                    label: format!("Community {community}"),
                    color: color.to_string(),
                })
                .collect()
        } else {
            Vec::new()
        };

        Self { nodes, edges, legend }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
