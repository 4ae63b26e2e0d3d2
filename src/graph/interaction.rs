//! InteractionGraph: the weighted, undirected character network

use super::edge::{EdgeKey, InteractionDetail, WeightedEdge};
use super::node::NodeAnnotation;
use std::collections::HashMap;
use thiserror::Error;

/// Errors that can occur while building or loading a graph
#[derive(Debug, Error)]
pub enum GraphError {
    /// No edges survived aggregation. Callers report this, they do not abort.
    #[error("Graph is empty: no interactions to analyze")]
    Empty,

    #[error("GML parse error at line {line}: {message}")]
    Gml { line: usize, message: String },

    #[error("Edge {a} -- {b} has weight {weight} but {details} interaction details")]
    WeightMismatch {
        a: String,
        b: String,
        weight: u32,
        details: usize,
    },

    #[error("Edge details are not valid JSON: {0}")]
    Details(#[from] serde_json::Error),
}

/// Result type for graph operations
pub type GraphResult<T> = Result<T, GraphError>;

/// Undirected weighted graph over canonical character names.
///
/// Parallel interactions are folded into one edge's weight; there are no
/// self-loops. Node order is first-seen order during construction, which is
/// also the tie-break order for every ranking computed on the graph.
#[derive(Debug, Clone)]
pub struct InteractionGraph {
    nodes: Vec<String>,
    node_index: HashMap<String, usize>,
    edges: Vec<WeightedEdge>,
    edge_index: HashMap<EdgeKey, usize>,
    /// Per node: (neighbor index, edge index)
    adjacency: Vec<Vec<(usize, usize)>>,
    annotations: Vec<Option<NodeAnnotation>>,
}

impl InteractionGraph {
    fn new() -> Self {
        Self {
            nodes: Vec::new(),
            node_index: HashMap::new(),
            edges: Vec::new(),
            edge_index: HashMap::new(),
            adjacency: Vec::new(),
            annotations: Vec::new(),
        }
    }

    /// Build from pre-aggregated edges. Repeated keys are merged in order.
    pub fn from_weighted_edges(edges: impl IntoIterator<Item = WeightedEdge>) -> GraphResult<Self> {
        let mut graph = Self::new();
        for edge in edges {
            graph.insert_edge(edge);
        }
        graph.finish()
    }

    /// Build from a flat multiset of pair occurrences.
    ///
    /// Each occurrence counts once toward its edge's weight and carries a
    /// default interaction detail. Self-pairs are skipped.
    pub fn from_pairs<A, B>(pairs: impl IntoIterator<Item = (A, B)>) -> GraphResult<Self>
    where
        A: Into<String>,
        B: Into<String>,
    {
        let mut graph = Self::new();
        for (a, b) in pairs {
            if let Some(key) = EdgeKey::new(a, b) {
                graph.insert_edge(WeightedEdge::new(key, InteractionDetail::default()));
            }
        }
        graph.finish()
    }

    fn finish(self) -> GraphResult<Self> {
        if self.edges.is_empty() {
            return Err(GraphError::Empty);
        }
        Ok(self)
    }

    fn ensure_node(&mut self, name: &str) -> usize {
        if let Some(&idx) = self.node_index.get(name) {
            return idx;
        }
        let idx = self.nodes.len();
        self.nodes.push(name.to_string());
        self.node_index.insert(name.to_string(), idx);
        self.adjacency.push(Vec::new());
        self.annotations.push(None);
        idx
    }

    fn insert_edge(&mut self, edge: WeightedEdge) {
        if let Some(&existing) = self.edge_index.get(edge.key()) {
            self.edges[existing].absorb(edge);
            return;
        }

        let a = self.ensure_node(edge.key().first());
        let b = self.ensure_node(edge.key().second());
        let edge_idx = self.edges.len();

        self.edge_index.insert(edge.key().clone(), edge_idx);
        self.edges.push(edge);
        self.adjacency[a].push((b, edge_idx));
        self.adjacency[b].push((a, edge_idx));
    }

    /// Node names in first-seen order
    pub fn nodes(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().map(String::as_str)
    }

    /// Edges in first-seen order
    pub fn edges(&self) -> &[WeightedEdge] {
        &self.edges
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.node_index.contains_key(name)
    }

    /// The edge between two characters, in either argument order.
    pub fn edge(&self, a: &str, b: &str) -> Option<&WeightedEdge> {
        let key = EdgeKey::new(a, b)?;
        self.edge_index.get(&key).map(|&idx| &self.edges[idx])
    }

    pub fn weight(&self, a: &str, b: &str) -> Option<u32> {
        self.edge(a, b).map(WeightedEdge::weight)
    }

    /// Sum of incident edge weights; 0 for unknown names.
    pub fn weighted_degree(&self, name: &str) -> u32 {
        self.node_index
            .get(name)
            .map(|&idx| self.weighted_degree_at(idx))
            .unwrap_or(0)
    }

    /// Number of incident edges, ignoring weight; 0 for unknown names.
    pub fn degree(&self, name: &str) -> usize {
        self.node_index
            .get(name)
            .map(|&idx| self.adjacency[idx].len())
            .unwrap_or(0)
    }

    /// Neighbors of `name` with the weight of the connecting edge.
    pub fn neighbors<'a>(&'a self, name: &str) -> impl Iterator<Item = (&'a str, u32)> + 'a {
        let adjacent: &'a [(usize, usize)] = match self.node_index.get(name) {
            Some(&idx) => &self.adjacency[idx],
            None => &[],
        };
        adjacent
            .iter()
            .map(move |&(n, e)| (self.nodes[n].as_str(), self.edges[e].weight()))
    }

    /// Edges sorted by weight descending; ties keep first-seen order.
    pub fn edges_by_weight(&self) -> Vec<&WeightedEdge> {
        let mut sorted: Vec<&WeightedEdge> = self.edges.iter().collect();
        sorted.sort_by(|a, b| b.weight().cmp(&a.weight()));
        sorted
    }

    pub fn annotation(&self, name: &str) -> Option<&NodeAnnotation> {
        self.node_index
            .get(name)
            .and_then(|&idx| self.annotations[idx].as_ref())
    }

    pub fn is_annotated(&self) -> bool {
        !self.annotations.is_empty() && self.annotations.iter().all(Option::is_some)
    }

    // --- index-level access for the analysis algorithms ---

    pub(crate) fn adjacency_at(&self, idx: usize) -> &[(usize, usize)] {
        &self.adjacency[idx]
    }

    pub(crate) fn edge_weight_at(&self, edge_idx: usize) -> u32 {
        self.edges[edge_idx].weight()
    }

    pub(crate) fn weighted_degree_at(&self, idx: usize) -> u32 {
        self.adjacency[idx]
            .iter()
            .map(|&(_, e)| self.edges[e].weight())
            .sum()
    }

    /// Attach one annotation per node, in node order.
    pub(crate) fn set_annotations(&mut self, annotations: Vec<NodeAnnotation>) {
        debug_assert_eq!(annotations.len(), self.nodes.len());
        self.annotations = annotations.into_iter().map(Some).collect();
    }
}
