//! Result types shared by the network analysis algorithms

use crate::graph::InteractionGraph;
use serde::Serialize;
use std::cmp::Ordering;
use thiserror::Error;

/// Errors from centrality computations
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CentralityError {
    #[error("Power iteration failed to converge within {iterations} iterations")]
    NotConverged { iterations: usize },

    #[error("Centrality is undefined on a graph with no nodes")]
    PointlessConcept,
}

/// Result type for centrality computations
pub type CentralityResult<T> = Result<T, CentralityError>;

/// Errors from community detection
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CommunityError {
    #[error("Community detection is undefined here: {0}")]
    DegenerateGraph(String),
}

/// Result type for community detection
pub type CommunityResult<T> = Result<T, CommunityError>;

/// Outcome of an analysis step that may degrade instead of failing.
///
/// Reports render `Unavailable` as an explicit note rather than dropping the
/// section.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Availability<T> {
    Available { value: T },
    Unavailable { reason: String },
}

impl<T> Availability<T> {
    pub fn available(value: T) -> Self {
        Self::Available { value }
    }

    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable {
            reason: reason.into(),
        }
    }

    pub fn as_available(&self) -> Option<&T> {
        match self {
            Self::Available { value } => Some(value),
            Self::Unavailable { .. } => None,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Self::Available { .. })
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Availability<U> {
        match self {
            Self::Available { value } => Availability::Available { value: f(value) },
            Self::Unavailable { reason } => Availability::Unavailable { reason },
        }
    }
}

impl<T, E: std::fmt::Display> From<Result<T, E>> for Availability<T> {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => Self::available(value),
            Err(e) => Self::unavailable(e.to_string()),
        }
    }
}

/// Per-node scores in graph node order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CentralityScores {
    scores: Vec<(String, f64)>,
}

impl CentralityScores {
    pub(crate) fn from_graph_order(graph: &InteractionGraph, values: Vec<f64>) -> Self {
        debug_assert_eq!(values.len(), graph.node_count());
        Self {
            scores: graph.nodes().map(str::to_string).zip(values).collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.scores.iter().find(|(n, _)| n == name).map(|(_, s)| *s)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.scores.iter().map(|(n, s)| (n.as_str(), *s))
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// Highest `n` scores, descending. Ties keep node order (first seen
    /// during graph construction).
    pub fn top_n(&self, n: usize) -> Vec<(String, f64)> {
        let mut sorted = self.scores.clone();
        sorted.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
        sorted.truncate(n);
        sorted
    }
}

/// Community membership for every node, in graph node order.
///
/// Indices are dense and 0-based, numbered by first appearance in node
/// order. They carry no meaning across runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition {
    assignments: Vec<usize>,
    count: usize,
}

impl Partition {
    /// Renumber arbitrary labels densely by first appearance.
    pub fn from_labels(labels: &[usize]) -> Self {
        let mut renumbered = std::collections::HashMap::new();
        let assignments = labels
            .iter()
            .map(|label| {
                let next = renumbered.len();
                *renumbered.entry(*label).or_insert(next)
            })
            .collect();
        Self {
            assignments,
            count: renumbered.len(),
        }
    }

    /// Every node in community 0.
    pub fn single(node_count: usize) -> Self {
        Self {
            assignments: vec![0; node_count],
            count: usize::from(node_count > 0),
        }
    }

    pub fn community_at(&self, idx: usize) -> usize {
        self.assignments[idx]
    }

    pub fn assignments(&self) -> &[usize] {
        &self.assignments
    }

    /// Number of communities
    pub fn count(&self) -> usize {
        self.count
    }

    /// Member names per community, each list in node order.
    pub fn groups(&self, graph: &InteractionGraph) -> Vec<Vec<String>> {
        let mut groups = vec![Vec::new(); self.count];
        for (name, &community) in graph.nodes().zip(&self.assignments) {
            groups[community].push(name.to_string());
        }
        groups
    }
}
