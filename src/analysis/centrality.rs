//! Degree, betweenness and eigenvector centrality
//!
//! All three tolerate disconnected graphs. Edge weight is the interaction
//! count. Betweenness treats that count literally as a traversal cost (no
//! inversion), so heavily interacting pairs are "far apart" for shortest
//! paths; this matches how the scores have always been produced and is kept
//! for comparability.

use super::types::{CentralityError, CentralityResult, CentralityScores};
use crate::graph::InteractionGraph;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::BinaryHeap;

/// Iteration cap for eigenvector power iteration
pub const DEFAULT_EIGENVECTOR_MAX_ITER: usize = 1000;

/// Per-node convergence tolerance for eigenvector power iteration
pub const DEFAULT_EIGENVECTOR_TOLERANCE: f64 = 1.0e-6;

/// The centrality measures reported for the whole book
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CentralityMetric {
    Degree,
    Betweenness,
    Eigenvector,
}

impl CentralityMetric {
    pub const ALL: [CentralityMetric; 3] = [Self::Degree, Self::Betweenness, Self::Eigenvector];
}

impl std::fmt::Display for CentralityMetric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Degree => "Degree Centrality",
            Self::Betweenness => "Betweenness Centrality",
            Self::Eigenvector => "Eigenvector Centrality",
        };
        f.write_str(name)
    }
}

/// Whether degree counts edge weights or just incident edges
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DegreeWeighting {
    Weighted,
    Unweighted,
}

/// Degree divided by `N - 1`. A graph with one node scores 0.
pub fn degree_centrality(graph: &InteractionGraph, weighting: DegreeWeighting) -> CentralityScores {
    let n = graph.node_count();
    let values = (0..n)
        .map(|idx| {
            if n <= 1 {
                return 0.0;
            }
            let degree = match weighting {
                DegreeWeighting::Weighted => graph.weighted_degree_at(idx) as f64,
                DegreeWeighting::Unweighted => graph.adjacency_at(idx).len() as f64,
            };
            degree / (n - 1) as f64
        })
        .collect();
    CentralityScores::from_graph_order(graph, values)
}

/// Shortest-path betweenness (Brandes), weight as cost.
///
/// Normalized by `1 / ((n-1)(n-2))` for `n > 2`; smaller graphs have no
/// intermediate nodes and score 0.
pub fn betweenness_centrality(graph: &InteractionGraph) -> CentralityScores {
    let n = graph.node_count();
    let mut centrality = vec![0.0; n];

    for source in 0..n {
        let dependency = dijkstra_dependency(graph, source);
        for (node, delta) in dependency.into_iter().enumerate() {
            if node != source {
                centrality[node] += delta;
            }
        }
    }

    if n > 2 {
        let scale = 1.0 / ((n - 1) * (n - 2)) as f64;
        for score in &mut centrality {
            *score *= scale;
        }
    }

    CentralityScores::from_graph_order(graph, centrality)
}

/// Dependency of `source` on every node, via weighted shortest paths.
fn dijkstra_dependency(graph: &InteractionGraph, source: usize) -> Vec<f64> {
    let n = graph.node_count();
    let mut order = Vec::with_capacity(n); // settled nodes, non-decreasing distance
    let mut predecessors: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut paths = vec![0.0_f64; n];
    let mut seen: Vec<Option<u64>> = vec![None; n];
    let mut settled = vec![false; n];

    paths[source] = 1.0;
    seen[source] = Some(0);

    // (distance, insertion counter, predecessor, node)
    let mut heap = BinaryHeap::new();
    let mut counter = 0usize;
    heap.push(Reverse((0u64, counter, source, source)));

    while let Some(Reverse((dist, _, pred, v))) = heap.pop() {
        if settled[v] {
            continue;
        }
        if v != source {
            paths[v] += paths[pred];
        }
        settled[v] = true;
        order.push(v);

        for &(w, edge_idx) in graph.adjacency_at(v) {
            let candidate = dist + graph.edge_weight_at(edge_idx) as u64;
            if settled[w] {
                continue;
            }
            match seen[w] {
                Some(best) if candidate > best => {}
                Some(best) if candidate == best => {
                    paths[w] += paths[v];
                    predecessors[w].push(v);
                }
                _ => {
                    counter += 1;
                    seen[w] = Some(candidate);
                    heap.push(Reverse((candidate, counter, v, w)));
                    paths[w] = 0.0;
                    predecessors[w] = vec![v];
                }
            }
        }
    }

    let mut dependency = vec![0.0; n];
    while let Some(w) = order.pop() {
        let coeff = (1.0 + dependency[w]) / paths[w];
        for &v in &predecessors[w] {
            dependency[v] += paths[v] * coeff;
        }
    }
    dependency
}

/// Weighted eigenvector centrality by power iteration on `A + I`.
///
/// Starts from the uniform vector, L2-normalizes every step and stops when
/// the summed absolute change drops below `n * tolerance`. Running out of
/// iterations is an error; callers substitute an empty ranking.
pub fn eigenvector_centrality(
    graph: &InteractionGraph,
    max_iter: usize,
    tolerance: f64,
) -> CentralityResult<CentralityScores> {
    let n = graph.node_count();
    if n == 0 {
        return Err(CentralityError::PointlessConcept);
    }

    let mut x = vec![1.0 / n as f64; n];

    for _ in 0..max_iter {
        let last = x.clone();
        for (v, &last_v) in last.iter().enumerate() {
            for &(w, edge_idx) in graph.adjacency_at(v) {
                x[w] += last_v * graph.edge_weight_at(edge_idx) as f64;
            }
        }

        let norm = x.iter().map(|v| v * v).sum::<f64>().sqrt();
        let norm = if norm == 0.0 { 1.0 } else { norm };
        for value in &mut x {
            *value /= norm;
        }

        let change: f64 = x.iter().zip(&last).map(|(a, b)| (a - b).abs()).sum();
        if change < n as f64 * tolerance {
            return Ok(CentralityScores::from_graph_order(graph, x));
        }
    }

    Err(CentralityError::NotConverged { iterations: max_iter })
}
