//! Louvain modularity optimization
//!
//! Weighted, deterministic variant: nodes are visited in graph order rather
//! than shuffled, so the same graph always yields the same partition.
//! Each level moves single nodes to the neighboring community with the best
//! modularity gain until no move helps, then collapses communities into
//! super-nodes and repeats while modularity still improves.

use super::traits::CommunityDetector;
use super::types::{CommunityError, CommunityResult, Partition};
use crate::graph::InteractionGraph;
use std::collections::HashMap;
use tracing::debug;

/// Smallest modularity improvement worth another pass
const MIN_IMPROVEMENT: f64 = 1e-7;

/// Louvain community detection over interaction weights.
#[derive(Debug, Clone)]
pub struct Louvain {
    resolution: f64,
}

impl Default for Louvain {
    fn default() -> Self {
        Self { resolution: 1.0 }
    }
}

impl Louvain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Values above 1 favour smaller communities, below 1 larger ones.
    pub fn with_resolution(mut self, resolution: f64) -> Self {
        self.resolution = resolution;
        self
    }
}

impl CommunityDetector for Louvain {
    fn id(&self) -> &str {
        "louvain"
    }

    fn detect(&self, graph: &InteractionGraph) -> CommunityResult<Partition> {
        if graph.node_count() < 2 {
            return Err(CommunityError::DegenerateGraph(format!(
                "{} node(s), nothing to partition",
                graph.node_count()
            )));
        }
        if !(self.resolution.is_finite() && self.resolution > 0.0) {
            return Err(CommunityError::DegenerateGraph(format!(
                "resolution must be positive, got {}",
                self.resolution
            )));
        }

        let mut level_graph = LevelGraph::from_graph(graph);
        if level_graph.total_weight <= 0.0 {
            return Err(CommunityError::DegenerateGraph("total edge weight is zero".into()));
        }

        // Community of each original node, refined level by level
        let mut membership: Vec<usize> = (0..graph.node_count()).collect();

        let mut status = Status::new(&level_graph);
        status.one_level(&level_graph, self.resolution);
        let mut modularity = status.modularity(self.resolution);
        let mut level = 0;

        loop {
            let labels = Partition::from_labels(&status.node_to_comm);
            for community in membership.iter_mut() {
                *community = labels.community_at(*community);
            }
            debug!(level, communities = labels.count(), modularity, "louvain level done");

            level_graph = level_graph.induced(&labels);
            status = Status::new(&level_graph);
            status.one_level(&level_graph, self.resolution);
            let next = status.modularity(self.resolution);
            if next - modularity < MIN_IMPROVEMENT {
                break;
            }
            modularity = next;
            level += 1;
        }

        Ok(Partition::from_labels(&membership))
    }
}

/// Weighted graph for one Louvain level; self-loops hold collapsed
/// internal weight.
struct LevelGraph {
    /// Neighbors and weights, excluding self-loops
    adjacency: Vec<Vec<(usize, f64)>>,
    loops: Vec<f64>,
    /// Weighted degree, self-loops counted twice
    degrees: Vec<f64>,
    /// Sum of edge weights, self-loops counted once
    total_weight: f64,
}

impl LevelGraph {
    fn from_graph(graph: &InteractionGraph) -> Self {
        let n = graph.node_count();
        let adjacency: Vec<Vec<(usize, f64)>> = (0..n)
            .map(|v| {
                graph
                    .adjacency_at(v)
                    .iter()
                    .map(|&(w, e)| (w, graph.edge_weight_at(e) as f64))
                    .collect()
            })
            .collect();
        Self::assemble(adjacency, vec![0.0; n])
    }

    fn assemble(adjacency: Vec<Vec<(usize, f64)>>, loops: Vec<f64>) -> Self {
        let degrees: Vec<f64> = adjacency
            .iter()
            .zip(&loops)
            .map(|(adj, l)| adj.iter().map(|(_, w)| w).sum::<f64>() + 2.0 * l)
            .collect();
        let total_weight = (degrees.iter().sum::<f64>()) / 2.0;
        Self {
            adjacency,
            loops,
            degrees,
            total_weight,
        }
    }

    fn len(&self) -> usize {
        self.adjacency.len()
    }

    /// Collapse each community into one node.
    fn induced(&self, partition: &Partition) -> Self {
        let k = partition.count();
        let mut weights: Vec<HashMap<usize, f64>> = vec![HashMap::new(); k];
        let mut order: Vec<Vec<usize>> = vec![Vec::new(); k];
        let mut loops = vec![0.0; k];

        for v in 0..self.len() {
            let cv = partition.community_at(v);
            loops[cv] += self.loops[v];
            for &(w, weight) in &self.adjacency[v] {
                let cw = partition.community_at(w);
                if cv == cw {
                    // each internal edge is seen from both ends
                    loops[cv] += weight / 2.0;
                } else {
                    let entry = weights[cv].entry(cw).or_insert_with(|| {
                        order[cv].push(cw);
                        0.0
                    });
                    *entry += weight;
                }
            }
        }

        let adjacency = order
            .iter()
            .zip(&weights)
            .map(|(neighbors, w)| neighbors.iter().map(|c| (*c, w[c])).collect())
            .collect();
        Self::assemble(adjacency, loops)
    }
}

/// Community bookkeeping during one level's local moving phase.
struct Status {
    node_to_comm: Vec<usize>,
    /// Total degree per community
    totals: Vec<f64>,
    /// Internal edge weight per community
    internals: Vec<f64>,
    total_weight: f64,
}

impl Status {
    fn new(graph: &LevelGraph) -> Self {
        Self {
            node_to_comm: (0..graph.len()).collect(),
            totals: graph.degrees.clone(),
            internals: graph.loops.clone(),
            total_weight: graph.total_weight,
        }
    }

    fn modularity(&self, resolution: f64) -> f64 {
        let m = self.total_weight;
        self.internals
            .iter()
            .zip(&self.totals)
            .map(|(&inside, &total)| inside / m - resolution * (total / (2.0 * m)).powi(2))
            .sum()
    }

    /// Weights from `node` to each neighboring community, first-seen order.
    fn neighbor_communities(&self, graph: &LevelGraph, node: usize) -> Vec<(usize, f64)> {
        let mut found: Vec<(usize, f64)> = Vec::new();
        for &(neighbor, weight) in &graph.adjacency[node] {
            let community = self.node_to_comm[neighbor];
            match found.iter_mut().find(|(c, _)| *c == community) {
                Some((_, w)) => *w += weight,
                None => found.push((community, weight)),
            }
        }
        found
    }

    fn one_level(&mut self, graph: &LevelGraph, resolution: f64) {
        let two_m = 2.0 * self.total_weight;
        let mut current = self.modularity(resolution);

        loop {
            let mut moved = false;

            for node in 0..graph.len() {
                let own = self.node_to_comm[node];
                let degree = graph.degrees[node];
                let degree_share = degree / two_m;
                let neighbors = self.neighbor_communities(graph, node);
                let weight_to = |community: usize| {
                    neighbors
                        .iter()
                        .find(|(c, _)| *c == community)
                        .map(|(_, w)| *w)
                        .unwrap_or(0.0)
                };

                let remove_cost =
                    -weight_to(own) + resolution * (self.totals[own] - degree) * degree_share;

                // take the node out of its community
                self.totals[own] -= degree;
                self.internals[own] -= weight_to(own) + graph.loops[node];

                let mut best = own;
                let mut best_gain = 0.0;
                for &(community, weight) in &neighbors {
                    let gain = remove_cost + weight - resolution * self.totals[community] * degree_share;
                    if gain > best_gain {
                        best_gain = gain;
                        best = community;
                    }
                }

                self.totals[best] += degree;
                self.internals[best] += weight_to(best) + graph.loops[node];
                self.node_to_comm[node] = best;
                if best != own {
                    moved = true;
                }
            }

            let next = self.modularity(resolution);
            if !moved || next - current < MIN_IMPROVEMENT {
                break;
            }
            current = next;
        }
    }
}
