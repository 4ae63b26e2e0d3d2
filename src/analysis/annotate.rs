//! Node annotation: community, color and display size per character

use super::centrality::{degree_centrality, DegreeWeighting};
use super::traits::CommunityDetector;
use super::types::{Availability, Partition};
use crate::graph::{InteractionGraph, NodeAnnotation};
use tracing::{debug, warn};

/// Color used when community detection is unavailable
pub const FALLBACK_COLOR: &str = "#97c2fc";

/// Smallest node size; the largest is `MIN_NODE_SIZE + NODE_SIZE_RANGE`
pub const MIN_NODE_SIZE: f64 = 15.0;
pub const NODE_SIZE_RANGE: f64 = 40.0;

const TAB20: [&str; 20] = [
    "#1f77b4", "#aec7e8", "#ff7f0e", "#ffbb78", "#2ca02c", "#98df8a", "#d62728", "#ff9896",
    "#9467bd", "#c5b0d5", "#8c564b", "#c49c94", "#e377c2", "#f7b6d2", "#7f7f7f", "#c7c7c7",
    "#bcbd22", "#dbdb8d", "#17becf", "#9edae5",
];

/// One color per community, sampled evenly across the tab20 palette.
pub fn community_palette(count: usize) -> Vec<String> {
    (0..count)
        .map(|i| {
            let position = if count > 1 {
                i as f64 / (count - 1) as f64
            } else {
                0.0
            };
            let idx = ((position * TAB20.len() as f64) as usize).min(TAB20.len() - 1);
            TAB20[idx].to_string()
        })
        .collect()
}

/// Communities as used for annotation, plus whether detection succeeded.
#[derive(Debug, Clone, PartialEq)]
pub struct CommunityAssignment {
    /// Detected partition, or everyone in community 0 on fallback
    pub partition: Partition,
    pub palette: Vec<String>,
    /// `Unavailable` carries the reason detection was skipped
    pub detection: Availability<()>,
}

impl CommunityAssignment {
    /// Run `detector`, degrading to a single community on failure.
    pub fn detect(graph: &InteractionGraph, detector: &dyn CommunityDetector) -> Self {
        match detector.detect(graph) {
            Ok(partition) => {
                debug!(detector = detector.id(), communities = partition.count(), "communities detected");
                let palette = community_palette(partition.count());
                Self {
                    partition,
                    palette,
                    detection: Availability::available(()),
                }
            }
            Err(e) => {
                warn!(detector = detector.id(), error = %e, "community detection failed, using one community");
                Self::fallback(graph.node_count(), e.to_string())
            }
        }
    }

    fn fallback(node_count: usize, reason: String) -> Self {
        Self {
            partition: Partition::single(node_count),
            palette: vec![FALLBACK_COLOR.to_string()],
            detection: Availability::unavailable(reason),
        }
    }
}

/// Detect communities and attach a [`NodeAnnotation`] to every node.
///
/// Size is `15 + 40 * normalized`, where `normalized` min-max scales the
/// unweighted degree centrality; all nodes get 15 when degrees are equal.
pub fn annotate(graph: &mut InteractionGraph, detector: &dyn CommunityDetector) -> CommunityAssignment {
    let communities = CommunityAssignment::detect(graph, detector);
    let degrees = degree_centrality(graph, DegreeWeighting::Unweighted);

    let (min, max) = degrees.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), (_, d)| {
        (lo.min(d), hi.max(d))
    });

    let annotations = degrees
        .iter()
        .enumerate()
        .map(|(idx, (_, degree))| {
            let community = communities.partition.community_at(idx);
            let size = if max > min {
                MIN_NODE_SIZE + (degree - min) / (max - min) * NODE_SIZE_RANGE
            } else {
                MIN_NODE_SIZE
            };
            NodeAnnotation {
                community,
                color: communities.palette[community].clone(),
                size,
                total_interactions: graph.weighted_degree_at(idx),
            }
        })
        .collect();

    graph.set_annotations(annotations);
    communities
}
