//! Community detection interface

use super::types::{CommunityResult, Partition};
use crate::graph::InteractionGraph;

/// Partitions a graph's nodes into communities.
///
/// Implementations may fail on graphs where their objective is undefined;
/// callers fall back to a single community instead of aborting.
pub trait CommunityDetector: Send + Sync {
    /// Short identifier used in logs
    fn id(&self) -> &str;

    /// Assign every node of `graph` to a community.
    fn detect(&self, graph: &InteractionGraph) -> CommunityResult<Partition>;
}
