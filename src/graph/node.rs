//! Node-level analysis results attached to the interaction graph

use serde::{Deserialize, Serialize};

/// Derived attributes for one character, attached after analysis.
///
/// Owned by the graph; never persisted on its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeAnnotation {
    /// Dense, 0-based community index. Only meaningful within one run.
    pub community: usize,
    /// Hex color of the community in the run's palette
    pub color: String,
    /// Display size score in `[15, 55]`
    pub size: f64,
    /// Sum of incident edge weights
    pub total_interactions: u32,
}
