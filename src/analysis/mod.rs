//! Network analysis over the character interaction graph
//!
//! Everything here is a read-only computation over an [`InteractionGraph`],
//! except [`annotate`], which attaches community and size data to nodes.
//!
//! # Measures
//!
//! - **Degree centrality**: weighted or unweighted degree over `N - 1`
//! - **Betweenness centrality**: Brandes over weighted shortest paths
//! - **Eigenvector centrality**: weighted power iteration, may fail to converge
//! - **Communities**: Louvain modularity optimization behind [`CommunityDetector`]
//!
//! Steps that can fail (eigenvector, communities) report through
//! [`Availability`] so a report can still be produced.
//!
//! # Example
//!
//! ```
//! use charnet::analysis::{betweenness_centrality, CommunityDetector, Louvain};
//! use charnet::graph::InteractionGraph;
//!
//! let graph = InteractionGraph::from_pairs(vec![("A", "B"), ("B", "C")]).unwrap();
//! let scores = betweenness_centrality(&graph);
//! assert_eq!(scores.top_n(1)[0].0, "B");
//!
//! let partition = Louvain::new().detect(&graph).unwrap();
//! assert_eq!(partition.assignments().len(), 3);
//! ```
//!
//! [`InteractionGraph`]: crate::graph::InteractionGraph

mod annotate;
mod centrality;
mod louvain;
mod traits;
mod types;

pub use annotate::{annotate, community_palette, CommunityAssignment, FALLBACK_COLOR, MIN_NODE_SIZE, NODE_SIZE_RANGE};
pub use centrality::{
    betweenness_centrality, degree_centrality, eigenvector_centrality, CentralityMetric,
    DegreeWeighting, DEFAULT_EIGENVECTOR_MAX_ITER, DEFAULT_EIGENVECTOR_TOLERANCE,
};
pub use louvain::Louvain;
pub use traits::CommunityDetector;
pub use types::{
    Availability, CentralityError, CentralityResult, CentralityScores, CommunityError,
    CommunityResult, Partition,
};
