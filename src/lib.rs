//! Charnet: character interaction networks for novels
//!
//! Turns per-chapter "character interacts with character" records into a
//! canonical, weighted interaction graph and reports on it: who matters
//! most (degree, betweenness, eigenvector centrality), which characters
//! cluster together, and who leads each chapter.
//!
//! # Core Concepts
//!
//! - **Roster**: canonical characters and their aliases; mentions resolve
//!   case-insensitively or not at all
//! - **Aggregation**: resolved, order-independent pairs folded into weighted
//!   edges, per chapter and for the whole book
//! - **Graph**: undirected, no self-loops, multiplicity folded into weight
//! - **Reports**: whole-book and chapter-wise, degrading per section rather
//!   than failing
//!
//! # Example
//!
//! ```
//! use charnet::{AliasResolver, AnalysisRun, CanonicalCharacter, ChapterBatch, RawInteraction};
//!
//! let resolver = AliasResolver::from_characters(vec![
//!     CanonicalCharacter::new("Dorothea Brooke").with_alias("dorothea"),
//!     CanonicalCharacter::new("Celia Brooke").with_alias("celia"),
//! ])
//! .unwrap();
//!
//! let chapter = ChapterBatch::new(0, vec![RawInteraction::between("Dorothea", "Celia")]);
//! let output = AnalysisRun::new(&resolver).run(vec![chapter]);
//! assert_eq!(output.graph.unwrap().weight("Celia Brooke", "Dorothea Brooke"), Some(1));
//! ```

pub mod aggregate;
pub mod analysis;
pub mod config;
pub mod graph;
pub mod ingest;
mod pipeline;
pub mod report;
pub mod roster;
mod snapshot;

pub use aggregate::{
    aggregate_book, aggregate_chapter, AggregationStats, ChapterBatch, ChapterEdgeSet,
    EdgeAggregation, RawInteraction,
};
pub use analysis::{Availability, CentralityMetric, CommunityDetector, Louvain};
pub use config::{AnalysisConfig, CharnetConfig, ConfigError, DataConfig};
pub use graph::{EdgeKey, GraphError, GraphResult, InteractionDetail, InteractionGraph, WeightedEdge};
pub use ingest::{load_chapters, IngestError};
pub use pipeline::{AnalysisOutput, AnalysisRun};
pub use report::{BookReport, ChapterReport};
pub use roster::{AliasResolver, CanonicalCharacter, RosterError};
pub use snapshot::{LegendEntry, VisualizationSnapshot, VizEdge, VizNode};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
