//! End-to-end analysis run over materialized chapter batches
//!
//! roster → aggregation → graph → annotation → reports, single-threaded and
//! single-pass. Only a missing roster or unreadable input aborts; everything
//! after loading degrades into the report instead of failing.

use crate::aggregate::{aggregate_book, AggregationStats, ChapterBatch, EdgeAggregation};
use crate::analysis::{annotate, CommunityAssignment, CommunityDetector, Louvain};
use crate::config::AnalysisConfig;
use crate::graph::{GraphError, InteractionGraph};
use crate::report::{BookReport, ChapterReport};
use crate::roster::AliasResolver;
use crate::snapshot::VisualizationSnapshot;
use serde::Serialize;
use tracing::{info, warn};

/// Configured analysis over one book
pub struct AnalysisRun<'a> {
    resolver: &'a AliasResolver,
    config: AnalysisConfig,
    detector: Box<dyn CommunityDetector>,
}

impl<'a> AnalysisRun<'a> {
    pub fn new(resolver: &'a AliasResolver) -> Self {
        Self {
            resolver,
            config: AnalysisConfig::default(),
            detector: Box::new(Louvain::new()),
        }
    }

    pub fn with_config(mut self, config: AnalysisConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_detector(mut self, detector: impl CommunityDetector + 'static) -> Self {
        self.detector = Box::new(detector);
        self
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn run(&self, chapters: impl IntoIterator<Item = ChapterBatch>) -> AnalysisOutput {
        let aggregation = aggregate_book(self.resolver, chapters);

        let mut graph = match aggregation.to_graph() {
            Ok(graph) => Some(graph),
            Err(GraphError::Empty) => {
                warn!("no interactions survived aggregation");
                None
            }
            Err(e) => {
                warn!(error = %e, "graph construction failed");
                None
            }
        };

        let communities = graph
            .as_mut()
            .map(|graph| annotate(graph, self.detector.as_ref()));

        let book = BookReport::generate(graph.as_ref(), communities.as_ref(), &self.config);
        let chapters = ChapterReport::generate(aggregation.chapters(), self.config.chapter_top_n);
        let snapshot = graph.as_ref().map(VisualizationSnapshot::capture).unwrap_or_default();

        let stats = aggregation.stats();
        info!(
            records = stats.records,
            kept = stats.kept,
            nodes = graph.as_ref().map_or(0, InteractionGraph::node_count),
            edges = graph.as_ref().map_or(0, InteractionGraph::edge_count),
            "analysis complete"
        );

        AnalysisOutput {
            aggregation,
            graph,
            communities,
            book,
            chapters,
            snapshot,
        }
    }
}

/// Everything one analysis run produced
#[derive(Debug, Clone)]
pub struct AnalysisOutput {
    pub aggregation: EdgeAggregation,
    /// `None` when no edges survived aggregation
    pub graph: Option<InteractionGraph>,
    pub communities: Option<CommunityAssignment>,
    pub book: BookReport,
    pub chapters: ChapterReport,
    pub snapshot: VisualizationSnapshot,
}

#[derive(Serialize)]
struct ReportDocument<'a> {
    stats: AggregationStats,
    book: &'a BookReport,
    chapters: &'a ChapterReport,
}

impl AnalysisOutput {
    /// Whole-book report followed by the chapter-wise report.
    pub fn render_text(&self) -> String {
        format!(
            "{}\n\n{}",
            self.book.to_string().trim_end(),
            self.chapters.to_string().trim_end()
        )
    }

    /// Both reports plus aggregation counts as JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&ReportDocument {
            stats: self.aggregation.stats(),
            book: &self.book,
            chapters: &self.chapters,
        })
    }
}
