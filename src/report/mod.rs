//! Whole-book and chapter-wise reports
//!
//! Both reports are pure functions of their inputs and render to text via
//! `Display` (see `text.rs`). Every section renders something: an empty
//! ranking shows a placeholder, a degraded one shows why it is missing.

mod text;

use crate::aggregate::ChapterEdgeSet;
use crate::analysis::{
    betweenness_centrality, degree_centrality, eigenvector_centrality, Availability,
    CentralityMetric, CentralityScores, CommunityAssignment, DegreeWeighting,
};
use crate::config::AnalysisConfig;
use crate::graph::InteractionGraph;
use serde::{Serialize, Serializer};
use tracing::{debug, warn};

/// Scores are compared and stored at full precision; output is rounded.
fn round4<S: Serializer>(score: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64((score * 10_000.0).round() / 10_000.0)
}

/// One character in a ranking
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedCharacter {
    pub name: String,
    #[serde(serialize_with = "round4")]
    pub score: f64,
}

impl RankedCharacter {
    fn from_scores(scores: &CentralityScores, n: usize) -> Vec<Self> {
        scores
            .top_n(n)
            .into_iter()
            .map(|(name, score)| Self { name, score })
            .collect()
    }
}

/// One relationship in the top-relationships section
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankedRelationship {
    pub first: String,
    pub second: String,
    pub weight: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricRanking {
    pub metric: CentralityMetric,
    pub ranking: Availability<Vec<RankedCharacter>>,
}

/// Contents of a whole-book report over a non-empty graph
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookAnalysis {
    pub top_n: usize,
    pub node_count: usize,
    pub edge_count: usize,
    pub top_relationships: Vec<RankedRelationship>,
    /// Degree, betweenness, eigenvector, in that order
    pub rankings: Vec<MetricRanking>,
    /// Member names per community
    pub communities: Availability<Vec<Vec<String>>>,
}

/// Whole-book report; an empty graph is a valid, reportable state.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BookReport {
    Empty,
    Analyzed(BookAnalysis),
}

impl BookReport {
    /// Analyze `graph` (or report that nothing can be analyzed).
    ///
    /// Communities come from an earlier annotation pass; `None` renders the
    /// section as unavailable.
    pub fn generate(
        graph: Option<&InteractionGraph>,
        communities: Option<&CommunityAssignment>,
        config: &AnalysisConfig,
    ) -> Self {
        let Some(graph) = graph.filter(|g| g.node_count() > 0) else {
            warn!("graph is empty, no analysis possible");
            return Self::Empty;
        };
        let n = config.top_n_results;

        let top_relationships = graph
            .edges_by_weight()
            .into_iter()
            .take(n)
            .map(|edge| RankedRelationship {
                first: edge.key().first().to_string(),
                second: edge.key().second().to_string(),
                weight: edge.weight(),
            })
            .collect();

        let rankings = CentralityMetric::ALL
            .iter()
            .map(|&metric| {
                let ranking = match metric {
                    CentralityMetric::Degree => Availability::available(RankedCharacter::from_scores(
                        &degree_centrality(graph, DegreeWeighting::Weighted),
                        n,
                    )),
                    CentralityMetric::Betweenness => Availability::available(
                        RankedCharacter::from_scores(&betweenness_centrality(graph), n),
                    ),
                    CentralityMetric::Eigenvector => {
                        let result = eigenvector_centrality(
                            graph,
                            config.eigenvector_max_iter,
                            config.eigenvector_tolerance,
                        );
                        if let Err(e) = &result {
                            warn!(error = %e, "eigenvector centrality unavailable");
                        }
                        Availability::from(result).map(|scores| RankedCharacter::from_scores(&scores, n))
                    }
                };
                MetricRanking { metric, ranking }
            })
            .collect();

        let communities = match communities {
            Some(assignment) => match &assignment.detection {
                Availability::Available { .. } => {
                    Availability::available(assignment.partition.groups(graph))
                }
                Availability::Unavailable { reason } => Availability::unavailable(reason.clone()),
            },
            None => Availability::unavailable("community detection was not run"),
        };

        debug!(nodes = graph.node_count(), edges = graph.edge_count(), "book report generated");

        Self::Analyzed(BookAnalysis {
            top_n: n,
            node_count: graph.node_count(),
            edge_count: graph.edge_count(),
            top_relationships,
            rankings,
            communities,
        })
    }

    pub fn analysis(&self) -> Option<&BookAnalysis> {
        match self {
            Self::Empty => None,
            Self::Analyzed(analysis) => Some(analysis),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

impl BookAnalysis {
    pub fn ranking(&self, metric: CentralityMetric) -> Option<&Availability<Vec<RankedCharacter>>> {
        self.rankings.iter().find(|r| r.metric == metric).map(|r| &r.ranking)
    }
}

/// Leaders of a single chapter
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChapterLeaders {
    /// Zero-based chapter index as ingested
    pub index: usize,
    /// One-based chapter number as displayed
    pub chapter: usize,
    pub leaders: Vec<RankedCharacter>,
}

/// Most important characters per chapter, by unweighted degree within the
/// chapter alone.
///
/// This deliberately differs from the whole-book degree ranking: repeated
/// interactions inside a chapter count once.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChapterReport {
    pub top_n: usize,
    pub chapters: Vec<ChapterLeaders>,
}

impl ChapterReport {
    pub fn generate(chapters: &ChapterEdgeSet, top_n: usize) -> Self {
        let chapters = chapters
            .iter()
            .filter_map(|(index, pairs)| {
                let pairs = pairs.iter().map(|key| (key.first(), key.second()));
                // chapters without edges get no section
                let graph = InteractionGraph::from_pairs(pairs).ok()?;
                let scores = degree_centrality(&graph, DegreeWeighting::Unweighted);
                Some(ChapterLeaders {
                    index,
                    chapter: index + 1,
                    leaders: RankedCharacter::from_scores(&scores, top_n),
                })
            })
            .collect();

        Self { top_n, chapters }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{annotate, CommunityDetector, CommunityError, CommunityResult, Louvain, Partition};
    use crate::graph::EdgeKey;

    fn key(a: &str, b: &str) -> EdgeKey {
        EdgeKey::new(a, b).unwrap()
    }

    fn small_book() -> InteractionGraph {
        InteractionGraph::from_pairs(vec![
            ("Dorothea", "Celia"),
            ("Dorothea", "Celia"),
            ("Dorothea", "Casaubon"),
            ("Celia", "Chettam"),
        ])
        .unwrap()
    }

    struct Refuses;

    impl CommunityDetector for Refuses {
        fn id(&self) -> &str {
            "refuses"
        }

        fn detect(&self, _graph: &InteractionGraph) -> CommunityResult<Partition> {
            Err(CommunityError::DegenerateGraph("not today".into()))
        }
    }

    #[test]
    fn empty_graph_reports_no_analysis() {
        let report = BookReport::generate(None, None, &AnalysisConfig::default());
        assert!(report.is_empty());
        assert_eq!(report.to_string(), "Graph is empty. No analysis can be performed.");
    }

    #[test]
    fn top_relationships_follow_weight_then_first_seen() {
        let graph = small_book();
        let report = BookReport::generate(Some(&graph), None, &AnalysisConfig::default());
        let analysis = report.analysis().unwrap();

        assert_eq!(analysis.node_count, 4);
        assert_eq!(analysis.edge_count, 3);
        let weights: Vec<u32> = analysis.top_relationships.iter().map(|r| r.weight).collect();
        assert_eq!(weights, vec![2, 1, 1]);
        assert_eq!(analysis.top_relationships[1].second, "Dorothea");
        assert_eq!(analysis.top_relationships[1].first, "Casaubon");
    }

    #[test]
    fn every_metric_has_a_section() {
        let graph = small_book();
        let report = BookReport::generate(Some(&graph), None, &AnalysisConfig::default());
        let analysis = report.analysis().unwrap();
        for metric in CentralityMetric::ALL {
            assert!(analysis.ranking(metric).unwrap().is_available());
        }
        let text = report.to_string();
        assert!(text.contains("--- Top 10 Characters by Degree Centrality ---"));
        assert!(text.contains("--- Top 10 Characters by Betweenness Centrality ---"));
        assert!(text.contains("--- Top 10 Characters by Eigenvector Centrality ---"));
    }

    #[test]
    fn eigenvector_failure_degrades_only_its_section() {
        let graph = small_book();
        // Power iteration on A+I converges for non-negative weights, so only the cap can trip it
        let config = AnalysisConfig {
            eigenvector_max_iter: 1,
            ..AnalysisConfig::default()
        };
        let report = BookReport::generate(Some(&graph), None, &config);
        let analysis = report.analysis().unwrap();

        assert!(!analysis.ranking(CentralityMetric::Eigenvector).unwrap().is_available());
        assert!(analysis.ranking(CentralityMetric::Degree).unwrap().is_available());
        assert!(report.to_string().contains("no eigenvector centrality ranking available"));
    }

    #[test]
    fn communities_section_reflects_detection() {
        let mut graph = small_book();
        let assignment = annotate(&mut graph, &Louvain::new());
        let report = BookReport::generate(Some(&graph), Some(&assignment), &AnalysisConfig::default());
        let members = report.analysis().unwrap().communities.as_available().unwrap();
        assert_eq!(members.iter().map(Vec::len).sum::<usize>(), 4);

        let mut graph = small_book();
        let assignment = annotate(&mut graph, &Refuses);
        let report = BookReport::generate(Some(&graph), Some(&assignment), &AnalysisConfig::default());
        assert!(!report.analysis().unwrap().communities.is_available());
        assert!(report.to_string().contains("not today"));
    }

    #[test]
    fn json_scores_are_rounded() {
        let graph = InteractionGraph::from_pairs(vec![("A", "B"), ("B", "C"), ("C", "D")]).unwrap();
        let report = BookReport::generate(Some(&graph), None, &AnalysisConfig::default());
        let value = serde_json::to_value(&report).unwrap();

        assert_eq!(value["status"], "analyzed");
        let betweenness = &value["rankings"][1];
        assert_eq!(betweenness["metric"], "betweenness");
        assert_eq!(betweenness["ranking"]["value"][0]["score"], 0.6667);
    }

    #[test]
    fn chapter_report_skips_empty_chapters_and_numbers_from_one() {
        let mut chapters = ChapterEdgeSet::new();
        chapters.extend(0, vec![key("A", "B"), key("A", "B"), key("A", "C")]);
        chapters.extend(1, Vec::new());
        chapters.extend(2, vec![key("C", "D")]);

        let report = ChapterReport::generate(&chapters, 5);
        let numbers: Vec<usize> = report.chapters.iter().map(|c| c.chapter).collect();
        assert_eq!(numbers, vec![1, 3]);

        // repetition within a chapter does not raise the score
        let first = &report.chapters[0];
        assert_eq!(first.leaders[0].name, "A");
        assert!((first.leaders[0].score - 1.0).abs() < 1e-9);
        assert!((first.leaders[1].score - 0.5).abs() < 1e-9);
    }

    #[test]
    fn chapter_report_truncates_to_top_n() {
        let mut chapters = ChapterEdgeSet::new();
        chapters.extend(0, vec![key("A", "B"), key("A", "C"), key("A", "D")]);
        let report = ChapterReport::generate(&chapters, 2);
        assert_eq!(report.chapters[0].leaders.len(), 2);
    }

    #[test]
    fn chapter_report_without_chapters_renders_placeholder() {
        let report = ChapterReport::generate(&ChapterEdgeSet::new(), 5);
        assert!(report.chapters.is_empty());
        assert!(report.to_string().contains("(no chapter interactions recorded)"));
    }
}
