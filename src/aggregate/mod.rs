//! Edge aggregation from raw interaction records
//!
//! Each chapter's records are folded independently into a
//! [`ChapterContribution`]: both mentions are resolved against the roster,
//! unresolved and self pairs are dropped, and every surviving record adds
//! one to its pair's weight along with a fully defaulted
//! [`InteractionDetail`]. The whole-book aggregation is the union of the
//! chapter contributions, merged in the caller's order.
//!
//! Duplicate records are not collapsed here: two identical records in a
//! chapter count twice. Deduplication belongs upstream.

use crate::graph::{EdgeKey, GraphResult, InteractionDetail, InteractionGraph, WeightedEdge};
use crate::roster::AliasResolver;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::ops::AddAssign;
use tracing::debug;

/// One "character mentions character" record as produced upstream.
///
/// Every field is optional at the wire level; a missing mention simply
/// fails to resolve.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawInteraction {
    #[serde(default)]
    pub character_1: Option<String>,
    #[serde(default)]
    pub character_2: Option<String>,
    #[serde(default)]
    pub interaction_type: Option<String>,
    #[serde(default)]
    pub sentiment: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub evidence_snippet: Option<String>,
}

impl RawInteraction {
    pub fn between(a: impl Into<String>, b: impl Into<String>) -> Self {
        Self {
            character_1: Some(a.into()),
            character_2: Some(b.into()),
            ..Default::default()
        }
    }

    pub fn with_type(mut self, interaction_type: impl Into<String>) -> Self {
        self.interaction_type = Some(interaction_type.into());
        self
    }

    pub fn with_sentiment(mut self, sentiment: impl Into<String>) -> Self {
        self.sentiment = Some(sentiment.into());
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_evidence(mut self, evidence: impl Into<String>) -> Self {
        self.evidence_snippet = Some(evidence.into());
        self
    }

    /// The detail retained for this record, with defaults for missing
    /// attributes.
    pub fn detail(&self) -> InteractionDetail {
        InteractionDetail::from_optional(
            self.interaction_type.as_deref(),
            self.sentiment.as_deref(),
            self.location.as_deref(),
            self.evidence_snippet.as_deref(),
        )
    }
}

/// All raw records for one chapter, fully materialized.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChapterBatch {
    /// Zero-based chapter ordinal
    pub index: usize,
    pub interactions: Vec<RawInteraction>,
}

impl ChapterBatch {
    pub fn new(index: usize, interactions: Vec<RawInteraction>) -> Self {
        Self { index, interactions }
    }
}

/// Counts of what happened to the records in an aggregation pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AggregationStats {
    pub records: usize,
    pub kept: usize,
    pub unresolved: usize,
    pub self_pairs: usize,
}

impl AddAssign for AggregationStats {
    fn add_assign(&mut self, other: Self) {
        self.records += other.records;
        self.kept += other.kept;
        self.unresolved += other.unresolved;
        self.self_pairs += other.self_pairs;
    }
}

/// The edges and pair sequence contributed by one chapter.
#[derive(Debug, Clone, PartialEq)]
pub struct ChapterContribution {
    pub chapter: usize,
    /// Weighted edges in first-seen order
    pub edges: Vec<WeightedEdge>,
    /// Every kept record's pair, in record order
    pub pairs: Vec<EdgeKey>,
    pub stats: AggregationStats,
}

/// Fold one chapter's records into weighted edges.
///
/// Pure: the result depends only on the resolver and the records.
pub fn aggregate_chapter(
    resolver: &AliasResolver,
    chapter: usize,
    records: &[RawInteraction],
) -> ChapterContribution {
    let mut edges: Vec<WeightedEdge> = Vec::new();
    let mut index: HashMap<EdgeKey, usize> = HashMap::new();
    let mut pairs = Vec::new();
    let mut stats = AggregationStats::default();

    for record in records {
        stats.records += 1;

        let a = record.character_1.as_deref().and_then(|m| resolver.resolve(m));
        let b = record.character_2.as_deref().and_then(|m| resolver.resolve(m));
        let (Some(a), Some(b)) = (a, b) else {
            stats.unresolved += 1;
            continue;
        };
        let Some(key) = EdgeKey::new(a, b) else {
            stats.self_pairs += 1;
            continue;
        };

        stats.kept += 1;
        let detail = record.detail();
        match index.get(&key) {
            Some(&idx) => edges[idx].record(detail),
            None => {
                index.insert(key.clone(), edges.len());
                edges.push(WeightedEdge::new(key.clone(), detail));
            }
        }
        pairs.push(key);
    }

    debug!(
        chapter,
        records = stats.records,
        kept = stats.kept,
        unresolved = stats.unresolved,
        self_pairs = stats.self_pairs,
        edges = edges.len(),
        "chapter aggregated"
    );

    ChapterContribution {
        chapter,
        edges,
        pairs,
        stats,
    }
}

/// Chapter index → resolved pairs observed in that chapter.
///
/// Multiplicity is kept by repetition. Iterates in ascending chapter order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ChapterEdgeSet {
    chapters: BTreeMap<usize, Vec<EdgeKey>>,
}

impl ChapterEdgeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append pairs to a chapter, creating it if needed.
    pub fn extend(&mut self, chapter: usize, pairs: impl IntoIterator<Item = EdgeKey>) {
        self.chapters.entry(chapter).or_default().extend(pairs);
    }

    pub fn get(&self, chapter: usize) -> Option<&[EdgeKey]> {
        self.chapters.get(&chapter).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &[EdgeKey])> {
        self.chapters.iter().map(|(&c, pairs)| (c, pairs.as_slice()))
    }

    /// Number of chapters present, including chapters with no pairs
    pub fn len(&self) -> usize {
        self.chapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chapters.is_empty()
    }
}

/// Accumulated whole-book aggregation.
#[derive(Debug, Clone, Default)]
pub struct EdgeAggregation {
    edges: Vec<WeightedEdge>,
    index: HashMap<EdgeKey, usize>,
    chapters: ChapterEdgeSet,
    stats: AggregationStats,
}

impl EdgeAggregation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Union a chapter contribution into the accumulated state.
    ///
    /// Weights add; details of an existing edge are appended after the ones
    /// already held.
    pub fn merge(&mut self, contribution: ChapterContribution) {
        for edge in contribution.edges {
            match self.index.get(edge.key()) {
                Some(&idx) => self.edges[idx].absorb(edge),
                None => {
                    self.index.insert(edge.key().clone(), self.edges.len());
                    self.edges.push(edge);
                }
            }
        }
        self.chapters.extend(contribution.chapter, contribution.pairs);
        self.stats += contribution.stats;
    }

    /// Weighted edges in first-seen order
    pub fn edges(&self) -> &[WeightedEdge] {
        &self.edges
    }

    pub fn edge(&self, a: &str, b: &str) -> Option<&WeightedEdge> {
        let key = EdgeKey::new(a, b)?;
        self.index.get(&key).map(|&idx| &self.edges[idx])
    }

    pub fn chapters(&self) -> &ChapterEdgeSet {
        &self.chapters
    }

    pub fn stats(&self) -> AggregationStats {
        self.stats
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Every kept pair occurrence, chapter by chapter.
    pub fn flat_pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.chapters
            .iter()
            .flat_map(|(_, pairs)| pairs.iter().map(|k| (k.first(), k.second())))
    }

    /// Build the analytical graph from the aggregated edges.
    pub fn to_graph(&self) -> GraphResult<InteractionGraph> {
        InteractionGraph::from_weighted_edges(self.edges.iter().cloned())
    }
}

/// Aggregate a sequence of chapters in order.
pub fn aggregate_book(
    resolver: &AliasResolver,
    chapters: impl IntoIterator<Item = ChapterBatch>,
) -> EdgeAggregation {
    let mut aggregation = EdgeAggregation::new();
    for batch in chapters {
        aggregation.merge(aggregate_chapter(resolver, batch.index, &batch.interactions));
    }

    let stats = aggregation.stats();
    debug!(
        chapters = aggregation.chapters().len(),
        records = stats.records,
        kept = stats.kept,
        edges = aggregation.edges().len(),
        "book aggregated"
    );
    aggregation
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::CanonicalCharacter;

    fn resolver() -> AliasResolver {
        AliasResolver::from_characters(vec![
            CanonicalCharacter::new("Dorothea Brooke")
                .with_alias("dorothea")
                .with_alias("Miss Brooke"),
            CanonicalCharacter::new("Celia Brooke").with_alias("celia"),
            CanonicalCharacter::new("Edward Casaubon").with_alias("Casaubon"),
        ])
        .unwrap()
    }

    #[test]
    fn unresolved_mentions_contribute_nothing() {
        let records = vec![
            RawInteraction::between("Mysterious Stranger", "Dorothea"),
            RawInteraction::between("Dorothea", "a passing farmer"),
            RawInteraction {
                character_1: Some("Celia".into()),
                ..Default::default()
            },
        ];
        let contribution = aggregate_chapter(&resolver(), 0, &records);
        assert!(contribution.edges.is_empty());
        assert!(contribution.pairs.is_empty());
        assert_eq!(contribution.stats.unresolved, 3);
    }

    #[test]
    fn aliases_of_the_same_character_are_a_self_pair() {
        let records = vec![RawInteraction::between("Dorothea", "Miss Brooke")];
        let contribution = aggregate_chapter(&resolver(), 0, &records);
        assert!(contribution.edges.is_empty());
        assert_eq!(contribution.stats.self_pairs, 1);
    }

    #[test]
    fn both_orders_fold_into_one_edge() {
        let records = vec![
            RawInteraction::between("Dorothea", "Celia"),
            RawInteraction::between("celia", "Miss Brooke"),
            RawInteraction::between("Celia Brooke", "dorothea"),
        ];
        let contribution = aggregate_chapter(&resolver(), 0, &records);
        assert_eq!(contribution.edges.len(), 1);
        assert_eq!(contribution.edges[0].weight(), 3);
        assert_eq!(contribution.pairs.len(), 3);
    }

    #[test]
    fn missing_attributes_get_defaults() {
        let records = vec![
            RawInteraction::between("Dorothea", "Casaubon")
                .with_type("Direct Dialogue")
                .with_evidence("\"I am not fond of music,\" said Mr. Casaubon"),
        ];
        let contribution = aggregate_chapter(&resolver(), 0, &records);
        let detail = &contribution.edges[0].details()[0];
        assert_eq!(detail.interaction_type, "Direct Dialogue");
        assert_eq!(detail.sentiment, "Neutral");
        assert_eq!(detail.location, "Unknown");
        assert!(detail.evidence.starts_with("\"I am not fond"));
    }

    #[test]
    fn duplicate_records_are_not_deduplicated() {
        let record = RawInteraction::between("Dorothea", "Celia").with_evidence("same quote");
        let contribution = aggregate_chapter(&resolver(), 0, &[record.clone(), record]);
        assert_eq!(contribution.edges[0].weight(), 2);
    }

    #[test]
    fn merge_adds_weights_and_appends_details() {
        let r = resolver();
        let mut aggregation = EdgeAggregation::new();
        aggregation.merge(aggregate_chapter(
            &r,
            0,
            &[RawInteraction::between("Dorothea", "Celia").with_location("Tipton")],
        ));
        aggregation.merge(aggregate_chapter(
            &r,
            1,
            &[
                RawInteraction::between("Celia", "Dorothea").with_location("Lowick"),
                RawInteraction::between("Dorothea", "Casaubon"),
            ],
        ));

        let edge = aggregation.edge("Celia Brooke", "Dorothea Brooke").unwrap();
        assert_eq!(edge.weight(), 2);
        let locations: Vec<_> = edge.details().iter().map(|d| d.location.as_str()).collect();
        assert_eq!(locations, vec!["Tipton", "Lowick"]);

        assert_eq!(aggregation.edges().len(), 2);
        assert_eq!(aggregation.chapters().len(), 2);
        assert_eq!(aggregation.chapters().get(1).unwrap().len(), 2);
        assert_eq!(aggregation.flat_pairs().count(), 3);
        assert_eq!(aggregation.stats().kept, 3);
    }

    #[test]
    fn chapter_with_only_dropped_records_is_still_listed() {
        let aggregation = aggregate_book(
            &resolver(),
            vec![ChapterBatch::new(4, vec![RawInteraction::between("Nobody", "Dorothea")])],
        );
        assert!(aggregation.is_empty());
        assert_eq!(aggregation.chapters().get(4), Some(&[][..]));
    }

    #[test]
    fn raw_interaction_tolerates_missing_and_null_fields() {
        let record: RawInteraction = serde_json::from_str(
            r#"{"character_1": "Dorothea", "character_2": null, "sentiment": "Positive", "quote": "ignored"}"#,
        )
        .unwrap();
        assert_eq!(record.character_1.as_deref(), Some("Dorothea"));
        assert_eq!(record.character_2, None);
        assert_eq!(record.detail().sentiment, "Positive");
        assert_eq!(record.detail().interaction_type, "Unknown");
    }
}
