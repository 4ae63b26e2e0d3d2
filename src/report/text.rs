//! Plain-text rendering of reports

use super::{BookAnalysis, BookReport, ChapterReport, MetricRanking};
use crate::analysis::Availability;
use std::fmt;

const NONE_PLACEHOLDER: &str = "  (none)";

impl fmt::Display for BookReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("Graph is empty. No analysis can be performed."),
            Self::Analyzed(analysis) => fmt::Display::fmt(analysis, f),
        }
    }
}

impl fmt::Display for BookAnalysis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Character Network Analysis Report ---")?;
        writeln!(f)?;
        writeln!(f, "Total Characters (Nodes): {}", self.node_count)?;
        writeln!(f, "Total Unique Relationships (Edges): {}", self.edge_count)?;

        writeln!(f)?;
        writeln!(f, "--- Top {} Relationships by Interaction Count ---", self.top_n)?;
        if self.top_relationships.is_empty() {
            writeln!(f, "{NONE_PLACEHOLDER}")?;
        }
        for rel in &self.top_relationships {
            writeln!(f, "  {:<5} | {} -- {}", rel.weight, rel.first, rel.second)?;
        }

        for ranking in &self.rankings {
            writeln!(f)?;
            write_ranking(f, self.top_n, ranking)?;
        }

        writeln!(f)?;
        writeln!(f, "--- Communities ---")?;
        match &self.communities {
            Availability::Available { value } => {
                for (idx, members) in value.iter().enumerate() {
                    writeln!(f, "  Community {idx}: {}", members.join(", "))?;
                }
            }
            Availability::Unavailable { reason } => {
                writeln!(f, "  (community detection unavailable: {reason})")?;
            }
        }
        Ok(())
    }
}

fn write_ranking(f: &mut fmt::Formatter<'_>, top_n: usize, ranking: &MetricRanking) -> fmt::Result {
    writeln!(f, "--- Top {} Characters by {} ---", top_n, ranking.metric)?;
    match &ranking.ranking {
        Availability::Available { value } if value.is_empty() => writeln!(f, "{NONE_PLACEHOLDER}"),
        Availability::Available { value } => {
            for entry in value {
                writeln!(f, "  {:<30} | Score: {:.4}", entry.name, entry.score)?;
            }
            Ok(())
        }
        Availability::Unavailable { reason } => writeln!(
            f,
            "  (no {} ranking available: {reason})",
            ranking.metric.to_string().to_lowercase()
        ),
    }
}

impl fmt::Display for ChapterReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Top {} Most Important Characters by Chapter ---", self.top_n)?;
        if self.chapters.is_empty() {
            writeln!(f)?;
            return writeln!(f, "  (no chapter interactions recorded)");
        }
        for chapter in &self.chapters {
            writeln!(f)?;
            writeln!(f, "Chapter {}:", chapter.chapter)?;
            for (rank, entry) in chapter.leaders.iter().enumerate() {
                writeln!(f, "  {}. {:<30} (Score: {:.4})", rank + 1, entry.name, entry.score)?;
            }
        }
        Ok(())
    }
}
