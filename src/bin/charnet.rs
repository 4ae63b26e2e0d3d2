//! Charnet CLI: build and analyze character interaction networks.
//!
//! Usage:
//!   charnet analyze <book> [--config F] [--roster F] [--results DIR] [--out DIR]
//!   charnet build-graph <book> [--config F] [--roster F] [--results DIR] [--out DIR]
//!   charnet report <graph.gml> [--top-n N]

use charnet::analysis::{annotate, Louvain};
use charnet::graph::gml;
use charnet::{
    aggregate_book, load_chapters, AliasResolver, AnalysisRun, BookReport, ChapterBatch,
    CharnetConfig,
};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser)]
#[command(
    name = "charnet",
    version,
    about = "Character interaction networks and analysis for novels"
)]
struct Cli {
    /// Log at debug level (RUST_LOG overrides)
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Path to config.yaml; defaults apply when omitted
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct BookArgs {
    /// Book name; chapter files live in <results>/<book>
    book: String,
    /// Roster JSON (overrides data.character_file)
    #[arg(long)]
    roster: Option<PathBuf>,
    /// Directory of chapter files (overrides <data.llm_results_dir>/<book>)
    #[arg(long)]
    results: Option<PathBuf>,
    /// Output directory
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full analysis and write reports plus the visualization snapshot
    Analyze(BookArgs),
    /// Aggregate chapters and write the GML graph artifact
    BuildGraph(BookArgs),
    /// Whole-book report from a saved GML graph
    Report {
        /// GML file written by build-graph
        graph: PathBuf,
        /// Entries per ranking (overrides analysis.top_n_results)
        #[arg(long)]
        top_n: Option<usize>,
    },
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Load the roster and every chapter of `args.book`.
fn load_book(config: &CharnetConfig, args: &BookArgs) -> Result<(AliasResolver, Vec<ChapterBatch>), String> {
    let roster_path = args
        .roster
        .clone()
        .unwrap_or_else(|| config.data.character_file.clone());
    let resolver = AliasResolver::load(&roster_path)
        .map_err(|e| format!("Failed to load roster {}: {}", roster_path.display(), e))?;

    let results_dir = args
        .results
        .clone()
        .unwrap_or_else(|| config.data.book_results_dir(&args.book));
    let chapters = load_chapters(&results_dir).map_err(|e| format!("Failed to load chapters: {}", e))?;
    Ok((resolver, chapters))
}

fn write_file(path: &Path, contents: &str) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| format!("Failed to create {}: {}", parent.display(), e))?;
    }
    std::fs::write(path, contents).map_err(|e| format!("Failed to write {}: {}", path.display(), e))?;
    info!(path = %path.display(), "written");
    Ok(())
}

fn cmd_analyze(config: &CharnetConfig, args: &BookArgs) -> i32 {
    let (resolver, chapters) = match load_book(config, args) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };

    let output = AnalysisRun::new(&resolver)
        .with_config(config.analysis.clone())
        .run(chapters);
    let text = output.render_text();
    println!("{}", text);

    let out_dir = args
        .out
        .clone()
        .unwrap_or_else(|| config.data.book_reports_dir(&args.book));

    let json = match output.to_json() {
        Ok(json) => json,
        Err(e) => {
            eprintln!("Error: failed to serialize report: {}", e);
            return 1;
        }
    };
    let snapshot = match output.snapshot.to_json() {
        Ok(json) => json,
        Err(e) => {
            eprintln!("Error: failed to serialize snapshot: {}", e);
            return 1;
        }
    };

    let written = write_file(&out_dir.join("analysis_report.txt"), &text)
        .and_then(|_| write_file(&out_dir.join("analysis_report.json"), &json))
        .and_then(|_| write_file(&out_dir.join(format!("{}_network.json", args.book)), &snapshot));
    match written {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn cmd_build_graph(config: &CharnetConfig, args: &BookArgs) -> i32 {
    let (resolver, chapters) = match load_book(config, args) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };

    let aggregation = aggregate_book(&resolver, chapters);
    let graph = match aggregation.to_graph() {
        Ok(graph) => graph,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };
    let document = match gml::write(&graph) {
        Ok(document) => document,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };

    let out_dir = args
        .out
        .clone()
        .unwrap_or_else(|| config.data.graph_artifacts_dir.clone());
    let path = out_dir.join(format!("{}_graph.gml", args.book));
    match write_file(&path, &document) {
        Ok(()) => {
            println!(
                "Wrote {} ({} characters, {} relationships)",
                path.display(),
                graph.node_count(),
                graph.edge_count()
            );
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn cmd_report(config: &CharnetConfig, graph_path: &Path, top_n: Option<usize>) -> i32 {
    let document = match std::fs::read_to_string(graph_path) {
        Ok(document) => document,
        Err(e) => {
            eprintln!("Error: cannot read '{}': {}", graph_path.display(), e);
            return 1;
        }
    };
    let mut graph = match gml::read(&document) {
        Ok(graph) => graph,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };

    let mut analysis = config.analysis.clone();
    if let Some(n) = top_n {
        analysis = analysis.with_top_n(n);
    }
    let communities = annotate(&mut graph, &Louvain::new());
    println!("{}", BookReport::generate(Some(&graph), Some(&communities), &analysis));
    0
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = match CharnetConfig::load_or_default(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let code = match cli.command {
        Commands::Analyze(args) => cmd_analyze(&config, &args),
        Commands::BuildGraph(args) => cmd_build_graph(&config, &args),
        Commands::Report { graph, top_n } => cmd_report(&config, &graph, top_n),
    };
    std::process::exit(code);
}
