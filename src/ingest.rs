//! Loading per-chapter interaction records from disk
//!
//! A book's results directory holds one JSON file per chapter, named so the
//! chapter ordinal follows the last underscore of the stem
//! (`chapter_0.json`, `middlemarch_12.json`):
//!
//! ```json
//! { "interactions": [ { "character_1": "Dorothea", "character_2": "Celia" } ] }
//! ```

use crate::aggregate::{ChapterBatch, RawInteraction};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Results directory not found: {0}")]
    DirectoryNotFound(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed chapter file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

pub type IngestResult<T> = Result<T, IngestError>;

/// On-disk layout of one chapter's records
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChapterFile {
    #[serde(default)]
    pub interactions: Vec<RawInteraction>,
}

/// Chapter ordinal encoded in a file name, if any.
pub fn chapter_index_from_path(path: &Path) -> Option<usize> {
    let stem = path.file_stem()?.to_str()?;
    let (_, index) = stem.rsplit_once('_')?;
    index.parse().ok()
}

/// Parse one chapter file's contents.
pub fn parse_chapter(path: &Path, json: &str) -> IngestResult<Vec<RawInteraction>> {
    let file: ChapterFile = serde_json::from_str(json).map_err(|source| IngestError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(file.interactions)
}

/// Load every chapter file in `dir`, sorted by chapter index.
///
/// Only `.json` files directly inside `dir` are considered. Files whose
/// names carry no chapter index are skipped with a warning.
pub fn load_chapters(dir: &Path) -> IngestResult<Vec<ChapterBatch>> {
    if !dir.is_dir() {
        return Err(IngestError::DirectoryNotFound(dir.to_path_buf()));
    }

    let mut found: Vec<(usize, PathBuf)> = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry.map_err(|e| IngestError::Io(e.into()))?;
        let path = entry.path();
        if !entry.file_type().is_file() || path.extension().map_or(true, |ext| ext != "json") {
            continue;
        }
        match chapter_index_from_path(path) {
            Some(index) => found.push((index, path.to_path_buf())),
            None => warn!(path = %path.display(), "no chapter index in file name, skipping"),
        }
    }
    found.sort();

    let mut batches = Vec::with_capacity(found.len());
    for (index, path) in found {
        let json = std::fs::read_to_string(&path)?;
        let interactions = parse_chapter(&path, &json)?;
        debug!(chapter = index, records = interactions.len(), "chapter loaded");
        batches.push(ChapterBatch::new(index, interactions));
    }

    info!(dir = %dir.display(), chapters = batches.len(), "chapters loaded");
    Ok(batches)
}
