//! YAML configuration
//!
//! ```yaml
//! data:
//!   character_file: characters.json
//!   llm_results_dir: results
//!   graph_artifacts_dir: graph_artifacts
//!   reports_dir: analysis_reports
//! analysis:
//!   top_n_results: 10
//!   chapter_top_n: 5
//! ```
//!
//! Every field is optional. Relative data paths are resolved against the
//! directory of the config file they were read from.

use crate::analysis::{DEFAULT_EIGENVECTOR_MAX_ITER, DEFAULT_EIGENVECTOR_TOLERANCE};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Where inputs are read from and outputs written to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Roster JSON
    pub character_file: PathBuf,
    /// Holds one subdirectory of chapter files per book
    pub llm_results_dir: PathBuf,
    pub graph_artifacts_dir: PathBuf,
    pub reports_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            character_file: PathBuf::from("characters.json"),
            llm_results_dir: PathBuf::from("results"),
            graph_artifacts_dir: PathBuf::from("graph_artifacts"),
            reports_dir: PathBuf::from("analysis_reports"),
        }
    }
}

impl DataConfig {
    /// Chapter record directory for `book`
    pub fn book_results_dir(&self, book: &str) -> PathBuf {
        self.llm_results_dir.join(book)
    }

    /// Report directory for `book`
    pub fn book_reports_dir(&self, book: &str) -> PathBuf {
        self.reports_dir.join(book)
    }

    fn resolve_against(&mut self, base: &Path) {
        for path in [
            &mut self.character_file,
            &mut self.llm_results_dir,
            &mut self.graph_artifacts_dir,
            &mut self.reports_dir,
        ] {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }
    }
}

/// Settings consumed by the analysis core
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Size of whole-book rankings
    pub top_n_results: usize,
    /// Size of per-chapter rankings
    pub chapter_top_n: usize,
    pub eigenvector_max_iter: usize,
    pub eigenvector_tolerance: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            top_n_results: 10,
            chapter_top_n: 5,
            eigenvector_max_iter: DEFAULT_EIGENVECTOR_MAX_ITER,
            eigenvector_tolerance: DEFAULT_EIGENVECTOR_TOLERANCE,
        }
    }
}

impl AnalysisConfig {
    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n_results = top_n;
        self
    }

    pub fn with_chapter_top_n(mut self, top_n: usize) -> Self {
        self.chapter_top_n = top_n;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CharnetConfig {
    pub data: DataConfig,
    pub analysis: AnalysisConfig,
}

impl CharnetConfig {
    /// Parse YAML without touching the filesystem; paths stay as written.
    pub fn from_yaml_str(yaml: &str) -> ConfigResult<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Load a config file, resolving relative data paths against its directory.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        if !path.is_file() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        let yaml = std::fs::read_to_string(path)?;
        let mut config = Self::from_yaml_str(&yaml)?;
        if let Some(base) = path.parent() {
            config.data.resolve_against(base);
        }
        Ok(config)
    }

    /// Load `path` when given, otherwise use defaults relative to the
    /// working directory.
    pub fn load_or_default(path: Option<&Path>) -> ConfigResult<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }
}
