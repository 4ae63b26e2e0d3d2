//! Character roster and alias resolution
//!
//! The roster is the static list of canonical characters for a book. Every
//! free-text mention produced upstream is mapped back to one of these
//! identities, or reported as unrecognized.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

/// Errors raised while loading the roster.
///
/// All of these are fatal: without a roster no mention can be canonicalized.
#[derive(Debug, Error)]
pub enum RosterError {
    #[error("Roster file not found: {0}")]
    NotFound(PathBuf),

    #[error("IO error reading roster: {0}")]
    Io(#[from] std::io::Error),

    #[error("Roster is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Roster entry {position} has a blank canonical name")]
    BlankCanonicalName { position: usize },
}

/// Result type for roster operations
pub type RosterResult<T> = Result<T, RosterError>;

/// One roster entry: a display name plus the strings that refer to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalCharacter {
    pub canonical_name: String,
    #[serde(default)]
    pub aliases: Vec<String>,
}

impl CanonicalCharacter {
    pub fn new(canonical_name: impl Into<String>) -> Self {
        Self {
            canonical_name: canonical_name.into(),
            aliases: Vec::new(),
        }
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }
}

fn normalize(mention: &str) -> String {
    mention.trim().to_lowercase()
}

/// Lower-cased alias → canonical display name.
#[derive(Debug, Clone, Default)]
pub struct AliasIndex {
    map: HashMap<String, String>,
}

impl AliasIndex {
    /// Build the index from roster entries.
    ///
    /// Alias collisions between two characters are last-write-wins. Canonical
    /// names are inserted after every alias, so a canonical name always maps
    /// to itself.
    pub fn build(characters: &[CanonicalCharacter]) -> Self {
        let mut map: HashMap<String, String> = HashMap::new();

        for character in characters {
            for alias in &character.aliases {
                let key = normalize(alias);
                if key.is_empty() {
                    continue;
                }
                if let Some(previous) = map.insert(key.clone(), character.canonical_name.clone()) {
                    if previous != character.canonical_name {
                        warn!(
                            alias = %key,
                            previous = %previous,
                            winner = %character.canonical_name,
                            "alias claimed by two characters, keeping the later one"
                        );
                    }
                }
            }
        }

        for character in characters {
            let key = normalize(&character.canonical_name);
            if let Some(previous) = map.insert(key.clone(), character.canonical_name.clone()) {
                if previous != character.canonical_name {
                    warn!(
                        alias = %key,
                        previous = %previous,
                        winner = %character.canonical_name,
                        "alias shadowed a canonical name, canonical name wins"
                    );
                }
            }
        }

        Self { map }
    }

    pub fn get(&self, mention: &str) -> Option<&str> {
        self.map.get(&normalize(mention)).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

/// Maps free-text mentions to canonical character names.
#[derive(Debug, Clone)]
pub struct AliasResolver {
    characters: Vec<CanonicalCharacter>,
    index: AliasIndex,
}

impl AliasResolver {
    /// Build a resolver from an in-memory roster.
    pub fn from_characters(characters: Vec<CanonicalCharacter>) -> RosterResult<Self> {
        for (position, character) in characters.iter().enumerate() {
            if character.canonical_name.trim().is_empty() {
                return Err(RosterError::BlankCanonicalName { position });
            }
        }

        let index = AliasIndex::build(&characters);
        if characters.is_empty() {
            warn!("roster is empty, no mention will resolve");
        }
        info!(
            characters = characters.len(),
            aliases = index.len(),
            "character map built"
        );

        Ok(Self { characters, index })
    }

    /// Parse a roster from its JSON text.
    pub fn from_json(json: &str) -> RosterResult<Self> {
        let characters: Vec<CanonicalCharacter> = serde_json::from_str(json)?;
        Self::from_characters(characters)
    }

    /// Load the roster file.
    pub fn load(path: &Path) -> RosterResult<Self> {
        if !path.is_file() {
            return Err(RosterError::NotFound(path.to_path_buf()));
        }
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Resolve a mention to its canonical name. `None` means the character
    /// is not recognized, which is not an error.
    pub fn resolve(&self, mention: &str) -> Option<&str> {
        self.index.get(mention)
    }

    /// Canonical names in roster order
    pub fn canonical_names(&self) -> impl Iterator<Item = &str> {
        self.characters.iter().map(|c| c.canonical_name.as_str())
    }

    pub fn alias_count(&self) -> usize {
        self.index.len()
    }
}
