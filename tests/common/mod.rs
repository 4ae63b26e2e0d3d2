//! Shared fixtures for charnet integration tests
//!
//! Rosters and chapter batches built in memory, plus writers that lay the
//! same data out on disk the way the CLI expects it.

#![allow(dead_code)]

pub mod fixtures;

pub use fixtures::{
    chapter, middlemarch_resolver, middlemarch_roster, shuffled, write_chapter, write_roster,
};
