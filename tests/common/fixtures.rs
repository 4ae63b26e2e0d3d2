use charnet::{AliasResolver, CanonicalCharacter, ChapterBatch, RawInteraction};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::path::{Path, PathBuf};

/// A small Middlemarch cast with the aliases the extractor tends to emit
pub fn middlemarch_roster() -> Vec<CanonicalCharacter> {
    vec![
        CanonicalCharacter::new("Dorothea Brooke")
            .with_alias("dorothea")
            .with_alias("Miss Brooke")
            .with_alias("Mrs. Casaubon"),
        CanonicalCharacter::new("Celia Brooke").with_alias("celia"),
        CanonicalCharacter::new("Edward Casaubon")
            .with_alias("Casaubon")
            .with_alias("Mr. Casaubon"),
        CanonicalCharacter::new("Sir James Chettam")
            .with_alias("Sir James")
            .with_alias("Chettam"),
        CanonicalCharacter::new("Will Ladislaw").with_alias("Ladislaw").with_alias("Will"),
    ]
}

pub fn middlemarch_resolver() -> AliasResolver {
    AliasResolver::from_characters(middlemarch_roster()).expect("fixture roster is valid")
}

/// Chapter `index` holding one default-attribute record per pair
pub fn chapter(index: usize, pairs: &[(&str, &str)]) -> ChapterBatch {
    ChapterBatch::new(
        index,
        pairs
            .iter()
            .map(|(a, b)| RawInteraction::between(*a, *b))
            .collect(),
    )
}

/// A copy of `records` in a seeded random order
pub fn shuffled(records: &[RawInteraction], seed: u64) -> Vec<RawInteraction> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut copy = records.to_vec();
    copy.shuffle(&mut rng);
    copy
}

/// Write `characters.json` into `dir`
pub fn write_roster(dir: &Path, roster: &[CanonicalCharacter]) -> PathBuf {
    let path = dir.join("characters.json");
    let json = serde_json::to_string_pretty(roster).expect("roster serializes");
    std::fs::write(&path, json).expect("write roster");
    path
}

/// Write `chapter_<index>.json` into `dir`
pub fn write_chapter(dir: &Path, index: usize, records: &[RawInteraction]) -> PathBuf {
    std::fs::create_dir_all(dir).expect("create results dir");
    let path = dir.join(format!("chapter_{index}.json"));
    let json = serde_json::json!({ "interactions": records });
    std::fs::write(&path, json.to_string()).expect("write chapter");
    path
}
