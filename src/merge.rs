//! Merging of per-source example maps into the persisted accumulator.
//!
//! Sources are folded in a fixed, documented order (the CLI argument order);
//! after folding, each key is deduplicated by exact text in first-seen order
//! and truncated to a single example. Merging the same source twice is a
//! no-op, so reruns are safe.

use std::fs;
use std::io::Write;
use std::path::Path;

use crate::error::Result;
use crate::extract::ExampleMap;

/// Maximum surviving examples per key after a merge.
pub const MAX_EXAMPLES_PER_KEY: usize = 1;

/// Load a previously written accumulator. An absent file starts a fresh map;
/// an unreadable or corrupt one is reported and also starts fresh, so one bad
/// run never wedges the pipeline.
pub fn load_examples(path: &Path) -> ExampleMap {
    if !path.exists() {
        return ExampleMap::new();
    }
    match fs::read_to_string(path).map_err(|e| e.to_string()).and_then(|contents| {
        serde_json::from_str::<ExampleMap>(&contents).map_err(|e| e.to_string())
    }) {
        Ok(map) => map,
        Err(e) => {
            eprintln!("warning: could not load {}: {}, starting fresh", path.display(), e);
            ExampleMap::new()
        }
    }
}

/// Fold the new per-source maps into the existing accumulator, then dedup and
/// truncate each key's examples.
pub fn merge_and_clean(existing: ExampleMap, sources: Vec<ExampleMap>) -> ExampleMap {
    let mut merged = existing;

    for source in sources {
        for (word, lines) in source {
            merged.entry(word).or_default().extend(lines);
        }
    }

    merged
        .into_iter()
        .map(|(word, lines)| {
            let mut unique: Vec<String> = Vec::new();
            for line in lines {
                if !unique.contains(&line) {
                    unique.push(line);
                }
            }
            unique.truncate(MAX_EXAMPLES_PER_KEY);
            (word, unique)
        })
        .collect()
}

/// Write the accumulator as pretty JSON via a sibling temp file and rename,
/// so a crashed run never truncates the previous accumulator.
pub fn save_examples(map: &ExampleMap, path: &Path) -> Result<()> {
    let tmp_path = path.with_extension("json.tmp");
    {
        let mut file = fs::File::create(&tmp_path)?;
        let json = serde_json::to_string_pretty(map)?;
        file.write_all(json.as_bytes())?;
        file.flush()?;
    }
    fs::rename(&tmp_path, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(entries: &[(&str, &[&str])]) -> ExampleMap {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.iter().map(|s| s.to_string()).collect()))
            .collect()
    }

    #[test]
    fn merge_appends_new_keys() {
        let merged = merge_and_clean(
            map(&[("pes", &["Pes šteká."])]),
            vec![map(&[("mačka", &["Mačka spí."])])],
        );
        assert_eq!(merged["pes"], vec!["Pes šteká."]);
        assert_eq!(merged["mačka"], vec!["Mačka spí."]);
    }

    #[test]
    fn dedup_preserves_first_seen_and_truncates_to_one() {
        let merged = merge_and_clean(
            map(&[("mačka", &["Prvá veta."])]),
            vec![
                map(&[("mačka", &["Druhá veta."])]),
                map(&[("mačka", &["Prvá veta.", "Tretia veta."])]),
            ],
        );
        assert_eq!(merged["mačka"], vec!["Prvá veta."]);
    }

    #[test]
    fn merge_is_idempotent() {
        let source = map(&[("mačka", &["Mačka spí."]), ("pes", &["Pes šteká."])]);
        let once = merge_and_clean(ExampleMap::new(), vec![source.clone()]);
        let twice = merge_and_clean(once.clone(), vec![source]);
        assert_eq!(once, twice);
    }

    #[test]
    fn survivor_depends_on_fixed_source_order() {
        let a = map(&[("mačka", &["Z prvého zdroja."])]);
        let b = map(&[("mačka", &["Z druhého zdroja."])]);
        let merged = merge_and_clean(ExampleMap::new(), vec![a, b]);
        assert_eq!(merged["mačka"], vec!["Z prvého zdroja."]);
    }

    #[test]
    fn load_missing_file_starts_fresh() {
        assert!(load_examples(Path::new("/nonexistent/examples.json")).is_empty());
    }

    #[test]
    fn save_then_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("examples.json");
        let original = map(&[("mačka", &["Mačka spí na posteli."])]);
        save_examples(&original, &path).unwrap();
        assert_eq!(load_examples(&path), original);
    }
}
