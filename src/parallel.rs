//! Parallel extraction across independent dump sources.
//!
//! Each source gets its own thread and its own candidate map; there is no
//! shared mutable state. Handles are joined in CLI argument order, so the
//! merge tie-break order is fixed per run. A failed source contributes
//! nothing: its partial map is discarded and the other sources continue.

use std::path::{Path, PathBuf};
use std::thread::{self, JoinHandle};
use std::time::Instant;

use crate::dump::{open_dump, parse_record, scan_pages};
use crate::error::{IndexerError, Result};
use crate::extract::{accumulate, ExampleMap, ExtractStats};

/// Outcome of extracting one source.
pub struct SourceResult {
    pub path: PathBuf,
    pub outcome: Result<(ExampleMap, ExtractStats)>,
    pub elapsed_secs: f64,
}

/// Extract a single dump source sequentially.
pub fn extract_source(
    path: &Path,
    page_limit: Option<usize>,
    quiet: bool,
) -> Result<(ExampleMap, ExtractStats)> {
    let reader = open_dump(path)?;
    let mut map = ExampleMap::new();
    let mut stats = ExtractStats::default();
    let source_name = path.display().to_string();

    scan_pages(reader, |page_xml| {
        if let Some(record) = parse_record(&page_xml) {
            accumulate(&record, &mut map, &mut stats);
        } else {
            stats.pages_scanned += 1;
        }

        if !quiet && stats.pages_scanned % 1000 == 0 {
            eprintln!(
                "[{}] {} pages scanned, {} with examples",
                source_name, stats.pages_scanned, stats.pages_with_examples
            );
        }

        match page_limit {
            Some(limit) => stats.pages_scanned < limit,
            None => true,
        }
    })
    .map_err(|e| IndexerError::DumpStream {
        source_name: source_name.clone(),
        message: e.to_string(),
    })?;

    Ok((map, stats))
}

/// Run every source in its own thread and join in the given order.
pub fn extract_sources_parallel(
    paths: &[PathBuf],
    page_limit: Option<usize>,
    quiet: bool,
) -> Vec<SourceResult> {
    let handles: Vec<(PathBuf, JoinHandle<(Result<(ExampleMap, ExtractStats)>, f64)>)> = paths
        .iter()
        .map(|path| {
            let path = path.clone();
            let thread_path = path.clone();
            let handle = thread::spawn(move || {
                let start = Instant::now();
                let outcome = extract_source(&thread_path, page_limit, quiet);
                (outcome, start.elapsed().as_secs_f64())
            });
            (path, handle)
        })
        .collect();

    handles
        .into_iter()
        .map(|(path, handle)| match handle.join() {
            Ok((outcome, elapsed_secs)) => SourceResult { path, outcome, elapsed_secs },
            Err(_) => SourceResult {
                path: path.clone(),
                outcome: Err(IndexerError::DumpStream {
                    source_name: path.display().to_string(),
                    message: "extraction thread panicked".to_string(),
                }),
                elapsed_secs: 0.0,
            },
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_dump(dir: &Path, name: &str, pages: &[(&str, &str)]) -> PathBuf {
        let body: String = pages
            .iter()
            .map(|(title, text)| {
                format!(
                    "<page><title>{}</title><text xml:space=\"preserve\">{}</text></page>",
                    title, text
                )
            })
            .collect();
        let path = dir.join(name);
        fs::write(&path, format!("<mediawiki>{}</mediawiki>", body)).unwrap();
        path
    }

    #[test]
    fn sources_extract_independently_and_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let a = write_dump(
            dir.path(),
            "a.xml",
            &[("mačka", "== Príklady ==\n* Naša mačka chytila veľkú myš.\n")],
        );
        let b = write_dump(
            dir.path(),
            "b.xml",
            &[("pes", "== Príklady ==\n* Sused má psa ktorý šteká.\n")],
        );

        let results = extract_sources_parallel(&[a.clone(), b.clone()], None, true);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].path, a);
        assert_eq!(results[1].path, b);

        let (map_a, stats_a) = results[0].outcome.as_ref().unwrap();
        assert_eq!(map_a["mačka"], vec!["Naša mačka chytila veľkú myš."]);
        assert_eq!(stats_a.pages_scanned, 1);

        let (map_b, _) = results[1].outcome.as_ref().unwrap();
        assert!(map_b.contains_key("pes"));
    }

    #[test]
    fn failed_source_does_not_poison_others() {
        let dir = tempfile::tempdir().unwrap();
        let good = write_dump(
            dir.path(),
            "good.xml",
            &[("mačka", "== Príklady ==\n* Naša mačka chytila veľkú myš.\n")],
        );
        let missing = dir.path().join("missing.xml");

        let results = extract_sources_parallel(&[missing, good], None, true);
        assert!(results[0].outcome.is_err());
        let (map, _) = results[1].outcome.as_ref().unwrap();
        assert!(map.contains_key("mačka"));
    }

    #[test]
    fn page_limit_stops_the_scan() {
        let dir = tempfile::tempdir().unwrap();
        let pages: Vec<(String, String)> = (0..5)
            .map(|i| (format!("slovo{}", i), "telo".to_string()))
            .collect();
        let borrowed: Vec<(&str, &str)> =
            pages.iter().map(|(a, b)| (a.as_str(), b.as_str())).collect();
        let path = write_dump(dir.path(), "limited.xml", &borrowed);

        let (_, stats) = extract_source(&path, Some(2), true).unwrap();
        assert_eq!(stats.pages_scanned, 2);
    }
}
