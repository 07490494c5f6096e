//! Derived views of a finished build: the sorted JSONL export and the run
//! statistics object. Neither is authoritative; the SQLite store is.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::Result;
use crate::store::IndexRow;

/// Summary statistics for one build.
#[derive(Debug, Serialize)]
pub struct IndexStats {
    pub total_wordforms: usize,
    pub pos_distribution: BTreeMap<String, usize>,
    pub avg_examples_per_wordform: f64,
    pub unique_feats_count: usize,
    pub feats_coverage: Vec<String>,
}

impl IndexStats {
    pub fn from_rows(rows: &[IndexRow]) -> Self {
        let mut pos_distribution: BTreeMap<String, usize> = BTreeMap::new();
        let mut feats_coverage: BTreeSet<String> = BTreeSet::new();
        let mut total_examples = 0usize;

        for row in rows {
            *pos_distribution.entry(row.upos.clone()).or_default() += 1;
            total_examples += row.sentences.len();
            if !row.feats.is_empty() {
                feats_coverage.insert(row.feats.clone());
            }
        }

        let total_wordforms = rows.len();
        IndexStats {
            total_wordforms,
            pos_distribution,
            avg_examples_per_wordform: total_examples as f64 / total_wordforms.max(1) as f64,
            unique_feats_count: feats_coverage.len(),
            feats_coverage: feats_coverage.into_iter().collect(),
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let mut file = File::create(path)?;
        let json = serde_json::to_string_pretty(self)?;
        file.write_all(json.as_bytes())?;
        Ok(())
    }
}

/// Write one JSON record per row; rows arrive already sorted by wordform.
pub fn export_jsonl(rows: &[IndexRow], path: &Path) -> Result<()> {
    let mut writer = BufWriter::with_capacity(256 * 1024, File::create(path)?);
    for row in rows {
        let json = serde_json::to_string(row)?;
        writeln!(writer, "{}", json)?;
    }
    writer.flush()?;
    Ok(())
}

/// End-of-build summary in the usual report block style.
pub fn print_index_report(stats: &IndexStats, tokens_processed: usize, elapsed_secs: f64) {
    println!();
    println!("============================================================");
    println!("Index build complete");
    println!("============================================================");
    println!("Tokens processed: {}", tokens_processed);
    println!("Wordforms indexed: {}", stats.total_wordforms);
    println!("Avg examples/wordform: {:.2}", stats.avg_examples_per_wordform);
    println!("Distinct feature-strings: {}", stats.unique_feats_count);
    println!("------------------------------------------------------------");
    println!("Part-of-speech distribution:");
    let mut by_count: Vec<(&String, &usize)> = stats.pos_distribution.iter().collect();
    by_count.sort_by(|a, b| b.1.cmp(a.1));
    for (pos, count) in by_count.into_iter().take(10) {
        println!("  {}: {}", pos, count);
    }
    println!("------------------------------------------------------------");
    println!("Time: {:.2}s", elapsed_secs);
    println!("============================================================");
}
