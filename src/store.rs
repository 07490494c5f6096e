//! Persistent indexed store: full-rebuild SQLite construction with an atomic
//! swap, plus the exact-match lookup API used by the serving layer.

use lazy_static::lazy_static;
use rand::thread_rng;
use regex::Regex;
use rusqlite::{params, Connection};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::aggregate::Aggregate;
use crate::error::{IndexerError, Result};
use crate::select::select_examples;
use crate::sentences::SentenceStore;

lazy_static! {
    static ref WHITESPACE_RUN: Regex = Regex::new(r"\s+").unwrap();
}

/// Characters that betray a non-Slovak sentence; such examples are dropped
/// at lookup time.
const FOREIGN_DIACRITICS: &str = "ěřůąęół";

/// One fully computed row: shared by the SQLite build, the flat export, and
/// the statistics, so all derived views agree within a run.
#[derive(Debug, Serialize)]
pub struct IndexRow {
    pub wordform: String,
    pub lemma: String,
    pub upos: String,
    pub feats: String,
    pub frequency: u64,
    pub sentences: Vec<String>,
}

/// Placeholder substituted when the selector comes back empty, so every
/// persisted row has at least one non-empty example.
pub fn placeholder_example(wordform: &str) -> String {
    format!("Príklad pre '{}' nie je k dispozícii.", wordform)
}

/// Materialize all index rows from the aggregation result, sorted by
/// wordform. Example selection runs exactly once per wordform here.
pub fn build_rows(aggregate: &Aggregate, store: &SentenceStore) -> Vec<IndexRow> {
    let mut rng = thread_rng();

    let mut rows: Vec<IndexRow> = aggregate
        .wordforms
        .iter()
        .map(|(wordform, record)| {
            let feats = record.feats.most_common().unwrap_or("").to_string();
            let mut sentences = select_examples(&record.sentence_ids, store, &mut rng);
            if sentences.is_empty() {
                eprintln!("warning: no examples for wordform '{}'", wordform);
                sentences = vec![placeholder_example(wordform)];
            }
            IndexRow {
                wordform: wordform.clone(),
                lemma: record.lemma.clone(),
                upos: record.upos.clone(),
                feats,
                frequency: record.frequency,
                sentences,
            }
        })
        .collect();

    rows.sort_by(|a, b| a.wordform.cmp(&b.wordform));
    rows
}

fn temp_db_path(db_path: &Path) -> PathBuf {
    let mut os = db_path.as_os_str().to_os_string();
    os.push(".tmp");
    PathBuf::from(os)
}

/// Build the indexed store from scratch and atomically swap it into place.
///
/// All rows land in one transaction inside a freshly created temp database;
/// the published store is replaced only after indexes, VACUUM, and ANALYZE
/// succeed. On any failure the temp store is removed and the previously
/// published store stays untouched.
pub fn build_database(rows: &[IndexRow], db_path: &Path) -> Result<()> {
    let tmp_path = temp_db_path(db_path);
    if tmp_path.exists() {
        fs::remove_file(&tmp_path)?;
    }

    let result = build_into(rows, &tmp_path);
    if let Err(e) = result {
        let _ = fs::remove_file(&tmp_path);
        return Err(e);
    }

    fs::rename(&tmp_path, db_path)?;
    Ok(())
}

fn build_into(rows: &[IndexRow], tmp_path: &Path) -> Result<()> {
    let mut conn = Connection::open(tmp_path)?;
    conn.execute_batch("PRAGMA encoding = 'UTF-8';")?;
    // journal_mode reports the new mode back, so it has to go through a query
    let _mode: String = conn.query_row("PRAGMA journal_mode = WAL", [], |row| row.get(0))?;

    conn.execute(
        "CREATE TABLE wordforms (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            wordform TEXT NOT NULL,
            lemma TEXT NOT NULL,
            upos TEXT NOT NULL,
            feats TEXT,
            frequency INTEGER DEFAULT 1,
            sentences TEXT NOT NULL
        )",
        [],
    )?;

    let tx = conn.transaction()?;
    {
        let mut stmt = tx.prepare(
            "INSERT INTO wordforms (wordform, lemma, upos, feats, frequency, sentences)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )?;
        for row in rows {
            let sentences_json = serde_json::to_string(&row.sentences)?;
            stmt.execute(params![
                row.wordform,
                row.lemma,
                row.upos,
                row.feats,
                row.frequency as i64,
                sentences_json,
            ])?;
        }
    }
    tx.commit()?;

    conn.execute_batch(
        "CREATE INDEX idx_wordform ON wordforms(wordform);
         CREATE INDEX idx_lemma ON wordforms(lemma);
         CREATE INDEX idx_upos ON wordforms(upos);
         CREATE INDEX idx_frequency ON wordforms(frequency DESC);",
    )?;

    // Once per build, not per row.
    conn.execute_batch("VACUUM; ANALYZE;")?;
    Ok(())
}

/// Serving-side read API: exact wordform-or-lemma match, case-insensitive.
///
/// Returns up to `limit` whitespace-normalized example sentences; sentences
/// carrying non-Slovak diacritics are dropped. Zero results are normal.
pub fn lookup(db_path: &Path, word: &str, limit: usize) -> Result<Vec<String>> {
    if limit == 0 {
        return Ok(Vec::new());
    }
    if !db_path.exists() {
        return Err(IndexerError::MissingInput(db_path.to_path_buf()));
    }

    let conn = Connection::open(db_path)?;
    let mut stmt = conn.prepare(
        "SELECT sentences FROM wordforms
         WHERE wordform = ?1 COLLATE NOCASE OR lemma = ?1 COLLATE NOCASE
         LIMIT 1",
    )?;

    let serialized: Option<String> = stmt
        .query_row(params![word], |row| row.get(0))
        .map(Some)
        .or_else(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => Ok(None),
            other => Err(other),
        })?;

    let Some(serialized) = serialized else {
        return Ok(Vec::new());
    };

    let sentences: Vec<String> = serde_json::from_str(&serialized)?;
    let mut out = Vec::new();
    for s in sentences {
        let normalized = WHITESPACE_RUN.replace_all(s.trim(), " ").to_string();
        if normalized.is_empty() {
            continue;
        }
        let lowered = normalized.to_lowercase();
        if FOREIGN_DIACRITICS.chars().any(|c| lowered.contains(c)) {
            continue;
        }
        out.push(normalized);
        if out.len() >= limit {
            break;
        }
    }
    Ok(out)
}
