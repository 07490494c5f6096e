//! Sentence lookup table: sentence id -> full text, loaded once per run
//! before aggregation begins and read-only afterwards.

use serde::Deserialize;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::{IndexerError, Result};

/// One line of the sentence stream. Corpus files carry extra fields
/// (`source`, `tokens`); only the id and text matter here.
#[derive(Debug, Deserialize)]
struct SentenceRecord {
    sentence_id: String,
    text: String,
}

/// In-memory id -> text table.
#[derive(Debug, Default)]
pub struct SentenceStore {
    sentences: HashMap<String, String>,
    pub malformed_lines: usize,
}

impl SentenceStore {
    /// Load the full sentence stream. The file is required; malformed lines
    /// are skipped with a warning and counted, never fatal.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(IndexerError::MissingInput(path.to_path_buf()));
        }

        let reader = BufReader::new(File::open(path)?);
        let mut store = SentenceStore::default();

        for (line_num, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<SentenceRecord>(&line) {
                Ok(record) => {
                    store.sentences.insert(record.sentence_id, record.text);
                }
                Err(e) => {
                    eprintln!("warning: bad sentence record on line {}: {}", line_num + 1, e);
                    store.malformed_lines += 1;
                }
            }
        }

        Ok(store)
    }

    pub fn get(&self, sentence_id: &str) -> Option<&str> {
        self.sentences.get(sentence_id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.sentences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sentences.is_empty()
    }

    #[cfg(test)]
    pub fn from_pairs(pairs: &[(&str, &str)]) -> Self {
        SentenceStore {
            sentences: pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect(),
            malformed_lines: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn loads_records_and_skips_malformed_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sentences.jsonl");
        let mut f = File::create(&path).unwrap();
        writeln!(f, r#"{{"sentence_id": "s1", "text": "Mačka spí.", "source": "a.txt"}}"#).unwrap();
        writeln!(f, "not json at all").unwrap();
        writeln!(f).unwrap();
        writeln!(f, r#"{{"sentence_id": "s2", "text": "Pes šteká."}}"#).unwrap();
        drop(f);

        let store = SentenceStore::load(&path).unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(store.get("s1"), Some("Mačka spí."));
        assert_eq!(store.get("s2"), Some("Pes šteká."));
        assert_eq!(store.get("s3"), None);
        assert_eq!(store.malformed_lines, 1);
    }

    #[test]
    fn missing_file_aborts() {
        let err = SentenceStore::load(Path::new("/nonexistent/sentences.jsonl")).unwrap_err();
        assert!(matches!(err, IndexerError::MissingInput(_)));
    }
}
