//! Morphology aggregation: groups the tagger's per-token records by surface
//! form and maintains bounded per-wordform state.

use indicatif::{ProgressBar, ProgressStyle};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::{IndexerError, Result};

/// One tagger output record, consumed once. `feats` may be empty.
#[derive(Debug, Deserialize)]
pub struct MorphToken {
    pub sentence_id: String,
    #[allow(dead_code)]
    pub token_position: usize,
    pub form: String,
    pub lemma: String,
    pub upos: String,
    #[serde(default)]
    pub feats: String,
}

/// Feature-string frequency counter that remembers insertion order, so ties
/// among equally frequent features resolve to the first one seen.
#[derive(Debug, Default)]
pub struct FeatCounter {
    counts: Vec<(String, u64)>,
}

impl FeatCounter {
    pub fn bump(&mut self, feats: &str) {
        match self.counts.iter_mut().find(|(f, _)| f == feats) {
            Some((_, n)) => *n += 1,
            None => self.counts.push((feats.to_string(), 1)),
        }
    }

    /// The feature-string with the maximum count; first-inserted wins ties.
    pub fn most_common(&self) -> Option<&str> {
        let mut best: Option<(&str, u64)> = None;
        for (feats, n) in &self.counts {
            match best {
                Some((_, m)) if *n <= m => {}
                _ => best = Some((feats, *n)),
            }
        }
        best.map(|(feats, _)| feats)
    }
}

/// Maximum distinct sentence ids retained per wordform. Later sentences for
/// high-frequency words are dropped (frequency still counts them) to bound
/// memory.
pub const SENTENCE_ID_CAP: usize = 10;

/// Aggregate state for one surface form. Lemma and upos come from the first
/// token with this form and never change; creation fixes them, so the
/// invariant holds by construction.
#[derive(Debug)]
pub struct WordformRecord {
    pub lemma: String,
    pub upos: String,
    pub feats: FeatCounter,
    pub frequency: u64,
    pub sentence_ids: Vec<String>,
}

impl WordformRecord {
    fn new(token: &MorphToken) -> Self {
        WordformRecord {
            lemma: token.lemma.clone(),
            upos: token.upos.clone(),
            feats: FeatCounter::default(),
            frequency: 0,
            sentence_ids: Vec::new(),
        }
    }

    fn observe(&mut self, token: &MorphToken) {
        self.feats.bump(&token.feats);
        self.frequency += 1;
        if self.sentence_ids.len() < SENTENCE_ID_CAP
            && !self.sentence_ids.contains(&token.sentence_id)
        {
            self.sentence_ids.push(token.sentence_id.clone());
        }
    }
}

/// Result of the aggregation pass: exclusively owned here, read-only once
/// handed to the index builder.
#[derive(Debug, Default)]
pub struct Aggregate {
    pub wordforms: HashMap<String, WordformRecord>,
    pub tokens_processed: usize,
    pub malformed_lines: usize,
}

impl Aggregate {
    /// Feed one token into the aggregate. Empty surface forms are skipped.
    pub fn observe(&mut self, token: MorphToken) {
        if token.form.trim().is_empty() {
            return;
        }
        self.wordforms
            .entry(token.form.clone())
            .or_insert_with(|| WordformRecord::new(&token))
            .observe(&token);
        self.tokens_processed += 1;
    }
}

/// Stream the morphology token file into an aggregate. Malformed lines warn
/// and count; a missing file aborts.
pub fn aggregate_morphology(path: &Path, quiet: bool) -> Result<Aggregate> {
    if !path.exists() {
        return Err(IndexerError::MissingInput(path.to_path_buf()));
    }

    let pb = if quiet {
        ProgressBar::hidden()
    } else {
        let pb = ProgressBar::new_spinner();
        pb.set_style(ProgressStyle::default_spinner().template("{spinner} {msg}").unwrap());
        pb
    };

    let reader = BufReader::new(File::open(path)?);
    let mut aggregate = Aggregate::default();

    for (line_num, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<MorphToken>(&line) {
            Ok(token) => aggregate.observe(token),
            Err(e) => {
                eprintln!("warning: bad morphology record on line {}: {}", line_num + 1, e);
                aggregate.malformed_lines += 1;
                continue;
            }
        }

        if !quiet && aggregate.tokens_processed % 5000 == 0 {
            pb.set_message(format!(
                "Tokens: {} | Wordforms: {}",
                aggregate.tokens_processed,
                aggregate.wordforms.len()
            ));
        }
    }

    pb.finish_and_clear();
    Ok(aggregate)
}
