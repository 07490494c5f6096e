//! Post-extraction cleanup of the accumulated examples map.
//!
//! The extractor is deliberately permissive; this pass applies the strict
//! rules: a narrower Slovak-only key alphabet with a stop-word list, and
//! per-example checks for structural leftovers, minimum length, and at
//! least one Slovak diacritic. Words whose examples all fail are dropped
//! entirely.

use lazy_static::lazy_static;
use regex::Regex;

use crate::extract::ExampleMap;

lazy_static! {
    // Lowercase Slovak letters plus hyphen only; stricter than the
    // extraction-time alphabet, which also admits Czech letters.
    static ref STRICT_KEY: Regex = Regex::new(r"^[a-záäčďéíĺľňóôŕšťúýž\-]+$").unwrap();
}

/// Obviously non-Slovak words that survive the alphabet check.
const STOP_WORDS: &[&str] = &["free", "wiki", "the", "and", "or", "of", "in", "to", "for"];

/// Wiki structure and metadata fragments; an example containing any of
/// these is page furniture, not prose.
const UNWANTED_MARKERS: &[&str] = &[
    "Etymológia",
    "Výslovnosť",
    "IPA",
    "Kategória",
    "Podstatné meno",
    "Slovenčina",
    "Angličtina",
    "Minimumsk",
    "Význam",
    "Príznaky",
    "Zo staro",
    "Z w:",
    "z pragma",
    "ktoré vychádza",
    "Doplňte zdroj",
    "rod ženský",
    "rod mužský",
    "slangový výraz",
    "Slangové výrazy",
    "Upraviť",
    "Príkladsk",
    "<ref",
    "</ref>",
    "Možno hľadáte",
    "Pozri aj",
    "Viď aj",
];

const SLOVAK_DIACRITICS: &str = "áäčďéíĺľňóôŕšťúýž";

/// Minimum cleaned-example length in characters, exclusive.
const MIN_CLEANED_CHARS: usize = 15;

/// Counters for one cleanup pass.
#[derive(Debug, Default)]
pub struct FilterStats {
    pub words_in: usize,
    pub words_kept: usize,
    pub rejected_words: usize,
    pub rejected_examples: usize,
}

/// Strict key check: at least 2 chars, not a known stop word, lowercase
/// Slovak alphabet plus hyphen.
fn is_valid_word(word: &str) -> bool {
    if word.chars().count() < 2 {
        return false;
    }
    let lowered = word.to_lowercase();
    if STOP_WORDS.contains(&lowered.as_str()) {
        return false;
    }
    STRICT_KEY.is_match(&lowered)
}

/// Example check: at least 10 chars trimmed, free of structural markers,
/// more than one word, and at least one Slovak diacritic.
fn is_valid_example(example: &str) -> bool {
    let trimmed = example.trim();
    if trimmed.chars().count() < 10 {
        return false;
    }
    if UNWANTED_MARKERS.iter().any(|marker| example.contains(marker)) {
        return false;
    }
    if !trimmed.contains(' ') {
        return false;
    }
    let lowered = example.to_lowercase();
    SLOVAK_DIACRITICS.chars().any(|c| lowered.contains(c))
}

/// Collapse whitespace runs into single spaces and trim the ends.
fn clean_example(example: &str) -> String {
    example.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Apply the strict pass to a whole map: invalid keys dropped, each
/// surviving key keeps the first example that passes validation, cleanup,
/// and the length floor. Keys left with no valid example are dropped too.
pub fn filter_examples(map: &ExampleMap, stats: &mut FilterStats) -> ExampleMap {
    let mut cleaned = ExampleMap::new();

    for (word, examples) in map {
        stats.words_in += 1;

        if !is_valid_word(word) {
            stats.rejected_words += 1;
            continue;
        }

        let survivor = examples.iter().find_map(|example| {
            if !is_valid_example(example) {
                stats.rejected_examples += 1;
                return None;
            }
            let text = clean_example(example);
            if text.is_empty() || text.chars().count() <= MIN_CLEANED_CHARS {
                stats.rejected_examples += 1;
                return None;
            }
            Some(text)
        });

        match survivor {
            Some(example) => {
                cleaned.insert(word.clone(), vec![example]);
                stats.words_kept += 1;
            }
            None => {
                stats.rejected_words += 1;
            }
        }
    }

    cleaned
}
