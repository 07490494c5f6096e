//! Diversity-oriented selection of example sentences for one wordform.
//!
//! Deterministic picks (first, last, middle of the reservoir pool) followed
//! by a random fill. The fill is intentionally non-reproducible across runs;
//! it is a best-effort diversity sample, not a ranking.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::sentences::SentenceStore;

/// Maximum examples persisted per wordform.
pub const MAX_EXAMPLES: usize = 5;

/// Resolve the reservoir against the sentence store and pick up to
/// `MAX_EXAMPLES` diverse texts.
///
/// Unresolvable ids are dropped. Sentences shorter than 10 chars, structural
/// lines (`=`), and anything containing "http" are filtered out; when the
/// filter leaves nothing, the first resolvable sentence is used anyway so
/// the wordform still gets an example.
pub fn select_examples<R: Rng>(
    sentence_ids: &[String],
    store: &SentenceStore,
    rng: &mut R,
) -> Vec<String> {
    let mut available: Vec<String> = sentence_ids
        .iter()
        .filter_map(|sid| store.get(sid))
        .map(|text| text.trim().to_string())
        .filter(|text| {
            text.chars().count() > 10 && !text.starts_with('=') && !text.contains("http")
        })
        .collect();

    if available.is_empty() {
        if let Some(text) = sentence_ids.iter().find_map(|sid| store.get(sid)) {
            available.push(text.trim().to_string());
        }
    }

    if available.len() <= MAX_EXAMPLES {
        return available;
    }

    // First, last, middle, then random picks from what is left.
    let mut selected = vec![available[0].clone(), available[available.len() - 1].clone()];
    if available.len() > 2 {
        selected.push(available[available.len() / 2].clone());
    }

    let mut remaining: Vec<String> =
        available.iter().filter(|s| !selected.contains(*s)).cloned().collect();
    remaining.shuffle(rng);

    while selected.len() < MAX_EXAMPLES {
        match remaining.pop() {
            Some(s) => selected.push(s),
            None => break,
        }
    }

    selected.truncate(MAX_EXAMPLES);
    selected
}
