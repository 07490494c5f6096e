//! Candidate extraction: turns one dump record into at most one
//! (wordform key, example sentence) pair.
//!
//! The title must look like a single Slovak lexical entry; the body is mined
//! for labeled example sections first, then for plain prose sentences as a
//! fallback.

use lazy_static::lazy_static;
use regex::Regex;
use std::collections::BTreeMap;
use unicode_normalization::UnicodeNormalization;

use crate::dump::SourceRecord;

/// Accumulated per-source mapping of key -> example sentences. BTreeMap keeps
/// the serialized accumulator stable across runs.
pub type ExampleMap = BTreeMap<String, Vec<String>>;

lazy_static! {
    // Letters of the Latin script plus Slovak/Czech diacritics, 2-30 chars.
    static ref KEY_ALPHABET: Regex =
        Regex::new(r"^[A-Za-zÀ-žÁáÄäČčĎďÉéÍíĹĺĽľŇňÓóÔôŔŕŘřŠšŤťÚúÝýŽž]{2,30}$").unwrap();

    // Example/usage section headers at levels 2-4, body captured lazily up to
    // the next header or end of text.
    static ref EXAMPLE_SECTIONS: Vec<Regex> = vec![
        Regex::new(r"(?si)={2,4}\s*Príklady\s*={2,4}(.+?)(?:={2,4}|$)").unwrap(),
        Regex::new(r"(?si)={2,4}\s*Príklad\s*={2,4}(.+?)(?:={2,4}|$)").unwrap(),
        Regex::new(r"(?si)={2,4}\s*Použitie\s*={2,4}(.+?)(?:={2,4}|$)").unwrap(),
    ];

    // Bold/italic quotes and link/template brackets inside bullet lines.
    static ref MARKUP_DECOR: Regex = Regex::new(r"('{2,}|[\[\]{}])").unwrap();

    // Terminal punctuation followed by whitespace ends a prose sentence.
    static ref SENTENCE_SPLIT: Regex = Regex::new(r"[.!?]\s+").unwrap();

    // Leftover wiki decoration stripped from fallback sentences.
    static ref SENTENCE_NOISE: Regex = Regex::new(r"['\[\]{}|=*#]").unwrap();
}

/// Per-source extraction counters, reported at the end of a run.
#[derive(Debug, Default, Clone)]
pub struct ExtractStats {
    pub pages_scanned: usize,
    pub pages_with_examples: usize,
    pub rejected_titles: usize,
}

/// Validate and normalize a page title into a wordform key.
///
/// Rejects namespaced, multi-word, and digit-bearing titles, then requires
/// the fixed alphabet with length bounds. Accepted keys are lowercased, so
/// every key lives in exactly one namespace.
pub fn normalize_key(title: &str) -> Option<String> {
    let key: String = title.trim().nfc().collect();

    if key.contains(':') || key.contains(char::is_whitespace) || key.contains(|c: char| c.is_ascii_digit()) {
        return None;
    }
    if !KEY_ALPHABET.is_match(&key) {
        return None;
    }
    Some(key.to_lowercase())
}

/// Bullet/numbered lines from labeled example sections: stripped of list
/// markers and markup, longer than 10 chars, at least 3 words.
fn section_example_lines(body: &str) -> Vec<String> {
    let mut lines = Vec::new();

    for pattern in EXAMPLE_SECTIONS.iter() {
        for m in pattern.captures_iter(body) {
            for line in m[1].lines() {
                let trimmed = line.trim();
                if !(trimmed.starts_with('*') || trimmed.starts_with('#'))
                    || trimmed.chars().count() <= 10
                {
                    continue;
                }
                let stripped = trimmed.trim_matches(|c| c == '*' || c == '#' || c == ' ');
                let cleaned = MARKUP_DECOR.replace_all(stripped, "").trim().to_string();
                if !cleaned.is_empty() && cleaned.split_whitespace().count() >= 3 {
                    lines.push(cleaned);
                }
            }
        }
    }

    lines
}

/// Fallback: bare prose sentences of 5-25 words anywhere in the body.
fn fallback_sentences(body: &str) -> Vec<String> {
    SENTENCE_SPLIT
        .split(body)
        .filter_map(|s| {
            let cleaned = SENTENCE_NOISE.replace_all(s, "").trim().to_string();
            let word_count = cleaned.split_whitespace().count();
            let is_prose = (5..=25).contains(&word_count)
                && !["http", "www", "File:", "Category:"]
                    .iter()
                    .any(|prefix| cleaned.starts_with(prefix));
            is_prose.then_some(cleaned)
        })
        .collect()
}

/// Extract the single best candidate from one record: labeled section lines
/// win over fallback sentences, duplicates removed in first-seen order.
pub fn extract_candidate(record: &SourceRecord) -> Option<(String, String)> {
    let key = normalize_key(&record.title)?;

    let mut lines = section_example_lines(&record.body);
    lines.extend(fallback_sentences(&record.body));

    let mut seen = Vec::new();
    for line in lines {
        if !seen.contains(&line) {
            seen.push(line);
        }
    }

    seen.into_iter().next().map(|example| (key, example))
}

/// Fold one record's candidate into a per-source map, updating counters.
pub fn accumulate(record: &SourceRecord, map: &mut ExampleMap, stats: &mut ExtractStats) {
    stats.pages_scanned += 1;

    if normalize_key(&record.title).is_none() {
        stats.rejected_titles += 1;
        return;
    }

    if let Some((key, example)) = extract_candidate(record) {
        map.entry(key).or_default().push(example);
        stats.pages_with_examples += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(title: &str, body: &str) -> SourceRecord {
        SourceRecord {
            title: title.to_string(),
            body: body.to_string(),
        }
    }

    // ─────────────────────────────────────────────────────────────
    // Key filter
    // ─────────────────────────────────────────────────────────────

    #[test]
    fn diacritic_key_accepted() {
        assert_eq!(normalize_key("mačka"), Some("mačka".to_string()));
    }

    #[test]
    fn key_with_digit_rejected() {
        assert_eq!(normalize_key("dom2"), None);
    }

    #[test]
    fn key_with_whitespace_rejected() {
        assert_eq!(normalize_key("New York"), None);
    }

    #[test]
    fn namespaced_key_rejected() {
        assert_eq!(normalize_key("Kategória:Zvieratá"), None);
    }

    #[test]
    fn uppercase_key_accepted_and_lowercased() {
        assert_eq!(normalize_key("API"), Some("api".to_string()));
    }

    #[test]
    fn length_bounds_enforced() {
        assert_eq!(normalize_key("a"), None);
        let long: String = std::iter::repeat('a').take(31).collect();
        assert_eq!(normalize_key(&long), None);
        assert_eq!(normalize_key("ab"), Some("ab".to_string()));
    }

    #[test]
    fn decomposed_diacritics_are_normalized_before_matching() {
        // "mačka" with U+030C combining caron instead of precomposed č
        let decomposed = "mac\u{030C}ka";
        assert_eq!(normalize_key(decomposed), Some("mačka".to_string()));
    }

    // ─────────────────────────────────────────────────────────────
    // Body extraction
    // ─────────────────────────────────────────────────────────────

    #[test]
    fn priklady_bullet_line_extracted() {
        let body = "== Príklady ==\n* '''Mačka''' spí na posteli.\n== Iné ==\n";
        let got = extract_candidate(&record("Mačka", body)).unwrap();
        assert_eq!(got, ("mačka".to_string(), "Mačka spí na posteli.".to_string()));
    }

    #[test]
    fn short_bullet_lines_dropped() {
        let body = "== Príklady ==\n* krátke\n* '''Mačka''' spí na posteli vedľa okna.\n";
        let got = extract_candidate(&record("mačka", body)).unwrap();
        assert_eq!(got.1, "Mačka spí na posteli vedľa okna.");
    }

    #[test]
    fn bullet_length_counts_characters_not_bytes() {
        // 10 chars but 16 bytes of diacritics, still too short
        let body = "== Príklady ==\n* áá čč ďď\n";
        assert!(extract_candidate(&record("mačka", body)).is_none());
    }

    #[test]
    fn pouzitie_section_also_matches() {
        let body = "=== Použitie ===\n# Pes šteká na mačku celý deň.\n";
        let got = extract_candidate(&record("pes", body)).unwrap();
        assert_eq!(got.1, "Pes šteká na mačku celý deň.");
    }

    #[test]
    fn fallback_prose_sentence_used_without_sections() {
        let body = "Toto je obyčajná veta o mačke ktorá spí. Krátka veta.";
        let got = extract_candidate(&record("mačka", body)).unwrap();
        assert_eq!(got.1, "Toto je obyčajná veta o mačke ktorá spí");
    }

    #[test]
    fn url_sentences_excluded_from_fallback() {
        let body = "http example example example example example. Táto veta má presne päť slov.";
        let got = extract_candidate(&record("slovo", body)).unwrap();
        assert!(got.1.starts_with("Táto"));
    }

    #[test]
    fn section_line_beats_fallback_prose() {
        let body = "Mačka je domáce zviera chované ľuďmi doma.\n\
                    == Príklady ==\n* Naša '''mačka''' chytila myš.\n";
        let got = extract_candidate(&record("mačka", body)).unwrap();
        assert_eq!(got.1, "Naša mačka chytila myš.");
    }

    #[test]
    fn no_candidates_yields_none() {
        assert!(extract_candidate(&record("mačka", "krátke.")).is_none());
    }

    #[test]
    fn accumulate_counts_rejections() {
        let mut map = ExampleMap::new();
        let mut stats = ExtractStats::default();
        accumulate(&record("dom2", "whatever"), &mut map, &mut stats);
        accumulate(
            &record("mačka", "== Príklady ==\n* Naša mačka chytila veľkú myš.\n"),
            &mut map,
            &mut stats,
        );
        assert_eq!(stats.pages_scanned, 2);
        assert_eq!(stats.rejected_titles, 1);
        assert_eq!(stats.pages_with_examples, 1);
        assert_eq!(map["mačka"], vec!["Naša mačka chytila veľkú myš."]);
    }
}
