//! Streaming record parser for compressed MediaWiki XML dumps.
//!
//! Scans `<page>…</page>` blocks out of a chunked read buffer so memory stays
//! bounded by one record regardless of dump size. Only `<title>` and `<text>`
//! content matters; every other structural element is ignored.

use bzip2::read::BzDecoder;
use lazy_static::lazy_static;
use regex::Regex;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::{IndexerError, Result};

lazy_static! {
    static ref TITLE_PATTERN: Regex = Regex::new(r"<title>([^<]+)</title>").unwrap();
    static ref TEXT_PATTERN: Regex = Regex::new(r"(?s)<text[^>]*>(.+?)</text>").unwrap();
}

/// One logical unit of a dump: an article title plus its raw wikitext body.
/// Transient; discarded right after candidate extraction.
#[derive(Debug)]
pub struct SourceRecord {
    pub title: String,
    pub body: String,
}

/// Open a dump file for streaming, decompressing on the fly when the path
/// ends in `.bz2`.
pub fn open_dump(path: &Path) -> Result<Box<dyn BufRead>> {
    if !path.exists() {
        return Err(IndexerError::MissingInput(path.to_path_buf()));
    }
    let file = File::open(path)?;
    let reader: Box<dyn BufRead> = if path.to_string_lossy().ends_with(".bz2") {
        Box::new(BufReader::with_capacity(256 * 1024, BzDecoder::new(file)))
    } else {
        Box::new(BufReader::with_capacity(256 * 1024, file))
    };
    Ok(reader)
}

/// Extract the (title, body) pair from one page block. Pages without a title
/// or text element produce nothing.
pub fn parse_record(page_xml: &str) -> Option<SourceRecord> {
    let title = TITLE_PATTERN.captures(page_xml).map(|cap| cap[1].to_string())?;
    let body = TEXT_PATTERN.captures(page_xml).map(|cap| cap[1].to_string())?;
    Some(SourceRecord { title, body })
}

/// Scan complete `<page>` blocks out of the reader, invoking the callback for
/// each one. The callback returns `false` to stop the scan early.
///
/// An unterminated trailing page is dropped, not retried. A read or
/// decompression failure aborts the scan with an error; records already
/// handed to the callback stand.
pub fn scan_pages(
    mut reader: impl BufRead,
    mut callback: impl FnMut(String) -> bool,
) -> Result<()> {
    let mut buffer = String::new();
    let mut chunk = vec![0u8; 1024 * 1024]; // 1MB chunks

    loop {
        let bytes_read = reader.read(&mut chunk)?;
        if bytes_read == 0 {
            break;
        }

        buffer.push_str(&String::from_utf8_lossy(&chunk[..bytes_read]));

        // Extract complete pages
        while let Some(start) = buffer.find("<page>") {
            if let Some(end_offset) = buffer[start..].find("</page>") {
                let end = start + end_offset + "</page>".len();
                let page_xml = buffer[start..end].to_string();
                buffer.drain(..end);

                if !callback(page_xml) {
                    return Ok(());
                }
            } else {
                buffer.drain(..start);
                break;
            }
        }

        // Nothing page-like pending: keep only a small tail so a tag split
        // across chunk boundaries still reassembles.
        if buffer.len() > 10 && !buffer.contains("<page>") {
            let mut cut = buffer.len() - 10;
            while !buffer.is_char_boundary(cut) {
                cut -= 1;
            }
            buffer.drain(..cut);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Read};

    fn page(title: &str, body: &str) -> String {
        format!(
            "<page><title>{}</title><ns>0</ns><text xml:space=\"preserve\">{}</text></page>",
            title, body
        )
    }

    #[test]
    fn scans_all_complete_pages() {
        let xml = format!("<mediawiki>{}{}</mediawiki>", page("mačka", "telo"), page("pes", "telo"));
        let mut titles = Vec::new();
        scan_pages(Cursor::new(xml), |p| {
            titles.push(parse_record(&p).unwrap().title);
            true
        })
        .unwrap();
        assert_eq!(titles, vec!["mačka", "pes"]);
    }

    #[test]
    fn drops_unterminated_trailing_page() {
        let xml = format!("{}<page><title>torzo</title><text>neukon", page("celá", "telo"));
        let mut count = 0;
        scan_pages(Cursor::new(xml), |_| {
            count += 1;
            true
        })
        .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn callback_false_stops_early() {
        let xml = format!("{}{}{}", page("a", "x"), page("b", "x"), page("c", "x"));
        let mut count = 0;
        scan_pages(Cursor::new(xml), |_| {
            count += 1;
            count < 2
        })
        .unwrap();
        assert_eq!(count, 2);
    }

    #[test]
    fn page_split_across_chunks_is_reassembled() {
        // Cursor reads everything at once, so emulate a tiny reader instead.
        struct Dribble(Vec<u8>, usize);
        impl Read for Dribble {
            fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
                if self.1 >= self.0.len() {
                    return Ok(0);
                }
                let n = buf.len().min(7).min(self.0.len() - self.1);
                buf[..n].copy_from_slice(&self.0[self.1..self.1 + n]);
                self.1 += n;
                Ok(n)
            }
        }
        let xml = page("slovo", "obsah stránky");
        let reader = BufReader::new(Dribble(xml.into_bytes(), 0));
        let mut seen = Vec::new();
        scan_pages(reader, |p| {
            seen.push(parse_record(&p).unwrap().title);
            true
        })
        .unwrap();
        assert_eq!(seen, vec!["slovo"]);
    }

    #[test]
    fn record_without_text_is_skipped() {
        assert!(parse_record("<page><title>holý</title></page>").is_none());
    }

    #[test]
    fn missing_dump_is_an_error() {
        let err = open_dump(Path::new("/nonexistent/dump.xml.bz2")).err().unwrap();
        assert!(matches!(err, IndexerError::MissingInput(_)));
    }
}
