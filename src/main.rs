//! Slovak corpus wordform indexer.
//!
//! Two independent pipelines behind one CLI: `extract` streams compressed
//! wiki dumps into a merged word -> example-sentence map, and `index` turns
//! a tagged morphology stream plus a sentence table into a queryable SQLite
//! wordform store. `lookup` is the serving-side read API over the finished
//! store.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Instant;

mod aggregate;
mod dump;
mod error;
mod extract;
mod filter;
mod merge;
mod parallel;
mod report;
mod select;
mod sentences;
mod store;

use error::Result;

#[derive(Parser)]
#[command(name = "wordform-index-rust")]
#[command(about = "Builds a queryable Slovak wordform index from corpus dumps and tagged token streams")]
struct Cli {
    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Extract word -> example-sentence candidates from wiki dumps and merge
    /// them into the accumulator map
    Extract {
        /// Input dump files (.xml or .xml.bz2), processed in parallel;
        /// argument order fixes the merge order
        #[arg(required = true)]
        dumps: Vec<PathBuf>,

        /// Merged examples map (read if present, rewritten on success)
        #[arg(short, long, default_value = "examples.json")]
        output: PathBuf,

        /// Limit pages scanned per source (for testing)
        #[arg(long)]
        page_limit: Option<usize>,
    },

    /// Apply the strict cleanup pass to a previously extracted examples map
    Filter {
        /// Extracted examples map
        #[arg(long, default_value = "examples.json")]
        input: PathBuf,

        /// Cleaned map written on success
        #[arg(long, default_value = "examples.cleaned.json")]
        output: PathBuf,
    },

    /// Aggregate a tagged morphology stream and rebuild the SQLite index
    Index {
        /// Sentence table, JSONL: {sentence_id, text, ...}
        #[arg(long, default_value = "sentences.jsonl")]
        sentences: PathBuf,

        /// Morphology token stream, JSONL: {sentence_id, token_position,
        /// form, lemma, upos, feats}
        #[arg(long, default_value = "morphology_data.jsonl")]
        morphology: PathBuf,

        /// Published SQLite store (replaced atomically on success)
        #[arg(long, default_value = "index.sqlite")]
        db: PathBuf,

        /// Sorted flat JSONL export
        #[arg(long, default_value = "index_export.jsonl")]
        export: PathBuf,

        /// Run statistics JSON
        #[arg(long, default_value = "index_stats.json")]
        stats: PathBuf,
    },

    /// Look up example sentences for one wordform or lemma
    Lookup {
        /// Finished SQLite store
        #[arg(long, default_value = "index.sqlite")]
        db: PathBuf,

        /// Wordform or lemma (case-insensitive exact match)
        word: String,

        /// Maximum examples to return
        #[arg(short, long, default_value_t = 3)]
        limit: usize,
    },
}

fn run_extract(
    dumps: &[PathBuf],
    output: &PathBuf,
    page_limit: Option<usize>,
    quiet: bool,
) -> Result<()> {
    if !quiet {
        println!("Extracting {} source(s), merging into {}", dumps.len(), output.display());
    }

    let results = parallel::extract_sources_parallel(dumps, page_limit, quiet);

    let mut source_maps = Vec::new();
    let mut failed = 0usize;
    let mut pages_scanned = 0usize;
    let mut pages_with_examples = 0usize;

    for result in results {
        match result.outcome {
            Ok((map, stats)) => {
                if !quiet {
                    println!(
                        "  {}: {} pages, {} with examples, {} titles rejected ({:.1}s)",
                        result.path.display(),
                        stats.pages_scanned,
                        stats.pages_with_examples,
                        stats.rejected_titles,
                        result.elapsed_secs
                    );
                }
                pages_scanned += stats.pages_scanned;
                pages_with_examples += stats.pages_with_examples;
                source_maps.push(map);
            }
            Err(e) => {
                eprintln!("warning: source {} failed and is skipped: {}", result.path.display(), e);
                failed += 1;
            }
        }
    }

    let existing = merge::load_examples(output);
    let existing_count = existing.len();
    let merged = merge::merge_and_clean(existing, source_maps);
    merge::save_examples(&merged, output)?;

    if !quiet {
        println!();
        println!("============================================================");
        println!("Extraction complete");
        println!("Pages scanned: {}", pages_scanned);
        println!("Pages with examples: {}", pages_with_examples);
        println!("Sources failed: {}", failed);
        println!("Words in map: {} (was {})", merged.len(), existing_count);
        println!("============================================================");
    }

    Ok(())
}

fn run_filter(input: &PathBuf, output: &PathBuf, quiet: bool) -> Result<()> {
    if !input.exists() {
        return Err(error::IndexerError::MissingInput(input.clone()));
    }
    // Unlike the accumulator load, a corrupt input is fatal here: filtering
    // garbage would silently publish an empty map.
    let map: extract::ExampleMap = serde_json::from_str(&std::fs::read_to_string(input)?)?;

    let mut stats = filter::FilterStats::default();
    let cleaned = filter::filter_examples(&map, &mut stats);
    merge::save_examples(&cleaned, output)?;

    if !quiet {
        println!();
        println!("============================================================");
        println!("Cleanup complete");
        println!("Words in: {}", stats.words_in);
        println!("Words kept: {}", stats.words_kept);
        println!("Words rejected: {}", stats.rejected_words);
        println!("Examples rejected: {}", stats.rejected_examples);
        println!("Cleaned map: {}", output.display());
        println!("============================================================");
    }

    Ok(())
}

fn run_index(
    sentences: &PathBuf,
    morphology: &PathBuf,
    db: &PathBuf,
    export: &PathBuf,
    stats_path: &PathBuf,
    quiet: bool,
) -> Result<()> {
    let start = Instant::now();

    if !quiet {
        println!("Loading sentences from {}", sentences.display());
    }
    let sentence_store = sentences::SentenceStore::load(sentences)?;
    if sentence_store.is_empty() {
        eprintln!(
            "warning: sentence table {} is empty, every wordform will get a placeholder example",
            sentences.display()
        );
    }
    if !quiet {
        println!(
            "Loaded {} sentences ({} malformed lines skipped)",
            sentence_store.len(),
            sentence_store.malformed_lines
        );
        println!("Aggregating morphology from {}", morphology.display());
    }

    let aggregate = aggregate::aggregate_morphology(morphology, quiet)?;
    if !quiet {
        println!(
            "Processed {} tokens into {} wordforms ({} malformed lines skipped)",
            aggregate.tokens_processed,
            aggregate.wordforms.len(),
            aggregate.malformed_lines
        );
    }

    let rows = store::build_rows(&aggregate, &sentence_store);

    store::build_database(&rows, db)?;
    report::export_jsonl(&rows, export)?;

    let stats = report::IndexStats::from_rows(&rows);
    stats.save(stats_path)?;

    if !quiet {
        report::print_index_report(&stats, aggregate.tokens_processed, start.elapsed().as_secs_f64());
        println!("Store: {}", db.display());
        println!("Export: {}", export.display());
        println!("Statistics: {}", stats_path.display());
    }

    Ok(())
}

fn run_lookup(db: &PathBuf, word: &str, limit: usize, quiet: bool) -> Result<()> {
    let examples = store::lookup(db, word, limit)?;
    if examples.is_empty() {
        if !quiet {
            println!("No examples for '{}'", word);
        }
    } else {
        for example in examples {
            println!("{}", example);
        }
    }
    Ok(())
}

fn run(cli: &Cli) -> Result<()> {
    match &cli.command {
        Command::Extract { dumps, output, page_limit } => {
            run_extract(dumps, output, *page_limit, cli.quiet)
        }
        Command::Filter { input, output } => run_filter(input, output, cli.quiet),
        Command::Index { sentences, morphology, db, export, stats } => {
            run_index(sentences, morphology, db, export, stats, cli.quiet)
        }
        Command::Lookup { db, word, limit } => run_lookup(db, word, *limit, cli.quiet),
    }
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(&cli) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
