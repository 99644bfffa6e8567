use anyhow::Context;
use clap::{Parser, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Instant;
use tracing::info;

use tamil_lexicon_parser::output::{self, Format};
use tamil_lexicon_parser::parallel::{parse_batch_parallel, parse_sequential, ParallelConfig, Stats};
use tamil_lexicon_parser::source::{self, Columns};

/// Processing strategy for parsing
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Strategy {
    /// One row after another on the main thread
    Sequential,
    /// Batches of rows split across a thread pool
    BatchParallel,
}

#[derive(Parser)]
#[command(name = "tamil-lexicon-parser")]
#[command(about = "Parse a tagged Tamil lexicon CSV export into structured entries")]
struct Args {
    /// Input CSV file (.csv or .csv.bz2)
    input: PathBuf,

    /// Directory for the output files
    output_dir: PathBuf,

    /// Output formats to write (repeat the flag or separate with commas)
    #[arg(short, long, value_enum, value_delimiter = ',', default_values_t = [Format::Json, Format::Yaml, Format::Tables])]
    format: Vec<Format>,

    /// Column holding the raw tagged entry text
    #[arg(long, default_value = "ResultText")]
    text_column: String,

    /// Column with the row identifier carried into the output
    #[arg(long, default_value = "ID")]
    id_column: String,

    /// Column with the row name carried into the output
    #[arg(long, default_value = "NAME")]
    name_column: String,

    /// Processing strategy
    #[arg(short, long, value_enum, default_value_t = Strategy::BatchParallel)]
    strategy: Strategy,

    /// Number of threads (0 = auto-detect)
    #[arg(short, long, default_value_t = 0)]
    threads: usize,

    /// Batch size for batch-parallel strategy
    #[arg(long, default_value_t = 1000)]
    batch_size: usize,

    /// Limit number of rows to parse (for testing)
    #[arg(long)]
    limit: Option<usize>,

    /// Quiet mode - minimal output
    #[arg(short, long)]
    quiet: bool,
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

fn progress_bar(len: usize, quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new(len as u64);
    if let Ok(style) = ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] {bar:40} {pos}/{len} rows") {
        pb.set_style(style);
    }
    pb
}

fn print_stats(stats: &Stats, strategy: Strategy, written: &[PathBuf]) {
    println!();
    println!("============================================================");
    println!("Strategy: {:?}", strategy);
    println!("Entries parsed: {}", stats.entries);
    println!("  with headword: {}", stats.with_headword);
    println!("  without headword: {}", stats.without_headword);
    println!("  without meanings: {}", stats.without_meanings);
    println!("  numbered senses: {}", stats.numbered);
    println!("------------------------------------------------------------");
    println!("Meanings: {}", stats.meanings);
    println!("Avg meanings/entry: {:.2}", stats.meanings as f64 / stats.entries.max(1) as f64);
    println!("Cross-references: {}", stats.cross_references);
    println!("Etymology lines: {}", stats.etymology_lines);
    println!("------------------------------------------------------------");
    println!("Outputs written:");
    for path in written {
        println!(" - {}", path.display());
    }
    println!("Time: {:.2}s", stats.elapsed.as_secs_f64());
    println!("============================================================");
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let args = Args::parse();

    let columns = Columns {
        text: args.text_column.clone(),
        id: args.id_column.clone(),
        name: args.name_column.clone(),
    };

    let mut config = ParallelConfig::default();
    if args.threads > 0 {
        config.num_threads = args.threads;
    }
    config.batch_size = args.batch_size;

    info!(input = %args.input.display(), output = %args.output_dir.display(), strategy = ?args.strategy, "starting");

    let start_time = Instant::now();
    let rows = source::read_rows_from_path(&args.input, &columns, args.limit)
        .with_context(|| format!("reading {}", args.input.display()))?;
    info!(rows = rows.len(), "loaded export rows");

    let pb = progress_bar(rows.len(), args.quiet);
    let entries = match args.strategy {
        Strategy::Sequential => parse_sequential(&rows, &pb),
        Strategy::BatchParallel => parse_batch_parallel(&rows, &config, &pb)?,
    };
    pb.finish_and_clear();

    let written = output::write_all(&args.output_dir, &args.format, &entries)
        .with_context(|| format!("writing output to {}", args.output_dir.display()))?;

    let mut stats = Stats::from_entries(&entries);
    stats.elapsed = start_time.elapsed();

    if !args.quiet {
        print_stats(&stats, args.strategy, &written);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_before_positional_arguments() {
        let args = Args::try_parse_from(["t", "--format", "json", "in.csv", "out"]).unwrap();
        assert_eq!(args.format, vec![Format::Json]);
        assert_eq!(args.input, PathBuf::from("in.csv"));
        assert_eq!(args.output_dir, PathBuf::from("out"));
    }

    #[test]
    fn format_repeated_and_comma_separated() {
        let args = Args::try_parse_from(["t", "-f", "yaml", "-f", "jsonl,tables", "in.csv", "out"]).unwrap();
        assert_eq!(args.format, vec![Format::Yaml, Format::Jsonl, Format::Tables]);
    }

    #[test]
    fn default_formats() {
        let args = Args::try_parse_from(["t", "in.csv", "out"]).unwrap();
        assert_eq!(args.format, vec![Format::Json, Format::Yaml, Format::Tables]);
        assert_eq!(args.strategy, Strategy::BatchParallel);
    }
}
