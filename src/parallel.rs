//! Sequential and multi-threaded parsing of export rows.
//!
//! Entries are independent, so rows are cut into batches and each batch is
//! split across scoped worker threads. Results come back in input order.

use indicatif::ProgressBar;
use std::thread::{self, ScopedJoinHandle};
use std::time::Duration;

use crate::entry::Entry;
use crate::error::{Error, Result};
use crate::source::SourceRow;

/// Configuration for parallel processing
#[derive(Debug, Clone)]
pub struct ParallelConfig {
    /// Number of threads to use
    pub num_threads: usize,
    /// Rows handed to the thread pool at a time
    pub batch_size: usize,
}

impl Default for ParallelConfig {
    fn default() -> Self {
        let cpus = thread::available_parallelism()
            .map(|p| p.get())
            .unwrap_or(4);
        Self {
            num_threads: cpus,
            batch_size: 1000,
        }
    }
}

/// Summary of a parse run
#[derive(Debug, Default, Clone)]
pub struct Stats {
    pub entries: usize,
    pub with_headword: usize,
    pub without_headword: usize,
    pub without_meanings: usize,
    pub numbered: usize,
    pub meanings: usize,
    pub cross_references: usize,
    pub etymology_lines: usize,
    pub elapsed: Duration,
}

impl Stats {
    pub fn record(&mut self, entry: &Entry) {
        self.entries += 1;
        if entry.headword.is_some() {
            self.with_headword += 1;
        } else {
            self.without_headword += 1;
        }
        if entry.meanings.is_empty() {
            self.without_meanings += 1;
        }
        if entry.is_numbered() {
            self.numbered += 1;
        }
        self.meanings += entry.meanings.len();
        self.cross_references += entry.cross_references.len();
        self.etymology_lines += entry.etymology.len();
    }

    pub fn from_entries(entries: &[Entry]) -> Self {
        let mut stats = Stats::default();
        for entry in entries {
            stats.record(entry);
        }
        stats
    }
}

/// Parse rows one after another on the calling thread
pub fn parse_sequential(rows: &[SourceRow], progress: &ProgressBar) -> Vec<Entry> {
    rows.iter()
        .map(|row| {
            let entry = row.parse();
            progress.inc(1);
            entry
        })
        .collect()
}

/// Parse rows in batches, each batch spread over `config.num_threads` threads
pub fn parse_batch_parallel(
    rows: &[SourceRow],
    config: &ParallelConfig,
    progress: &ProgressBar,
) -> Result<Vec<Entry>> {
    let mut entries = Vec::with_capacity(rows.len());
    for batch in rows.chunks(config.batch_size.max(1)) {
        entries.extend(parse_batch_threaded(batch, config.num_threads, progress)?);
    }
    Ok(entries)
}

/// Process a batch of rows using multiple threads
fn parse_batch_threaded(batch: &[SourceRow], num_threads: usize, progress: &ProgressBar) -> Result<Vec<Entry>> {
    if batch.is_empty() {
        return Ok(vec![]);
    }

    let num_threads = num_threads.min(batch.len()).max(1);
    let chunk_size = batch.len().div_ceil(num_threads);

    thread::scope(|scope| {
        let handles: Vec<ScopedJoinHandle<Vec<Entry>>> = batch
            .chunks(chunk_size)
            .map(|chunk| {
                scope.spawn(move || {
                    let parsed: Vec<Entry> = chunk.iter().map(SourceRow::parse).collect();
                    progress.inc(chunk.len() as u64);
                    parsed
                })
            })
            .collect();

        // Handles are joined in spawn order, which keeps rows in input order
        let mut results = Vec::with_capacity(batch.len());
        for handle in handles {
            results.extend(handle.join().map_err(|_| Error::WorkerPanicked)?);
        }
        Ok(results)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(n: usize) -> Vec<SourceRow> {
        (0..n)
            .map(|i| SourceRow {
                id: Some(i.to_string()),
                name: None,
                text: format!(
                    "<Red>சொல்{}</Red><BR><BR><Three_Space>{}. பொருள்<BR><BR>அ பார்க்க see a",
                    i,
                    i + 1
                ),
            })
            .collect()
    }

    #[test]
    fn parallel_preserves_row_order() {
        let rows = rows(53);
        let config = ParallelConfig {
            num_threads: 4,
            batch_size: 7,
        };
        let parallel = parse_batch_parallel(&rows, &config, &ProgressBar::hidden()).unwrap();
        let sequential = parse_sequential(&rows, &ProgressBar::hidden());
        assert_eq!(parallel, sequential);
        let ids: Vec<_> = parallel.iter().map(|e| e.source_row_id.clone().unwrap()).collect();
        let expected: Vec<_> = (0..53).map(|i| i.to_string()).collect();
        assert_eq!(ids, expected);
    }

    #[test]
    fn more_threads_than_rows() {
        let rows = rows(2);
        let config = ParallelConfig {
            num_threads: 16,
            batch_size: 1000,
        };
        let entries = parse_batch_parallel(&rows, &config, &ProgressBar::hidden()).unwrap();
        assert_eq!(entries.len(), 2);
    }

    #[test]
    fn empty_input() {
        let entries = parse_batch_parallel(&[], &ParallelConfig::default(), &ProgressBar::hidden()).unwrap();
        assert!(entries.is_empty());
    }

    #[test]
    fn progress_counts_every_row() {
        let rows = rows(10);
        let progress = ProgressBar::hidden();
        let config = ParallelConfig {
            num_threads: 3,
            batch_size: 4,
        };
        parse_batch_parallel(&rows, &config, &progress).unwrap();
        assert_eq!(progress.position(), 10);
    }

    #[test]
    fn stats_from_entries() {
        let mut entries = parse_sequential(&rows(3), &ProgressBar::hidden());
        entries.push(Entry::default());
        let stats = Stats::from_entries(&entries);
        assert_eq!(stats.entries, 4);
        assert_eq!(stats.with_headword, 3);
        assert_eq!(stats.without_headword, 1);
        assert_eq!(stats.without_meanings, 1);
        assert_eq!(stats.numbered, 3);
        assert_eq!(stats.meanings, 3);
        assert_eq!(stats.cross_references, 3);
        assert_eq!(stats.etymology_lines, 0);
    }
}
