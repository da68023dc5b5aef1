//! Corpus batch processing.
//!
//! Records are pulled one at a time from the source and handed to a rayon
//! pool of `workers` threads. Each worker filters, extracts and merges into
//! its own private [`Trie`]; the partial tries and statistics are reduced at
//! the end. With `shared_trie` set, workers merge into one [`SharedTrie`]
//! instead. Both modes produce the same counts.

use std::io::{self, BufRead};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use rayon::prelude::*;

use crate::config::Config;
use crate::error::RecordDecodeError;
use crate::extract::Extractor;
use crate::filter::{self, Rejection};
use crate::record::GameRecord;
use crate::symmetry::LocalMove;
use crate::trie::{SharedTrie, Trie};

/// Counters reported at the end of a run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Stats {
    /// Records pulled from the source, decodable or not.
    pub seen: usize,
    pub accepted: usize,
    /// Records that could not be decoded.
    pub skipped: usize,
    /// Decoded records rejected by the filter, by reason.
    pub rejected: [usize; 6],
    /// Sequences merged into the trie.
    pub sequences: u64,
    /// Moves that joined no corner sequence.
    pub overflow: usize,
    pub ambiguous: usize,
    /// Whether the run stopped at the halt point before the source ran out.
    pub halted: bool,
}

impl Stats {
    pub fn rejected(&self, reason: Rejection) -> usize {
        self.rejected[reason.index()]
    }

    pub fn rejected_total(&self) -> usize {
        self.rejected.iter().sum()
    }

    fn join(mut self, other: Stats) -> Stats {
        self.seen += other.seen;
        self.accepted += other.accepted;
        self.skipped += other.skipped;
        for (a, b) in self.rejected.iter_mut().zip(other.rejected) {
            *a += b;
        }
        self.sequences += other.sequences;
        self.overflow += other.overflow;
        self.ambiguous += other.ambiguous;
        self.halted |= other.halted;
        self
    }
}

/// Cooperative stop point. Once tripped, no further record is pulled from
/// the source; records already pulled are processed to completion.
#[derive(Debug, Default)]
pub struct Halt {
    stopped: AtomicBool,
    deadline: Option<Instant>,
    max_records: Option<usize>,
    pulled: AtomicUsize,
}

impl Halt {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_deadline(mut self, duration: Duration) -> Self {
        self.deadline = Instant::now().checked_add(duration);
        self
    }

    pub fn with_max_records(mut self, max: usize) -> Self {
        self.max_records = Some(max);
        self
    }

    /// Request a stop from another thread.
    pub fn stop(&self) {
        self.stopped.store(true, Ordering::Relaxed);
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Relaxed)
    }

    /// Called before each record is pulled; trips the halt once a limit is hit.
    fn admit(&self) -> bool {
        if self.is_stopped() {
            return false;
        }
        let limit_hit = self.deadline.is_some_and(|d| Instant::now() >= d)
            || self
                .max_records
                .is_some_and(|max| self.pulled.fetch_add(1, Ordering::Relaxed) >= max);
        if limit_hit {
            self.stop();
            return false;
        }
        true
    }
}

/// Parse a duration such as `"30s"`, `"5m"`, `"2h"` or `"1d"`.
pub fn parse_duration(s: &str) -> Option<Duration> {
    let s = s.trim();
    let (split, unit) = s.char_indices().next_back()?;
    let value: u64 = s[..split].parse().ok()?;
    let scale = match unit {
        's' => 1,
        'm' => 60,
        'h' => 3600,
        'd' => 86400,
        _ => return None,
    };
    value.checked_mul(scale).map(Duration::from_secs)
}

/// A JSON-lines corpus. Blank lines are skipped; a line that is not valid
/// UTF-8 is a decode error; any other read error ends the stream.
pub struct JsonLines<R> {
    lines: io::Lines<R>,
    first: Option<io::Result<String>>,
    done: bool,
}

impl<R: BufRead> JsonLines<R> {
    /// Fails if the very first read fails: a corpus that cannot be read at all
    /// is fatal, unlike a bad line further in.
    pub fn open(reader: R) -> Result<Self> {
        let mut lines = reader.lines();
        let first = match lines.next() {
            Some(Err(e)) if e.kind() != io::ErrorKind::InvalidData => {
                return Err(e).context("reading the first corpus record");
            }
            first => first,
        };
        let done = first.is_none();
        Ok(Self { lines, first, done })
    }
}

impl<R: BufRead> Iterator for JsonLines<R> {
    type Item = Result<GameRecord, RecordDecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.first.take() {
                Some(line) => line,
                None if self.done => return None,
                None => match self.lines.next() {
                    Some(line) => line,
                    None => {
                        self.done = true;
                        return None;
                    }
                },
            };
            match line {
                Ok(line) if line.trim().is_empty() => continue,
                Ok(line) => return Some(GameRecord::from_json(&line)),
                Err(e) if e.kind() == io::ErrorKind::InvalidData => return Some(Err(e.into())),
                Err(e) => {
                    log::warn!("corpus stream failed, stopping early: {e}");
                    self.done = true;
                    return Some(Err(e.into()));
                }
            }
        }
    }
}

/// Filter and extract one record, updating `stats`. Returns the canonical
/// sequences to merge.
fn examine(
    item: Result<GameRecord, RecordDecodeError>,
    config: &Config,
    extractor: &Extractor,
    stats: &mut Stats,
) -> Vec<Vec<LocalMove>> {
    stats.seen += 1;
    let record = match item {
        Ok(record) => record,
        Err(e) => {
            log::debug!("skipping record: {e}");
            stats.skipped += 1;
            return Vec::new();
        }
    };
    if let Some(reason) = filter::explain(&record, &config.criteria) {
        stats.rejected[reason.index()] += 1;
        return Vec::new();
    }
    stats.accepted += 1;

    let extraction = extractor.extract(&record);
    stats.overflow += extraction.overflow.len();
    stats.ambiguous += extraction.ambiguous;
    let seqs = extraction.into_canonical(config.extract.normalize_colors);
    stats.sequences += seqs.len() as u64;
    seqs
}

/// Per-worker accumulator.
#[derive(Default)]
struct Partial {
    trie: Trie,
    stats: Stats,
}

impl Partial {
    fn join(self, other: Partial) -> Partial {
        Partial {
            trie: self.trie.join(other.trie),
            stats: self.stats.join(other.stats),
        }
    }
}

/// Logs a progress line every `every` records.
struct Progress {
    every: usize,
    ticks: usize,
    begin: Instant,
}

impl Progress {
    fn new(every: usize) -> Self {
        Self {
            every,
            ticks: 0,
            begin: Instant::now(),
        }
    }

    fn tick(&mut self) {
        self.ticks += 1;
        if self.ticks % self.every == 0 {
            let elapsed = self.begin.elapsed();
            log::info!(
                "progress: {:8.0?} {:>12} records {:10.0}/s",
                elapsed,
                self.ticks,
                self.ticks as f64 / elapsed.as_secs_f64().max(f64::EPSILON),
            );
        }
    }
}

/// Mine a corpus into a trie.
///
/// Fails only on invalid configuration or if the worker pool cannot be
/// built; bad records are counted in [`Stats::skipped`].
pub fn run<I>(source: I, config: &Config, halt: &Halt) -> Result<(Trie, Stats)>
where
    I: Iterator<Item = Result<GameRecord, RecordDecodeError>> + Send,
{
    config.validate()?;
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.workers)
        .build()
        .context("building worker pool")?;
    let extractor = Extractor::new(config.extract.clone());

    log::info!(
        "mining {}x{} corpus with {} workers{}",
        config.criteria.size,
        config.criteria.size,
        config.workers,
        if config.shared_trie { " (shared trie)" } else { "" },
    );

    let mut source = source;
    let mut progress = Progress::new(config.progress_every);
    // Set when the halt turned away a record the source still had.
    let cut_short = AtomicBool::new(false);
    let cut = &cut_short;
    let records = std::iter::from_fn(move || {
        if !halt.admit() {
            if source.next().is_some() {
                cut.store(true, Ordering::Relaxed);
            }
            return None;
        }
        let next = source.next();
        if next.is_some() {
            progress.tick();
        }
        next
    });

    let (trie, mut stats) = pool.install(|| {
        if config.shared_trie {
            let shared = SharedTrie::new();
            let stats = records
                .par_bridge()
                .fold(Stats::default, |mut stats, item| {
                    let seqs = examine(item, config, &extractor, &mut stats);
                    shared.merge_all(&seqs);
                    stats
                })
                .reduce(Stats::default, Stats::join);
            (shared.into_inner(), stats)
        } else {
            let partial = records
                .par_bridge()
                .fold(Partial::default, |mut acc, item| {
                    for seq in examine(item, config, &extractor, &mut acc.stats) {
                        acc.trie.merge(&seq);
                    }
                    acc
                })
                .reduce(Partial::default, Partial::join);
            (partial.trie, partial.stats)
        }
    });

    stats.halted = cut_short.load(Ordering::Relaxed);
    if stats.halted {
        log::warn!("run halted after {} records", stats.seen);
    }
    log::info!(
        "seen {} accepted {} rejected {} skipped {} sequences {} nodes {}",
        stats.seen,
        stats.accepted,
        stats.rejected_total(),
        stats.skipped,
        stats.sequences,
        trie.len(),
    );
    Ok((trie, stats))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_parse_duration() {
        assert_eq!(parse_duration("30s"), Some(Duration::from_secs(30)));
        assert_eq!(parse_duration("5m"), Some(Duration::from_secs(300)));
        assert_eq!(parse_duration("2h"), Some(Duration::from_secs(7200)));
        assert_eq!(parse_duration("1d"), Some(Duration::from_secs(86400)));
        assert_eq!(parse_duration("1w"), None);
        assert_eq!(parse_duration(""), None);
        assert_eq!(parse_duration("5µ"), None);
        assert_eq!(parse_duration("µ"), None);
        assert_eq!(parse_duration(&format!("{}d", u64::MAX)), None);
    }

    #[test]
    fn test_json_lines_skips_blank_lines() {
        let text = "\n{\"size\":19,\"moves\":[]}\n\n  \nnot json\n{\"size\":9,\"moves\":[]}\n";
        let items: Vec<_> = JsonLines::open(Cursor::new(text)).unwrap().collect();
        assert_eq!(items.len(), 3);
        assert!(items[0].is_ok());
        assert!(matches!(items[1], Err(RecordDecodeError::Json(_))));
        assert_eq!(items[2].as_ref().map(|r| r.size).ok(), Some(9));
    }

    #[test]
    fn test_json_lines_invalid_utf8_is_a_decode_error() {
        let mut bytes = b"{\"size\":19,\"moves\":[]}\n".to_vec();
        bytes.extend_from_slice(&[0xff, 0xfe, b'\n']);
        bytes.extend_from_slice(b"{\"size\":19,\"moves\":[]}\n");
        let items: Vec<_> = JsonLines::open(Cursor::new(bytes)).unwrap().collect();
        assert_eq!(items.len(), 3);
        assert!(matches!(items[1], Err(RecordDecodeError::Io(_))));
        assert!(items[2].is_ok());
    }

    #[test]
    fn test_empty_corpus() {
        let items: Vec<_> = JsonLines::open(Cursor::new("")).unwrap().collect();
        assert!(items.is_empty());
    }

    #[test]
    fn test_halt_max_records() {
        let halt = Halt::new().with_max_records(2);
        assert!(halt.admit());
        assert!(halt.admit());
        assert!(!halt.admit());
        assert!(halt.is_stopped());
    }

    #[test]
    fn test_halt_with_huge_deadline_never_trips() {
        let halt = Halt::new().with_deadline(Duration::MAX);
        assert!(halt.admit());
        assert!(!halt.is_stopped());
    }

    #[test]
    fn test_halt_stop() {
        let halt = Halt::new();
        assert!(halt.admit());
        halt.stop();
        assert!(!halt.admit());
    }

    #[test]
    fn test_stats_join() {
        let a = Stats {
            seen: 3,
            accepted: 2,
            rejected: [1, 0, 0, 0, 0, 0],
            sequences: 5,
            ..Stats::default()
        };
        let b = Stats {
            seen: 1,
            skipped: 1,
            halted: true,
            ..Stats::default()
        };
        let joined = a.clone().join(b.clone());
        assert_eq!(joined, b.join(a));
        assert_eq!(joined.seen, 4);
        assert_eq!(joined.rejected(Rejection::BoardSize), 1);
        assert!(joined.halted);
    }
}
