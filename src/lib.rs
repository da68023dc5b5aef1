//! Joseki-Miner: frequency-ranked corner sequences from a corpus of Go games.
//!
//! Games flow through a fixed pipeline: the [`filter`] drops records by
//! metadata, the [`extract`]or splits each game's moves into up to four corner
//! sequences (using [`symmetry`] to bring every corner into one frame), the
//! sequences are counted in a [`trie`], and [`export`] prunes rare branches
//! and writes the rest out. [`corpus`] drives the pipeline over a stream of
//! records on a pool of workers.
//!
//! ## Modules
//!
//! - [`board`] - Colors, points, moves and vertex notation
//! - [`record`] - Decoded game records
//! - [`config`] - Run configuration and validation
//! - [`constants`] - Default parameters
//! - [`error`] - Decode and configuration errors
//! - [`filter`] - Record filter
//! - [`symmetry`] - Corner assignment and canonicalization
//! - [`extract`] - Corner sequence extraction
//! - [`trie`] - Frequency-annotated prefix tree
//! - [`corpus`] - Batch processing over a record stream
//! - [`export`] - Pruning and serialization
//! - [`synth`] - Synthetic corpora for demos and tests
//!
//! ## Example
//!
//! ```
//! use joseki_miner::config::Config;
//! use joseki_miner::corpus::{Halt, run};
//! use joseki_miner::export::prune_and_export;
//! use joseki_miner::synth::Synth;
//!
//! let config = Config { workers: 2, ..Config::default() };
//! let games = Synth::new(19, 7).take(100).map(Ok);
//! let (trie, stats) = run(games, &config, &Halt::new()).unwrap();
//!
//! let tree = prune_and_export(&trie, config.prune_fraction, stats.sequences);
//! for (seq, count) in tree.sequences().iter().take(3) {
//!     println!("{count:6} {seq:?}");
//! }
//! ```

pub mod board;
pub mod config;
pub mod constants;
pub mod corpus;
pub mod error;
pub mod export;
pub mod extract;
pub mod filter;
pub mod record;
pub mod symmetry;
pub mod synth;
pub mod trie;
