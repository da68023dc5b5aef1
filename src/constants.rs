//! Default parameters for filtering, extraction, and pruning.
//!
//! Every value here is only a default: the run configuration
//! ([`crate::config::Config`]) can override each of them from the command line.

// =============================================================================
// Board Geometry
// =============================================================================

/// Standard board size for the corpus being mined.
pub const DEFAULT_BOARD_SIZE: usize = 19;

/// Largest board size the coordinate encoding supports (GTP letters A-Z minus I).
pub const MAX_BOARD_SIZE: usize = 25;

// =============================================================================
// Corner Sequence Extraction
// =============================================================================

/// Maximum number of moves kept in one corner sequence.
pub const MAX_SEQUENCE_LEN: usize = 20;

/// Maximum distance from a corner's most recent move for a new move to join it.
pub const DISTANCE_THRESHOLD: f64 = 4.0;

/// Width of the region, counted from the corner, in which the first move of a
/// corner sequence is admitted without a previous move to measure from.
/// With 6 the region covers every local point up to the sixth line.
pub const CORNER_EXTENT: usize = 6;

// =============================================================================
// Pruning and Reporting
// =============================================================================

/// Fraction of all merged sequences a node must reach to survive pruning.
pub const PRUNE_FRACTION: f64 = 0.01;

/// Number of records between two progress log lines.
pub const PROGRESS_EVERY: usize = 100_000;

/// Number of sequences printed in the end-of-run summary.
pub const SUMMARY_TOP: usize = 10;
