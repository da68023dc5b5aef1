//! Run configuration.
//!
//! [`Config`] groups the record filter criteria, the extraction parameters and
//! the batch options. The command line builds one and must call
//! [`Config::validate`] before starting a run.

use chrono::NaiveDate;

use crate::constants::{
    CORNER_EXTENT, DEFAULT_BOARD_SIZE, DISTANCE_THRESHOLD, MAX_BOARD_SIZE, MAX_SEQUENCE_LEN,
    PROGRESS_EVERY, PRUNE_FRACTION,
};
use crate::error::ConfigError;

/// Static criteria a record must meet before extraction.
#[derive(Clone, Debug, PartialEq)]
pub struct Criteria {
    /// Exact board size.
    pub size: usize,
    /// Whether handicap games are kept.
    pub allow_handicap: bool,
    /// Inclusive strength bounds, applied to both players.
    pub min_rank: Option<i32>,
    pub max_rank: Option<i32>,
    /// Inclusive date bounds.
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    /// Records with fewer moves are rejected (0 disables the check).
    pub min_moves: usize,
}

impl Default for Criteria {
    fn default() -> Self {
        Self {
            size: DEFAULT_BOARD_SIZE,
            allow_handicap: false,
            min_rank: None,
            max_rank: None,
            from: None,
            to: None,
            min_moves: 0,
        }
    }
}

/// Distance between a move and a corner's most recent move.
#[derive(Copy, Clone, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum Metric {
    /// Largest of the row and column offsets.
    Chebyshev,
    /// Straight-line distance.
    Euclidean,
}

/// Parameters of the corner sequence extractor.
#[derive(Clone, Debug, PartialEq)]
pub struct ExtractParams {
    pub distance: f64,
    pub metric: Metric,
    pub corner_extent: usize,
    pub max_len: usize,
    /// Swap colors so that every sequence starts with Black.
    pub normalize_colors: bool,
}

impl Default for ExtractParams {
    fn default() -> Self {
        Self {
            distance: DISTANCE_THRESHOLD,
            metric: Metric::Chebyshev,
            corner_extent: CORNER_EXTENT,
            max_len: MAX_SEQUENCE_LEN,
            normalize_colors: true,
        }
    }
}

/// Everything a corpus run needs.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub criteria: Criteria,
    pub extract: ExtractParams,
    pub prune_fraction: f64,
    pub workers: usize,
    /// Accumulate into one locked trie instead of per-worker tries.
    pub shared_trie: bool,
    pub progress_every: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            criteria: Criteria::default(),
            extract: ExtractParams::default(),
            prune_fraction: PRUNE_FRACTION,
            workers: std::thread::available_parallelism().map_or(1, |n| n.get()),
            shared_trie: false,
            progress_every: PROGRESS_EVERY,
        }
    }
}

impl Config {
    /// Reject option combinations that would make the run meaningless.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let c = &self.criteria;
        if c.size == 0 || c.size > MAX_BOARD_SIZE {
            return Err(ConfigError::BoardSize {
                got: c.size,
                max: MAX_BOARD_SIZE,
            });
        }
        if let (Some(min), Some(max)) = (c.min_rank, c.max_rank) {
            if min > max {
                return Err(ConfigError::StrengthRange { min, max });
            }
        }
        if let (Some(from), Some(to)) = (c.from, c.to) {
            if from > to {
                return Err(ConfigError::DateRange {
                    from: from.to_string(),
                    to: to.to_string(),
                });
            }
        }
        let e = &self.extract;
        if e.distance.is_nan() || e.distance < 0.0 {
            return Err(ConfigError::Distance(e.distance));
        }
        if e.max_len == 0 {
            return Err(ConfigError::Zero("sequence length cap"));
        }
        if e.corner_extent == 0 {
            return Err(ConfigError::Zero("corner extent"));
        }
        if !(0.0..=1.0).contains(&self.prune_fraction) {
            return Err(ConfigError::PruneFraction(self.prune_fraction));
        }
        if self.workers == 0 {
            return Err(ConfigError::Zero("worker count"));
        }
        if self.progress_every == 0 {
            return Err(ConfigError::Zero("progress interval"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert_eq!(Config::default().validate(), Ok(()));
    }

    #[test]
    fn test_negative_distance() {
        let mut config = Config::default();
        config.extract.distance = -1.0;
        assert_eq!(config.validate(), Err(ConfigError::Distance(-1.0)));
        config.extract.distance = f64::NAN;
        assert!(matches!(config.validate(), Err(ConfigError::Distance(_))));
    }

    #[test]
    fn test_empty_ranges() {
        let mut config = Config::default();
        config.criteria.min_rank = Some(2000);
        config.criteria.max_rank = Some(1500);
        assert_eq!(
            config.validate(),
            Err(ConfigError::StrengthRange {
                min: 2000,
                max: 1500
            })
        );

        let mut config = Config::default();
        config.criteria.from = NaiveDate::from_ymd_opt(2020, 1, 2);
        config.criteria.to = NaiveDate::from_ymd_opt(2020, 1, 1);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::DateRange { .. })
        ));

        // A single-day range is fine.
        config.criteria.to = config.criteria.from;
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn test_out_of_range_values() {
        let mut config = Config::default();
        config.prune_fraction = 1.5;
        assert_eq!(config.validate(), Err(ConfigError::PruneFraction(1.5)));

        let mut config = Config::default();
        config.workers = 0;
        assert_eq!(config.validate(), Err(ConfigError::Zero("worker count")));

        let mut config = Config::default();
        config.criteria.size = 26;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::BoardSize { got: 26, .. })
        ));
    }
}
