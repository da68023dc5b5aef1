//! Record filter: cheap metadata checks applied before extraction.

use std::fmt;

use crate::config::Criteria;
use crate::record::GameRecord;

/// The first criterion a record failed.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Rejection {
    BoardSize,
    /// A move lies off the record's own board.
    Malformed,
    Handicap,
    Strength,
    Date,
    TooShort,
}

impl Rejection {
    pub const ALL: [Rejection; 6] = [
        Rejection::BoardSize,
        Rejection::Malformed,
        Rejection::Handicap,
        Rejection::Strength,
        Rejection::Date,
        Rejection::TooShort,
    ];

    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Rejection::BoardSize => "board size",
            Rejection::Malformed => "move off board",
            Rejection::Handicap => "handicap",
            Rejection::Strength => "strength",
            Rejection::Date => "date",
            Rejection::TooShort => "too short",
        };
        f.write_str(s)
    }
}

/// Whether a record passes every criterion.
pub fn accept(record: &GameRecord, criteria: &Criteria) -> bool {
    explain(record, criteria).is_none()
}

/// Name the first failing criterion, or `None` if the record is accepted.
///
/// A missing rank or date fails the corresponding criterion when it is set.
pub fn explain(record: &GameRecord, criteria: &Criteria) -> Option<Rejection> {
    if record.size != criteria.size {
        return Some(Rejection::BoardSize);
    }
    if record.moves.iter().any(|mv| !mv.point.on_board(record.size)) {
        return Some(Rejection::Malformed);
    }
    if record.handicap > 0 && !criteria.allow_handicap {
        return Some(Rejection::Handicap);
    }
    if !in_strength_range(record.black_rank, criteria)
        || !in_strength_range(record.white_rank, criteria)
    {
        return Some(Rejection::Strength);
    }
    if criteria.from.is_some() || criteria.to.is_some() {
        let Some(date) = record.date else {
            return Some(Rejection::Date);
        };
        if criteria.from.is_some_and(|from| date < from) || criteria.to.is_some_and(|to| date > to)
        {
            return Some(Rejection::Date);
        }
    }
    if record.moves.len() < criteria.min_moves {
        return Some(Rejection::TooShort);
    }
    None
}

fn in_strength_range(rank: Option<i32>, criteria: &Criteria) -> bool {
    if criteria.min_rank.is_none() && criteria.max_rank.is_none() {
        return true;
    }
    let Some(rank) = rank else {
        return false;
    };
    criteria.min_rank.is_none_or(|min| rank >= min) && criteria.max_rank.is_none_or(|max| rank <= max)
}
