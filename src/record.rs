//! Decoded game records.
//!
//! The game-record file format itself is handled upstream: this crate reads
//! records that have already been decoded into one JSON object per line:
//!
//! ```text
//! {"size":19,"handicap":0,"black_rank":2200,"white_rank":2150,
//!  "date":"2019-05-04","moves":["B[Q16]","W[D4]","B[pass]"]}
//! ```
//!
//! Passes are dropped during decoding. Unparsable metadata (an odd date
//! string) is kept as missing so the filter can reject it; a move that cannot
//! be placed on the board fails the whole record.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::board::{Color, Move, parse_vertex, vertex};
use crate::constants::MAX_BOARD_SIZE;
use crate::error::RecordDecodeError;

/// A decoded game: its move list plus the metadata the filter looks at.
#[derive(Clone, Debug, PartialEq)]
pub struct GameRecord {
    pub size: usize,
    pub handicap: u32,
    pub black_rank: Option<i32>,
    pub white_rank: Option<i32>,
    pub date: Option<NaiveDate>,
    pub moves: Vec<Move>,
}

impl GameRecord {
    /// An even game with no rank or date information.
    pub fn new(size: usize, moves: Vec<Move>) -> Self {
        Self {
            size,
            handicap: 0,
            black_rank: None,
            white_rank: None,
            date: None,
            moves,
        }
    }

    pub fn with_ranks(mut self, black: i32, white: i32) -> Self {
        self.black_rank = Some(black);
        self.white_rank = Some(white);
        self
    }

    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    pub fn with_handicap(mut self, handicap: u32) -> Self {
        self.handicap = handicap;
        self
    }

    /// Decode one corpus line.
    pub fn from_json(line: &str) -> Result<Self, RecordDecodeError> {
        let raw: RawRecord = serde_json::from_str(line)?;
        raw.decode()
    }

    /// Encode as one corpus line.
    pub fn to_json(&self) -> String {
        let raw = RawRecord {
            size: self.size,
            handicap: self.handicap,
            black_rank: self.black_rank,
            white_rank: self.white_rank,
            date: self.date.map(|d| d.format("%Y-%m-%d").to_string()),
            moves: self
                .moves
                .iter()
                .map(|mv| format!("{}[{}]", mv.color.letter(), vertex(mv.point, self.size)))
                .collect(),
        };
        // A struct of strings and integers always serializes.
        serde_json::to_string(&raw).unwrap_or_default()
    }
}

#[derive(Serialize, Deserialize)]
struct RawRecord {
    size: usize,
    #[serde(default)]
    handicap: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    black_rank: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    white_rank: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    date: Option<String>,
    moves: Vec<String>,
}

impl RawRecord {
    fn decode(self) -> Result<GameRecord, RecordDecodeError> {
        if self.size == 0 || self.size > MAX_BOARD_SIZE {
            return Err(RecordDecodeError::BoardSize(self.size));
        }
        let mut moves = Vec::with_capacity(self.moves.len());
        for (index, text) in self.moves.iter().enumerate() {
            if let Some(mv) = parse_move(text, self.size)
                .ok_or_else(|| RecordDecodeError::Move {
                    index,
                    text: text.clone(),
                })?
            {
                moves.push(mv);
            }
        }
        Ok(GameRecord {
            size: self.size,
            handicap: self.handicap,
            black_rank: self.black_rank,
            white_rank: self.white_rank,
            date: self.date.as_deref().and_then(parse_date),
            moves,
        })
    }
}

/// Parse `B[Q16]`. Returns `Some(None)` for a pass (`B[pass]` or `B[]`) and
/// `None` if the text is not a move on this board.
fn parse_move(text: &str, size: usize) -> Option<Option<Move>> {
    let (color, rest) = text.split_once('[')?;
    let color = Color::from_letter(color.trim())?;
    let body = rest.strip_suffix(']')?.trim();
    if body.is_empty() || body.eq_ignore_ascii_case("pass") {
        return Some(None);
    }
    parse_vertex(body, size).map(|pt| Some(Move::new(color, pt)))
}

/// Accepts `YYYY-MM-DD`, optionally followed by more text (game-record dates
/// often list several days, e.g. `2019-05-04,05`).
fn parse_date(s: &str) -> Option<NaiveDate> {
    let head = s.get(..10)?;
    match NaiveDate::parse_from_str(head, "%Y-%m-%d") {
        Ok(date) => Some(date),
        Err(_) => {
            log::debug!("ignoring unparsable date {s:?}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Point;

    #[test]
    fn test_decode_full_record() {
        let line = r#"{"size":19,"handicap":0,"black_rank":2200,"white_rank":2150,
            "date":"2019-05-04","moves":["B[Q16]","W[D4]","B[pass]","W[]","B[R4]"]}"#;
        let record = GameRecord::from_json(line).unwrap();
        assert_eq!(record.size, 19);
        assert_eq!(record.black_rank, Some(2200));
        assert_eq!(record.date, NaiveDate::from_ymd_opt(2019, 5, 4));
        assert_eq!(record.moves.len(), 3, "passes are dropped");
        assert_eq!(record.moves[0], Move::new(Color::Black, Point::new(15, 3)));
        assert_eq!(record.moves[1], Move::new(Color::White, Point::new(3, 15)));
    }

    #[test]
    fn test_decode_minimal_record() {
        let record = GameRecord::from_json(r#"{"size":9,"moves":[]}"#).unwrap();
        assert_eq!(record, GameRecord::new(9, Vec::new()));
    }

    #[test]
    fn test_odd_date_becomes_missing() {
        let line = r#"{"size":19,"date":"sometime in 1985","moves":[]}"#;
        assert_eq!(GameRecord::from_json(line).unwrap().date, None);
        let line = r#"{"size":19,"date":"1985-07-01,02","moves":[]}"#;
        assert_eq!(
            GameRecord::from_json(line).unwrap().date,
            NaiveDate::from_ymd_opt(1985, 7, 1)
        );
    }

    #[test]
    fn test_encode_then_decode() {
        let record = GameRecord::new(19, vec![Move::new(Color::Black, Point::new(15, 3))])
            .with_ranks(1900, 2000)
            .with_date(NaiveDate::from_ymd_opt(2001, 2, 3).unwrap());
        let line = record.to_json();
        assert!(line.contains(r#""B[Q16]""#));
        assert_eq!(GameRecord::from_json(&line).unwrap(), record);
    }

    #[test]
    fn test_decode_errors() {
        assert!(matches!(
            GameRecord::from_json("not json"),
            Err(RecordDecodeError::Json(_))
        ));
        assert!(matches!(
            GameRecord::from_json(r#"{"size":0,"moves":[]}"#),
            Err(RecordDecodeError::BoardSize(0))
        ));
        assert!(matches!(
            GameRecord::from_json(r#"{"size":9,"moves":["B[C3]","W[Q16]"]}"#),
            Err(RecordDecodeError::Move { index: 1, .. })
        ));
        assert!(matches!(
            GameRecord::from_json(r#"{"size":9,"moves":["X[C3]"]}"#),
            Err(RecordDecodeError::Move { index: 0, .. })
        ));
    }
}
