//! Synthetic corpus generation for demos and tests.
//!
//! Each synthetic game plays a few well-known corner sequences from a small
//! book, each in a random corner and under a random diagonal reflection and
//! color assignment, with the corners' moves interleaved at random. Optional
//! noise moves are scattered over the board afterwards.

use chrono::NaiveDate;

use crate::board::{Color, Move, Point};
use crate::record::GameRecord;
use crate::symmetry::{Corner, LocalMove};

/// Corner sequences in the top-left frame, `(columns, rows)` from the corner.
pub const BOOK: &[&[(u8, u8)]] = &[
    // 4-4 point, left alone.
    &[(3, 3)],
    // 4-4 point, knight's approach, knight's response, extension.
    &[(3, 3), (5, 2), (2, 5), (6, 2)],
    // 4-4 point, 3-3 invasion.
    &[(3, 3), (2, 2), (2, 3), (3, 2), (4, 2), (2, 4)],
    // 3-4 point, high approach, press.
    &[(2, 3), (4, 3), (3, 4), (4, 4), (2, 5)],
    // 3-3 point, shoulder hit, crawl.
    &[(2, 2), (3, 3), (3, 2), (4, 3)],
];

/// Relative frequency of each book entry.
const WEIGHTS: [usize; 5] = [30, 25, 20, 15, 10];

/// Probability (in percent) that a corner stays empty.
const EMPTY_CORNER: usize = 15;

/// A book entry as a move sequence starting with Black.
pub fn book_sequence(index: usize) -> Vec<LocalMove> {
    BOOK[index]
        .iter()
        .enumerate()
        .map(|(i, &(x, y))| {
            let color = if i % 2 == 0 { Color::Black } else { Color::White };
            Move::new(color, Point { x, y })
        })
        .collect()
}

/// An endless stream of synthetic games.
pub struct Synth {
    rng: fastrand::Rng,
    size: usize,
    noise: usize,
    planted: [usize; 5],
}

impl Synth {
    /// Corner sequences fit on 19x19 boards; smaller boards may see corners
    /// run into each other.
    pub fn new(size: usize, seed: u64) -> Self {
        Self {
            rng: fastrand::Rng::with_seed(seed),
            size,
            noise: 0,
            planted: [0; 5],
        }
    }

    /// Add up to `noise` random moves after the corner sequences.
    pub fn with_noise(mut self, noise: usize) -> Self {
        self.noise = noise;
        self
    }

    /// How many times each book entry has been played so far.
    pub fn planted(&self) -> [usize; 5] {
        self.planted
    }

    fn pick(&mut self) -> usize {
        let total: usize = WEIGHTS.iter().sum();
        let mut roll = self.rng.usize(0..total);
        for (i, &w) in WEIGHTS.iter().enumerate() {
            if roll < w {
                return i;
            }
            roll -= w;
        }
        WEIGHTS.len() - 1
    }

    /// One corner's moves on the board, in order.
    fn corner_moves(&mut self, corner: Corner) -> Vec<Move> {
        if self.rng.usize(0..100) < EMPTY_CORNER {
            return Vec::new();
        }
        let index = self.pick();
        self.planted[index] += 1;
        let transpose = self.rng.bool();
        let swap = self.rng.bool();
        book_sequence(index)
            .into_iter()
            .map(|mv| {
                let local = if transpose { mv.point.transpose() } else { mv.point };
                let color = if swap { mv.color.opponent() } else { mv.color };
                Move::new(color, corner.to_board(local, self.size))
            })
            .collect()
    }

    fn date(&mut self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(
            self.rng.i32(2000..2025),
            self.rng.u32(1..13),
            self.rng.u32(1..29),
        )
    }

    pub fn game(&mut self) -> GameRecord {
        let mut queues: Vec<std::vec::IntoIter<Move>> = Corner::ALL
            .into_iter()
            .map(|corner| self.corner_moves(corner).into_iter())
            .collect();
        let total: usize = queues.iter().map(|q| q.len()).sum();

        let mut moves = Vec::with_capacity(total + self.noise);
        while moves.len() < total {
            let live: Vec<usize> = (0..queues.len()).filter(|&i| queues[i].len() != 0).collect();
            let pick = live[self.rng.usize(0..live.len())];
            moves.extend(queues[pick].next());
        }
        for _ in 0..self.rng.usize(0..=self.noise) {
            let pt = Point::new(self.rng.usize(0..self.size), self.rng.usize(0..self.size));
            let color = if moves.len() % 2 == 0 { Color::Black } else { Color::White };
            moves.push(Move::new(color, pt));
        }

        let mut record = GameRecord::new(self.size, moves)
            .with_ranks(self.rng.i32(1500..2800), self.rng.i32(1500..2800));
        if let Some(date) = self.date() {
            record = record.with_date(date);
        }
        if self.rng.usize(0..100) < 5 {
            record = record.with_handicap(self.rng.u32(2..10));
        }
        record
    }
}

impl Iterator for Synth {
    type Item = GameRecord;

    fn next(&mut self) -> Option<GameRecord> {
        Some(self.game())
    }
}
