//! Corner sequence extraction.
//!
//! A game is scanned once in play order. Each move is offered to the corner
//! whose quadrant contains it and is admitted only if that corner is its sole
//! claimant:
//!
//! - a corner with moves claims every move within the distance threshold of
//!   its most recent move (measured on the board, Chebyshev by default);
//! - an empty corner claims moves inside its unconditional corner region
//!   (local coordinates below `corner_extent`), and only in its own quadrant.
//!
//! A move claimed by more than one corner is ambiguous. Ambiguous moves, moves
//! nobody claims, moves claimed only by a neighboring corner, and moves for a
//! corner that reached the length cap all go to the overflow list. A full
//! corner keeps its frontier, so it still makes nearby moves ambiguous.

use crate::board::{Move, Point};
use crate::config::{ExtractParams, Metric};
use crate::record::GameRecord;
use crate::symmetry::{Corner, LocalMove, canonicalize, canonicalize_sequence};

/// One corner's growing sequence within a single game.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ActiveSequence {
    board: Vec<Point>,
    local: Vec<LocalMove>,
}

impl ActiveSequence {
    pub fn len(&self) -> usize {
        self.local.len()
    }

    pub fn is_empty(&self) -> bool {
        self.local.is_empty()
    }

    /// Moves in the corner-local frame, before diagonal canonicalization.
    pub fn moves(&self) -> &[LocalMove] {
        &self.local
    }

    /// Board point of the most recent move.
    pub fn frontier(&self) -> Option<Point> {
        self.board.last().copied()
    }

    fn push(&mut self, point: Point, local: LocalMove) {
        self.board.push(point);
        self.local.push(local);
    }
}

/// Result of scanning one game.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Extraction {
    pub sequences: [ActiveSequence; 4],
    /// Moves that joined no sequence, in board coordinates.
    pub overflow: Vec<Move>,
    /// How many overflow moves were claimed by more than one corner.
    pub ambiguous: usize,
}

impl Extraction {
    pub fn sequence(&self, corner: Corner) -> &ActiveSequence {
        &self.sequences[corner.index()]
    }

    /// The non-empty sequences in canonical form, ready to merge.
    pub fn into_canonical(self, normalize_colors: bool) -> Vec<Vec<LocalMove>> {
        self.sequences
            .iter()
            .filter(|seq| !seq.is_empty())
            .map(|seq| canonicalize_sequence(seq.moves(), normalize_colors))
            .collect()
    }
}

/// Assigns the moves of a game to corner sequences.
#[derive(Clone, Debug)]
pub struct Extractor {
    params: ExtractParams,
}

impl Extractor {
    pub fn new(params: ExtractParams) -> Self {
        Self { params }
    }

    fn distance(&self, a: Point, b: Point) -> f64 {
        match self.params.metric {
            Metric::Chebyshev => a.chebyshev(b),
            Metric::Euclidean => a.euclidean(b),
        }
    }

    fn in_corner_region(&self, local: Point) -> bool {
        (local.x as usize) < self.params.corner_extent
            && (local.y as usize) < self.params.corner_extent
    }

    /// Whether corner `k`'s sequence claims a move at `point`, given the
    /// corner that move falls in and its local coordinate.
    fn claims(
        &self,
        k: Corner,
        seq: &ActiveSequence,
        point: Point,
        home: Corner,
        local: Point,
    ) -> bool {
        match seq.frontier() {
            Some(last) => self.distance(point, last) <= self.params.distance,
            None => k == home && self.in_corner_region(local),
        }
    }

    pub fn extract(&self, record: &GameRecord) -> Extraction {
        let mut out = Extraction::default();

        for &mv in &record.moves {
            if !mv.point.on_board(record.size) {
                out.overflow.push(mv);
                continue;
            }
            let (home, local) = canonicalize(mv.point, record.size);

            let mut claimants = 0;
            let mut home_claims = false;
            for k in Corner::ALL {
                if self.claims(k, &out.sequences[k.index()], mv.point, home, local) {
                    claimants += 1;
                    home_claims |= k == home;
                }
            }

            let seq = &mut out.sequences[home.index()];
            if home_claims && claimants == 1 && seq.len() < self.params.max_len {
                seq.push(mv.point, Move::new(mv.color, local));
            } else {
                if claimants > 1 {
                    out.ambiguous += 1;
                }
                out.overflow.push(mv);
            }
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Color;

    fn b(x: usize, y: usize) -> Move {
        Move::new(Color::Black, Point::new(x, y))
    }

    fn w(x: usize, y: usize) -> Move {
        Move::new(Color::White, Point::new(x, y))
    }

    fn extract(moves: Vec<Move>) -> Extraction {
        Extractor::new(ExtractParams::default()).extract(&GameRecord::new(19, moves))
    }

    #[test]
    fn test_two_corners() {
        let out = extract(vec![b(3, 3), w(15, 16), b(5, 2), w(13, 16)]);
        let tl = out.sequence(Corner::TopLeft);
        let br = out.sequence(Corner::BottomRight);
        assert_eq!(tl.len(), 2);
        assert_eq!(br.len(), 2);
        assert!(out.overflow.is_empty());
        assert!(out.sequence(Corner::TopRight).is_empty());
        // Reflected onto the top-left frame.
        assert_eq!(br.moves(), &[w(3, 2), w(5, 2)]);
    }

    #[test]
    fn test_first_move_outside_corner_region() {
        // Tengen and a sixth-line move are no corner's business.
        let out = extract(vec![b(9, 9), w(6, 2), b(2, 2)]);
        assert_eq!(out.overflow, vec![b(9, 9), w(6, 2)]);
        assert_eq!(out.sequence(Corner::TopLeft).moves(), &[b(2, 2)]);
        assert_eq!(out.ambiguous, 0);
    }

    #[test]
    fn test_far_move_in_same_quadrant_overflows() {
        let out = extract(vec![b(2, 2), w(8, 8)]);
        assert_eq!(out.sequence(Corner::TopLeft).len(), 1);
        assert_eq!(out.overflow, vec![w(8, 8)]);
    }

    #[test]
    fn test_ambiguous_move_joins_nothing() {
        // Two top corners whose frontiers are both four columns from K16.
        let out = extract(vec![b(5, 3), w(13, 3), b(9, 3), w(6, 4)]);
        assert_eq!(out.sequence(Corner::TopLeft).len(), 2);
        assert_eq!(out.sequence(Corner::TopRight).len(), 1);
        assert_eq!(out.overflow, vec![b(9, 3)]);
        assert_eq!(out.ambiguous, 1);
    }

    #[test]
    fn test_move_near_neighbor_frontier_only() {
        // (10, 3) is in the top-right quadrant but only near the top-left
        // frontier; the top-right corner is empty and (10, 3) lies outside its
        // corner region.
        let out = extract(vec![b(7, 3), w(10, 3)]);
        assert!(out.sequence(Corner::TopLeft).is_empty(), "(7, 3) is not in the corner region");

        let out = extract(vec![b(5, 3), w(8, 3), b(10, 3)]);
        assert_eq!(out.sequence(Corner::TopLeft).len(), 2);
        assert!(out.sequence(Corner::TopRight).is_empty());
        assert_eq!(out.overflow, vec![b(10, 3)]);
        assert_eq!(out.ambiguous, 0);
    }

    #[test]
    fn test_cap_stops_one_corner_only() {
        let params = ExtractParams {
            max_len: 3,
            ..ExtractParams::default()
        };
        let extractor = Extractor::new(params);
        let moves = vec![
            b(3, 3),
            w(2, 3),
            b(3, 2),
            w(2, 2), // fourth top-left move: over the cap
            b(15, 15),
            w(16, 16),
        ];
        let out = extractor.extract(&GameRecord::new(19, moves));
        assert_eq!(out.sequence(Corner::TopLeft).len(), 3);
        assert_eq!(out.sequence(Corner::BottomRight).len(), 2);
        assert_eq!(out.overflow, vec![w(2, 2)]);
    }

    #[test]
    fn test_off_board_move_overflows() {
        let out = extract(vec![b(3, 3), b(30, 30), w(5, 2)]);
        assert_eq!(out.overflow, vec![b(30, 30)]);
        assert_eq!(out.sequence(Corner::TopLeft).len(), 2);
    }

    #[test]
    fn test_no_move_counted_twice() {
        let mut rng = fastrand::Rng::with_seed(7);
        for _ in 0..50 {
            let moves: Vec<Move> = (0..120)
                .map(|i| {
                    let pt = Point::new(rng.usize(0..19), rng.usize(0..19));
                    let color = if i % 2 == 0 { Color::Black } else { Color::White };
                    Move::new(color, pt)
                })
                .collect();
            let out = extract(moves.clone());
            let placed: usize = out.sequences.iter().map(ActiveSequence::len).sum();
            assert_eq!(placed + out.overflow.len(), moves.len());
            assert!(out.sequences.iter().all(|s| s.len() <= 20));
        }
    }

    #[test]
    fn test_euclidean_metric() {
        let params = ExtractParams {
            metric: Metric::Euclidean,
            distance: 3.0,
            ..ExtractParams::default()
        };
        let extractor = Extractor::new(params);
        // (3, 3) -> (5, 5): Chebyshev 2, Euclidean 2.83; (5, 5) -> (8, 7): 3.61.
        let out = extractor.extract(&GameRecord::new(19, vec![b(3, 3), w(5, 5), b(8, 7)]));
        assert_eq!(out.sequence(Corner::TopLeft).len(), 2);
        assert_eq!(out.overflow, vec![b(8, 7)]);
    }

    #[test]
    fn test_into_canonical_skips_empty_corners() {
        let out = extract(vec![w(3, 3), b(2, 5)]);
        let seqs = out.into_canonical(true);
        assert_eq!(seqs, vec![vec![b(3, 3), w(5, 2)]]);
    }
}
