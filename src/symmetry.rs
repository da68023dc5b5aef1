//! Corner assignment and symmetry canonicalization.
//!
//! Every corner is reflected onto the top-left frame, so a local point
//! `(lx, ly)` is the distance in columns and rows from the corner itself.
//! The diagonal reflection within a corner is resolved per sequence by
//! [`canonicalize_sequence`]: together the two steps cover all eight symmetries
//! of the board.

use crate::board::{Color, Move, Point};

/// A move whose point is in the top-left local frame.
pub type LocalMove = Move;

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Corner {
    TopLeft = 0,
    TopRight = 1,
    BottomLeft = 2,
    BottomRight = 3,
}

impl Corner {
    pub const ALL: [Corner; 4] = [
        Corner::TopLeft,
        Corner::TopRight,
        Corner::BottomLeft,
        Corner::BottomRight,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    fn flips(self) -> (bool, bool) {
        match self {
            Corner::TopLeft => (false, false),
            Corner::TopRight => (true, false),
            Corner::BottomLeft => (false, true),
            Corner::BottomRight => (true, true),
        }
    }

    /// Map a local point back onto the board in this corner.
    pub fn to_board(self, local: Point, size: usize) -> Point {
        let (flip_x, flip_y) = self.flips();
        reflect(local, flip_x, flip_y, size)
    }
}

fn reflect(pt: Point, flip_x: bool, flip_y: bool, size: usize) -> Point {
    let last = (size - 1) as u8;
    Point {
        x: if flip_x { last - pt.x } else { pt.x },
        y: if flip_y { last - pt.y } else { pt.y },
    }
}

/// Find the corner a point belongs to and its local coordinate.
///
/// Points on a center line go to the lower-index corner, i.e. the left or top
/// half.
pub fn canonicalize(pt: Point, size: usize) -> (Corner, Point) {
    let right = 2 * pt.x as usize > size - 1;
    let bottom = 2 * pt.y as usize > size - 1;
    let corner = match (right, bottom) {
        (false, false) => Corner::TopLeft,
        (true, false) => Corner::TopRight,
        (false, true) => Corner::BottomLeft,
        (true, true) => Corner::BottomRight,
    };
    (corner, reflect(pt, right, bottom, size))
}

/// Whether a sequence must be transposed to reach its canonical orientation:
/// the first move off the diagonal has to lie on the `lx > ly` side.
fn needs_transpose(seq: &[LocalMove]) -> bool {
    seq.iter()
        .map(|mv| mv.point)
        .find(|pt| pt.x != pt.y)
        .is_some_and(|pt| pt.x < pt.y)
}

/// Resolve the diagonal reflection of a local sequence and, if
/// `normalize_colors` is set, swap colors so the first move is Black.
pub fn canonicalize_sequence(seq: &[LocalMove], normalize_colors: bool) -> Vec<LocalMove> {
    let transpose = needs_transpose(seq);
    let swap = normalize_colors
        && seq
            .first()
            .is_some_and(|mv| mv.color == Color::White);
    seq.iter()
        .map(|mv| Move {
            color: if swap { mv.color.opponent() } else { mv.color },
            point: if transpose { mv.point.transpose() } else { mv.point },
        })
        .collect()
}
