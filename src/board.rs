//! Board geometry: colors, points, moves and GTP vertex notation.
//!
//! Points are 0-indexed `(x, y)` pairs with `x` the column from the left edge
//! and `y` the row from the top edge. GTP vertices (`"D4"`) number rows from
//! the bottom, so the conversion needs the board size.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Color {
    #[serde(rename = "B")]
    Black,
    #[serde(rename = "W")]
    White,
}

impl Color {
    pub fn opponent(self) -> Self {
        match self {
            Color::Black => Color::White,
            Color::White => Color::Black,
        }
    }

    /// Parse an SGF-style color letter (`B` or `W`, any case).
    pub fn from_letter(s: &str) -> Option<Self> {
        match s {
            "B" | "b" => Some(Color::Black),
            "W" | "w" => Some(Color::White),
            _ => None,
        }
    }

    pub fn letter(self) -> char {
        match self {
            Color::Black => 'B',
            Color::White => 'W',
        }
    }
}

/// A point on the board.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Point {
    pub x: u8,
    pub y: u8,
}

impl Point {
    pub fn new(x: usize, y: usize) -> Self {
        Self {
            x: x as u8,
            y: y as u8,
        }
    }

    /// Largest of the horizontal and vertical offsets.
    pub fn chebyshev(self, other: Point) -> f64 {
        let dx = (self.x as i32 - other.x as i32).abs();
        let dy = (self.y as i32 - other.y as i32).abs();
        dx.max(dy) as f64
    }

    pub fn euclidean(self, other: Point) -> f64 {
        let dx = self.x as f64 - other.x as f64;
        let dy = self.y as f64 - other.y as f64;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn on_board(self, size: usize) -> bool {
        (self.x as usize) < size && (self.y as usize) < size
    }

    /// Swap the two coordinates (reflection across the main diagonal).
    pub fn transpose(self) -> Self {
        Self {
            x: self.y,
            y: self.x,
        }
    }
}

/// A stone placed by one player. Passes never become a `Move`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Move {
    pub color: Color,
    pub point: Point,
}

impl Move {
    pub fn new(color: Color, point: Point) -> Self {
        Self { color, point }
    }
}

/// Column letter for a 0-indexed column, skipping 'I'.
fn column_letter(x: u8) -> char {
    let c = b'A' + x;
    if c >= b'I' { (c + 1) as char } else { c as char }
}

/// 0-indexed column for a letter, skipping 'I'.
fn letter_column(c: u8) -> Option<u8> {
    let c = c.to_ascii_uppercase();
    match c {
        b'A'..=b'H' => Some(c - b'A'),
        b'J'..=b'Z' => Some(c - b'A' - 1),
        _ => None,
    }
}

/// Parse a GTP vertex (e.g. `"Q16"`) on a board of the given size.
///
/// Returns `None` for `"pass"`, malformed input, or a vertex off the board.
pub fn parse_vertex(s: &str, size: usize) -> Option<Point> {
    let bytes = s.as_bytes();
    if bytes.len() < 2 || s.eq_ignore_ascii_case("pass") {
        return None;
    }
    let x = letter_column(bytes[0])?;
    let row: usize = s[1..].parse().ok()?;
    if row == 0 || row > size || x as usize >= size {
        return None;
    }
    Some(Point::new(x as usize, size - row))
}

/// Format a point as a GTP vertex on a board of the given size.
pub fn vertex(pt: Point, size: usize) -> String {
    format!("{}{}", column_letter(pt.x), size - pt.y as usize)
}

/// Format a corner-local point. Rows count from the corner, so the 4-4 point
/// is `D4` whatever the board size.
pub fn local_vertex(pt: Point) -> String {
    format!("{}{}", column_letter(pt.x), pt.y + 1)
}

/// Inverse of [`local_vertex`].
pub fn parse_local_vertex(s: &str) -> Option<Point> {
    let bytes = s.as_bytes();
    if bytes.len() < 2 {
        return None;
    }
    let x = letter_column(bytes[0])?;
    let row: u8 = s[1..].parse().ok()?;
    if row == 0 {
        return None;
    }
    Some(Point { x, y: row - 1 })
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.color.letter(), local_vertex(self.point))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_skips_i() {
        let h = parse_vertex("H5", 19).unwrap();
        let j = parse_vertex("J5", 19).unwrap();
        assert_eq!(j.x - h.x, 1, "J should be one column after H");
        assert!(parse_vertex("I5", 19).is_none());
    }

    #[test]
    fn test_vertex_rows_from_bottom() {
        assert_eq!(parse_vertex("A19", 19), Some(Point::new(0, 0)));
        assert_eq!(parse_vertex("A1", 19), Some(Point::new(0, 18)));
        assert_eq!(parse_vertex("T1", 19), Some(Point::new(18, 18)));
        assert_eq!(vertex(Point::new(15, 3), 19), "Q16");
    }

    #[test]
    fn test_vertex_rejects_off_board() {
        assert_eq!(parse_vertex("K10", 9), None);
        assert_eq!(parse_vertex("A0", 19), None);
        assert_eq!(parse_vertex("A20", 19), None);
        assert_eq!(parse_vertex("pass", 19), None);
        assert_eq!(parse_vertex("4", 19), None);
    }

    #[test]
    fn test_local_vertex() {
        assert_eq!(local_vertex(Point::new(3, 3)), "D4");
        assert_eq!(local_vertex(Point::new(8, 2)), "J3");
        assert_eq!(parse_local_vertex("J3"), Some(Point::new(8, 2)));
        assert_eq!(parse_local_vertex("D0"), None);
    }

    #[test]
    fn test_distances() {
        let a = Point::new(3, 3);
        let b = Point::new(5, 2);
        assert_eq!(a.chebyshev(b), 2.0);
        assert!((a.euclidean(b) - 5f64.sqrt()).abs() < 1e-9);
    }

    #[test]
    fn test_move_display() {
        let mv = Move::new(Color::White, Point::new(2, 5));
        assert_eq!(mv.to_string(), "W[C6]");
    }
}
