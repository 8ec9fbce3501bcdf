//! Board coordinates and moves.
//!
//! Points are 1-indexed `(x, y)` pairs with `x` counting columns from the
//! left and `y` counting rows from the bottom. A [`Move`] is either a point
//! or a pass. Pass is its own variant and is never used to mean "off the
//! board"; adjacency lookups report the board edge with `None` instead.
//!
//! Text coordinates use the usual Go convention: a column letter (skipping
//! `I`) followed by the row number, e.g. `"D4"`.

use std::fmt;

use thiserror::Error;

use crate::constants::COLUMN_LETTERS;

/// A point on the board, 1-indexed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Point {
    pub x: usize,
    pub y: usize,
}

impl Point {
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

/// A move: place a stone at a point, or pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Move {
    Pass,
    Play(Point),
}

impl Move {
    /// Shorthand for `Move::Play(Point::new(x, y))`.
    pub const fn at(x: usize, y: usize) -> Self {
        Move::Play(Point::new(x, y))
    }

    pub fn is_pass(self) -> bool {
        matches!(self, Move::Pass)
    }

    /// The point of a stone move, or `None` for a pass.
    pub fn point(self) -> Option<Point> {
        match self {
            Move::Pass => None,
            Move::Play(p) => Some(p),
        }
    }
}

impl From<Point> for Move {
    fn from(p: Point) -> Self {
        Move::Play(p)
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&str_coord(*self))
    }
}

/// Error returned when move text cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseMoveError {
    #[error("empty move")]
    Empty,
    #[error("unknown column '{0}'")]
    BadColumn(char),
    #[error("invalid row '{0}'")]
    BadRow(String),
}

/// Parse a coordinate string (e.g. `"D4"`, `"pass"`) into a [`Move`].
///
/// Columns `A`-`Z` without `I` are accepted case-insensitively, so up to 25
/// columns can be named. Whether the point lies on a particular board is
/// not checked here; [`crate::board::Board::check`] reports that.
pub fn parse_move(s: &str) -> Result<Move, ParseMoveError> {
    let s = s.trim();
    if s.eq_ignore_ascii_case("pass") {
        return Ok(Move::Pass);
    }

    let mut chars = s.chars();
    let col_char = chars.next().ok_or(ParseMoveError::Empty)?;
    let upper = col_char.to_ascii_uppercase();
    let x = COLUMN_LETTERS
        .iter()
        .position(|&c| c as char == upper)
        .map(|i| i + 1)
        .ok_or(ParseMoveError::BadColumn(col_char))?;

    let rest = chars.as_str().trim();
    let y: usize = rest
        .parse()
        .map_err(|_| ParseMoveError::BadRow(rest.to_string()))?;
    if y == 0 {
        return Err(ParseMoveError::BadRow(rest.to_string()));
    }

    Ok(Move::at(x, y))
}

/// Convert a [`Move`] to a coordinate string (e.g. `"D4"`).
///
/// Returns `"pass"` for a pass.
pub fn str_coord(mv: Move) -> String {
    match mv {
        Move::Pass => "pass".into(),
        Move::Play(Point { x, y }) => match COLUMN_LETTERS.get(x.wrapping_sub(1)) {
            Some(&c) => format!("{}{y}", c as char),
            None => format!("({x},{y})"),
        },
    }
}
