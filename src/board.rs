//! Go board representation and rules.
//!
//! This module provides the core game logic:
//! - Board state as a flat arena of cells addressed column-major
//! - Groups tracked as a disjoint-set forest (union by rank, path compression)
//!   whose roots hold the exact liberty count of the whole group
//! - Legality checking (occupancy, ko, suicide) through one predicate with
//!   a strict and a fast, ko-unaware, entry point
//! - Capture propagation and a simplified adjacency-based score
//!
//! Liberty counts are kept exact after every placement and capture, so
//! [`Board::liberties`] is an O(α) lookup rather than a flood fill.

use std::fmt;
use std::ops::Neg;

use thiserror::Error;

use crate::constants::COLUMN_LETTERS;
use crate::position::{Move, Point};

/// Stone color, also used for the player to move.
///
/// `Black` and `White` are numeric negatives of each other, so the opponent
/// of a color is `-color`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(i8)]
pub enum Color {
    White = -1,
    #[default]
    Empty = 0,
    Black = 1,
}

impl Color {
    #[inline]
    pub fn opponent(self) -> Color {
        -self
    }

    #[inline]
    pub fn is_stone(self) -> bool {
        self != Color::Empty
    }
}

impl Neg for Color {
    type Output = Color;

    #[inline]
    fn neg(self) -> Color {
        match self {
            Color::Black => Color::White,
            Color::White => Color::Black,
            Color::Empty => Color::Empty,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Color::Black => "black",
            Color::White => "white",
            Color::Empty => "empty",
        })
    }
}

/// Why a move was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Reason {
    #[error("position not on board")]
    OffBoard,
    #[error("position not empty")]
    Occupied,
    #[error("ko capture")]
    Ko,
    #[error("suicide move")]
    Suicide,
    #[error("invalid player")]
    InvalidPlayer,
}

/// A rejected move: what was tried, by whom, and why.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("({mv} {player}) : {reason}")]
pub struct IllegalMove {
    pub mv: Move,
    pub player: Color,
    pub reason: Reason,
}

/// One board point.
///
/// `parent` and `rank` form the disjoint-set forest. `libs` is only
/// meaningful on a group root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    color: Color,
    parent: usize,
    rank: u8,
    libs: usize,
}

impl Cell {
    fn empty(idx: usize) -> Self {
        Self {
            color: Color::Empty,
            parent: idx,
            rank: 0,
            libs: 0,
        }
    }

    #[inline]
    pub fn color(&self) -> Color {
        self.color
    }
}

/// Result of [`Board::score`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Score {
    /// `black - white`; positive favors Black.
    pub net: i32,
    pub black: usize,
    pub white: usize,
}

impl Score {
    /// Black wins on a strictly positive score, White otherwise.
    pub fn winner(&self) -> Color {
        if self.net > 0 { Color::Black } else { Color::White }
    }

    pub fn as_array(&self) -> [i32; 3] {
        [self.net, self.black as i32, self.white as i32]
    }
}

/// A Go board (position plus game bookkeeping).
///
/// Cloning produces a fully independent value copy, which is how playouts
/// and tree nodes get their private boards.
#[derive(Debug, Clone)]
pub struct Board {
    xdim: usize,
    ydim: usize,
    cells: Vec<Cell>,
    player: Color,
    last: Option<Move>,
    second_last: Option<Move>,
    /// Stone that just captured exactly one stone, if any.
    ko: Option<Point>,
    /// Visit marks for liberty recounts; a cell is visited when it holds `stamp`.
    marks: Vec<u32>,
    stamp: u32,
    stack: Vec<usize>,
}

impl Default for Board {
    fn default() -> Self {
        Self::new(crate::constants::DEFAULT_DIM)
    }
}

impl Board {
    /// Create an empty `dim x dim` board with Black to move.
    ///
    /// # Panics
    /// If `dim` is zero.
    pub fn new(dim: usize) -> Self {
        Self::with_size(dim, dim)
    }

    /// Create an empty `xdim x ydim` board with Black to move.
    ///
    /// # Panics
    /// If either dimension is zero.
    pub fn with_size(xdim: usize, ydim: usize) -> Self {
        assert!(xdim > 0 && ydim > 0, "board dimensions must be positive");
        Self {
            xdim,
            ydim,
            cells: (0..xdim * ydim).map(Cell::empty).collect(),
            player: Color::Black,
            last: None,
            second_last: None,
            ko: None,
            marks: vec![0; xdim * ydim],
            stamp: 0,
            stack: Vec::new(),
        }
    }

    #[inline]
    pub fn xdim(&self) -> usize {
        self.xdim
    }

    #[inline]
    pub fn ydim(&self) -> usize {
        self.ydim
    }

    /// Number of points on the board.
    #[inline]
    pub fn area(&self) -> usize {
        self.xdim * self.ydim
    }

    /// The player to move.
    #[inline]
    pub fn player(&self) -> Color {
        self.player
    }

    pub fn set_player(&mut self, player: Color) {
        self.player = player;
    }

    pub fn last_move(&self) -> Option<Move> {
        self.last
    }

    pub fn second_last_move(&self) -> Option<Move> {
        self.second_last
    }

    pub fn ko(&self) -> Option<Point> {
        self.ko
    }

    // =========================================================================
    // Indexing
    // =========================================================================

    /// Arena index of a point, or `None` if it is off the board.
    #[inline]
    pub fn index(&self, p: Point) -> Option<usize> {
        if p.x < 1 || p.y < 1 || p.x > self.xdim || p.y > self.ydim {
            return None;
        }
        Some((p.x - 1) * self.ydim + (p.y - 1))
    }

    #[inline]
    fn point_of(&self, idx: usize) -> Point {
        Point::new(idx / self.ydim + 1, idx % self.ydim + 1)
    }

    /// Slot number of a move among [`Board::moves`]: points first, pass last.
    pub fn move_index(&self, mv: Move) -> Option<usize> {
        match mv {
            Move::Pass => Some(self.area()),
            Move::Play(p) => self.index(p),
        }
    }

    /// Inverse of [`Board::move_index`].
    pub fn move_at(&self, slot: usize) -> Move {
        if slot >= self.area() {
            Move::Pass
        } else {
            Move::Play(self.point_of(slot))
        }
    }

    /// All points, column-major (x outer, y inner).
    pub fn points(&self) -> impl Iterator<Item = Point> + use<> {
        let (xdim, ydim) = (self.xdim, self.ydim);
        (1..=xdim).flat_map(move |x| (1..=ydim).map(move |y| Point::new(x, y)))
    }

    /// Every candidate move: all points column-major, then pass.
    pub fn moves(&self) -> impl Iterator<Item = Move> + use<> {
        self.points()
            .map(Move::Play)
            .chain(std::iter::once(Move::Pass))
    }

    /// Cell under a move, or `None` for a pass or an off-board point.
    pub fn get(&self, mv: Move) -> Option<&Cell> {
        match mv {
            Move::Pass => None,
            Move::Play(p) => self.index(p).map(|i| &self.cells[i]),
        }
    }

    /// Color at a point, or `None` if off the board.
    pub fn color(&self, p: Point) -> Option<Color> {
        self.index(p).map(|i| self.cells[i].color)
    }

    // =========================================================================
    // Adjacency
    // =========================================================================

    /// Orthogonal neighbors in the order right, up, left, down.
    /// `None` marks the board edge.
    #[inline]
    fn adjacent_indices(&self, idx: usize) -> [Option<usize>; 4] {
        let x = idx / self.ydim;
        let y = idx % self.ydim;
        [
            (x + 1 < self.xdim).then(|| idx + self.ydim),
            (y + 1 < self.ydim).then(|| idx + 1),
            (x > 0).then(|| idx - self.ydim),
            (y > 0).then(|| idx - 1),
        ]
    }

    /// Orthogonal neighbors of `p` (right, up, left, down). `None` marks a
    /// neighbor off the board; all four are `None` if `p` itself is off.
    pub fn adjacent(&self, p: Point) -> [Option<Point>; 4] {
        match self.index(p) {
            Some(idx) => self.adjacent_indices(idx).map(|n| n.map(|n| self.point_of(n))),
            None => [None; 4],
        }
    }

    // =========================================================================
    // Groups
    // =========================================================================

    /// Root of the set containing `idx`, without compressing the path.
    #[inline]
    fn root(&self, mut idx: usize) -> usize {
        while self.cells[idx].parent != idx {
            idx = self.cells[idx].parent;
        }
        idx
    }

    /// Root of the set containing `idx`, compressing the path behind it.
    fn find(&mut self, idx: usize) -> usize {
        let root = self.root(idx);
        let mut cur = idx;
        while cur != root {
            let next = self.cells[cur].parent;
            self.cells[cur].parent = root;
            cur = next;
        }
        root
    }

    /// Join the sets of `a` and `b` by rank. Liberty counts are not touched.
    fn union(&mut self, a: usize, b: usize) -> usize {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra == rb {
            return ra;
        }
        let (ka, kb) = (self.cells[ra].rank, self.cells[rb].rank);
        if ka < kb {
            self.cells[ra].parent = rb;
            rb
        } else if ka > kb {
            self.cells[rb].parent = ra;
            ra
        } else {
            self.cells[ra].parent = rb;
            self.cells[rb].rank += 1;
            rb
        }
    }

    /// Representative point of the group containing the stone at `p`.
    pub fn group_root(&self, p: Point) -> Option<Point> {
        let idx = self.index(p)?;
        if !self.cells[idx].color.is_stone() {
            return None;
        }
        Some(self.point_of(self.root(idx)))
    }

    /// Liberty count of the group containing the stone at `p`.
    pub fn liberties(&self, p: Point) -> Option<usize> {
        let idx = self.index(p)?;
        if !self.cells[idx].color.is_stone() {
            return None;
        }
        Some(self.cells[self.root(idx)].libs)
    }

    /// Liberty count of the group at `p` computed by flood fill, independent
    /// of the incremental bookkeeping.
    pub fn count_liberties(&self, p: Point) -> Option<usize> {
        let idx = self.index(p)?;
        if !self.cells[idx].color.is_stone() {
            return None;
        }
        Some(self.flood_liberties(idx))
    }

    fn flood_liberties(&self, start: usize) -> usize {
        let color = self.cells[start].color;
        let mut seen = vec![false; self.cells.len()];
        let mut stack = vec![start];
        let mut libs = 0;
        seen[start] = true;

        while let Some(i) = stack.pop() {
            for n in self.adjacent_indices(i).into_iter().flatten() {
                if seen[n] {
                    continue;
                }
                let c = self.cells[n].color;
                if c == Color::Empty {
                    seen[n] = true;
                    libs += 1;
                } else if c == color {
                    seen[n] = true;
                    stack.push(n);
                }
            }
        }
        libs
    }

    /// Same count as [`Board::flood_liberties`], reusing the board's scratch
    /// marks and stack instead of allocating.
    fn recount_liberties(&mut self, start: usize) -> usize {
        self.stamp = self.stamp.wrapping_add(1);
        if self.stamp == 0 {
            self.marks.fill(0);
            self.stamp = 1;
        }
        let stamp = self.stamp;
        let color = self.cells[start].color;
        let mut stack = std::mem::take(&mut self.stack);
        stack.clear();
        stack.push(start);
        self.marks[start] = stamp;
        let mut libs = 0;

        while let Some(i) = stack.pop() {
            for n in self.adjacent_indices(i).into_iter().flatten() {
                if self.marks[n] == stamp {
                    continue;
                }
                let c = self.cells[n].color;
                if c == Color::Empty {
                    self.marks[n] = stamp;
                    libs += 1;
                } else if c == color {
                    self.marks[n] = stamp;
                    stack.push(n);
                }
            }
        }
        self.stack = stack;
        libs
    }

    // =========================================================================
    // Legality
    // =========================================================================

    /// The single legality predicate behind [`Board::check`] and
    /// [`Board::check_fast`]. Checks run in the order
    /// player, bounds, occupancy, ko (if asked), suicide.
    fn legality(&self, mv: Move, player: Color, check_ko: bool) -> Result<(), Reason> {
        if !player.is_stone() {
            return Err(Reason::InvalidPlayer);
        }
        let p = match mv {
            Move::Pass => return Ok(()),
            Move::Play(p) => p,
        };
        let idx = self.index(p).ok_or(Reason::OffBoard)?;
        if self.cells[idx].color != Color::Empty {
            return Err(Reason::Occupied);
        }
        if check_ko && self.retakes_ko(idx, player) {
            return Err(Reason::Ko);
        }
        if self.is_suicide(idx, player) {
            return Err(Reason::Suicide);
        }
        Ok(())
    }

    fn retakes_ko(&self, idx: usize, player: Color) -> bool {
        let Some(k) = self.ko.and_then(|p| self.index(p)) else {
            return false;
        };
        self.cells[k].color == -player
            && self.cells[self.root(k)].libs == 1
            && self.adjacent_indices(idx).contains(&Some(k))
    }

    /// A move is suicide when it has no empty neighbor, no friendly neighbor
    /// group that keeps a liberty, and no enemy neighbor group it captures.
    fn is_suicide(&self, idx: usize, player: Color) -> bool {
        for n in self.adjacent_indices(idx).into_iter().flatten() {
            let c = self.cells[n].color;
            if c == Color::Empty {
                return false;
            }
            let libs = self.cells[self.root(n)].libs;
            if (c == player && libs > 1) || (c == -player && libs == 1) {
                return false;
            }
        }
        true
    }

    /// Strict legality check.
    ///
    /// Ko binds only the opponent of the stone that captured: that side may
    /// not retake at once, while the capturer may still fill next to the ko
    /// stone.
    ///
    /// # Errors
    /// [`IllegalMove`] with reason `InvalidPlayer`, `OffBoard`, `Occupied`,
    /// `Ko` or `Suicide`.
    pub fn check(&self, mv: Move, player: Color) -> Result<(), IllegalMove> {
        self.legality(mv, player, true)
            .map_err(|reason| IllegalMove { mv, player, reason })
    }

    /// Ko-unaware legality check for playouts. May accept a ko retake that
    /// [`Board::check`] rejects.
    #[inline]
    pub fn check_fast(&self, mv: Move, player: Color) -> bool {
        self.legality(mv, player, false).is_ok()
    }

    // =========================================================================
    // Moves
    // =========================================================================

    /// Validate and place a stone for `player`. The player to move is not
    /// changed. Returns the number of captured stones.
    pub fn place(&mut self, mv: Move, player: Color) -> Result<usize, IllegalMove> {
        self.check(mv, player)?;
        Ok(self.place_unchecked(mv, player))
    }

    /// Validate and play a move for the player to move, then hand the turn
    /// to the opponent. Returns the number of captured stones.
    pub fn play(&mut self, mv: Move) -> Result<usize, IllegalMove> {
        let player = self.player;
        let captured = self.place(mv, player)?;
        self.player = -player;
        Ok(captured)
    }

    /// Place without validation; the caller guarantees the move passes at
    /// least [`Board::check_fast`]. Returns the number of captured stones.
    pub fn place_unchecked(&mut self, mv: Move, player: Color) -> usize {
        self.ko = None;
        let mut captured = 0;
        if let Move::Play(p) = mv {
            match self.index(p) {
                Some(idx) if self.cells[idx].color == Color::Empty && player.is_stone() => {
                    captured = self.put_stone(idx, player);
                }
                _ => {
                    log::warn!("ignoring unchecked placement {mv} for {player}");
                    return 0;
                }
            }
        }
        self.second_last = self.last;
        self.last = Some(mv);
        captured
    }

    fn put_stone(&mut self, idx: usize, player: Color) -> usize {
        let adj = self.adjacent_indices(idx);

        // The new stone takes exactly one liberty from each distinct group.
        let mut roots = [usize::MAX; 4];
        let mut n_roots = 0;
        for n in adj.into_iter().flatten() {
            if self.cells[n].color.is_stone() {
                let r = self.find(n);
                if !roots[..n_roots].contains(&r) {
                    roots[n_roots] = r;
                    n_roots += 1;
                }
            }
        }
        for &r in &roots[..n_roots] {
            debug_assert!(self.cells[r].libs > 0);
            self.cells[r].libs = self.cells[r].libs.saturating_sub(1);
        }

        let mut captured = 0;
        for n in adj.into_iter().flatten() {
            if self.cells[n].color == -player {
                let r = self.find(n);
                if self.cells[r].libs == 0 {
                    captured += self.remove_group(n);
                }
            }
        }

        let libs = adj
            .into_iter()
            .flatten()
            .filter(|&n| self.cells[n].color == Color::Empty)
            .count();
        self.cells[idx] = Cell {
            color: player,
            parent: idx,
            rank: 0,
            libs,
        };

        let mut joined = false;
        for n in adj.into_iter().flatten() {
            if self.cells[n].color == player {
                self.union(idx, n);
                joined = true;
            }
        }

        if joined {
            // Merged groups may share liberties; count the union.
            let root = self.find(idx);
            self.cells[root].libs = self.recount_liberties(idx);
        } else if captured == 1 {
            self.ko = Some(self.point_of(idx));
        }
        captured
    }

    /// Remove the stone at `p` and every stone connected to it. Returns the
    /// number of stones removed (0 if `p` is empty or off the board).
    pub fn capture(&mut self, p: Point) -> usize {
        match self.index(p) {
            Some(idx) => self.remove_group(idx),
            None => 0,
        }
    }

    fn remove_group(&mut self, start: usize) -> usize {
        let color = self.cells[start].color;
        if !color.is_stone() {
            return 0;
        }
        let mut stack = vec![start];
        let mut count = 0;

        while let Some(i) = stack.pop() {
            if self.cells[i].color != color {
                continue;
            }
            self.cells[i] = Cell::empty(i);
            count += 1;

            // Each opposing group touching this point gains it once.
            let mut bumped = [usize::MAX; 4];
            let mut n_bumped = 0;
            for n in self.adjacent_indices(i).into_iter().flatten() {
                let c = self.cells[n].color;
                if c == color {
                    stack.push(n);
                } else if c == -color {
                    let r = self.find(n);
                    if !bumped[..n_bumped].contains(&r) {
                        bumped[n_bumped] = r;
                        n_bumped += 1;
                        self.cells[r].libs += 1;
                    }
                }
            }
        }
        count
    }

    // =========================================================================
    // Scoring
    // =========================================================================

    /// Approximate area score.
    ///
    /// Every stone counts for its color. Every empty point adds one to each
    /// color present among its orthogonal neighbors. This is not territory
    /// counting: points inside larger empty regions count for nobody, and a
    /// point bordering both colors counts for both.
    pub fn score(&self) -> Score {
        let mut black = 0;
        let mut white = 0;
        for (idx, cell) in self.cells.iter().enumerate() {
            match cell.color {
                Color::Black => black += 1,
                Color::White => white += 1,
                Color::Empty => {
                    let mut near_black = false;
                    let mut near_white = false;
                    for n in self.adjacent_indices(idx).into_iter().flatten() {
                        match self.cells[n].color {
                            Color::Black => near_black = true,
                            Color::White => near_white = true,
                            Color::Empty => {}
                        }
                    }
                    black += near_black as usize;
                    white += near_white as usize;
                }
            }
        }
        Score {
            net: black as i32 - white as i32,
            black,
            white,
        }
    }
}

impl Board {
    fn write_column_letters(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "    ")?;
        for x in 0..self.xdim {
            let c = COLUMN_LETTERS.get(x).copied().unwrap_or(b'?') as char;
            write!(f, "{c} ")?;
        }
        writeln!(f)
    }
}

/// Text rendering: `#` black, `O` white, `+` star points on 13x13 and
/// 19x19, `-` elsewhere. The last move is bracketed.
impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let last = self.last.and_then(Move::point);
        let stars = self.xdim == 19 || self.xdim == 13;

        self.write_column_letters(f)?;
        for y in (1..=self.ydim).rev() {
            let open = if last == Some(Point::new(1, y)) { '[' } else { ' ' };
            write!(f, " {y:2}{open}")?;
            for x in 1..=self.xdim {
                let ch = match self.color(Point::new(x, y)) {
                    Some(Color::Black) => '#',
                    Some(Color::White) => 'O',
                    _ if stars && x % 6 == 4 && y % 6 == 4 => '+',
                    _ => '-',
                };
                let after = if last == Some(Point::new(x, y)) {
                    ']'
                } else if last == Some(Point::new(x + 1, y)) {
                    '['
                } else {
                    ' '
                };
                write!(f, "{ch}{after}")?;
            }
            writeln!(f, "{y:<2}")?;
        }
        self.write_column_letters(f)
    }
}
